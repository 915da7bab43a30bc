//! `xgen_core` turns class member facts into UI markup and checks markup for
//! common problems.
//!
//! ## Generation pipeline
//!
//! ```text
//! ClassDescriptor (member facts)
//!   → Resolver (picks one template per member from the profile's mappings)
//!   → Expander (substitutes $placeholders$, counters and nested members)
//!   → Assembler (accessible members only, class grouping, indentation)
//!   → markup string
//! ```
//!
//! ## Analysis pipeline
//!
//! ```text
//! markup text
//!   → markup scanner (element spans, attributes, exclusion zones)
//!   → analyzers (one finding and optional fix per element)
//!   → edit script (non-overlapping text edits against one snapshot)
//!   → new text
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `xgen.toml` discovery and loading.
//! - [`markup`]: heuristic element scanning and the lightweight element tree.
//! - [`analyzers`]: the built-in `XG1xx` analyzers.
//! - [`project`]: markup file discovery and project-wide analysis.
//!
//! ## Quick start
//!
//! ```rust
//! use xgen_core::MemberDescriptor;
//! use xgen_core::ProfileSet;
//! use xgen_core::build_output;
//!
//! let profiles = ProfileSet::defaults().unwrap();
//! let profile = profiles.get("UWP").unwrap();
//! let members = vec![MemberDescriptor::new("FirstName", "string", false)];
//!
//! let output = build_output(profile, &members);
//! assert!(output.starts_with("<StackPanel>"));
//! assert!(output.contains("Header=\"First Name\""));
//! ```

pub use analysis::*;
pub use assembler::*;
pub use config::*;
pub use error::*;
pub use expander::*;
pub use fix::*;
pub use markup::*;
pub use member::*;
pub use placeholders::*;
pub use profile::*;
pub use project::*;
pub use resolver::*;
pub use settings::*;

mod analysis;
pub mod analyzers;
mod assembler;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod expander;
mod fix;
pub mod markup;
mod member;
mod placeholders;
mod profile;
pub mod project;
mod resolver;
mod settings;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
