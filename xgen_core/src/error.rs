use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum XgenError {
	#[error(transparent)]
	#[diagnostic(code(xgen::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(xgen::config_parse),
		help("check that xgen.toml is valid TOML with `[[profiles]]` and/or `[analysis]` sections")
	)]
	ConfigParse(String),

	#[error("failed to load profile file `{path}`: {reason}")]
	#[diagnostic(code(xgen::profile_file))]
	ProfileFile { path: String, reason: String },

	#[error("unsupported profile file format: `{0}`")]
	#[diagnostic(
		code(xgen::unsupported_format),
		help("supported formats: json, toml, yaml, yml")
	)]
	UnsupportedProfileFormat(String),

	#[error("no profile named `{0}`")]
	#[diagnostic(
		code(xgen::missing_profile),
		help("run `xgen profiles` to list the available profile names")
	)]
	MissingProfile(String),

	#[error("no profile is configured for project type `{0}`")]
	#[diagnostic(
		code(xgen::missing_project_profile),
		help("add `project_type = \"{0}\"` to one of the `[[profiles]]` entries")
	)]
	MissingProjectProfile(String),

	#[error("the profile set is empty")]
	#[diagnostic(
		code(xgen::empty_profile_set),
		help("declare at least one `[[profiles]]` entry or remove the override")
	)]
	EmptyProfileSet,

	#[error("failed to read class facts from `{path}`: {reason}")]
	#[diagnostic(
		code(xgen::class_facts),
		help("class facts are JSON: `{{\"name\": \"Person\", \"members\": [...]}}`")
	)]
	ClassFacts { path: String, reason: String },

	#[error("edit at {start}..{end} overlaps an earlier edit ending at {previous_end}")]
	#[diagnostic(code(xgen::overlapping_edits))]
	OverlappingEdits {
		start: usize,
		end: usize,
		previous_end: usize,
	},

	#[error("edit at {start}..{end} is outside of the {len} byte document")]
	#[diagnostic(code(xgen::edit_out_of_bounds))]
	EditOutOfBounds { start: usize, end: usize, len: usize },

	#[error("no `{name}` element starts at byte {offset}")]
	#[diagnostic(
		code(xgen::fix_target_not_found),
		help("the document changed after the fix was suggested; analyze it again")
	)]
	FixTargetNotFound { name: String, offset: usize },

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(xgen::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },
}

pub type XgenResult<T> = Result<T, XgenError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
