//! Heuristic markup scanning: element spans, a lightweight element tree and
//! attribute lookup.

mod attribute;
mod element;
mod scanner;

pub use attribute::*;
pub use element::*;
pub use scanner::ElementFilter;
pub use scanner::ElementScan;
pub use scanner::ElementSpan;
pub use scanner::LineTable;
pub use scanner::ScanIssue;
pub use scanner::ScanIssueKind;
pub use scanner::ScanMode;
pub use scanner::comment_ranges;
pub use scanner::element_end;
pub use scanner::element_name_at;
pub use scanner::exclusion_zones;
pub use scanner::find_closing_tag;
pub use scanner::is_self_closing;
pub use scanner::line_indent_at;
pub use scanner::opening_tag_end;
pub use scanner::parse;
pub use scanner::scan_elements;
