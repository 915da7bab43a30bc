//! Byte-level scanning helpers for markup text.
//!
//! Nothing here builds a DOM. Element boundaries are found by walking tags
//! and counting same-named openings and closings, which is enough for
//! generated and hand-written UI markup while tolerating text that is not
//! well formed.

use std::fmt::Display;
use std::ops::Range;

use serde::Serialize;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Position of an element found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSpan {
	pub name: String,
	/// Byte offset of the opening `<`.
	pub start: usize,
	/// Byte length up to and including the final `>`.
	pub length: usize,
	pub is_self_closing: bool,
}

impl ElementSpan {
	pub fn end(&self) -> usize {
		self.start + self.length
	}

	pub fn range(&self) -> Range<usize> {
		self.start..self.end()
	}
}

/// Which elements a scan reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementFilter {
	/// Only elements with exactly this name. Property elements such as
	/// `Grid.RowDefinitions` are distinct from `Grid`.
	Named(String),
	Any,
}

impl ElementFilter {
	pub fn named(name: impl Into<String>) -> Self {
		Self::Named(name.into())
	}

	pub fn accepts(&self, element_name: &str) -> bool {
		match self {
			Self::Named(name) => name == element_name,
			Self::Any => true,
		}
	}
}

/// Whether a scan looks inside elements it has already reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
	/// Matches nested inside another match are skipped.
	#[default]
	TopLevel,
	/// Every match is reported, including nested ones.
	Descend,
}

/// Something the scanner could not make sense of. Scanning continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanIssue {
	pub offset: usize,
	pub kind: ScanIssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ScanIssueKind {
	/// An opening tag with no matching closing tag.
	UnclosedElement { name: String },
	/// A `<name` with no closing `>`.
	UnterminatedTag { name: String },
	UnterminatedComment,
}

impl Display for ScanIssue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.kind {
			ScanIssueKind::UnclosedElement { name } => {
				write!(f, "element `{name}` at byte {} is never closed", self.offset)
			}
			ScanIssueKind::UnterminatedTag { name } => {
				write!(f, "tag `<{name}` at byte {} has no closing `>`", self.offset)
			}
			ScanIssueKind::UnterminatedComment => {
				write!(f, "comment at byte {} is never closed", self.offset)
			}
		}
	}
}

/// Result of [`scan_elements`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementScan {
	pub elements: Vec<ElementSpan>,
	pub issues: Vec<ScanIssue>,
}

/// Byte ranges covered by `<!-- ... -->` comments. An unterminated comment
/// runs to the end of the text.
pub fn comment_ranges(text: &str) -> Vec<Range<usize>> {
	let mut ranges = Vec::new();
	let mut from = 0;

	while let Some(relative) = text[from..].find(COMMENT_OPEN) {
		let start = from + relative;
		let body = start + COMMENT_OPEN.len();
		let end = text[body..]
			.find(COMMENT_CLOSE)
			.map_or(text.len(), |close| body + close + COMMENT_CLOSE.len());
		ranges.push(start..end);
		from = end;
	}

	ranges
}

fn containing_range(ranges: &[Range<usize>], offset: usize) -> Option<&Range<usize>> {
	ranges.iter().find(|range| range.contains(&offset))
}

fn is_name_terminator(ch: char) -> bool {
	ch.is_whitespace() || ch == '>' || ch == '/'
}

/// The element name of the tag opening at `start`. `None` when `start` is not
/// an opening tag (closing tags, comments, declarations and processing
/// instructions included).
pub fn element_name_at(text: &str, start: usize) -> Option<&str> {
	let after = text.get(start..)?.strip_prefix('<')?;
	let length = after.find(is_name_terminator).unwrap_or(after.len());
	let name = &after[..length];

	if name.is_empty() || name.starts_with(['!', '?']) {
		return None;
	}

	Some(name)
}

/// Name of the closing tag at `start`, e.g. `Grid` for `</Grid>`.
fn closing_name_at(text: &str, start: usize) -> Option<&str> {
	let after = text.get(start..)?.strip_prefix("</")?;
	let length = after.find(is_name_terminator).unwrap_or(after.len());
	let name = &after[..length];

	(!name.is_empty()).then_some(name)
}

/// Offset of the first `>` after `start` that is not inside a quoted
/// attribute value.
fn unquoted_tag_close(text: &str, start: usize) -> Option<usize> {
	let mut quote: Option<char> = None;

	for (index, ch) in text.get(start..)?.char_indices() {
		match (quote, ch) {
			(Some(open), ch) if ch == open => quote = None,
			(Some(_), _) => {}
			(None, '"' | '\'') => quote = Some(ch),
			(None, '>') => return Some(start + index),
			(None, _) => {}
		}
	}

	None
}

/// Offset just past the `>` that ends the opening tag starting at `start`.
pub fn opening_tag_end(text: &str, start: usize) -> Option<usize> {
	unquoted_tag_close(text, start).map(|close| close + 1)
}

/// Whether the tag at `start` ends with `/>`. Slashes inside quoted attribute
/// values do not count.
pub fn is_self_closing(text: &str, start: usize) -> bool {
	unquoted_tag_close(text, start)
		.is_some_and(|close| text[start..close].trim_end().ends_with('/'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
	Open,
	Close,
}

#[derive(Debug, Clone, Copy)]
struct Tag<'t> {
	kind: TagKind,
	name: &'t str,
	start: usize,
}

/// Find the next opening or closing tag at or after `from`, skipping comments.
fn next_tag<'t>(text: &'t str, from: usize, comments: &[Range<usize>]) -> Option<Tag<'t>> {
	let mut cursor = from;

	while let Some(relative) = text.get(cursor..)?.find('<') {
		let start = cursor + relative;

		if let Some(comment) = containing_range(comments, start) {
			cursor = comment.end;
			continue;
		}

		if let Some(name) = closing_name_at(text, start) {
			return Some(Tag {
				kind: TagKind::Close,
				name,
				start,
			});
		}

		if let Some(name) = element_name_at(text, start) {
			return Some(Tag {
				kind: TagKind::Open,
				name,
				start,
			});
		}

		cursor = start + 1;
	}

	None
}

/// Range of the closing tag matching the element opening at `start`.
///
/// Nested openings of the same name are counted so `<Grid><Grid/></Grid>` and
/// `<Grid><Grid></Grid></Grid>` both resolve to the outer closing tag.
/// Returns `None` for self-closing elements and for elements that are never
/// closed.
pub fn find_closing_tag(text: &str, start: usize) -> Option<Range<usize>> {
	let comments = comment_ranges(text);
	find_closing_tag_with(text, start, &comments)
}

pub(crate) fn find_closing_tag_with(
	text: &str,
	start: usize,
	comments: &[Range<usize>],
) -> Option<Range<usize>> {
	let name = element_name_at(text, start)?;
	if is_self_closing(text, start) {
		return None;
	}

	let mut cursor = opening_tag_end(text, start)?;
	let mut depth = 1usize;

	while let Some(tag) = next_tag(text, cursor, comments) {
		let tag_end = opening_tag_end(text, tag.start)?;

		if tag.name == name {
			match tag.kind {
				TagKind::Open if !is_self_closing(text, tag.start) => depth += 1,
				TagKind::Open => {}
				TagKind::Close => {
					depth -= 1;
					if depth == 0 {
						return Some(tag.start..tag_end);
					}
				}
			}
		}

		cursor = tag_end;
	}

	None
}

/// Offset just past the end of the element opening at `start`: the end of
/// the opening tag for self-closing elements, otherwise the end of the
/// matching closing tag.
pub fn element_end(text: &str, start: usize) -> Option<usize> {
	if is_self_closing(text, start) {
		return opening_tag_end(text, start);
	}

	find_closing_tag(text, start).map(|closing| closing.end)
}

/// Regions occupied by the contents of `name` elements in `text`.
///
/// Each zone runs from the end of an opening tag to the end of its matching
/// closing tag. Self-closing elements have no contents and produce no zone.
/// Nested elements of the same name sit inside their parent's zone, so zones
/// never overlap. An element that is never closed produces a zone running to
/// the end of the text.
pub fn exclusion_zones(text: &str, name: &str) -> Vec<Range<usize>> {
	let comments = comment_ranges(text);
	let mut zones = Vec::new();
	let mut cursor = 0;

	while let Some(tag) = next_tag(text, cursor, &comments) {
		let Some(tag_end) = opening_tag_end(text, tag.start) else {
			break;
		};

		if tag.kind != TagKind::Open || tag.name != name || is_self_closing(text, tag.start) {
			cursor = tag_end;
			continue;
		}

		let zone_end = match find_closing_tag_with(text, tag.start, &comments) {
			Some(closing) => closing.end,
			None => {
				tracing::debug!(
					element = name,
					offset = tag.start,
					"unclosed element, excluding the rest of the text"
				);
				text.len()
			}
		};

		zones.push(tag_end..zone_end);
		cursor = zone_end;
	}

	zones
}

/// Find elements accepted by `filter`, in document order.
///
/// Unclosed elements are reported with a span covering only their opening
/// tag and an accompanying [`ScanIssue`].
pub fn scan_elements(text: &str, filter: &ElementFilter, mode: ScanMode) -> ElementScan {
	let comments = comment_ranges(text);
	let mut scan = ElementScan::default();
	let mut cursor = 0;

	if let Some(unterminated) = comments.last().filter(|range| {
		range.end == text.len() && !text[range.start..range.end].ends_with(COMMENT_CLOSE)
	}) {
		scan.issues.push(ScanIssue {
			offset: unterminated.start,
			kind: ScanIssueKind::UnterminatedComment,
		});
	}

	while let Some(tag) = next_tag(text, cursor, &comments) {
		let Some(opening_end) = opening_tag_end(text, tag.start) else {
			tracing::debug!(element = tag.name, offset = tag.start, "unterminated tag");
			scan.issues.push(ScanIssue {
				offset: tag.start,
				kind: ScanIssueKind::UnterminatedTag {
					name: tag.name.to_string(),
				},
			});
			break;
		};

		if tag.kind != TagKind::Open || !filter.accepts(tag.name) {
			cursor = opening_end;
			continue;
		}

		let self_closing = is_self_closing(text, tag.start);
		let end = if self_closing {
			opening_end
		} else if let Some(closing) = find_closing_tag_with(text, tag.start, &comments) {
			closing.end
		} else {
			tracing::debug!(element = tag.name, offset = tag.start, "unclosed element");
			scan.issues.push(ScanIssue {
				offset: tag.start,
				kind: ScanIssueKind::UnclosedElement {
					name: tag.name.to_string(),
				},
			});
			opening_end
		};

		scan.elements.push(ElementSpan {
			name: tag.name.to_string(),
			start: tag.start,
			length: end - tag.start,
			is_self_closing: self_closing,
		});

		cursor = match mode {
			ScanMode::TopLevel => end,
			ScanMode::Descend => opening_end,
		};
	}

	scan
}

/// Spans of the top-level elements named `name`.
pub fn parse(text: &str, name: &str) -> Vec<ElementSpan> {
	scan_elements(text, &ElementFilter::named(name), ScanMode::TopLevel).elements
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent_at(text: &str, offset: usize) -> &str {
	let line_start = text[..offset].rfind('\n').map_or(0, |index| index + 1);
	let line = &text[line_start..offset];
	let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();

	&line[..indent_len]
}

/// Maps byte offsets to one-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineTable {
	line_starts: Vec<usize>,
}

impl LineTable {
	pub fn new(text: &str) -> Self {
		let line_starts = std::iter::once(0)
			.chain(text.match_indices('\n').map(|(index, _)| index + 1))
			.collect();

		Self { line_starts }
	}

	/// One-based `(line, column)` for `offset`. Columns count characters.
	pub fn position(&self, text: &str, offset: usize) -> (usize, usize) {
		let line_index = self
			.line_starts
			.partition_point(|line_start| *line_start <= offset)
			.saturating_sub(1);
		let line_start = self.line_starts[line_index];
		let column = text
			.get(line_start..offset)
			.map_or(0, |prefix| prefix.chars().count());

		(line_index + 1, column + 1)
	}
}
