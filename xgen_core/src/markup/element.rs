use std::ops::Range;

use crate::markup::ElementSpan;
use crate::markup::ScanIssue;
use crate::markup::ScanIssueKind;
use crate::markup::comment_ranges;
use crate::markup::element_name_at;
use crate::markup::is_self_closing;
use crate::markup::opening_tag_end;
use crate::markup::scanner::find_closing_tag_with;

/// An inline `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	/// Raw value between the quotes, entities left untouched.
	pub value: String,
	/// Absolute range from the first character of the name to the closing
	/// quote inclusive.
	pub span: Range<usize>,
	/// Absolute range of the value between the quotes.
	pub value_span: Range<usize>,
}

/// One element of a parsed markup document. All offsets are absolute byte
/// offsets into the text the element was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub name: String,
	pub start: usize,
	pub end: usize,
	/// Offset just past the opening tag's `>`.
	pub opening_end: usize,
	/// Offset of the closing tag's `<`, `None` for self-closing elements and
	/// for elements that are never closed.
	pub closing_start: Option<usize>,
	pub is_self_closing: bool,
	pub attributes: Vec<Attribute>,
	pub children: Vec<Element>,
}

/// Every top-level element in a text plus whatever could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	pub roots: Vec<Element>,
	pub issues: Vec<ScanIssue>,
}

impl Document {
	pub fn parse(text: &str) -> Self {
		let mut parser = Parser::new(text);
		let roots = parser.parse_children(0, text.len());

		Self {
			roots,
			issues: parser.issues,
		}
	}

	/// The first top-level element, normally the single root of the document.
	pub fn root(&self) -> Option<&Element> {
		self.roots.first()
	}

	/// Every element in document order.
	pub fn elements(&self) -> impl Iterator<Item = &Element> {
		self.roots.iter().flat_map(Element::descendants_and_self)
	}

	/// The element that opens at `start`, if any.
	pub fn element_at(&self, start: usize) -> Option<&Element> {
		self.elements().find(|element| element.start == start)
	}
}

impl Element {
	/// Parse the first element in `text`, skipping any prolog and comments.
	pub fn parse(text: &str) -> Option<Element> {
		Document::parse(text).roots.into_iter().next()
	}

	/// Parse the element opening at `start`, with the children it contains.
	pub fn parse_at(text: &str, start: usize) -> Option<Element> {
		Parser::new(text).parse_element(start, text.len())
	}

	pub fn attribute(&self, name: &str) -> Option<&Attribute> {
		self.attributes
			.iter()
			.find(|attribute| attribute.name == name)
	}

	/// Property elements such as `Grid.RowDefinitions` carry a `.` in their
	/// name.
	pub fn is_property_element(&self) -> bool {
		self.name.contains('.')
	}

	/// Whether this element is the `{Owner}.{Property}` element of `owner`.
	pub fn is_property_of(&self, owner: &str) -> bool {
		self.name
			.strip_prefix(owner)
			.is_some_and(|rest| rest.len() > 1 && rest.starts_with('.'))
	}

	/// Children that are this element's own property elements.
	pub fn property_elements(&self) -> impl Iterator<Item = &Element> {
		self.children
			.iter()
			.filter(|child| child.is_property_of(&self.name))
	}

	pub fn name_range(&self) -> Range<usize> {
		let start = self.start + 1;
		start..start + self.name.len()
	}

	pub fn closing_name_range(&self) -> Option<Range<usize>> {
		self.closing_start.map(|closing_start| {
			let start = closing_start + 2;
			start..start + self.name.len()
		})
	}

	pub fn range(&self) -> Range<usize> {
		self.start..self.end
	}

	pub fn span(&self) -> ElementSpan {
		ElementSpan {
			name: self.name.clone(),
			start: self.start,
			length: self.end - self.start,
			is_self_closing: self.is_self_closing,
		}
	}

	pub fn text<'t>(&self, document: &'t str) -> &'t str {
		&document[self.range()]
	}

	pub fn opening_tag<'t>(&self, document: &'t str) -> &'t str {
		&document[self.start..self.opening_end]
	}

	/// Range between the opening and closing tags.
	pub fn content_range(&self) -> Option<Range<usize>> {
		self.closing_start
			.map(|closing_start| self.opening_end..closing_start)
	}

	/// Offset where a new inline attribute belongs: after the last attribute,
	/// or after the element name when there are none.
	pub fn attribute_insertion_point(&self) -> usize {
		self.attributes
			.last()
			.map_or(self.name_range().end, |attribute| attribute.span.end)
	}

	pub fn descendants_and_self(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
		Box::new(
			std::iter::once(self).chain(
				self.children
					.iter()
					.flat_map(Element::descendants_and_self),
			),
		)
	}
}

struct Parser<'t> {
	text: &'t str,
	comments: Vec<Range<usize>>,
	issues: Vec<ScanIssue>,
}

impl<'t> Parser<'t> {
	fn new(text: &'t str) -> Self {
		Self {
			text,
			comments: comment_ranges(text),
			issues: Vec::new(),
		}
	}

	/// Parse every element that opens in `from..limit`.
	fn parse_children(&mut self, from: usize, limit: usize) -> Vec<Element> {
		let mut children = Vec::new();
		let mut cursor = from;

		while cursor < limit {
			let Some(relative) = self.text[cursor..limit].find('<') else {
				break;
			};
			let start = cursor + relative;

			if let Some(comment) = self.comments.iter().find(|range| range.contains(&start)) {
				cursor = comment.end;
				continue;
			}

			if element_name_at(self.text, start).is_none() {
				cursor = start + 1;
				continue;
			}

			match self.parse_element(start, limit) {
				Some(element) => {
					cursor = element.end;
					children.push(element);
				}
				None => break,
			}
		}

		children
	}

	fn parse_element(&mut self, start: usize, limit: usize) -> Option<Element> {
		let name = element_name_at(self.text, start)?;
		let Some(opening_end) = opening_tag_end(self.text, start).filter(|end| *end <= limit)
		else {
			tracing::debug!(element = name, offset = start, "unterminated tag");
			self.issues.push(ScanIssue {
				offset: start,
				kind: ScanIssueKind::UnterminatedTag {
					name: name.to_string(),
				},
			});
			return None;
		};

		let self_closing = is_self_closing(self.text, start);
		let attributes_end = if self_closing {
			self.text[..opening_end - 1]
				.trim_end()
				.len()
				.saturating_sub(1)
		} else {
			opening_end - 1
		};
		let attributes = parse_attributes(self.text, start + 1 + name.len(), attributes_end);

		let mut element = Element {
			name: name.to_string(),
			start,
			end: opening_end,
			opening_end,
			closing_start: None,
			is_self_closing: self_closing,
			attributes,
			children: Vec::new(),
		};

		if self_closing {
			return Some(element);
		}

		let closing = find_closing_tag_with(self.text, start, &self.comments)
			.filter(|closing| closing.end <= limit);

		match closing {
			Some(closing) => {
				element.children = self.parse_children(opening_end, closing.start);
				element.closing_start = Some(closing.start);
				element.end = closing.end;
			}
			None => {
				tracing::debug!(element = name, offset = start, "unclosed element");
				self.issues.push(ScanIssue {
					offset: start,
					kind: ScanIssueKind::UnclosedElement {
						name: name.to_string(),
					},
				});
			}
		}

		Some(element)
	}
}

/// Parse `name="value"` pairs in `text[from..to]`. Attributes without a
/// quoted value are skipped.
fn parse_attributes(text: &str, from: usize, to: usize) -> Vec<Attribute> {
	let mut attributes = Vec::new();
	let bytes = text.as_bytes();
	let mut cursor = from;

	while cursor < to {
		while cursor < to && bytes[cursor].is_ascii_whitespace() {
			cursor += 1;
		}
		let name_start = cursor;
		while cursor < to && !bytes[cursor].is_ascii_whitespace() && bytes[cursor] != b'=' {
			cursor += 1;
		}
		let name_end = cursor;

		while cursor < to && bytes[cursor].is_ascii_whitespace() {
			cursor += 1;
		}
		if cursor >= to || bytes[cursor] != b'=' {
			continue;
		}
		cursor += 1;
		while cursor < to && bytes[cursor].is_ascii_whitespace() {
			cursor += 1;
		}
		if cursor >= to || !matches!(bytes[cursor], b'"' | b'\'') {
			continue;
		}

		let quote = bytes[cursor];
		let value_start = cursor + 1;
		let Some(value_len) = bytes[value_start..to].iter().position(|byte| *byte == quote) else {
			tracing::debug!(offset = name_start, "attribute value is never closed");
			break;
		};
		let value_end = value_start + value_len;
		cursor = value_end + 1;

		if name_start == name_end {
			continue;
		}

		attributes.push(Attribute {
			name: text[name_start..name_end].to_string(),
			value: text[value_start..value_end].to_string(),
			span: name_start..cursor,
			value_span: value_start..value_end,
		});
	}

	attributes
}
