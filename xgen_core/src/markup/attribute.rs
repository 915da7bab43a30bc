use std::ops::Range;

use crate::markup::Element;
use crate::markup::ElementFilter;
use crate::markup::ScanMode;
use crate::markup::exclusion_zones;
use crate::markup::line_indent_at;
use crate::markup::scan_elements;

/// The ways a property value can be written in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeKind {
	/// `<TextBox Text="value" />`
	Inline,
	/// `<TextBox><TextBox.Text>value</TextBox.Text></TextBox>`
	Element,
	/// `<TextBlock>value</TextBlock>`, the element's default content.
	DefaultValue,
}

/// Which [`AttributeKind`]s a lookup should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeKinds {
	pub inline: bool,
	pub element: bool,
	pub default_value: bool,
}

impl AttributeKinds {
	pub const ALL: Self = Self {
		inline: true,
		element: true,
		default_value: true,
	};
	pub const INLINE: Self = Self {
		inline: true,
		element: false,
		default_value: false,
	};
	/// Inline attributes and property elements, but not default content.
	pub const EXPLICIT: Self = Self {
		inline: true,
		element: true,
		default_value: false,
	};
}

/// A property value found by [`try_get_attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
	pub kind: AttributeKind,
	/// Range within the element text: the whole `name="value"` pair, the whole
	/// property element, or the trimmed default content.
	pub span: Range<usize>,
	/// Raw value. Property elements yield their trimmed inner markup.
	pub value: String,
}

/// Look up `attribute_name` on the element at the start of `element_text`.
///
/// Inline attributes are checked first, then `<Element.Attribute>` property
/// elements, then default content when it is plain text rather than another
/// element. Property elements belonging to nested elements of the same name
/// are never matched.
pub fn try_get_attribute(
	element_text: &str,
	attribute_name: &str,
	kinds: AttributeKinds,
) -> Option<AttributeMatch> {
	let element = Element::parse(element_text)?;

	if kinds.inline {
		if let Some(attribute) = element.attribute(attribute_name) {
			return Some(AttributeMatch {
				kind: AttributeKind::Inline,
				span: attribute.span.clone(),
				value: attribute.value.clone(),
			});
		}
	}

	let content = element.content_range()?;

	if kinds.element {
		if let Some(found) = find_property_element(element_text, &element, &content, attribute_name)
		{
			return Some(found);
		}
	}

	if kinds.default_value {
		let inner = &element_text[content.clone()];
		let trimmed = inner.trim();

		if !trimmed.is_empty() && !trimmed.starts_with('<') {
			let start = content.start + (inner.len() - inner.trim_start().len());
			return Some(AttributeMatch {
				kind: AttributeKind::DefaultValue,
				span: start..start + trimmed.len(),
				value: trimmed.to_string(),
			});
		}
	}

	None
}

fn find_property_element(
	element_text: &str,
	element: &Element,
	content: &Range<usize>,
	attribute_name: &str,
) -> Option<AttributeMatch> {
	let inner = &element_text[content.clone()];
	let property_name = format!("{}.{attribute_name}", element.name);
	let zones = exclusion_zones(inner, &element.name);
	let candidates = scan_elements(inner, &ElementFilter::Named(property_name), ScanMode::Descend);

	let span = candidates
		.elements
		.into_iter()
		.find(|span| !zones.iter().any(|zone| zone.contains(&span.start)))?;
	let start = content.start + span.start;
	let property = Element::parse_at(element_text, start)?;
	let value = property
		.content_range()
		.map(|range| element_text[range].trim().to_string())
		.unwrap_or_default();

	Some(AttributeMatch {
		kind: AttributeKind::Element,
		span: property.range(),
		value,
	})
}

/// The element's opening tag, its own property elements and its closing tag,
/// with every other child removed.
///
/// Each kept piece goes on its own line with the indentation it had in the
/// original text. Self-closing elements are returned unchanged.
pub fn get_opening_without_children(element_text: &str) -> String {
	let Some(element) = Element::parse(element_text) else {
		tracing::debug!("no element to strip children from");
		return String::new();
	};

	let Some(closing_start) = element.closing_start else {
		return element.text(element_text).to_string();
	};

	let mut result = element.opening_tag(element_text).to_string();

	for property in element.property_elements() {
		result.push('\n');
		result.push_str(line_indent_at(element_text, property.start));
		result.push_str(property.text(element_text));
	}

	result.push('\n');
	result.push_str(line_indent_at(element_text, closing_start));
	result.push_str(&element_text[closing_start..element.end]);

	result
}
