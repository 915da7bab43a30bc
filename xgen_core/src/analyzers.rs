//! Built-in markup analyzers.

use std::path::Path;

use crate::AnalysisContext;
use crate::AnalyzerFailure;
use crate::AttributeKinds;
use crate::Element;
use crate::ElementAnalyzer;
use crate::ElementFilter;
use crate::Finding;
use crate::FixAction;
use crate::FixSuggestion;
use crate::Severity;
use crate::try_get_attribute;

/// Every built-in analyzer in code order.
pub fn builtin() -> Vec<Box<dyn ElementAnalyzer>> {
	vec![
		Box::new(MissingInputScope),
		Box::new(HardCodedString),
		Box::new(DeprecatedWebView),
		Box::new(EmptyGridDefinitions),
		Box::new(ImageWithoutName),
		Box::new(LabelInUwp),
		Box::new(RedundantIsEnabled),
	]
}

/// `XG101`: a `TextBox` without an `InputScope` gets the default keyboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingInputScope;

impl ElementAnalyzer for MissingInputScope {
	fn code(&self) -> &'static str {
		"XG101"
	}

	fn title(&self) -> &'static str {
		"TextBox without InputScope"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::named("TextBox")
	}

	fn default_severity(&self) -> Severity {
		Severity::Suggestion
	}

	fn analyze(
		&self,
		element: &Element,
		context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		let text = context.element_text(element);
		if try_get_attribute(text, "InputScope", AttributeKinds::EXPLICIT).is_some() {
			return Ok(None);
		}

		let fix = FixSuggestion::new(
			"Add InputScope",
			element.span(),
			FixAction::AddAttribute {
				name: "InputScope".to_string(),
				value: "Default".to_string(),
			},
		);

		Ok(Some(
			Finding::new("TextBox has no InputScope; set one to pick the right on-screen keyboard")
				.with_fix(fix),
		))
	}
}

/// Properties whose values are user-facing text.
const LOCALIZABLE_PROPERTIES: [&str; 5] = ["Text", "Content", "Header", "PlaceholderText", "Title"];

/// `XG102`: user-facing text written directly into markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardCodedString;

impl ElementAnalyzer for HardCodedString {
	fn code(&self) -> &'static str {
		"XG102"
	}

	fn title(&self) -> &'static str {
		"Hard-coded string"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::Any
	}

	fn analyze(
		&self,
		element: &Element,
		_context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		let hard_coded = LOCALIZABLE_PROPERTIES.iter().find_map(|property| {
			element
				.attribute(property)
				.filter(|attribute| is_literal_text(&attribute.value))
		});

		Ok(hard_coded.map(|attribute| {
			Finding::new(format!(
				"`{}` on `{}` is the hard-coded string \"{}\"; use a resource or binding",
				attribute.name, element.name, attribute.value
			))
			.with_span(attribute.span.clone())
		}))
	}
}

/// Empty values and markup extensions such as `{Binding}` or
/// `{x:Bind}` are not literal text.
fn is_literal_text(value: &str) -> bool {
	let value = value.trim();
	!value.is_empty() && !value.starts_with('{')
}

const WEBVIEW2_ALIAS: &str = "controls";
const WEBVIEW2_NAMESPACE: &str = "using:Microsoft.UI.Xaml.Controls";

/// `XG103`: `WebView` is superseded by `WebView2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeprecatedWebView;

impl ElementAnalyzer for DeprecatedWebView {
	fn code(&self) -> &'static str {
		"XG103"
	}

	fn title(&self) -> &'static str {
		"Deprecated WebView"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::named("WebView")
	}

	fn analyze(
		&self,
		element: &Element,
		_context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		let fix = FixSuggestion::new(
			"Use WebView2",
			element.span(),
			FixAction::RenameElement {
				new_name: format!("{WEBVIEW2_ALIAS}:WebView2"),
			},
		)
		.and_also(FixAction::AddXmlnsAlias {
			alias: WEBVIEW2_ALIAS.to_string(),
			namespace: WEBVIEW2_NAMESPACE.to_string(),
		});

		Ok(Some(
			Finding::new("WebView is deprecated; use WebView2").with_fix(fix),
		))
	}
}

const GRID_DEFINITIONS: [&str; 2] = ["Grid.RowDefinitions", "Grid.ColumnDefinitions"];

/// `XG104`: row or column definition blocks with nothing in them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyGridDefinitions;

impl ElementAnalyzer for EmptyGridDefinitions {
	fn code(&self) -> &'static str {
		"XG104"
	}

	fn title(&self) -> &'static str {
		"Empty grid definitions"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::named("Grid")
	}

	fn default_severity(&self) -> Severity {
		Severity::Suggestion
	}

	fn analyze(
		&self,
		element: &Element,
		context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		let empty = element.property_elements().find(|property| {
			GRID_DEFINITIONS.contains(&property.name.as_str())
				&& property.children.is_empty()
				&& property
					.content_range()
					.is_none_or(|content| context.document[content].trim().is_empty())
		});

		Ok(empty.map(|property| {
			let fix = FixSuggestion::new(
				format!("Remove empty {}", property.name),
				element.span(),
				FixAction::RemoveChild {
					child: property.span(),
				},
			);

			Finding::new(format!("`{}` is empty and can be removed", property.name))
				.with_span(property.name_range())
				.with_fix(fix)
		}))
	}
}

const AUTOMATION_NAME: &str = "AutomationProperties.Name";

/// `XG105`: images need an accessible name for screen readers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageWithoutName;

impl ElementAnalyzer for ImageWithoutName {
	fn code(&self) -> &'static str {
		"XG105"
	}

	fn title(&self) -> &'static str {
		"Image without accessible name"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::named("Image")
	}

	fn analyze(
		&self,
		element: &Element,
		context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		let text = context.element_text(element);
		if try_get_attribute(text, AUTOMATION_NAME, AttributeKinds::EXPLICIT).is_some() {
			return Ok(None);
		}

		let name = element
			.attribute("Source")
			.filter(|source| is_literal_text(&source.value))
			.and_then(|source| {
				Path::new(&source.value)
					.file_stem()
					.and_then(|stem| stem.to_str())
					.map(str::to_string)
			})
			.unwrap_or_default();

		let fix = FixSuggestion::new(
			"Add AutomationProperties.Name",
			element.span(),
			FixAction::AddAttribute {
				name: AUTOMATION_NAME.to_string(),
				value: name,
			},
		);

		Ok(Some(
			Finding::new("Image has no AutomationProperties.Name").with_fix(fix),
		))
	}
}

/// `XG106`: `Label` does not exist in UWP; `TextBlock` is the equivalent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelInUwp;

impl ElementAnalyzer for LabelInUwp {
	fn code(&self) -> &'static str {
		"XG106"
	}

	fn title(&self) -> &'static str {
		"Label in a UWP project"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::named("Label")
	}

	fn default_severity(&self) -> Severity {
		Severity::Error
	}

	fn analyze(
		&self,
		element: &Element,
		context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		if !context.is_project_type("uwp") {
			return Ok(None);
		}

		let replacement = label_as_text_block(element, context.document)?;
		let fix = FixSuggestion::new(
			"Replace with TextBlock",
			element.span(),
			FixAction::ReplaceElement { replacement },
		);

		Ok(Some(
			Finding::new("Label is not available in UWP; use TextBlock").with_fix(fix),
		))
	}
}

/// Rewrite a `Label` as a `TextBlock`, moving `Content` to `Text`.
fn label_as_text_block(element: &Element, document: &str) -> Result<String, AnalyzerFailure> {
	if !element.children.is_empty() {
		return Err(AnalyzerFailure(
			"cannot convert a Label with child elements".to_string(),
		));
	}

	let mut replacements = vec![(element.name_range(), "TextBlock")];
	if let Some(closing) = element.closing_name_range() {
		replacements.push((closing, "TextBlock"));
	}
	if let Some(content) = element.attribute("Content") {
		let name_end = content.span.start + "Content".len();
		replacements.push((content.span.start..name_end, "Text"));
	}
	replacements.sort_by_key(|(range, _)| range.start);

	let mut result = element.text(document).to_string();
	for (range, replacement) in replacements.into_iter().rev() {
		result.replace_range(range.start - element.start..range.end - element.start, replacement);
	}

	Ok(result)
}

/// `XG107`: `IsEnabled="True"` is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedundantIsEnabled;

impl ElementAnalyzer for RedundantIsEnabled {
	fn code(&self) -> &'static str {
		"XG107"
	}

	fn title(&self) -> &'static str {
		"Redundant IsEnabled"
	}

	fn element(&self) -> ElementFilter {
		ElementFilter::Any
	}

	fn default_severity(&self) -> Severity {
		Severity::Suggestion
	}

	fn analyze(
		&self,
		element: &Element,
		_context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure> {
		let Some(attribute) = element
			.attribute("IsEnabled")
			.filter(|attribute| attribute.value.trim().eq_ignore_ascii_case("true"))
		else {
			return Ok(None);
		};

		let fix = FixSuggestion::new(
			"Remove IsEnabled",
			element.span(),
			FixAction::RemoveAttribute {
				name: "IsEnabled".to_string(),
			},
		);

		Ok(Some(
			Finding::new("`IsEnabled=\"True\"` is the default and can be removed")
				.with_span(attribute.span.clone())
				.with_fix(fix),
		))
	}
}
