use std::ops::Range;

use derive_more::Deref;
use serde::Serialize;

use crate::Document;
use crate::Element;
use crate::ElementSpan;
use crate::XgenError;
use crate::XgenResult;
use crate::line_indent_at;

/// One textual change an analyzer can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
#[non_exhaustive]
pub enum FixAction {
	None,
	/// Replace the element name in the opening and closing tags.
	RenameElement { new_name: String },
	/// Add an inline attribute, or update its value when already present.
	AddAttribute { name: String, value: String },
	RemoveAttribute { name: String },
	/// Replace the whole element with new markup.
	ReplaceElement { replacement: String },
	/// Remove a child element's text, leaving surrounding whitespace.
	RemoveChild { child: ElementSpan },
	/// Declare `xmlns:{alias}` on the document root unless it already is.
	AddXmlnsAlias { alias: String, namespace: String },
}

/// A composite fix: a primary action on `target` plus secondary actions
/// applied to the same text snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixSuggestion {
	pub description: String,
	pub target: ElementSpan,
	pub action: FixAction,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub and_also: Vec<FixAction>,
}

impl FixSuggestion {
	pub fn new(description: impl Into<String>, target: ElementSpan, action: FixAction) -> Self {
		Self {
			description: description.into(),
			target,
			action,
			and_also: Vec::new(),
		}
	}

	#[must_use]
	pub fn and_also(mut self, action: FixAction) -> Self {
		self.and_also.push(action);
		self
	}

	pub fn actions(&self) -> impl Iterator<Item = &FixAction> {
		std::iter::once(&self.action).chain(&self.and_also)
	}
}

/// Replace `range` of the original text with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
	pub range: Range<usize>,
	pub replacement: String,
	pub description: String,
}

impl TextEdit {
	pub fn replace(
		range: Range<usize>,
		replacement: impl Into<String>,
		description: impl Into<String>,
	) -> Self {
		Self {
			range,
			replacement: replacement.into(),
			description: description.into(),
		}
	}

	pub fn insert(offset: usize, text: impl Into<String>, description: impl Into<String>) -> Self {
		Self::replace(offset..offset, text, description)
	}

	pub fn delete(range: Range<usize>, description: impl Into<String>) -> Self {
		Self::replace(range, "", description)
	}

	fn is_same_change(&self, other: &TextEdit) -> bool {
		self.range == other.range && self.replacement == other.replacement
	}
}

/// An immutable list of edits, all expressed against one text snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize)]
pub struct EditScript(Vec<TextEdit>);

impl EditScript {
	pub fn new(edits: Vec<TextEdit>) -> Self {
		Self(edits)
	}

	/// Check that every edit fits in a text of `len` bytes and that no two
	/// edits overlap. Insertions at the same offset are allowed and keep
	/// their order.
	pub fn validate(&self, len: usize) -> XgenResult<()> {
		let mut previous_end: Option<usize> = None;

		for edit in self.sorted() {
			let Range { start, end } = edit.range;
			if start > end || end > len {
				return Err(XgenError::EditOutOfBounds { start, end, len });
			}
			if let Some(previous_end) = previous_end.filter(|previous_end| start < *previous_end) {
				return Err(XgenError::OverlappingEdits {
					start,
					end,
					previous_end,
				});
			}
			previous_end = Some(end);
		}

		Ok(())
	}

	/// Apply every edit to `text`, producing new text.
	pub fn apply(&self, text: &str) -> XgenResult<String> {
		self.validate(text.len())?;

		let mut result = text.to_string();
		for edit in self.sorted().into_iter().rev() {
			if !result.is_char_boundary(edit.range.start) || !result.is_char_boundary(edit.range.end)
			{
				return Err(XgenError::EditOutOfBounds {
					start: edit.range.start,
					end: edit.range.end,
					len: text.len(),
				});
			}
			result.replace_range(edit.range.clone(), &edit.replacement);
		}

		Ok(result)
	}

	/// Descriptions of the edits in application order, without repeats.
	pub fn descriptions(&self) -> Vec<String> {
		let mut descriptions: Vec<String> = Vec::new();
		for edit in &self.0 {
			if !edit.description.is_empty() && !descriptions.contains(&edit.description) {
				descriptions.push(edit.description.clone());
			}
		}
		descriptions
	}

	/// Whether any edit in `other` overlaps an edit here. Identical edits do
	/// not count.
	fn conflicts_with(&self, other: &EditScript) -> bool {
		other.iter().any(|theirs| {
			self.iter().any(|ours| {
				!ours.is_same_change(theirs) && ranges_overlap(&ours.range, &theirs.range)
			})
		})
	}

	fn extend_deduplicated(&mut self, other: EditScript) {
		for edit in other.0 {
			if !self.0.iter().any(|existing| existing.is_same_change(&edit)) {
				self.0.push(edit);
			}
		}
	}

	fn sorted(&self) -> Vec<&TextEdit> {
		let mut edits: Vec<&TextEdit> = self.0.iter().collect();
		edits.sort_by_key(|edit| edit.range.start);
		edits
	}
}

fn ranges_overlap(a: &Range<usize>, b: &Range<usize>) -> bool {
	if a.is_empty() || b.is_empty() {
		// An insertion only conflicts with an edit that strictly contains it.
		let (point, other) = if a.is_empty() { (a.start, b) } else { (b.start, a) };
		return other.start < point && point < other.end;
	}

	a.start < b.end && b.start < a.end
}

/// Result of applying fixes to a text snapshot. Never an error: a fix that
/// cannot be applied leaves the text unchanged with `success` unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixOutcome {
	pub text: String,
	pub success: bool,
	pub changes: Vec<String>,
}

impl FixOutcome {
	fn unchanged(text: &str) -> Self {
		Self {
			text: text.to_string(),
			success: false,
			changes: Vec::new(),
		}
	}
}

/// Translate a fix into edits against `text`.
pub fn plan_fix(text: &str, fix: &FixSuggestion) -> XgenResult<EditScript> {
	let document = Document::parse(text);
	let mut edits = Vec::new();

	for action in fix.actions() {
		plan_action(text, &document, &fix.target, action, &mut edits)?;
	}

	let script = EditScript::new(edits);
	script.validate(text.len())?;

	Ok(script)
}

fn target_element<'d>(document: &'d Document, target: &ElementSpan) -> XgenResult<&'d Element> {
	document
		.element_at(target.start)
		.filter(|element| element.name == target.name)
		.ok_or_else(|| {
			XgenError::FixTargetNotFound {
				name: target.name.clone(),
				offset: target.start,
			}
		})
}

fn plan_action(
	text: &str,
	document: &Document,
	target: &ElementSpan,
	action: &FixAction,
	edits: &mut Vec<TextEdit>,
) -> XgenResult<()> {
	match action {
		FixAction::None => {}
		FixAction::RenameElement { new_name } => {
			let element = target_element(document, target)?;
			let description = format!("Renamed `{}` to `{new_name}`", element.name);
			edits.push(TextEdit::replace(
				element.name_range(),
				new_name.as_str(),
				description.as_str(),
			));
			if let Some(closing) = element.closing_name_range() {
				edits.push(TextEdit::replace(closing, new_name.as_str(), description));
			}
		}
		FixAction::AddAttribute { name, value } => {
			let element = target_element(document, target)?;
			if let Some(existing) = element.attribute(name) {
				if existing.value != *value {
					edits.push(TextEdit::replace(
						existing.value_span.clone(),
						value.as_str(),
						format!("Set `{name}` to \"{value}\" on `{}`", element.name),
					));
				}
			} else {
				edits.push(TextEdit::insert(
					element.attribute_insertion_point(),
					format!(" {name}=\"{value}\""),
					format!("Added `{name}=\"{value}\"` to `{}`", element.name),
				));
			}
		}
		FixAction::RemoveAttribute { name } => {
			let element = target_element(document, target)?;
			if let Some(attribute) = element.attribute(name) {
				let start = text[..attribute.span.start].trim_end().len();
				edits.push(TextEdit::delete(
					start..attribute.span.end,
					format!("Removed `{name}` from `{}`", element.name),
				));
			}
		}
		FixAction::ReplaceElement { replacement } => {
			let element = target_element(document, target)?;
			edits.push(TextEdit::replace(
				element.range(),
				replacement.as_str(),
				format!("Replaced `{}`", element.name),
			));
		}
		FixAction::RemoveChild { child } => {
			if element_at_span(document, child).is_none() {
				return Err(XgenError::FixTargetNotFound {
					name: child.name.clone(),
					offset: child.start,
				});
			}
			edits.push(TextEdit::delete(
				child.range(),
				format!("Removed `{}`", child.name),
			));
		}
		FixAction::AddXmlnsAlias { alias, namespace } => {
			if let Some(edit) = plan_xmlns_alias(text, document, alias, namespace) {
				edits.push(edit);
			}
		}
	}

	Ok(())
}

fn element_at_span<'d>(document: &'d Document, span: &ElementSpan) -> Option<&'d Element> {
	document
		.element_at(span.start)
		.filter(|element| element.name == span.name && element.end == span.end())
}

fn plan_xmlns_alias(
	text: &str,
	document: &Document,
	alias: &str,
	namespace: &str,
) -> Option<TextEdit> {
	let root = document.root()?;
	let declaration = format!("xmlns:{alias}");
	if root.attribute(&declaration).is_some() {
		return None;
	}

	let description = format!("Added `{declaration}=\"{namespace}\"` to `{}`", root.name);
	let last_namespace = root
		.attributes
		.iter()
		.rev()
		.find(|attribute| attribute.name == "xmlns" || attribute.name.starts_with("xmlns:"));

	let Some(last_namespace) = last_namespace else {
		return Some(TextEdit::insert(
			root.name_range().end,
			format!(" {declaration}=\"{namespace}\""),
			description,
		));
	};

	// Declarations laid out one per line get a new line of their own.
	let starts_line = text[..last_namespace.span.start]
		.rfind('\n')
		.is_some_and(|newline| text[newline + 1..last_namespace.span.start].trim().is_empty());
	let separator = if starts_line {
		format!("\n{}", line_indent_at(text, last_namespace.span.start))
	} else {
		" ".to_string()
	};

	Some(TextEdit::insert(
		last_namespace.span.end,
		format!("{separator}{declaration}=\"{namespace}\""),
		description,
	))
}

/// Apply one fix to `text`.
pub fn apply_fix(text: &str, fix: &FixSuggestion) -> FixOutcome {
	let script = match plan_fix(text, fix) {
		Ok(script) => script,
		Err(error) => {
			tracing::debug!(%error, fix = %fix.description, "fix could not be planned");
			return FixOutcome::unchanged(text);
		}
	};

	match script.apply(text) {
		Ok(new_text) => {
			FixOutcome {
				text: new_text,
				success: true,
				changes: script.descriptions(),
			}
		}
		Err(error) => {
			tracing::debug!(%error, fix = %fix.description, "fix could not be applied");
			FixOutcome::unchanged(text)
		}
	}
}

/// Apply several fixes planned against the same snapshot.
///
/// Fixes whose edits overlap an earlier accepted fix are skipped; identical
/// edits requested by more than one fix (such as the same namespace
/// declaration) are applied once. `success` is set when at least one fix was
/// applied.
pub fn apply_fixes(text: &str, fixes: &[FixSuggestion]) -> FixOutcome {
	let mut combined = EditScript::default();
	let mut applied = 0usize;

	for fix in fixes {
		let script = match plan_fix(text, fix) {
			Ok(script) => script,
			Err(error) => {
				tracing::debug!(%error, fix = %fix.description, "skipping fix");
				continue;
			}
		};

		if combined.conflicts_with(&script) {
			tracing::debug!(fix = %fix.description, "skipping fix that overlaps an earlier one");
			continue;
		}

		combined.extend_deduplicated(script);
		applied += 1;
	}

	if applied == 0 {
		return FixOutcome::unchanged(text);
	}

	match combined.apply(text) {
		Ok(new_text) => {
			FixOutcome {
				text: new_text,
				success: true,
				changes: combined.descriptions(),
			}
		}
		Err(error) => {
			tracing::debug!(%error, "combined fixes could not be applied");
			FixOutcome::unchanged(text)
		}
	}
}
