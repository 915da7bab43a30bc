use std::fmt::Display;
use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::Document;
use crate::Element;
use crate::ElementFilter;
use crate::FixOutcome;
use crate::FixSuggestion;
use crate::LineTable;
use crate::SeverityOverrides;
use crate::apply_fixes;
use crate::find_settings_file;

/// Code reported for text the scanner could not make sense of.
pub const SCAN_ISSUE_CODE: &str = "XG900";

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	/// Reported but not shown.
	Hidden,
	Suggestion,
	#[default]
	Warning,
	Error,
}

impl Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Hidden => "hidden",
			Self::Suggestion => "suggestion",
			Self::Warning => "warning",
			Self::Error => "error",
		};
		write!(f, "{name}")
	}
}

impl FromStr for Severity {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"hidden" | "none" => Ok(Self::Hidden),
			"suggestion" | "info" => Ok(Self::Suggestion),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			other => Err(format!("unknown severity `{other}`")),
		}
	}
}

/// Everything an analyzer may look at besides the element itself.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
	pub document: &'a str,
	/// Path of the document on disk, used to locate severity overrides.
	pub file: Option<&'a Path>,
	pub project_type: Option<&'a str>,
}

impl<'a> AnalysisContext<'a> {
	pub fn new(document: &'a str) -> Self {
		Self {
			document,
			file: None,
			project_type: None,
		}
	}

	#[must_use]
	pub fn with_file(mut self, file: &'a Path) -> Self {
		self.file = Some(file);
		self
	}

	#[must_use]
	pub fn with_project_type(mut self, project_type: &'a str) -> Self {
		self.project_type = Some(project_type);
		self
	}

	pub fn is_project_type(&self, project_type: &str) -> bool {
		self.project_type
			.is_some_and(|current| current.eq_ignore_ascii_case(project_type))
	}

	/// The nearest severity override file for the analyzed document.
	pub fn settings_path(&self) -> Option<PathBuf> {
		let file = self.file?;
		find_settings_file(file.parent()?)
	}

	pub fn element_text(&self, element: &Element) -> &'a str {
		element.text(self.document)
	}
}

/// What an analyzer reports about one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
	pub message: String,
	/// Defaults to the element's opening tag name when unset.
	pub span: Option<Range<usize>>,
	pub fix: Option<FixSuggestion>,
}

impl Finding {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			span: None,
			fix: None,
		}
	}

	#[must_use]
	pub fn with_span(mut self, span: Range<usize>) -> Self {
		self.span = Some(span);
		self
	}

	#[must_use]
	pub fn with_fix(mut self, fix: FixSuggestion) -> Self {
		self.fix = Some(fix);
		self
	}
}

/// Raised by an analyzer that could not finish. Reported as an internal
/// diagnostic rather than propagated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AnalyzerFailure(pub String);

/// A rule applied to every element accepted by its [`ElementFilter`].
pub trait ElementAnalyzer: Send + Sync {
	/// Stable diagnostic code, e.g. `XG101`.
	fn code(&self) -> &'static str;
	fn title(&self) -> &'static str;
	fn element(&self) -> ElementFilter;
	fn default_severity(&self) -> Severity {
		Severity::Warning
	}
	fn analyze(
		&self,
		element: &Element,
		context: &AnalysisContext<'_>,
	) -> Result<Option<Finding>, AnalyzerFailure>;
}

/// One reported problem in a markup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupDiagnostic {
	pub code: String,
	pub message: String,
	pub severity: Severity,
	/// Set for problems in the tooling itself rather than the markup.
	pub internal: bool,
	pub range: Range<usize>,
	/// One-based.
	pub line: usize,
	/// One-based, counted in characters.
	pub column: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fix: Option<FixSuggestion>,
}

impl MarkupDiagnostic {
	pub fn is_shown_by_default(&self) -> bool {
		!self.internal && self.severity != Severity::Hidden
	}

	pub fn is_error(&self) -> bool {
		!self.internal && self.severity == Severity::Error
	}
}

/// The set of analyzers run over a document.
#[derive(Default)]
pub struct AnalyzerRegistry {
	analyzers: Vec<Box<dyn ElementAnalyzer>>,
}

impl std::fmt::Debug for AnalyzerRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list()
			.entries(self.analyzers.iter().map(|analyzer| analyzer.code()))
			.finish()
	}
}

impl AnalyzerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding every built-in analyzer.
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		for analyzer in crate::analyzers::builtin() {
			registry.analyzers.push(analyzer);
		}
		registry
	}

	pub fn register(&mut self, analyzer: impl ElementAnalyzer + 'static) -> &mut Self {
		self.analyzers.push(Box::new(analyzer));
		self
	}

	pub fn analyzers(&self) -> impl Iterator<Item = &dyn ElementAnalyzer> {
		self.analyzers.iter().map(AsRef::as_ref)
	}

	/// Run every analyzer over every element of the document, parents before
	/// children.
	pub fn analyze(
		&self,
		context: &AnalysisContext<'_>,
		overrides: Option<&SeverityOverrides>,
	) -> Vec<MarkupDiagnostic> {
		let document = Document::parse(context.document);
		let lines = LineTable::new(context.document);
		let settings_path = overrides.and_then(|_| context.settings_path());
		let mut diagnostics = Vec::new();

		let make = |code: &str,
		            message: String,
		            severity: Severity,
		            internal: bool,
		            range: Range<usize>,
		            fix: Option<FixSuggestion>| {
			let (line, column) = lines.position(context.document, range.start);
			MarkupDiagnostic {
				code: code.to_string(),
				message,
				severity,
				internal,
				range,
				line,
				column,
				fix,
			}
		};

		for issue in &document.issues {
			diagnostics.push(make(
				SCAN_ISSUE_CODE,
				issue.to_string(),
				Severity::Hidden,
				true,
				issue.offset..issue.offset,
				None,
			));
		}

		for element in document.elements() {
			for analyzer in &self.analyzers {
				if !analyzer.element().accepts(&element.name) {
					continue;
				}

				match analyzer.analyze(element, context) {
					Ok(None) => {}
					Ok(Some(finding)) => {
						let default = analyzer.default_severity();
						let severity = match (overrides, &settings_path) {
							(Some(overrides), Some(path)) => {
								overrides.severity(path, analyzer.code(), default)
							}
							_ => default,
						};
						let range = finding.span.unwrap_or_else(|| element.name_range());
						diagnostics.push(make(
							analyzer.code(),
							finding.message,
							severity,
							false,
							range,
							finding.fix,
						));
					}
					Err(failure) => {
						tracing::debug!(code = analyzer.code(), %failure, "analyzer failed");
						diagnostics.push(make(
							analyzer.code(),
							format!("analyzer failed: {failure}"),
							Severity::Hidden,
							true,
							element.name_range(),
							None,
						));
					}
				}
			}
		}

		diagnostics
	}

	/// Analyze the document and apply every fix attached to a visible
	/// diagnostic.
	pub fn fix_document(
		&self,
		context: &AnalysisContext<'_>,
		overrides: Option<&SeverityOverrides>,
	) -> FixOutcome {
		let fixes: Vec<FixSuggestion> = self
			.analyze(context, overrides)
			.into_iter()
			.filter(MarkupDiagnostic::is_shown_by_default)
			.filter_map(|diagnostic| diagnostic.fix)
			.collect();

		if fixes.is_empty() {
			return FixOutcome {
				text: context.document.to_string(),
				success: true,
				changes: Vec::new(),
			};
		}

		apply_fixes(context.document, &fixes)
	}
}

