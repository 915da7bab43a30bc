use std::fmt::Display;

/// A substitutable marker inside a profile output template.
///
/// The set is closed: configuration validation rejects any `$token$` that is
/// not listed in [`Placeholder::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
	/// `$name$`
	Name,
	/// `$namewithspaces$`
	NameWithSpaces,
	/// `$type$`
	Type,
	/// `$incint$`
	IncrementingInteger,
	/// `$repint$`
	RepeatingInteger,
	/// `$xname$`
	GeneratedXName,
	/// `$repxname$`
	RepeatingXName,
	/// `$subprops$`
	SubProperties,
	/// `$enummembers$`
	EnumMembers,
	/// `$element$`
	EnumElement,
	/// `$elementwithspaces$`
	EnumElementWithSpaces,
	/// `$nooutput$`
	NoOutput,
}

impl Placeholder {
	pub const ALL: [Placeholder; 12] = [
		Placeholder::Name,
		Placeholder::NameWithSpaces,
		Placeholder::Type,
		Placeholder::IncrementingInteger,
		Placeholder::RepeatingInteger,
		Placeholder::GeneratedXName,
		Placeholder::RepeatingXName,
		Placeholder::SubProperties,
		Placeholder::EnumMembers,
		Placeholder::EnumElement,
		Placeholder::EnumElementWithSpaces,
		Placeholder::NoOutput,
	];

	pub const fn token(self) -> &'static str {
		match self {
			Self::Name => "$name$",
			Self::NameWithSpaces => "$namewithspaces$",
			Self::Type => "$type$",
			Self::IncrementingInteger => "$incint$",
			Self::RepeatingInteger => "$repint$",
			Self::GeneratedXName => "$xname$",
			Self::RepeatingXName => "$repxname$",
			Self::SubProperties => "$subprops$",
			Self::EnumMembers => "$enummembers$",
			Self::EnumElement => "$element$",
			Self::EnumElementWithSpaces => "$elementwithspaces$",
			Self::NoOutput => "$nooutput$",
		}
	}

	/// Look up a placeholder by its full token text, e.g. `"$name$"`.
	pub fn from_token(token: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|p| p.token() == token)
	}

	/// Returns true when `template` mentions this placeholder at least once.
	pub fn is_in(self, template: &str) -> bool {
		template.contains(self.token())
	}
}

impl Display for Placeholder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.token())
	}
}

/// Every known token string, in declaration order.
pub fn all_tokens() -> impl Iterator<Item = &'static str> {
	Placeholder::ALL.into_iter().map(Placeholder::token)
}

/// A problem found while validating a template.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateIssue {
	/// A `$token$` that is not part of the placeholder vocabulary.
	UnknownPlaceholder { token: String, offset: usize },
	/// A `$` with no closing `$` on the same template.
	UnmatchedMarker { offset: usize },
}

impl Display for TemplateIssue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnknownPlaceholder { token, offset } => {
				write!(f, "unknown placeholder `{token}` at offset {offset}")
			}
			Self::UnmatchedMarker { offset } => {
				write!(f, "unmatched `$` at offset {offset}")
			}
		}
	}
}

/// Check that every `$...$` marker in `template` is a known placeholder and
/// that no `$` is left without a partner.
///
/// Markers may not span whitespace, so `"costs $5 or $6"` reports both `$`
/// characters as unmatched rather than a `$5 or $` token.
pub fn validate_template(template: &str) -> Vec<TemplateIssue> {
	let mut issues = Vec::new();
	let bytes = template.as_bytes();
	let mut index = 0;

	while index < bytes.len() {
		if bytes[index] != b'$' {
			index += 1;
			continue;
		}

		let close = bytes[index + 1..]
			.iter()
			.position(|byte| *byte == b'$' || byte.is_ascii_whitespace())
			.map(|relative| index + 1 + relative)
			.filter(|close| bytes[*close] == b'$');

		let Some(close) = close else {
			issues.push(TemplateIssue::UnmatchedMarker { offset: index });
			index += 1;
			continue;
		};

		let token = &template[index..=close];
		if Placeholder::from_token(token).is_none() {
			issues.push(TemplateIssue::UnknownPlaceholder {
				token: token.to_string(),
				offset: index,
			});
		}
		index = close + 1;
	}

	issues
}
