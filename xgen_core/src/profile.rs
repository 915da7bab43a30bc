use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;

use crate::TemplateIssue;
use crate::XgenError;
use crate::XgenResult;
use crate::validate_template;

/// The profile set shipped with the crate.
const DEFAULT_PROFILES: &str = include_str!("../profiles/default.toml");

/// Ordered list of case-insensitive substrings a member name must contain.
///
/// An empty filter matches every name. Configuration may spell the filter
/// either as an array or as one `|`-separated string:
///
/// ```toml
/// name_contains = "password|pwd"
/// name_contains = ["password", "pwd"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize, Deserialize)]
#[serde(from = "RawNameFilter", into = "Vec<String>")]
pub struct NameFilter(Vec<String>);

impl NameFilter {
	pub fn new<I, S>(filters: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self(
			filters
				.into_iter()
				.map(|filter| filter.as_ref().trim().to_string())
				.filter(|filter| !filter.is_empty())
				.collect(),
		)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true when the filter is empty or any entry is a
	/// case-insensitive substring of `member_name`.
	pub fn matches(&self, member_name: &str) -> bool {
		if self.0.is_empty() {
			return true;
		}

		let member_name = member_name.to_lowercase();
		self.0
			.iter()
			.any(|filter| member_name.contains(&filter.to_lowercase()))
	}
}

impl From<NameFilter> for Vec<String> {
	fn from(value: NameFilter) -> Self {
		value.0
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNameFilter {
	Joined(String),
	List(Vec<String>),
}

impl From<RawNameFilter> for NameFilter {
	fn from(value: RawNameFilter) -> Self {
		match value {
			RawNameFilter::Joined(joined) => NameFilter::new(joined.split('|')),
			RawNameFilter::List(list) => NameFilter::new(list),
		}
	}
}

/// One `(type, name filter, read-only) -> template` association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
	/// Type to match. May be generic (`List<string>`), use the wildcard
	/// argument `T` (`ObservableCollection<T>`), or list alternatives
	/// separated by `|` (`int|long`).
	#[serde(rename = "type")]
	pub type_match: String,
	#[serde(default, skip_serializing_if = "NameFilter::is_empty")]
	pub name_contains: NameFilter,
	#[serde(default)]
	pub if_read_only: bool,
	pub output: String,
}

impl Mapping {
	pub fn new(type_match: impl Into<String>, if_read_only: bool, output: impl Into<String>) -> Self {
		Self {
			type_match: type_match.into(),
			name_contains: NameFilter::default(),
			if_read_only,
			output: output.into(),
		}
	}

	#[must_use]
	pub fn with_name_contains<I, S>(mut self, filters: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.name_contains = NameFilter::new(filters);
		self
	}
}

/// A named, ordered bundle of mappings plus the templates used around them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	pub name: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub description: String,
	/// Project type this profile is meant for, e.g. `uwp` or `wpf`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub project_type: Option<String>,
	/// Element wrapping all generated member output. May carry attributes,
	/// e.g. `StackPanel Orientation="Horizontal"`. Empty means no wrapper.
	#[serde(default)]
	pub class_grouping: String,
	pub fallback_output: String,
	#[serde(default)]
	pub sub_property_output: String,
	#[serde(default)]
	pub enum_member_output: String,
	#[serde(default)]
	pub mappings: Vec<Mapping>,
}

impl Profile {
	pub fn new(name: impl Into<String>, fallback_output: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: String::new(),
			project_type: None,
			class_grouping: String::new(),
			fallback_output: fallback_output.into(),
			sub_property_output: String::new(),
			enum_member_output: String::new(),
			mappings: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_class_grouping(mut self, class_grouping: impl Into<String>) -> Self {
		self.class_grouping = class_grouping.into();
		self
	}

	#[must_use]
	pub fn with_sub_property_output(mut self, template: impl Into<String>) -> Self {
		self.sub_property_output = template.into();
		self
	}

	#[must_use]
	pub fn with_enum_member_output(mut self, template: impl Into<String>) -> Self {
		self.enum_member_output = template.into();
		self
	}

	#[must_use]
	pub fn with_project_type(mut self, project_type: impl Into<String>) -> Self {
		self.project_type = Some(project_type.into());
		self
	}

	#[must_use]
	pub fn with_mapping(mut self, mapping: Mapping) -> Self {
		self.mappings.push(mapping);
		self
	}

	/// Returns true when this profile targets `project_type`
	/// (case-insensitive).
	pub fn is_for_project_type(&self, project_type: &str) -> bool {
		self.project_type
			.as_deref()
			.is_some_and(|own| own.eq_ignore_ascii_case(project_type.trim()))
	}

	/// Every template in the profile together with a label describing where
	/// it lives.
	pub fn templates(&self) -> Vec<(String, &str)> {
		let mut templates = vec![
			("fallback_output".to_string(), self.fallback_output.as_str()),
			(
				"sub_property_output".to_string(),
				self.sub_property_output.as_str(),
			),
			(
				"enum_member_output".to_string(),
				self.enum_member_output.as_str(),
			),
		];

		for (index, mapping) in self.mappings.iter().enumerate() {
			templates.push((format!("mappings[{index}]"), mapping.output.as_str()));
		}

		templates
	}

	/// Configuration validity check. Never invoked during generation.
	pub fn validate(&self) -> Vec<ProfileIssue> {
		let mut issues = Vec::new();

		if self.name.trim().is_empty() {
			issues.push(self.issue("name", ProfileIssueKind::EmptyName));
		}

		if self.fallback_output.trim().is_empty() {
			issues.push(self.issue("fallback_output", ProfileIssueKind::EmptyFallback));
		}

		for (location, template) in self.templates() {
			for template_issue in validate_template(template) {
				issues.push(self.issue(&location, ProfileIssueKind::Template(template_issue)));
			}
		}

		let mut seen: HashMap<(String, Vec<String>, bool), usize> = HashMap::new();
		for (index, mapping) in self.mappings.iter().enumerate() {
			let location = format!("mappings[{index}]");
			if mapping.type_match.trim().is_empty() {
				issues.push(self.issue(&location, ProfileIssueKind::EmptyType));
				continue;
			}

			let key = (
				crate::normalize_type_name(&mapping.type_match),
				mapping
					.name_contains
					.iter()
					.map(|filter| filter.to_lowercase())
					.collect(),
				mapping.if_read_only,
			);
			if let Some(first) = seen.get(&key) {
				issues.push(self.issue(
					&location,
					ProfileIssueKind::UnreachableMapping { shadowed_by: *first },
				));
			} else {
				seen.insert(key, index);
			}
		}

		issues
	}

	fn issue(&self, location: &str, kind: ProfileIssueKind) -> ProfileIssue {
		ProfileIssue {
			profile: self.name.clone(),
			location: location.to_string(),
			kind,
		}
	}
}

/// A configuration problem found by [`Profile::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIssue {
	pub profile: String,
	/// Field holding the problem, e.g. `mappings[3]`.
	pub location: String,
	pub kind: ProfileIssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileIssueKind {
	EmptyName,
	EmptyFallback,
	EmptyType,
	/// An earlier mapping with the same type, filter and mutability always
	/// wins, so this one can never be selected.
	UnreachableMapping { shadowed_by: usize },
	Template(TemplateIssue),
}

impl Display for ProfileIssue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} ({}): ", self.profile, self.location)?;
		match &self.kind {
			ProfileIssueKind::EmptyName => write!(f, "profile name is empty"),
			ProfileIssueKind::EmptyFallback => write!(f, "fallback output is empty"),
			ProfileIssueKind::EmptyType => write!(f, "mapping type is empty"),
			ProfileIssueKind::UnreachableMapping { shadowed_by } => {
				write!(f, "mapping is unreachable, shadowed by mappings[{shadowed_by}]")
			}
			ProfileIssueKind::Template(issue) => write!(f, "{issue}"),
		}
	}
}

/// Shape of a profile document on disk.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileDocument {
	Set { profiles: Vec<Profile> },
	List(Vec<Profile>),
	Single(Box<Profile>),
}

impl From<ProfileDocument> for Vec<Profile> {
	fn from(value: ProfileDocument) -> Self {
		match value {
			ProfileDocument::Set { profiles } | ProfileDocument::List(profiles) => profiles,
			ProfileDocument::Single(profile) => vec![*profile],
		}
	}
}

/// Ordered collection of profiles. The first profile is the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct ProfileSet(Vec<Profile>);

impl ProfileSet {
	pub fn new(profiles: Vec<Profile>) -> Self {
		Self(profiles)
	}

	/// The profiles shipped with the crate.
	pub fn defaults() -> XgenResult<Self> {
		let profiles = parse_profiles(DEFAULT_PROFILES, "toml", "<default profiles>")?;
		Ok(Self(profiles))
	}

	/// Load every profile declared in a JSON, TOML or YAML file.
	pub fn load_file(path: &Path) -> XgenResult<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| XgenError::ProfileFile {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;
		let format = path
			.extension()
			.and_then(|ext| ext.to_str())
			.unwrap_or("")
			.to_ascii_lowercase();

		Ok(Self(parse_profiles(
			&content,
			&format,
			&path.display().to_string(),
		)?))
	}

	pub fn get(&self, name: &str) -> Option<&Profile> {
		self.0
			.iter()
			.find(|profile| profile.name.eq_ignore_ascii_case(name.trim()))
	}

	/// The profile declared for `project_type`, or the first profile with no
	/// project type at all.
	pub fn for_project_type(&self, project_type: &str) -> Option<&Profile> {
		self.0
			.iter()
			.find(|profile| profile.is_for_project_type(project_type))
			.or_else(|| self.0.iter().find(|profile| profile.project_type.is_none()))
	}

	/// Pick the active profile: an explicit name wins, then the project type,
	/// then the first profile in the set.
	pub fn select(&self, name: Option<&str>, project_type: Option<&str>) -> XgenResult<&Profile> {
		if let Some(name) = name {
			return self
				.get(name)
				.ok_or_else(|| XgenError::MissingProfile(name.to_string()));
		}

		if let Some(project_type) = project_type {
			return self
				.for_project_type(project_type)
				.ok_or_else(|| XgenError::MissingProjectProfile(project_type.to_string()));
		}

		self.0.first().ok_or(XgenError::EmptyProfileSet)
	}

	/// Add `other` to this set. Profiles sharing a name are replaced in place,
	/// new names are appended.
	pub fn merge(&mut self, other: ProfileSet) {
		for profile in other.0 {
			if let Some(existing) = self
				.0
				.iter_mut()
				.find(|existing| existing.name.eq_ignore_ascii_case(&profile.name))
			{
				*existing = profile;
			} else {
				self.0.push(profile);
			}
		}
	}

	pub fn validate(&self) -> Vec<ProfileIssue> {
		self.0.iter().flat_map(Profile::validate).collect()
	}

	pub fn into_inner(self) -> Vec<Profile> {
		self.0
	}
}

fn parse_profiles(content: &str, format: &str, path_display: &str) -> XgenResult<Vec<Profile>> {
	let document: ProfileDocument = match format {
		"json" => serde_json::from_str(content).map_err(|e| XgenError::ProfileFile {
			path: path_display.to_string(),
			reason: e.to_string(),
		})?,
		"toml" => toml::from_str(content).map_err(|e| XgenError::ProfileFile {
			path: path_display.to_string(),
			reason: e.to_string(),
		})?,
		"yaml" | "yml" => serde_yaml_ng::from_str(content).map_err(|e| XgenError::ProfileFile {
			path: path_display.to_string(),
			reason: e.to_string(),
		})?,
		other => return Err(XgenError::UnsupportedProfileFormat(other.to_string())),
	};

	Ok(document.into())
}
