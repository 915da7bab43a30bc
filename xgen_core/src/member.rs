use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::XgenError;
use crate::XgenResult;

/// Declared accessibility of a member, as reported by the source-analysis
/// layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
	#[default]
	Public,
	Internal,
	Protected,
	Private,
}

/// Facts about a single member of a class or module.
///
/// These are produced outside this crate (from a semantic model of the
/// source code) and are treated as immutable during a generation pass.
///
/// ```json
/// {
///   "name": "Address",
///   "type": "Address",
///   "read_only": false,
///   "members": [{ "name": "Street", "type": "string" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
	pub name: String,
	/// Declared type as written in the source, e.g. `List(Of String)` or
	/// `ObservableCollection<Person>`.
	#[serde(rename = "type")]
	pub type_name: String,
	#[serde(default, rename = "read_only", alias = "readOnly")]
	pub is_read_only: bool,
	#[serde(default)]
	pub accessibility: Accessibility,
	/// Accessible members of the member's own type, used by `$subprops$`.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub members: Vec<MemberDescriptor>,
	/// Member names when the declared type is an enum, used by
	/// `$enummembers$`.
	#[serde(default, alias = "enumMembers", skip_serializing_if = "Vec::is_empty")]
	pub enum_members: Vec<String>,
}

impl MemberDescriptor {
	pub fn new(name: impl Into<String>, type_name: impl Into<String>, is_read_only: bool) -> Self {
		Self {
			name: name.into(),
			type_name: type_name.into(),
			is_read_only,
			accessibility: Accessibility::Public,
			members: Vec::new(),
			enum_members: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
		self.accessibility = accessibility;
		self
	}

	#[must_use]
	pub fn with_members(mut self, members: Vec<MemberDescriptor>) -> Self {
		self.members = members;
		self
	}

	#[must_use]
	pub fn with_enum_members<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.enum_members = names.into_iter().map(Into::into).collect();
		self
	}

	/// Only public members take part in generation.
	pub fn is_accessible(&self) -> bool {
		self.accessibility == Accessibility::Public
	}

	pub fn is_enum(&self) -> bool {
		!self.enum_members.is_empty()
	}

	/// Accessible nested members in declaration order.
	pub fn accessible_members(&self) -> impl Iterator<Item = &MemberDescriptor> {
		self.members.iter().filter(|member| member.is_accessible())
	}
}

/// A class or module together with its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
	pub name: String,
	#[serde(default)]
	pub members: Vec<MemberDescriptor>,
}

impl ClassDescriptor {
	pub fn new(name: impl Into<String>, members: Vec<MemberDescriptor>) -> Self {
		Self {
			name: name.into(),
			members,
		}
	}

	pub fn accessible_members(&self) -> impl Iterator<Item = &MemberDescriptor> {
		self.members.iter().filter(|member| member.is_accessible())
	}

	/// Read class facts from a JSON file.
	pub fn load(path: &Path) -> XgenResult<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| XgenError::ClassFacts {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;

		serde_json::from_str(&content).map_err(|e| XgenError::ClassFacts {
			path: path.display().to_string(),
			reason: e.to_string(),
		})
	}
}
