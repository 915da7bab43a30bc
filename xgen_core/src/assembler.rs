use crate::ClassDescriptor;
use crate::Expander;
use crate::MemberDescriptor;
use crate::Profile;
use crate::ProfileSet;
use crate::XgenError;
use crate::XgenResult;

/// Emitted in place of member output when a class has nothing accessible.
pub const NO_ACCESSIBLE_MEMBERS: &str = "<!-- No accessible properties -->";

/// Default indentation for one nesting level.
pub const DEFAULT_INDENT: &str = "  ";

/// Layout options supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
	/// Text added per nesting level inside the class grouping element.
	pub indent: String,
	/// Text prepended to every line after the first, so the output lines up
	/// when inserted at a column offset.
	pub left_padding: String,
}

impl Default for GenerationOptions {
	fn default() -> Self {
		Self {
			indent: DEFAULT_INDENT.to_string(),
			left_padding: String::new(),
		}
	}
}

impl GenerationOptions {
	/// Indent with `width` spaces per level.
	pub fn with_indent_width(width: usize) -> Self {
		Self {
			indent: " ".repeat(width),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_left_padding(mut self, left_padding: impl Into<String>) -> Self {
		self.left_padding = left_padding.into();
		self
	}
}

/// Build the markup for `members` using default layout options.
pub fn build_output(profile: &Profile, members: &[MemberDescriptor]) -> String {
	build_output_with_options(profile, members, &GenerationOptions::default())
}

/// Build the markup for the accessible `members`, wrapped in the profile's
/// class grouping element when one is configured.
pub fn build_output_with_options(
	profile: &Profile,
	members: &[MemberDescriptor],
	options: &GenerationOptions,
) -> String {
	let outputs = expand_members(profile, members);
	let outputs = if outputs.is_empty() && !members.iter().any(MemberDescriptor::is_accessible) {
		vec![NO_ACCESSIBLE_MEMBERS.to_string()]
	} else {
		outputs
	};

	let body = wrap_in_grouping(&profile.class_grouping, &outputs, &options.indent);
	pad_continuation_lines(&body, &options.left_padding)
}

/// Build flat output for an explicit member selection. The class grouping
/// element is not used.
pub fn build_selection_output(
	profile: &Profile,
	members: &[MemberDescriptor],
	options: &GenerationOptions,
) -> String {
	let outputs = expand_members(profile, members);
	pad_continuation_lines(&outputs.join("\n"), &options.left_padding)
}

fn expand_members(profile: &Profile, members: &[MemberDescriptor]) -> Vec<String> {
	let mut expander = Expander::new(profile);
	members
		.iter()
		.filter(|member| member.is_accessible())
		.filter_map(|member| expander.expand_member(member))
		.collect()
}

fn wrap_in_grouping(class_grouping: &str, outputs: &[String], indent: &str) -> String {
	let class_grouping = class_grouping.trim();
	if class_grouping.is_empty() {
		return outputs.join("\n");
	}

	let element_name = class_grouping
		.split(char::is_whitespace)
		.next()
		.unwrap_or(class_grouping);
	let mut result = format!("<{class_grouping}>");

	for output in outputs {
		for line in output.lines() {
			result.push('\n');
			if !line.is_empty() {
				result.push_str(indent);
				result.push_str(line);
			}
		}
	}

	result.push_str(&format!("\n</{element_name}>"));
	result
}

fn pad_continuation_lines(text: &str, left_padding: &str) -> String {
	if left_padding.is_empty() {
		return text.to_string();
	}

	text.split('\n')
		.enumerate()
		.map(|(index, line)| {
			if index == 0 || line.is_empty() {
				line.to_string()
			} else {
				format!("{left_padding}{line}")
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Summarize selected member names for a status message.
///
/// - `[]` → `""`
/// - `["one"]` → `"one"`
/// - `["one", "two"]` → `"one and two"`
/// - `["one", "two", "three"]` → `"one, two and 1 other member"`
/// - `["one", "two", "three", "four"]` → `"one, two and 2 other members"`
pub fn summarize_selection<S: AsRef<str>>(names: &[S]) -> String {
	match names {
		[] => String::new(),
		[only] => only.as_ref().to_string(),
		[first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
		[first, second, rest @ ..] => {
			let others = rest.len();
			let noun = if others == 1 { "member" } else { "members" };
			format!(
				"{}, {} and {others} other {noun}",
				first.as_ref(),
				second.as_ref()
			)
		}
	}
}

/// Which profile a request should use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileSelection<'a> {
	/// Explicit profile name. Takes precedence over `project_type`.
	pub name: Option<&'a str>,
	pub project_type: Option<&'a str>,
}

impl<'a> ProfileSelection<'a> {
	pub fn named(name: &'a str) -> Self {
		Self {
			name: Some(name),
			project_type: None,
		}
	}

	pub fn for_project_type(project_type: &'a str) -> Self {
		Self {
			name: None,
			project_type: Some(project_type),
		}
	}
}

/// Output of one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
	/// Name of the profile used.
	pub profile: String,
	pub output: String,
	/// Human readable description of what was generated, e.g. the class name
	/// or a selection summary.
	pub summary: String,
}

/// Generates markup from class facts using a configured set of profiles.
#[derive(Debug, Clone)]
pub struct Generator {
	profiles: ProfileSet,
	options: GenerationOptions,
}

impl Generator {
	/// Create a generator. An empty profile set is rejected immediately.
	pub fn new(profiles: ProfileSet) -> XgenResult<Self> {
		if profiles.is_empty() {
			return Err(XgenError::EmptyProfileSet);
		}

		Ok(Self {
			profiles,
			options: GenerationOptions::default(),
		})
	}

	#[must_use]
	pub fn with_options(mut self, options: GenerationOptions) -> Self {
		self.options = options;
		self
	}

	pub fn profiles(&self) -> &ProfileSet {
		&self.profiles
	}

	pub fn options(&self) -> &GenerationOptions {
		&self.options
	}

	pub fn profile(&self, selection: ProfileSelection<'_>) -> XgenResult<&Profile> {
		self.profiles.select(selection.name, selection.project_type)
	}

	/// Generate markup for every accessible member of `class`.
	///
	/// `None` for `class` means the source layer found nothing to generate
	/// from at the requested position. That is an expected outcome and yields
	/// `Ok(None)`.
	pub fn generate_for_class(
		&self,
		selection: ProfileSelection<'_>,
		class: Option<&ClassDescriptor>,
	) -> XgenResult<Option<GeneratedOutput>> {
		let profile = self.profile(selection)?;
		let Some(class) = class else {
			tracing::info!("no class or module found to generate markup for");
			return Ok(None);
		};

		tracing::debug!(
			profile = %profile.name,
			class = %class.name,
			members = class.members.len(),
			"generating markup for class"
		);

		Ok(Some(GeneratedOutput {
			profile: profile.name.clone(),
			output: build_output_with_options(profile, &class.members, &self.options),
			summary: class.name.clone(),
		}))
	}

	/// Generate flat markup for selected members.
	pub fn generate_for_selection(
		&self,
		selection: ProfileSelection<'_>,
		members: &[MemberDescriptor],
	) -> XgenResult<Option<GeneratedOutput>> {
		let profile = self.profile(selection)?;
		let accessible: Vec<MemberDescriptor> = members
			.iter()
			.filter(|member| member.is_accessible())
			.cloned()
			.collect();

		if accessible.is_empty() {
			tracing::info!("no accessible members in the selection");
			return Ok(None);
		}

		let names: Vec<&str> = accessible.iter().map(|member| member.name.as_str()).collect();

		Ok(Some(GeneratedOutput {
			profile: profile.name.clone(),
			output: build_selection_output(profile, &accessible, &self.options),
			summary: summarize_selection(&names),
		}))
	}
}
