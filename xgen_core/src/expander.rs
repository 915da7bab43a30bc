use std::collections::HashMap;

use crate::MemberDescriptor;
use crate::Placeholder;
use crate::Profile;
use crate::Resolver;

/// Counters shared by every template application in one generation pass.
///
/// A fresh context starts every counter from scratch, so two independent
/// passes over the same input produce identical output.
#[derive(Debug, Clone, Default)]
pub struct ExpansionContext {
	incrementing: u64,
	repeating: u64,
	xname_counters: HashMap<String, u64>,
	last_xname: Option<String>,
}

impl ExpansionContext {
	pub fn new() -> Self {
		Self::default()
	}

	fn next_incrementing(&mut self) -> u64 {
		self.incrementing += 1;
		self.incrementing
	}

	fn advance_repeating(&mut self) -> u64 {
		self.repeating += 1;
		self.repeating
	}

	fn next_xname(&mut self, element: &str) -> String {
		let counter = self.xname_counters.entry(element.to_string()).or_insert(0);
		*counter += 1;
		let xname = format!("{element}{counter}");
		self.last_xname = Some(xname.clone());
		xname
	}
}

/// Expands templates for the members of one generation pass.
#[derive(Debug, Clone)]
pub struct Expander<'p> {
	resolver: Resolver<'p>,
	context: ExpansionContext,
}

impl<'p> Expander<'p> {
	pub fn new(profile: &'p Profile) -> Self {
		Self {
			resolver: Resolver::new(profile),
			context: ExpansionContext::new(),
		}
	}

	pub fn profile(&self) -> &'p Profile {
		self.resolver.profile()
	}

	pub fn resolver(&self) -> &Resolver<'p> {
		&self.resolver
	}

	/// Resolve the member's template and expand it. Returns `None` when the
	/// resolved template asks for no output.
	pub fn expand_member(&mut self, member: &MemberDescriptor) -> Option<String> {
		let template = self.resolver.resolve_member(member);
		self.expand(template, member)
	}

	/// Expand `template` for `member`. Returns `None` when the template
	/// contains `$nooutput$`.
	pub fn expand(&mut self, template: &str, member: &MemberDescriptor) -> Option<String> {
		self.expand_inner(template, member, None)
	}

	fn expand_inner(
		&mut self,
		template: &str,
		member: &MemberDescriptor,
		enum_element: Option<&str>,
	) -> Option<String> {
		if Placeholder::NoOutput.is_in(template) {
			return None;
		}

		let repeating = Placeholder::RepeatingInteger
			.is_in(template)
			.then(|| self.context.advance_repeating());
		let mut output = String::with_capacity(template.len() + member.name.len() * 2);
		let mut rest = template;

		while let Some((before, placeholder, after)) = next_placeholder(rest) {
			output.push_str(before);
			rest = after;

			match placeholder {
				Placeholder::Name => output.push_str(&member.name),
				Placeholder::NameWithSpaces => output.push_str(&split_camel_case(&member.name)),
				Placeholder::Type => output.push_str(&member.type_name),
				Placeholder::IncrementingInteger => {
					let value = self.context.next_incrementing();
					output.push_str(&value.to_string());
				}
				Placeholder::RepeatingInteger => {
					output.push_str(&repeating.unwrap_or_default().to_string());
				}
				Placeholder::GeneratedXName => {
					let token_start = template.len() - after.len() - placeholder.token().len();
					let element =
						enclosing_element_name(&template[..token_start]).unwrap_or(&member.name);
					let xname = self.context.next_xname(element);
					output.push_str(&xname);
				}
				Placeholder::RepeatingXName => {
					if let Some(xname) = &self.context.last_xname {
						output.push_str(xname);
					}
				}
				Placeholder::SubProperties => {
					let nested = self.expand_sub_properties(member);
					push_indented(&mut output, &nested);
				}
				Placeholder::EnumMembers => {
					let nested = self.expand_enum_members(member);
					push_indented(&mut output, &nested);
				}
				Placeholder::EnumElement => output.push_str(enum_element.unwrap_or_default()),
				Placeholder::EnumElementWithSpaces => {
					output.push_str(&split_camel_case(enum_element.unwrap_or_default()));
				}
				Placeholder::NoOutput => {}
			}
		}
		output.push_str(rest);

		Some(output)
	}

	fn expand_sub_properties(&mut self, member: &MemberDescriptor) -> String {
		let profile = self.profile();
		let mut lines = Vec::new();

		for sub_member in member.accessible_members() {
			let template = if profile.sub_property_output.trim().is_empty() {
				self.resolver.resolve_member(sub_member)
			} else {
				profile.sub_property_output.as_str()
			};

			if let Some(expanded) = self.expand_inner(template, sub_member, None) {
				lines.push(expanded);
			}
		}

		lines.join("\n")
	}

	fn expand_enum_members(&mut self, member: &MemberDescriptor) -> String {
		let profile = self.profile();
		let template = if profile.enum_member_output.trim().is_empty() {
			Placeholder::EnumElement.token()
		} else {
			profile.enum_member_output.as_str()
		};

		member
			.enum_members
			.iter()
			.filter_map(|element| self.expand_inner(template, member, Some(element)))
			.collect::<Vec<_>>()
			.join("\n")
	}
}

/// Expand `template` for a single member with fresh counters.
///
/// `$nooutput$` templates expand to an empty string.
pub fn expand(template: &str, member: &MemberDescriptor, profile: &Profile) -> String {
	Expander::new(profile)
		.expand(template, member)
		.unwrap_or_default()
}

/// Insert a space before each uppercase letter that follows a lowercase one.
///
/// `MyProperty` becomes `My Property`; runs of capitals such as `IOStream`
/// are left alone.
pub fn split_camel_case(name: &str) -> String {
	let mut result = String::with_capacity(name.len() + 4);
	let mut previous_is_lowercase = false;

	for ch in name.chars() {
		if ch.is_uppercase() && previous_is_lowercase {
			result.push(' ');
		}
		previous_is_lowercase = ch.is_lowercase();
		result.push(ch);
	}

	result.trim().to_string()
}

/// Find the next known placeholder. Unknown `$...$` text is left in place.
fn next_placeholder(text: &str) -> Option<(&str, Placeholder, &str)> {
	let mut search_from = 0;

	while let Some(relative) = text[search_from..].find('$') {
		let start = search_from + relative;
		let found = Placeholder::ALL
			.into_iter()
			.find(|placeholder| text[start..].starts_with(placeholder.token()));

		if let Some(placeholder) = found {
			let end = start + placeholder.token().len();
			return Some((&text[..start], placeholder, &text[end..]));
		}

		search_from = start + 1;
	}

	None
}

/// Name of the element opened most recently in `before`, e.g. `TextBox` for
/// the text preceding the token in `<TextBox x:Name="$xname$" />`.
fn enclosing_element_name(before: &str) -> Option<&str> {
	let start = before.rfind('<')? + 1;
	let name_len = before[start..]
		.find(|ch: char| ch.is_whitespace() || ch == '>' || ch == '/')
		.unwrap_or(before.len() - start);
	let name = &before[start..start + name_len];

	(!name.is_empty()).then_some(name)
}

/// Append multi-line `nested` output so continuation lines line up with the
/// indentation of the line the placeholder sits on.
fn push_indented(output: &mut String, nested: &str) {
	let line_start = output.rfind('\n').map_or(0, |index| index + 1);
	let indent: String = output[line_start..]
		.chars()
		.take_while(|ch| *ch == ' ' || *ch == '\t')
		.collect();

	for (index, line) in nested.split('\n').enumerate() {
		if index > 0 {
			output.push('\n');
			if !line.is_empty() {
				output.push_str(&indent);
			}
		}
		output.push_str(line);
	}
}
