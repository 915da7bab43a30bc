use crate::Mapping;
use crate::MemberDescriptor;
use crate::Profile;

/// Pseudo type name mappings can use to target any enum member.
pub const ENUM_TYPE_NAME: &str = "enum";

/// The generic argument that accepts any type in a mapping pattern.
const WILDCARD_ARGUMENT: &str = "t";

/// Language keyword aliases and the canonical name they collapse to. Keys are
/// lowercase and may be namespace-qualified.
const TYPE_ALIASES: &[(&str, &str)] = &[
	("system.string", "string"),
	("system.int32", "int"),
	("int32", "int"),
	("integer", "int"),
	("system.int64", "long"),
	("int64", "long"),
	("system.int16", "short"),
	("int16", "short"),
	("system.uint32", "uint"),
	("uint32", "uint"),
	("uinteger", "uint"),
	("system.uint64", "ulong"),
	("uint64", "ulong"),
	("system.uint16", "ushort"),
	("uint16", "ushort"),
	("system.boolean", "bool"),
	("boolean", "bool"),
	("system.double", "double"),
	("system.single", "float"),
	("single", "float"),
	("system.decimal", "decimal"),
	("system.char", "char"),
	("system.byte", "byte"),
	("system.sbyte", "sbyte"),
	("system.object", "object"),
	("system.datetime", "datetime"),
	("date", "datetime"),
	("system.datetimeoffset", "datetimeoffset"),
	("system.nullable", "nullable"),
];

/// Normalize a declared type name for comparison.
///
/// - comparison is case-insensitive, so the result is lowercase;
/// - `Collection(Of T)` style generics become `Collection<T>`, including
///   nested arguments;
/// - whitespace is removed;
/// - keyword aliases collapse (`Int32` and `int` both become `int`);
/// - `Nullable<X>` becomes `X?`.
pub fn normalize_type_name(type_name: &str) -> String {
	let angled = convert_of_generics(type_name);
	let compact: String = angled
		.chars()
		.filter(|ch| !ch.is_whitespace())
		.collect::<String>()
		.to_lowercase();
	let aliased = replace_aliases(&compact);

	unwrap_nullable(&aliased).unwrap_or(aliased)
}

/// Rewrite `(Of ...)` groups into `<...>` while leaving ordinary parentheses
/// such as array suffixes alone.
fn convert_of_generics(type_name: &str) -> String {
	let mut result = String::with_capacity(type_name.len());
	let mut stack: Vec<bool> = Vec::new();
	let mut rest = type_name;

	while let Some(ch) = rest.chars().next() {
		match ch {
			'(' => {
				let after = rest[1..].trim_start();
				let is_generic = after
					.get(..2)
					.is_some_and(|prefix| prefix.eq_ignore_ascii_case("of"))
					&& after
						.get(2..)
						.is_some_and(|rest| rest.starts_with(char::is_whitespace));
				if is_generic {
					result.push('<');
					stack.push(true);
					rest = after[2..].trim_start();
					continue;
				}
				result.push('(');
				stack.push(false);
			}
			')' => {
				if stack.pop() == Some(true) {
					result.push('>');
				} else {
					result.push(')');
				}
			}
			other => result.push(other),
		}
		rest = &rest[ch.len_utf8()..];
	}

	result
}

fn replace_aliases(compact: &str) -> String {
	let mut result = String::with_capacity(compact.len());
	let mut identifier = String::new();

	let flush = |identifier: &mut String, result: &mut String| {
		if identifier.is_empty() {
			return;
		}
		let canonical = TYPE_ALIASES
			.iter()
			.find(|(alias, _)| *alias == identifier.as_str())
			.map_or(identifier.as_str(), |(_, canonical)| *canonical);
		result.push_str(canonical);
		identifier.clear();
	};

	for ch in compact.chars() {
		if ch.is_alphanumeric() || ch == '_' || ch == '.' {
			identifier.push(ch);
		} else {
			flush(&mut identifier, &mut result);
			result.push(ch);
		}
	}
	flush(&mut identifier, &mut result);

	result
}

fn unwrap_nullable(normalized: &str) -> Option<String> {
	let (outer, arguments) = split_generic(normalized)?;
	if outer != "nullable" || arguments.len() != 1 {
		return None;
	}

	Some(format!("{}?", arguments[0]))
}

/// Split `outer<a,b<c>>` into `("outer", ["a", "b<c>"])`. Only top-level
/// commas separate arguments.
fn split_generic(normalized: &str) -> Option<(&str, Vec<&str>)> {
	let open = normalized.find('<')?;
	if !normalized.ends_with('>') || open == 0 {
		return None;
	}

	let outer = &normalized[..open];
	let inner = &normalized[open + 1..normalized.len() - 1];
	let mut arguments = Vec::new();
	let mut depth = 0usize;
	let mut start = 0;

	for (index, ch) in inner.char_indices() {
		match ch {
			'<' => depth += 1,
			'>' => depth = depth.saturating_sub(1),
			',' if depth == 0 => {
				arguments.push(&inner[start..index]);
				start = index + 1;
			}
			_ => {}
		}
	}
	arguments.push(&inner[start..]);

	Some((outer, arguments))
}

/// How a mapping's type pattern matched a member type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeMatchKind {
	Exact,
	Wildcard,
}

#[derive(Debug, Clone)]
enum TypeAlternative {
	Exact(String),
	/// Outer type plus the number of wildcard arguments.
	Wildcard(String, usize),
}

/// A parsed mapping type pattern, possibly with `|` alternatives.
#[derive(Debug, Clone)]
pub struct TypePattern {
	alternatives: Vec<TypeAlternative>,
}

impl TypePattern {
	pub fn parse(pattern: &str) -> Self {
		let alternatives = split_alternatives(pattern)
			.into_iter()
			.map(normalize_type_name)
			.filter(|alternative| !alternative.is_empty())
			.map(|alternative| {
				match split_generic(&alternative) {
					Some((outer, arguments))
						if arguments.iter().all(|arg| *arg == WILDCARD_ARGUMENT) =>
					{
						TypeAlternative::Wildcard(outer.to_string(), arguments.len())
					}
					_ => TypeAlternative::Exact(alternative),
				}
			})
			.collect();

		Self { alternatives }
	}

	/// Match an already normalized type name. Exact alternatives win over
	/// wildcard ones within the same pattern.
	pub fn matches(&self, normalized_type: &str) -> Option<TypeMatchKind> {
		let exact = self.alternatives.iter().any(|alternative| {
			matches!(alternative, TypeAlternative::Exact(exact) if exact == normalized_type)
		});
		if exact {
			return Some(TypeMatchKind::Exact);
		}

		let generic = split_generic(normalized_type)?;
		self.alternatives
			.iter()
			.any(|alternative| {
				matches!(
					alternative,
					TypeAlternative::Wildcard(outer, arity)
						if *outer == generic.0 && *arity == generic.1.len()
				)
			})
			.then_some(TypeMatchKind::Wildcard)
	}
}

/// Split on `|` outside of generic brackets.
fn split_alternatives(pattern: &str) -> Vec<&str> {
	let mut alternatives = Vec::new();
	let mut depth = 0usize;
	let mut start = 0;

	for (index, ch) in pattern.char_indices() {
		match ch {
			'<' | '(' => depth += 1,
			'>' | ')' => depth = depth.saturating_sub(1),
			'|' if depth == 0 => {
				alternatives.push(&pattern[start..index]);
				start = index + 1;
			}
			_ => {}
		}
	}
	alternatives.push(&pattern[start..]);

	alternatives
}

/// Selects output templates from a profile's ordered mapping list.
///
/// Type patterns are parsed once when the resolver is built so a single
/// resolver can serve a whole generation pass.
#[derive(Debug, Clone)]
pub struct Resolver<'p> {
	profile: &'p Profile,
	patterns: Vec<TypePattern>,
}

impl<'p> Resolver<'p> {
	pub fn new(profile: &'p Profile) -> Self {
		let patterns = profile
			.mappings
			.iter()
			.map(|mapping| TypePattern::parse(&mapping.type_match))
			.collect();

		Self { profile, patterns }
	}

	pub fn profile(&self) -> &'p Profile {
		self.profile
	}

	/// Find the mapping for a member, or `None` when only the fallback
	/// applies.
	///
	/// Candidates are searched in this order, each in declaration order:
	///
	/// 1. exact type, same mutability;
	/// 2. exact type, read-write (read-only members only);
	/// 3. wildcard generic, same mutability;
	/// 4. wildcard generic, read-write (read-only members only).
	///
	/// Nullable types that find nothing are retried as their underlying type.
	pub fn resolve_mapping(
		&self,
		type_name: &str,
		member_name: &str,
		is_read_only: bool,
	) -> Option<&'p Mapping> {
		let normalized = normalize_type_name(type_name);
		let mut candidates = vec![normalized.as_str()];
		if let Some(underlying) = normalized.strip_suffix('?') {
			candidates.push(underlying);
		}

		let mutabilities: &[bool] = if is_read_only {
			&[true, false]
		} else {
			&[false]
		};

		for candidate in candidates {
			for kind in [TypeMatchKind::Exact, TypeMatchKind::Wildcard] {
				for if_read_only in mutabilities {
					if let Some(mapping) =
						self.find(candidate, kind, member_name, *if_read_only)
					{
						return Some(mapping);
					}
				}
			}
		}

		None
	}

	/// Resolve the template for a type/name/mutability triple, falling back to
	/// the profile's fallback template.
	pub fn resolve(&self, type_name: &str, member_name: &str, is_read_only: bool) -> &'p str {
		self.resolve_mapping(type_name, member_name, is_read_only)
			.map_or(self.profile.fallback_output.as_str(), |mapping| {
				mapping.output.as_str()
			})
	}

	/// Resolve the template for a member. Enum members that have no mapping
	/// for their own type are retried with the `enum` pseudo type.
	pub fn resolve_member(&self, member: &MemberDescriptor) -> &'p str {
		let mapping = self
			.resolve_mapping(&member.type_name, &member.name, member.is_read_only)
			.or_else(|| {
				if member.is_enum() {
					self.resolve_mapping(ENUM_TYPE_NAME, &member.name, member.is_read_only)
				} else {
					None
				}
			});

		mapping.map_or(self.profile.fallback_output.as_str(), |mapping| {
			mapping.output.as_str()
		})
	}

	fn find(
		&self,
		normalized_type: &str,
		kind: TypeMatchKind,
		member_name: &str,
		if_read_only: bool,
	) -> Option<&'p Mapping> {
		self.profile
			.mappings
			.iter()
			.zip(&self.patterns)
			.find(|(mapping, pattern)| {
				mapping.if_read_only == if_read_only
					&& pattern.matches(normalized_type) == Some(kind)
					&& mapping.name_contains.matches(member_name)
			})
			.map(|(mapping, _)| mapping)
	}
}

/// Resolve the output template for one member against `profile`.
pub fn resolve<'p>(
	profile: &'p Profile,
	type_name: &str,
	member_name: &str,
	is_read_only: bool,
) -> &'p str {
	Resolver::new(profile).resolve(type_name, member_name, is_read_only)
}
