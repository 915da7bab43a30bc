use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::GenerationOptions;
use crate::Profile;
use crate::ProfileSelection;
use crate::ProfileSet;
use crate::XgenError;
use crate::XgenResult;

/// Default maximum markup file size in bytes (5 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Default indentation width in spaces.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["xgen.toml", ".xgen.toml", ".config/xgen.toml"];

/// Glob used to find markup files when `[analysis] include` is empty.
pub const DEFAULT_MARKUP_GLOB: &str = "**/*.xaml";

/// Configuration loaded from an `xgen.toml` file.
///
/// ```toml
/// active_profile = "UWP"
/// project_type = "uwp"
/// profile_paths = ["profiles/team.yaml"]
/// indent = 4
///
/// [analysis]
/// include = ["**/*.xaml"]
/// exclude = ["obj/", "bin/"]
///
/// [[profiles]]
/// name = "Minimal"
/// fallback_output = "<TextBlock Text=\"{Binding $name$}\" />"
/// ```
#[derive(Debug, Deserialize)]
pub struct XgenConfig {
	/// Profile used when no name is given on the command line.
	#[serde(default)]
	pub active_profile: Option<String>,
	/// Project type used to pick a profile when neither the command line nor
	/// `active_profile` names one.
	#[serde(default)]
	pub project_type: Option<String>,
	/// Extra profile files, relative to the project root. Format is taken
	/// from the extension.
	#[serde(default)]
	pub profile_paths: Vec<PathBuf>,
	/// Drop the shipped profiles instead of merging into them.
	#[serde(default)]
	pub replace_default_profiles: bool,
	/// Spaces per nesting level in generated output.
	#[serde(default = "default_indent")]
	pub indent: usize,
	/// Profiles declared inline. These are merged last and replace any
	/// earlier profile with the same name.
	#[serde(default)]
	pub profiles: Vec<Profile>,
	#[serde(default)]
	pub analysis: AnalysisConfig,
}

impl Default for XgenConfig {
	fn default() -> Self {
		Self {
			active_profile: None,
			project_type: None,
			profile_paths: Vec::new(),
			replace_default_profiles: false,
			indent: DEFAULT_INDENT_WIDTH,
			profiles: Vec::new(),
			analysis: AnalysisConfig::default(),
		}
	}
}

/// Controls which markup files `xgen analyze` and `xgen fix` visit.
#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
	/// Glob patterns for markup files, relative to the project root.
	#[serde(default = "default_include")]
	pub include: Vec<String>,
	/// Gitignore-style patterns applied on top of `.gitignore`.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
	/// Files larger than this are skipped.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
}

impl Default for AnalysisConfig {
	fn default() -> Self {
		Self {
			include: default_include(),
			exclude: Vec::new(),
			disable_gitignore: false,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

fn default_indent() -> usize {
	DEFAULT_INDENT_WIDTH
}

fn default_include() -> Vec<String> {
	vec![DEFAULT_MARKUP_GLOB.to_string()]
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl XgenConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is no config file.
	pub fn load(root: &Path) -> XgenResult<Option<XgenConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Like [`XgenConfig::load`], falling back to the defaults when no config
	/// file exists.
	pub fn load_or_default(root: &Path) -> XgenResult<XgenConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	pub fn parse(content: &str) -> XgenResult<XgenConfig> {
		toml::from_str(content).map_err(|e| XgenError::ConfigParse(e.to_string()))
	}

	/// Build the effective profile set: the shipped profiles (unless replaced),
	/// then every `profile_paths` file in order, then inline profiles.
	pub fn profile_set(&self, root: &Path) -> XgenResult<ProfileSet> {
		let mut profiles = if self.replace_default_profiles {
			ProfileSet::default()
		} else {
			ProfileSet::defaults()?
		};

		for relative in &self.profile_paths {
			let loaded = ProfileSet::load_file(&root.join(relative))?;
			tracing::debug!(path = %relative.display(), count = loaded.len(), "loaded profile file");
			profiles.merge(loaded);
		}

		profiles.merge(ProfileSet::new(self.profiles.clone()));

		if profiles.is_empty() {
			return Err(XgenError::EmptyProfileSet);
		}

		Ok(profiles)
	}

	/// The profile selection implied by the config. Command line values win:
	/// an explicit project type overrides the configured `active_profile`.
	pub fn selection<'a>(
		&'a self,
		profile: Option<&'a str>,
		project_type: Option<&'a str>,
	) -> ProfileSelection<'a> {
		let name = match (profile, project_type) {
			(Some(name), _) => Some(name),
			(None, Some(_)) => None,
			(None, None) => self.active_profile.as_deref(),
		};

		ProfileSelection {
			name,
			project_type: project_type.or(self.project_type.as_deref()),
		}
	}

	pub fn generation_options(&self) -> GenerationOptions {
		GenerationOptions::with_indent_width(self.indent)
	}
}
