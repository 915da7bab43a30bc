use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::AnalysisContext;
use crate::AnalyzerRegistry;
use crate::CONFIG_FILE_CANDIDATES;
use crate::DEFAULT_MARKUP_GLOB;
use crate::DEFAULT_MAX_FILE_SIZE;
use crate::MarkupDiagnostic;
use crate::SeverityOverrides;
use crate::XgenConfig;
use crate::XgenError;
use crate::XgenResult;

/// Options for controlling which markup files are visited.
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Glob patterns selecting markup files, relative to the root.
	pub include_set: GlobSet,
	/// Gitignore-style patterns to exclude.
	pub exclude_patterns: Vec<String>,
	pub disable_gitignore: bool,
	pub max_file_size: u64,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			include_set: build_glob_set(&[DEFAULT_MARKUP_GLOB.to_string()])
				.unwrap_or_else(|_| GlobSet::empty()),
			exclude_patterns: Vec::new(),
			disable_gitignore: false,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

impl ScanOptions {
	/// Construct [`ScanOptions`] from the `[analysis]` section of a config.
	pub fn from_config(config: Option<&XgenConfig>) -> XgenResult<Self> {
		let Some(config) = config else {
			return Ok(Self::default());
		};
		let analysis = &config.analysis;
		let include = if analysis.include.is_empty() {
			vec![DEFAULT_MARKUP_GLOB.to_string()]
		} else {
			analysis.include.clone()
		};

		Ok(Self {
			include_set: build_glob_set(&include)?,
			exclude_patterns: analysis.exclude.clone(),
			disable_gitignore: analysis.disable_gitignore,
			max_file_size: analysis.max_file_size,
		})
	}
}

fn build_glob_set(patterns: &[String]) -> XgenResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			XgenError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}

	builder.build().map_err(|e| {
		XgenError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> XgenResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			XgenError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}

	builder.build().map_err(|e| {
		XgenError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.is_file() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::debug!(%error, "ignoring unreadable .gitignore");
		}
	}

	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || matches!(name, "bin" | "obj" | "node_modules" | "target")
}

fn has_project_config(dir: &Path) -> bool {
	CONFIG_FILE_CANDIDATES
		.iter()
		.any(|candidate| dir.join(candidate).is_file())
}

/// Collect every markup file under `root` accepted by `options`, sorted.
///
/// `.gitignore` rules apply unless disabled, exclude patterns always apply,
/// and subdirectories carrying their own `xgen.toml` are treated as separate
/// projects and skipped.
pub fn collect_markup_files(root: &Path, options: &ScanOptions) -> XgenResult<Vec<PathBuf>> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let mut walker = Walker {
		root,
		options,
		gitignore: &gitignore,
		exclude: &exclude,
		visited: HashSet::new(),
		files: Vec::new(),
	};

	walker.walk(root)?;
	let mut files = walker.files;
	files.sort();

	Ok(files)
}

struct Walker<'a> {
	root: &'a Path,
	options: &'a ScanOptions,
	gitignore: &'a Gitignore,
	exclude: &'a Gitignore,
	visited: HashSet<PathBuf>,
	files: Vec<PathBuf>,
}

impl Walker<'_> {
	fn walk(&mut self, dir: &Path) -> XgenResult<()> {
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !self.visited.insert(canonical) {
			tracing::debug!(path = %dir.display(), "skipping directory visited through a symlink");
			return Ok(());
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			let is_dir = path.is_dir();

			if path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(|name| is_dir && is_ignored_directory_name(name))
			{
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				// Subdirectories with their own config are separate projects.
				if has_project_config(&path) {
					continue;
				}
				self.walk(&path)?;
				continue;
			}

			let Ok(relative) = path.strip_prefix(self.root) else {
				continue;
			};
			if !self.options.include_set.is_match(relative) {
				continue;
			}

			let size = std::fs::metadata(&path).map_or(0, |metadata| metadata.len());
			if size > self.options.max_file_size {
				tracing::debug!(path = %path.display(), size, "skipping oversized file");
				continue;
			}

			self.files.push(path);
		}

		Ok(())
	}
}

/// Diagnostics for one markup file.
#[derive(Debug, Clone)]
pub struct FileDiagnostics {
	pub file: PathBuf,
	pub diagnostics: Vec<MarkupDiagnostic>,
}

/// Analyze every markup file under `root`.
pub fn analyze_project(
	root: &Path,
	options: &ScanOptions,
	registry: &AnalyzerRegistry,
	project_type: Option<&str>,
	overrides: &SeverityOverrides,
) -> XgenResult<Vec<FileDiagnostics>> {
	let mut results = Vec::new();

	for file in collect_markup_files(root, options)? {
		let content = std::fs::read_to_string(&file)?;
		let mut context = AnalysisContext::new(&content).with_file(&file);
		if let Some(project_type) = project_type {
			context = context.with_project_type(project_type);
		}

		let diagnostics = registry.analyze(&context, Some(overrides));
		results.push(FileDiagnostics { file, diagnostics });
	}

	Ok(results)
}

/// New content for one file after fixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFix {
	pub file: PathBuf,
	pub original: String,
	pub updated: String,
	pub changes: Vec<String>,
}

/// Compute fixes for every markup file under `root`. Files with nothing to
/// change are left out.
pub fn compute_fixes(
	root: &Path,
	options: &ScanOptions,
	registry: &AnalyzerRegistry,
	project_type: Option<&str>,
	overrides: &SeverityOverrides,
) -> XgenResult<Vec<FileFix>> {
	let mut fixes = Vec::new();

	for file in collect_markup_files(root, options)? {
		let original = std::fs::read_to_string(&file)?;
		let mut context = AnalysisContext::new(&original).with_file(&file);
		if let Some(project_type) = project_type {
			context = context.with_project_type(project_type);
		}

		let outcome = registry.fix_document(&context, Some(overrides));
		if !outcome.success || outcome.text == original {
			continue;
		}

		fixes.push(FileFix {
			updated: outcome.text,
			changes: outcome.changes,
			original,
			file,
		});
	}

	Ok(fixes)
}

pub fn write_fixes(fixes: &[FileFix]) -> XgenResult<()> {
	for fix in fixes {
		std::fs::write(&fix.file, &fix.updated)?;
	}

	Ok(())
}
