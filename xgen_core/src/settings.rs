use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::UNIX_EPOCH;

use crate::Severity;

/// File holding per-directory severity overrides, e.g.
/// `{ "XG101": "error", "XG102": "hidden" }`.
pub const SETTINGS_FILE_NAME: &str = "xgen-analysis.json";

const READ_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
	size: u64,
	modified_unix_ms: u64,
}

impl Fingerprint {
	fn of(path: &Path) -> Option<Self> {
		let metadata = std::fs::metadata(path).ok()?;
		let modified_unix_ms = metadata
			.modified()
			.ok()
			.and_then(|time| time.duration_since(UNIX_EPOCH).ok())
			.and_then(|duration| duration.as_millis().try_into().ok())
			.unwrap_or(0);

		Some(Self {
			size: metadata.len(),
			modified_unix_ms,
		})
	}
}

#[derive(Debug, Clone)]
struct CachedOverrides {
	fingerprint: Fingerprint,
	severities: HashMap<String, Severity>,
}

/// Cache of severity override files keyed by path.
///
/// Entries are refreshed when a file's size or modification time changes.
/// Lookups take a shared lock; refreshing takes the write lock. A file that
/// cannot be read or parsed is never cached and every lookup against it
/// returns the caller's default.
#[derive(Debug, Default)]
pub struct SeverityOverrides {
	entries: RwLock<HashMap<PathBuf, CachedOverrides>>,
}

impl SeverityOverrides {
	pub fn new() -> Self {
		Self::default()
	}

	/// Severity for `code` from the override file at `settings_path`, or
	/// `default` when the file has no entry or cannot be used.
	pub fn severity(&self, settings_path: &Path, code: &str, default: Severity) -> Severity {
		let Some(fingerprint) = Fingerprint::of(settings_path) else {
			return default;
		};
		let code = code.to_ascii_uppercase();

		{
			let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
			if let Some(cached) = entries
				.get(settings_path)
				.filter(|cached| cached.fingerprint == fingerprint)
			{
				return cached.severities.get(&code).copied().unwrap_or(default);
			}
		}

		let Some(severities) = read_overrides(settings_path) else {
			return default;
		};
		let severity = severities.get(&code).copied().unwrap_or(default);

		tracing::debug!(path = %settings_path.display(), "refreshed severity overrides");
		self.entries
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(
				settings_path.to_path_buf(),
				CachedOverrides {
					fingerprint,
					severities,
				},
			);

		severity
	}

	/// Forget the cached entry for one file.
	pub fn invalidate(&self, settings_path: &Path) {
		self.entries
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(settings_path);
	}

	pub fn clear(&self) {
		self.entries
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}

	pub fn len(&self) -> usize {
		self.entries
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn read_overrides(path: &Path) -> Option<HashMap<String, Severity>> {
	let mut last_error = None;

	for _ in 0..READ_ATTEMPTS {
		match std::fs::read_to_string(path) {
			Ok(content) => {
				return match serde_json::from_str::<HashMap<String, Severity>>(&content) {
					Ok(severities) => {
						Some(
							severities
								.into_iter()
								.map(|(code, severity)| (code.to_ascii_uppercase(), severity))
								.collect(),
						)
					}
					Err(error) => {
						tracing::warn!(path = %path.display(), %error, "ignoring invalid severity overrides");
						None
					}
				};
			}
			Err(error) => last_error = Some(error),
		}
	}

	if let Some(error) = last_error {
		tracing::warn!(path = %path.display(), %error, "could not read severity overrides");
	}

	None
}

/// Find the nearest override file, starting in `start` and walking up through
/// its ancestors.
pub fn find_settings_file(start: &Path) -> Option<PathBuf> {
	start
		.ancestors()
		.map(|dir| dir.join(SETTINGS_FILE_NAME))
		.find(|candidate| candidate.is_file())
}
