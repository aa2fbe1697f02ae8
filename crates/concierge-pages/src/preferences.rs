//! User preferences
//!
//! Small per-user flags such as "don't ask me again" on the discard
//! confirmation. A [`PreferencesStore`] is created by the page that owns it,
//! loaded and saved explicitly, and passed by reference to whatever needs a
//! flag.
//!
//! ## Example
//!
//! ```
//! use concierge_pages::preferences::{PreferencesStore, SKIP_DISCARD_CONFIRMATION};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("prefs.json");
//!
//! let mut store = PreferencesStore::load(&path).unwrap();
//! assert!(!store.flag(SKIP_DISCARD_CONFIRMATION));
//! store.set_flag(SKIP_DISCARD_CONFIRMATION, true);
//! store.save().unwrap();
//!
//! assert!(PreferencesStore::load(&path).unwrap().flag(SKIP_DISCARD_CONFIRMATION));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Skip the "discard unsaved changes?" prompt.
pub const SKIP_DISCARD_CONFIRMATION: &str = "skip_discard_confirmation";

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type PreferencesResult<T> = Result<T, PreferencesError>;

/// Persisted preference values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
	#[serde(default)]
	pub flags: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PreferencesStore {
	/// Backing file; `None` keeps everything in memory
	path: Option<PathBuf>,
	preferences: Preferences,
}

impl PreferencesStore {
	/// A store that never touches the disk.
	pub fn in_memory() -> Self {
		Self::default()
	}

	/// Loads preferences from `path`. A missing file yields the defaults.
	pub fn load(path: impl AsRef<Path>) -> PreferencesResult<Self> {
		let path = path.as_ref().to_path_buf();
		let preferences = match fs::read_to_string(&path) {
			Ok(raw) => serde_json::from_str(&raw)?,
			Err(e) if e.kind() == ErrorKind::NotFound => Preferences::default(),
			Err(e) => return Err(e.into()),
		};
		debug!(path = %path.display(), flags = preferences.flags.len(), "preferences loaded");
		Ok(Self {
			path: Some(path),
			preferences,
		})
	}

	/// Writes the preferences back to the file they were loaded from.
	pub fn save(&self) -> PreferencesResult<()> {
		let Some(path) = &self.path else {
			return Ok(());
		};
		if let Some(parent) = path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)?;
		}
		fs::write(path, serde_json::to_string_pretty(&self.preferences)?)?;
		debug!(path = %path.display(), "preferences saved");
		Ok(())
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	pub fn preferences(&self) -> &Preferences {
		&self.preferences
	}

	/// Unset flags read as `false`.
	pub fn flag(&self, name: &str) -> bool {
		self.preferences.flags.get(name).copied().unwrap_or(false)
	}

	pub fn set_flag(&mut self, name: impl Into<String>, on: bool) {
		self.preferences.flags.insert(name.into(), on);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_in_memory_store_saves_nothing() {
		let mut store = PreferencesStore::in_memory();
		store.set_flag("beta", true);
		assert!(store.save().is_ok());
		assert!(store.path().is_none());
		assert!(store.flag("beta"));
	}

	#[rstest]
	fn test_malformed_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("prefs.json");
		fs::write(&path, "{not json").unwrap();
		assert!(matches!(
			PreferencesStore::load(&path),
			Err(PreferencesError::Json(_))
		));
	}

	#[rstest]
	fn test_save_creates_parent_directories() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("prefs.json");
		let mut store = PreferencesStore::load(&path).unwrap();
		store.set_flag(SKIP_DISCARD_CONFIRMATION, true);
		store.save().unwrap();

		let saved: Preferences = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
		assert_eq!(saved.flags.get(SKIP_DISCARD_CONFIRMATION), Some(&true));
	}
}
