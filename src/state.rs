//! Snapshot persistence for two-way sync
//!
//! The snapshot records, per relative path, what both sides looked like at
//! the end of the last successful run. It is stored as a single JSON object:
//!
//! ```json
//! { "src/lib.rs": { "local_checksum": "…", "remote_checksum": "…",
//!                   "remote_uuid": "…", "last_sync": "2024-05-01T10:00:00Z" } }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{METADATA_DIR, STATE_FILE};
use crate::error::StateError;

/// Last known state of one file
///
/// `None` means "no prior observation" for that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStateEntry {
	#[serde(default)]
	pub local_checksum: Option<String>,

	#[serde(default)]
	pub remote_checksum: Option<String>,

	/// Valid only until the file is next replaced on the remote
	#[serde(default)]
	pub remote_uuid: Option<String>,

	#[serde(default)]
	pub last_sync: DateTime<Utc>,
}

impl SyncStateEntry {
	/// Entry observed right now
	pub fn observed(
		local_checksum: Option<String>,
		remote_checksum: Option<String>,
		remote_uuid: Option<String>,
	) -> Self {
		SyncStateEntry { local_checksum, remote_checksum, remote_uuid, last_sync: Utc::now() }
	}

	/// True when neither side holds the file anymore
	pub fn is_absent_on_both_sides(&self) -> bool {
		self.local_checksum.is_none() && self.remote_checksum.is_none()
	}
}

/// Snapshot keyed by relative path
pub type SyncState = BTreeMap<String, SyncStateEntry>;

/// Loads and saves the snapshot of one project
pub struct StateStore {
	path: PathBuf,
}

impl StateStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		StateStore { path: path.into() }
	}

	/// Store at the default location under a project root
	pub fn for_root(root: &Path) -> Self {
		StateStore::new(root.join(METADATA_DIR).join(STATE_FILE))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Load the snapshot; a missing file is an empty snapshot
	pub async fn load(&self) -> Result<SyncState, StateError> {
		if !self.path.exists() {
			return Ok(SyncState::new());
		}

		let contents = tokio::fs::read_to_string(&self.path)
			.await
			.map_err(|e| StateError::LoadFailed { source: Box::new(e) })?;

		serde_json::from_str(&contents).map_err(|e| StateError::Corrupted {
			message: format!("Failed to parse {}: {}", self.path.display(), e),
		})
	}

	/// Replace the snapshot on disk
	///
	/// Writes a sibling temp file and renames it over the old one, so readers
	/// see either the previous or the new snapshot, never a partial one.
	pub async fn save(&self, state: &SyncState) -> Result<(), StateError> {
		let parent = self.path.parent().unwrap_or(Path::new("."));
		tokio::fs::create_dir_all(parent)
			.await
			.map_err(|e| StateError::SaveFailed { source: Box::new(e) })?;

		let json = serde_json::to_string_pretty(state)
			.map_err(|e| StateError::SaveFailed { source: Box::new(e) })?;

		let tmp_path = self.path.with_extension("json.tmp");
		tokio::fs::write(&tmp_path, json)
			.await
			.map_err(|e| StateError::SaveFailed { source: Box::new(e) })?;

		tokio::fs::rename(&tmp_path, &self.path)
			.await
			.map_err(|e| StateError::SaveFailed { source: Box::new(e) })
	}

	/// Delete the saved snapshot
	pub async fn clear(&self) -> Result<(), StateError> {
		if self.path.exists() {
			tokio::fs::remove_file(&self.path)
				.await
				.map_err(|e| StateError::SaveFailed { source: Box::new(e) })?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn entry(local: Option<&str>, remote: Option<&str>) -> SyncStateEntry {
		SyncStateEntry {
			local_checksum: local.map(String::from),
			remote_checksum: remote.map(String::from),
			remote_uuid: remote.map(|_| "uuid-1".to_string()),
			last_sync: Utc::now(),
		}
	}

	#[test]
	fn test_state_path_for_root() {
		let store = StateStore::for_root(Path::new("/tmp/project"));
		assert!(store.path().ends_with(".claudesync/sync_state.json"));
	}

	#[tokio::test]
	async fn test_load_missing_is_empty() {
		let temp = TempDir::new().unwrap();
		let store = StateStore::for_root(temp.path());
		assert!(store.load().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_save_and_load() {
		let temp = TempDir::new().unwrap();
		let store = StateStore::for_root(temp.path());

		let mut state = SyncState::new();
		state.insert("a.txt".to_string(), entry(Some("l1"), Some("r1")));
		state.insert("gone.txt".to_string(), entry(None, None));
		store.save(&state).await.unwrap();

		let loaded = store.load().await.unwrap();
		assert_eq!(loaded, state);
		assert!(!store.path().with_extension("json.tmp").exists());
	}

	#[tokio::test]
	async fn test_save_overwrites_whole_file() {
		let temp = TempDir::new().unwrap();
		let store = StateStore::for_root(temp.path());

		let mut first = SyncState::new();
		first.insert("old.txt".to_string(), entry(Some("l"), Some("r")));
		store.save(&first).await.unwrap();

		let mut second = SyncState::new();
		second.insert("new.txt".to_string(), entry(Some("l"), Some("r")));
		store.save(&second).await.unwrap();

		let loaded = store.load().await.unwrap();
		assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["new.txt"]);
	}

	#[tokio::test]
	async fn test_null_and_missing_fields() {
		let temp = TempDir::new().unwrap();
		let store = StateStore::for_root(temp.path());
		std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
		std::fs::write(
			store.path(),
			r#"{"a.txt": {"local_checksum": null, "remote_checksum": "abc", "last_sync": "2024-01-01T00:00:00+00:00"},
			    "b.txt": {}}"#,
		)
		.unwrap();

		let loaded = store.load().await.unwrap();
		assert_eq!(loaded["a.txt"].local_checksum, None);
		assert_eq!(loaded["a.txt"].remote_checksum.as_deref(), Some("abc"));
		assert_eq!(loaded["a.txt"].remote_uuid, None);
		assert!(loaded["b.txt"].is_absent_on_both_sides());
	}

	#[tokio::test]
	async fn test_corrupted_state() {
		let temp = TempDir::new().unwrap();
		let store = StateStore::for_root(temp.path());
		std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
		std::fs::write(store.path(), "{not json").unwrap();

		assert!(matches!(store.load().await, Err(StateError::Corrupted { .. })));
	}

	#[tokio::test]
	async fn test_clear() {
		let temp = TempDir::new().unwrap();
		let store = StateStore::for_root(temp.path());
		store.save(&SyncState::new()).await.unwrap();
		assert!(store.path().exists());
		store.clear().await.unwrap();
		assert!(!store.path().exists());
	}
}

// vim: ts=4
