//! Remote document store interface
//!
//! The remote side is a flat collection of documents per project. There is
//! no in-place update: replacing a document means uploading a new one (with
//! a fresh uuid) and deleting the old one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ProviderError;

mod folder;
mod memory;

pub use folder::FolderRemoteStore;
pub use memory::{MemoryRemoteStore, RemoteOp};

/// Result type for remote store operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Organization and project a run targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
	pub organization_id: String,
	pub project_id: String,
}

impl ProjectRef {
	pub fn new(organization_id: impl Into<String>, project_id: impl Into<String>) -> Self {
		ProjectRef { organization_id: organization_id.into(), project_id: project_id.into() }
	}
}

impl std::fmt::Display for ProjectRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.organization_id, self.project_id)
	}
}

/// A document as listed by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
	/// Opaque identifier; changes on every update
	pub uuid: String,

	/// Project-relative path the document belongs to
	pub file_name: String,

	/// Full text, including the marker line
	pub content: String,

	/// Creation time, which is also the last write time
	pub created_at: DateTime<Utc>,
}

/// Operations consumed from the remote store
///
/// Implementations own their transport concerns (timeouts, retries,
/// authentication); callers see one attempt per call.
#[async_trait]
pub trait RemoteStore: Send + Sync {
	/// List every document in the project
	async fn list_files(&self, project: &ProjectRef) -> ProviderResult<Vec<RemoteEntry>>;

	/// Create a document and return it as stored
	async fn upload_file(
		&self,
		project: &ProjectRef,
		file_name: &str,
		content: &str,
	) -> ProviderResult<RemoteEntry>;

	/// Delete the document with the given uuid
	async fn delete_file(&self, project: &ProjectRef, uuid: &str) -> ProviderResult<()>;
}

/// Index a listing by file name
///
/// Should a name appear twice (an interrupted replace), the newest document
/// wins.
pub fn index_by_name(entries: &[RemoteEntry]) -> BTreeMap<String, RemoteEntry> {
	let mut index: BTreeMap<String, RemoteEntry> = BTreeMap::new();
	for entry in entries {
		match index.get(&entry.file_name) {
			Some(existing) if existing.created_at > entry.created_at => {}
			_ => {
				index.insert(entry.file_name.clone(), entry.clone());
			}
		}
	}
	index
}


// vim: ts=4
