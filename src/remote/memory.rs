//! In-process remote store
//!
//! Mints uuids and creation times like the hosted service does and keeps a
//! log of every call, which makes it the store of choice for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use super::{ProjectRef, ProviderResult, RemoteEntry, RemoteStore};
use crate::error::ProviderError;

/// A call made against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
	List,
	Upload { file_name: String },
	Delete { uuid: String, file_name: String },
}

#[derive(Default)]
struct Inner {
	files: Vec<RemoteEntry>,
	ops: Vec<RemoteOp>,
	failing_uploads: BTreeSet<String>,
	failing_list: bool,
}

/// Remote store kept entirely in memory
///
/// Documents of every project share one collection; the store is meant for
/// single-project use.
#[derive(Default)]
pub struct MemoryRemoteStore {
	inner: Mutex<Inner>,
}

impl MemoryRemoteStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		// A panic while holding the lock leaves plain data behind
		self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Add a document directly, bypassing the operation log
	pub fn insert(&self, file_name: &str, content: &str, created_at: DateTime<Utc>) -> RemoteEntry {
		let entry = RemoteEntry {
			uuid: uuid::Uuid::new_v4().to_string(),
			file_name: file_name.to_string(),
			content: content.to_string(),
			created_at,
		};
		self.lock().files.push(entry.clone());
		entry
	}

	/// Current documents, in creation order
	pub fn files(&self) -> Vec<RemoteEntry> {
		self.lock().files.clone()
	}

	/// Current document with the given name
	pub fn get(&self, file_name: &str) -> Option<RemoteEntry> {
		self.lock().files.iter().rev().find(|f| f.file_name == file_name).cloned()
	}

	/// Every call made so far
	pub fn ops(&self) -> Vec<RemoteOp> {
		self.lock().ops.clone()
	}

	/// Calls that changed the collection
	pub fn mutations(&self) -> Vec<RemoteOp> {
		self.lock().ops.iter().filter(|op| !matches!(op, RemoteOp::List)).cloned().collect()
	}

	pub fn clear_ops(&self) {
		self.lock().ops.clear();
	}

	/// Make every upload of `file_name` fail
	pub fn fail_uploads_of(&self, file_name: &str) {
		self.lock().failing_uploads.insert(file_name.to_string());
	}

	/// Make listing fail
	pub fn fail_listing(&self, fail: bool) {
		self.lock().failing_list = fail;
	}
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
	async fn list_files(&self, _project: &ProjectRef) -> ProviderResult<Vec<RemoteEntry>> {
		let mut inner = self.lock();
		inner.ops.push(RemoteOp::List);
		if inner.failing_list {
			return Err(ProviderError::RequestFailed {
				operation: "list_files",
				message: "injected failure".to_string(),
			});
		}
		Ok(inner.files.clone())
	}

	async fn upload_file(
		&self,
		_project: &ProjectRef,
		file_name: &str,
		content: &str,
	) -> ProviderResult<RemoteEntry> {
		let mut inner = self.lock();
		inner.ops.push(RemoteOp::Upload { file_name: file_name.to_string() });
		if inner.failing_uploads.contains(file_name) {
			return Err(ProviderError::RequestFailed {
				operation: "upload_file",
				message: format!("injected failure for {}", file_name),
			});
		}

		let entry = RemoteEntry {
			uuid: uuid::Uuid::new_v4().to_string(),
			file_name: file_name.to_string(),
			content: content.to_string(),
			created_at: Utc::now(),
		};
		inner.files.push(entry.clone());
		Ok(entry)
	}

	async fn delete_file(&self, _project: &ProjectRef, uuid: &str) -> ProviderResult<()> {
		let mut inner = self.lock();
		let pos = inner
			.files
			.iter()
			.position(|f| f.uuid == uuid)
			.ok_or_else(|| ProviderError::NotFound { uuid: uuid.to_string() })?;
		let removed = inner.files.remove(pos);
		inner.ops.push(RemoteOp::Delete { uuid: uuid.to_string(), file_name: removed.file_name });
		Ok(())
	}
}


// vim: ts=4
