//! Remote store backed by a local directory
//!
//! Layout: `<base>/<organization>/<project>/<uuid>.json`, one JSON-encoded
//! `RemoteEntry` per document. Used to exercise the engines end-to-end
//! without a network service.

use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};

use super::{ProjectRef, ProviderResult, RemoteEntry, RemoteStore};
use crate::error::ProviderError;
use crate::logging::*;

/// Remote store persisting documents as JSON files
pub struct FolderRemoteStore {
	base: PathBuf,
}

impl FolderRemoteStore {
	pub fn new(base: impl Into<PathBuf>) -> Self {
		FolderRemoteStore { base: base.into() }
	}

	pub fn base(&self) -> &Path {
		&self.base
	}

	fn project_dir(&self, project: &ProjectRef) -> ProviderResult<PathBuf> {
		for id in [&project.organization_id, &project.project_id] {
			if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id == "." || id == ".." {
				return Err(ProviderError::RequestFailed {
					operation: "resolve_project",
					message: format!("invalid identifier {:?}", id),
				});
			}
		}
		Ok(self.base.join(&project.organization_id).join(&project.project_id))
	}

	fn document_path(&self, project: &ProjectRef, uuid: &str) -> ProviderResult<PathBuf> {
		if uuid::Uuid::parse_str(uuid).is_err() {
			return Err(ProviderError::NotFound { uuid: uuid.to_string() });
		}
		Ok(self.project_dir(project)?.join(format!("{}.json", uuid)))
	}
}

#[async_trait]
impl RemoteStore for FolderRemoteStore {
	async fn list_files(&self, project: &ProjectRef) -> ProviderResult<Vec<RemoteEntry>> {
		let dir = self.project_dir(project)?;
		let mut read_dir = match tokio::fs::read_dir(&dir).await {
			Ok(rd) => rd,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
			Err(e) => return Err(e.into()),
		};

		let mut entries = Vec::new();
		while let Some(item) = read_dir.next_entry().await? {
			let path = item.path();
			if path.extension().map(|ext| ext != "json").unwrap_or(true) {
				continue;
			}
			let raw = tokio::fs::read_to_string(&path).await?;
			match serde_json::from_str::<RemoteEntry>(&raw) {
				Ok(entry) => entries.push(entry),
				Err(e) => warn!("Skipping unreadable document {}: {}", path.display(), e),
			}
		}

		entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
		Ok(entries)
	}

	async fn upload_file(
		&self,
		project: &ProjectRef,
		file_name: &str,
		content: &str,
	) -> ProviderResult<RemoteEntry> {
		let dir = self.project_dir(project)?;
		tokio::fs::create_dir_all(&dir).await?;

		let entry = RemoteEntry {
			uuid: uuid::Uuid::new_v4().to_string(),
			file_name: file_name.to_string(),
			content: content.to_string(),
			created_at: Utc::now(),
		};
		let json = serde_json::to_string_pretty(&entry).map_err(|e| {
			ProviderError::RequestFailed { operation: "upload_file", message: e.to_string() }
		})?;
		tokio::fs::write(dir.join(format!("{}.json", entry.uuid)), json).await?;
		Ok(entry)
	}

	async fn delete_file(&self, project: &ProjectRef, uuid: &str) -> ProviderResult<()> {
		let path = self.document_path(project, uuid)?;
		match tokio::fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				Err(ProviderError::NotFound { uuid: uuid.to_string() })
			}
			Err(e) => Err(e.into()),
		}
	}
}


// vim: ts=4
