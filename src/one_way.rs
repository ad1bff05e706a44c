//! One-way mirroring: the local tree is authoritative
//!
//! Every eligible local file ends up on the remote with marker-wrapped,
//! LF-normalized content. Remote documents are never written back locally.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::callbacks::{FileAction, NoCallbacks, SyncCallbacks};
use crate::config::SyncSettings;
use crate::error::SyncError;
use crate::logging::*;
use crate::normalize::{fingerprint, ContentNormalizer};
use crate::rate_limit::RateLimiter;
use crate::remote::{index_by_name, RemoteEntry, RemoteStore};
use crate::strategies::SyncMode;
use crate::types::{LocalFiles, SyncReport};
use crate::util;

/// Mirrors local files onto the remote project
pub struct OneWaySyncEngine {
	store: Arc<dyn RemoteStore>,
	settings: SyncSettings,
	normalizer: ContentNormalizer,
	limiter: RateLimiter,
	callbacks: Arc<dyn SyncCallbacks>,
}

impl OneWaySyncEngine {
	pub fn new(store: Arc<dyn RemoteStore>, settings: SyncSettings) -> Self {
		OneWaySyncEngine {
			store,
			normalizer: ContentNormalizer::new(settings.autocrlf),
			limiter: RateLimiter::new(settings.upload_delay),
			settings,
			callbacks: Arc::new(NoCallbacks),
		}
	}

	pub fn with_callbacks(mut self, callbacks: Arc<dyn SyncCallbacks>) -> Self {
		self.callbacks = callbacks;
		self
	}

	pub fn with_normalizer(mut self, normalizer: ContentNormalizer) -> Self {
		self.normalizer = normalizer;
		self
	}

	/// Bring the remote in line with `local`
	///
	/// `remote` is the listing taken at the start of the run. Files are
	/// handled one at a time; the first failure aborts the run.
	pub async fn sync(
		&self,
		local: &LocalFiles,
		remote: &[RemoteEntry],
	) -> Result<SyncReport, SyncError> {
		let mut report = SyncReport::new(SyncMode::OneWay);
		let index = index_by_name(remote);
		let mut to_delete: BTreeSet<&str> = index.keys().map(String::as_str).collect();

		info!("One-way sync of {} local files against {} remote documents", local.len(), index.len());

		for path in local.keys() {
			let existing = index.get(path);
			if let Err(e) = self.sync_file(path, existing, &mut report).await {
				self.callbacks.on_error(path, &e);
				return Err(e);
			}
			to_delete.remove(path.as_str());
		}

		// Leftovers of an interrupted replace are never the live copy
		for stale in remote.iter().filter(|r| index.get(&r.file_name).map(|live| live.uuid != r.uuid).unwrap_or(false)) {
			warn!("Removing stale duplicate of {} ({})", stale.file_name, stale.uuid);
			self.delete_remote(stale, &mut report).await?;
		}

		if self.settings.prune {
			for name in to_delete {
				if let Some(entry) = index.get(name) {
					self.delete_remote(entry, &mut report).await?;
				}
			}
		} else if !to_delete.is_empty() {
			debug!("Leaving {} remote-only documents in place (pruning disabled)", to_delete.len());
		}

		info!("{}", report);
		Ok(report)
	}

	async fn sync_file(
		&self,
		path: &str,
		existing: Option<&RemoteEntry>,
		report: &mut SyncReport,
	) -> Result<(), SyncError> {
		let content = util::read_text(&self.settings.local_root, path).await?;
		let upload = self.normalizer.prepare_upload(&content, path);

		match existing {
			Some(remote) => {
				let remote_fp = self.normalizer.remote_fingerprint(&remote.content, path);
				if remote_fp == fingerprint(&upload) {
					debug!("{} is up to date", path);
					report.unchanged += 1;
					return Ok(());
				}

				self.callbacks.on_file_start(path, FileAction::Replace);
				info!("Updating {} on remote", path);
				// New copy first, so an interruption never leaves zero copies
				self.store.upload_file(&self.settings.project, path, &upload).await?;
				self.limiter.wait().await;
				self.store.delete_file(&self.settings.project, &remote.uuid).await?;
				self.limiter.wait().await;
				report.replaced += 1;
				self.callbacks.on_file_done(path, FileAction::Replace);
			}
			None => {
				self.callbacks.on_file_start(path, FileAction::Upload);
				info!("Uploading new file {} to remote", path);
				self.store.upload_file(&self.settings.project, path, &upload).await?;
				self.limiter.wait().await;
				report.uploaded += 1;
				self.callbacks.on_file_done(path, FileAction::Upload);
			}
		}
		Ok(())
	}

	async fn delete_remote(&self, entry: &RemoteEntry, report: &mut SyncReport) -> Result<(), SyncError> {
		self.callbacks.on_file_start(&entry.file_name, FileAction::DeleteRemote);
		info!("Deleting {} from remote", entry.file_name);
		if let Err(e) = self.store.delete_file(&self.settings.project, &entry.uuid).await {
			let e = SyncError::from(e);
			self.callbacks.on_error(&entry.file_name, &e);
			return Err(e);
		}
		self.limiter.wait().await;
		report.deleted_remote += 1;
		self.callbacks.on_file_done(&entry.file_name, FileAction::DeleteRemote);
		Ok(())
	}
}


// vim: ts=4
