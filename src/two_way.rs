//! Bidirectional reconciliation against the last snapshot
//!
//! Every file name seen locally, remotely or in the snapshot is classified
//! per side as new, modified, deleted or unchanged. The pair decides what
//! happens:
//!
//! | local       | remote      | action                              |
//! |-------------|-------------|-------------------------------------|
//! | deleted     | deleted     | forget the snapshot entry           |
//! | new/changed | unchanged   | upload (replace if a copy exists)   |
//! | unchanged   | new/changed | download                            |
//! | deleted     | unchanged   | delete the remote copy              |
//! | unchanged   | deleted     | delete the local file               |
//! | other pairs |             | conflict, newest side wins          |
//!
//! The snapshot is written once, after every file went through.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::callbacks::{FileAction, NoCallbacks, SyncCallbacks};
use crate::config::SyncSettings;
use crate::conflict::{ChangeKind, Conflict, Side};
use crate::error::{ProviderError, SyncError};
use crate::logging::*;
use crate::normalize::{extract_marker_path, remove_path_marker, ContentNormalizer};
use crate::rate_limit::RateLimiter;
use crate::remote::{index_by_name, RemoteEntry, RemoteStore};
use crate::state::{StateStore, SyncState, SyncStateEntry};
use crate::strategies::SyncMode;
use crate::types::{LocalFiles, SyncReport};
use crate::util;

/// Bookkeeping for one run
struct Pass {
	report: SyncReport,
	state: SyncState,

	/// Local files present after the steps so far
	local_after: BTreeSet<String>,

	/// Remote documents present after the steps so far: name → uuid
	remote_after: BTreeMap<String, String>,
}

impl Pass {
	fn settle(&mut self, path: &str, entry: SyncStateEntry) {
		if entry.is_absent_on_both_sides() {
			self.state.remove(path);
		} else {
			self.state.insert(path.to_string(), entry);
		}
	}
}

/// How one side changed relative to the recorded checksum
fn detect(current: Option<&String>, recorded: Option<&String>) -> Option<ChangeKind> {
	match (current, recorded) {
		(Some(_), None) => Some(ChangeKind::New),
		(Some(now), Some(then)) if now != then => Some(ChangeKind::Modified),
		(None, Some(_)) => Some(ChangeKind::Deleted),
		_ => None,
	}
}

/// Local path a remote document is written to
///
/// The marker path wins when it stays inside the root.
fn download_target(entry: &RemoteEntry) -> Result<String, SyncError> {
	if let Some(marked) = extract_marker_path(&entry.content) {
		if util::is_safe_relative(&marked) {
			return Ok(marked);
		}
		warn!("Ignoring unsafe marker path {:?} in {}", marked, entry.file_name);
	}
	named_target(entry)
}

/// Local path taken from the document name alone
fn named_target(entry: &RemoteEntry) -> Result<String, SyncError> {
	if util::is_safe_relative(&entry.file_name) {
		Ok(entry.file_name.clone())
	} else {
		Err(ProviderError::InvalidEntry {
			file_name: entry.file_name.clone(),
			message: "file name escapes the project root".to_string(),
		}
		.into())
	}
}

/// Reconciles both sides using the persisted snapshot
pub struct TwoWaySyncEngine {
	store: Arc<dyn RemoteStore>,
	settings: SyncSettings,
	normalizer: ContentNormalizer,
	limiter: RateLimiter,
	state_store: StateStore,
	callbacks: Arc<dyn SyncCallbacks>,
}

impl TwoWaySyncEngine {
	pub fn new(store: Arc<dyn RemoteStore>, settings: SyncSettings) -> Self {
		TwoWaySyncEngine {
			store,
			normalizer: ContentNormalizer::new(settings.autocrlf),
			limiter: RateLimiter::new(settings.upload_delay),
			state_store: StateStore::new(settings.state_path()),
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

	pub fn with_state_store(mut self, state_store: StateStore) -> Self {
		self.state_store = state_store;
		self
	}

	pub fn state_store(&self) -> &StateStore {
		&self.state_store
	}

	/// Reconcile `local` with the `remote` listing
	///
	/// On error the snapshot on disk is left untouched, so the next run sees
	/// the same baseline.
	pub async fn sync(
		&self,
		local: &LocalFiles,
		remote: &[RemoteEntry],
	) -> Result<SyncReport, SyncError> {
		let index = index_by_name(remote);
		let state = self.state_store.load().await?;

		let mut names: BTreeSet<String> = local.keys().cloned().collect();
		names.extend(index.keys().cloned());
		names.extend(state.keys().cloned());

		info!(
			"Two-way sync of {} local files and {} remote documents ({} in snapshot)",
			local.len(),
			index.len(),
			state.len()
		);

		let mut pass = Pass {
			report: SyncReport::new(SyncMode::TwoWay),
			state,
			local_after: local.keys().cloned().collect(),
			remote_after: index.iter().map(|(name, e)| (name.clone(), e.uuid.clone())).collect(),
		};

		// Leftovers of an interrupted replace are never the live copy
		for stale in remote.iter().filter(|r| index.get(&r.file_name).map_or(false, |live| live.uuid != r.uuid)) {
			if let Err(e) = self.delete_stale(stale, &mut pass).await {
				self.callbacks.on_error(&stale.file_name, &e);
				return Err(e);
			}
		}

		for name in &names {
			if let Err(e) = self.reconcile(name, local, &index, &mut pass).await {
				self.callbacks.on_error(name, &e);
				return Err(e);
			}
		}

		if self.settings.prune {
			self.prune(&mut pass).await?;
		}

		self.state_store.save(&pass.state).await?;
		info!("{}", pass.report);
		Ok(pass.report)
	}

	async fn reconcile(
		&self,
		path: &str,
		local: &LocalFiles,
		index: &BTreeMap<String, RemoteEntry>,
		pass: &mut Pass,
	) -> Result<(), SyncError> {
		let previous = pass.state.get(path).cloned();
		let local_fp = local.get(path);
		let remote = index.get(path);
		let remote_fp = remote.map(|e| self.normalizer.remote_fingerprint(&e.content, path));

		let local_change = detect(local_fp, previous.as_ref().and_then(|p| p.local_checksum.as_ref()));
		let remote_change =
			detect(remote_fp.as_ref(), previous.as_ref().and_then(|p| p.remote_checksum.as_ref()));
		debug!("{}: local {:?}, remote {:?}", path, local_change, remote_change);

		let entry = match (local_change, remote_change) {
			(None, None) if previous.as_ref().map_or(false, |p| p.is_absent_on_both_sides()) => {
				pass.state.remove(path);
				return Ok(());
			}

			(None, None) => {
				pass.report.unchanged += 1;
				// Same content, but the copy may have been re-created since
				if let (Some(entry), Some(remote)) = (pass.state.get_mut(path), remote) {
					if entry.remote_uuid.as_deref() != Some(remote.uuid.as_str()) {
						entry.remote_uuid = Some(remote.uuid.clone());
					}
				}
				return Ok(());
			}

			(Some(ChangeKind::Deleted), Some(ChangeKind::Deleted)) => {
				self.callbacks.on_file_start(path, FileAction::Forget);
				debug!("{} is gone from both sides", path);
				pass.state.remove(path);
				self.callbacks.on_file_done(path, FileAction::Forget);
				return Ok(());
			}

			(Some(ChangeKind::Deleted), None) => {
				// The listing uuid names the live copy even when the recorded one is stale
				if let Some(remote) = remote {
					self.delete_remote(path, &remote.uuid, pass).await?;
				}
				SyncStateEntry::observed(None, None, None)
			}

			(None, Some(ChangeKind::Deleted)) => {
				self.callbacks.on_file_start(path, FileAction::DeleteLocal);
				info!("Deleting local file {}", path);
				util::remove_file(&self.settings.local_root, path).await?;
				pass.local_after.remove(path);
				pass.report.deleted_local += 1;
				self.callbacks.on_file_done(path, FileAction::DeleteLocal);
				SyncStateEntry::observed(None, None, None)
			}

			(Some(_), None) => self.push(path, remote, pass).await?,

			(None, Some(_)) => match remote {
				Some(remote) => self.pull(path, remote, pass).await?,
				None => return Ok(()),
			},

			(Some(local_kind), Some(remote_kind)) => {
				self.resolve(path, local_kind, remote_kind, local_fp, remote, pass).await?
			}
		};

		pass.settle(path, entry);
		Ok(())
	}

	async fn resolve(
		&self,
		path: &str,
		local_kind: ChangeKind,
		remote_kind: ChangeKind,
		local_fp: Option<&String>,
		remote: Option<&RemoteEntry>,
		pass: &mut Pass,
	) -> Result<SyncStateEntry, SyncError> {
		if let (Some(local_fp), Some(remote)) = (local_fp, remote) {
			if *local_fp == self.normalizer.local_fingerprint(remove_path_marker(&remote.content)) {
				self.callbacks.on_file_start(path, FileAction::Record);
				debug!("{} changed identically on both sides", path);
				pass.report.unchanged += 1;
				self.callbacks.on_file_done(path, FileAction::Record);
				return Ok(SyncStateEntry::observed(
					Some(local_fp.clone()),
					Some(self.normalizer.remote_fingerprint(&remote.content, path)),
					Some(remote.uuid.clone()),
				));
			}
		}

		let local_mtime = match local_fp {
			Some(_) => util::modified_time(&self.settings.local_root, path).await?,
			None => None,
		};
		let conflict =
			Conflict::new(path, local_kind, remote_kind, local_mtime, remote.map(|e| e.created_at));
		let winner = conflict.winner();
		info!(
			"Conflict on {} ({:?}, local {}, remote {}): keeping {:?} version",
			path, conflict.conflict_type, local_kind, remote_kind, winner
		);
		self.callbacks.on_conflict(&conflict);
		pass.report.conflicts += 1;

		match (winner, remote) {
			(Side::Remote, Some(remote)) => self.pull(path, remote, pass).await,
			_ => self.push(path, remote, pass).await,
		}
	}

	/// Upload the local file, replacing `existing` if there is one
	async fn push(
		&self,
		path: &str,
		existing: Option<&RemoteEntry>,
		pass: &mut Pass,
	) -> Result<SyncStateEntry, SyncError> {
		let action = if existing.is_some() { FileAction::Replace } else { FileAction::Upload };
		self.callbacks.on_file_start(path, action);
		info!("Uploading {} to remote", path);

		let content = util::read_text(&self.settings.local_root, path).await?;
		let upload = self.normalizer.prepare_upload(&content, path);
		let created = self.store.upload_file(&self.settings.project, path, &upload).await?;
		self.limiter.wait().await;

		if let Some(old) = existing {
			self.store.delete_file(&self.settings.project, &old.uuid).await?;
			self.limiter.wait().await;
			pass.report.replaced += 1;
		} else {
			pass.report.uploaded += 1;
		}
		pass.remote_after.insert(path.to_string(), created.uuid.clone());
		self.callbacks.on_file_done(path, action);

		Ok(SyncStateEntry::observed(
			Some(self.normalizer.local_fingerprint(&content)),
			Some(self.normalizer.remote_fingerprint(&created.content, path)),
			Some(created.uuid),
		))
	}

	/// Write the remote document into the local tree
	async fn pull(
		&self,
		path: &str,
		entry: &RemoteEntry,
		pass: &mut Pass,
	) -> Result<SyncStateEntry, SyncError> {
		let mut target = download_target(entry)?;
		if target != path && util::modified_time(&self.settings.local_root, &target).await?.is_some() {
			warn!("{} is marked for existing local file {}, writing {} instead", path, target, entry.file_name);
			target = named_target(entry)?;
		}
		self.callbacks.on_file_start(&target, FileAction::Download);
		if target != path {
			info!("Downloading {} to {}", path, target);
		} else {
			info!("Downloading {}", path);
		}

		let content = self.normalizer.prepare_download(&entry.content);
		util::write_text(&self.settings.local_root, &target, &content).await?;
		pass.report.downloaded += 1;
		self.callbacks.on_file_done(&target, FileAction::Download);
		pass.local_after.insert(target);

		Ok(SyncStateEntry::observed(
			Some(self.normalizer.local_fingerprint(&content)),
			Some(self.normalizer.remote_fingerprint(&entry.content, path)),
			Some(entry.uuid.clone()),
		))
	}

	async fn delete_remote(&self, path: &str, uuid: &str, pass: &mut Pass) -> Result<(), SyncError> {
		self.callbacks.on_file_start(path, FileAction::DeleteRemote);
		info!("Deleting {} from remote", path);
		self.store.delete_file(&self.settings.project, uuid).await?;
		self.limiter.wait().await;
		pass.remote_after.remove(path);
		pass.report.deleted_remote += 1;
		self.callbacks.on_file_done(path, FileAction::DeleteRemote);
		Ok(())
	}

	/// Delete an older copy shadowed by the live document of the same name
	async fn delete_stale(&self, stale: &RemoteEntry, pass: &mut Pass) -> Result<(), SyncError> {
		let path = stale.file_name.as_str();
		self.callbacks.on_file_start(path, FileAction::DeleteRemote);
		warn!("Removing stale duplicate of {} ({})", path, stale.uuid);
		self.store.delete_file(&self.settings.project, &stale.uuid).await?;
		self.limiter.wait().await;
		pass.report.deleted_remote += 1;
		self.callbacks.on_file_done(path, FileAction::DeleteRemote);
		Ok(())
	}

	/// Delete remote documents that have no local counterpart after the run
	async fn prune(&self, pass: &mut Pass) -> Result<(), SyncError> {
		let orphans: Vec<(String, String)> = pass
			.remote_after
			.iter()
			.filter(|(name, _)| !pass.local_after.contains(*name))
			.map(|(name, uuid)| (name.clone(), uuid.clone()))
			.collect();

		for (name, uuid) in orphans {
			if let Err(e) = self.delete_remote(&name, &uuid, pass).await {
				self.callbacks.on_error(&name, &e);
				return Err(e);
			}
			pass.state.remove(&name);
		}
		Ok(())
	}
}


// vim: ts=4
