use std::collections::BTreeMap;

use crate::strategies::SyncMode;

/// Eligible local files: relative path → fingerprint
pub type LocalFiles = BTreeMap<String, String>;

/// Counters describing what a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
	pub mode: SyncMode,
	pub uploaded: usize,
	pub replaced: usize,
	pub downloaded: usize,
	pub deleted_remote: usize,
	pub deleted_local: usize,
	pub conflicts: usize,
	pub unchanged: usize,
}

impl SyncReport {
	pub fn new(mode: SyncMode) -> Self {
		SyncReport { mode, ..Default::default() }
	}

	/// Number of remote create/delete calls the run issued
	pub fn remote_mutations(&self) -> usize {
		self.uploaded + self.replaced * 2 + self.deleted_remote
	}

	pub fn is_noop(&self) -> bool {
		self.uploaded == 0
			&& self.replaced == 0
			&& self.downloaded == 0
			&& self.deleted_remote == 0
			&& self.deleted_local == 0
	}
}

impl std::fmt::Display for SyncReport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} sync: {} uploaded, {} replaced, {} downloaded, {} deleted remotely, {} deleted locally, {} conflicts, {} unchanged",
			self.mode,
			self.uploaded,
			self.replaced,
			self.downloaded,
			self.deleted_remote,
			self.deleted_local,
			self.conflicts,
			self.unchanged
		)
	}
}


// vim: ts=4
