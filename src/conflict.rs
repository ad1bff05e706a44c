//! Conflict detection and resolution

use chrono::{DateTime, Utc};

/// How a file changed on one side since the last snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
	/// Not in the snapshot
	New,

	/// Checksum differs from the snapshot
	Modified,

	/// In the snapshot but gone now
	Deleted,
}

impl std::fmt::Display for ChangeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ChangeKind::New => write!(f, "new"),
			ChangeKind::Modified => write!(f, "modified"),
			ChangeKind::Deleted => write!(f, "deleted"),
		}
	}
}

/// Types of conflicts that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictType {
	/// File changed on both sides
	ModifyModify,

	/// File created on both sides independently
	CreateCreate,

	/// Deleted locally, changed remotely
	DeleteModify,

	/// Changed locally, deleted remotely
	ModifyDelete,
}

impl ConflictType {
	pub fn classify(local: ChangeKind, remote: ChangeKind) -> Self {
		match (local, remote) {
			(ChangeKind::New, ChangeKind::New) => ConflictType::CreateCreate,
			(ChangeKind::Deleted, _) => ConflictType::DeleteModify,
			(_, ChangeKind::Deleted) => ConflictType::ModifyDelete,
			_ => ConflictType::ModifyModify,
		}
	}
}

/// Side whose version survives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	Local,
	Remote,
}

/// A file changed on both sides since the last sync
#[derive(Debug, Clone)]
pub struct Conflict {
	/// Relative path of the file
	pub path: String,

	/// Type of conflict
	pub conflict_type: ConflictType,

	pub local: ChangeKind,
	pub remote: ChangeKind,

	/// Filesystem mtime; None when the local file is gone
	pub local_mtime: Option<DateTime<Utc>>,

	/// Remote creation time; None when the remote document is gone
	pub remote_created_at: Option<DateTime<Utc>>,
}

impl Conflict {
	pub fn new(
		path: impl Into<String>,
		local: ChangeKind,
		remote: ChangeKind,
		local_mtime: Option<DateTime<Utc>>,
		remote_created_at: Option<DateTime<Utc>>,
	) -> Self {
		Conflict {
			path: path.into(),
			conflict_type: ConflictType::classify(local, remote),
			local,
			remote,
			local_mtime,
			remote_created_at,
		}
	}

	/// Pick the surviving side
	///
	/// A side that no longer has the file loses to one that does. Otherwise
	/// the local copy wins only when it is strictly newer than the remote
	/// document; ties go to the remote.
	pub fn winner(&self) -> Side {
		match (self.local_mtime, self.remote_created_at) {
			(Some(local), Some(remote)) if local > remote => Side::Local,
			(Some(_), None) => Side::Local,
			_ => Side::Remote,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn at(secs: i64) -> Option<DateTime<Utc>> {
		Some(Utc.timestamp_opt(secs, 0).unwrap())
	}

	#[test]
	fn test_classify() {
		use ChangeKind::*;
		assert_eq!(ConflictType::classify(New, New), ConflictType::CreateCreate);
		assert_eq!(ConflictType::classify(Modified, Modified), ConflictType::ModifyModify);
		assert_eq!(ConflictType::classify(New, Modified), ConflictType::ModifyModify);
		assert_eq!(ConflictType::classify(Deleted, Modified), ConflictType::DeleteModify);
		assert_eq!(ConflictType::classify(Deleted, New), ConflictType::DeleteModify);
		assert_eq!(ConflictType::classify(Modified, Deleted), ConflictType::ModifyDelete);
	}

	#[test]
	fn test_newer_local_wins() {
		let c = Conflict::new("a.txt", ChangeKind::Modified, ChangeKind::Modified, at(200), at(100));
		assert_eq!(c.winner(), Side::Local);
	}

	#[test]
	fn test_tie_goes_to_remote() {
		let c = Conflict::new("a.txt", ChangeKind::New, ChangeKind::New, at(100), at(100));
		assert_eq!(c.winner(), Side::Remote);
	}

	#[test]
	fn test_missing_side_loses() {
		let deleted_locally =
			Conflict::new("a.txt", ChangeKind::Deleted, ChangeKind::Modified, None, at(1));
		assert_eq!(deleted_locally.winner(), Side::Remote);

		let deleted_remotely =
			Conflict::new("a.txt", ChangeKind::Modified, ChangeKind::Deleted, at(1), None);
		assert_eq!(deleted_remotely.winner(), Side::Local);
	}
}

// vim: ts=4
