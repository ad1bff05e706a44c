//! Local file helpers shared by the engines
//!
//! Relative paths are always '/'-separated, whatever the platform.

use chrono::{DateTime, Utc};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs as afs;

use crate::error::SyncError;
use crate::normalize;

/// Check that a relative path stays inside the project root
pub fn is_safe_relative(relative_path: &str) -> bool {
	if relative_path.is_empty() || relative_path.contains('\0') {
		return false;
	}
	Path::new(relative_path).components().all(|c| matches!(c, Component::Normal(_)))
}

/// Join a '/'-separated relative path onto the root
pub fn local_path(root: &Path, relative_path: &str) -> PathBuf {
	relative_path.split('/').filter(|part| !part.is_empty()).fold(root.to_path_buf(), |p, part| p.join(part))
}

/// Convert a path below `root` to its '/'-separated relative form
pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
	let relative = path.strip_prefix(root).ok()?;
	let parts: Option<Vec<&str>> = relative
		.components()
		.map(|c| match c {
			Component::Normal(s) => s.to_str(),
			_ => None,
		})
		.collect();
	let parts = parts?;
	if parts.is_empty() {
		None
	} else {
		Some(parts.join("/"))
	}
}

/// Read a local file as UTF-8 text
pub async fn read_text(root: &Path, relative_path: &str) -> Result<String, SyncError> {
	let bytes = afs::read(local_path(root, relative_path)).await?;
	normalize::decode(bytes, relative_path)
}

/// Write a local file, creating parent directories as needed
pub async fn write_text(root: &Path, relative_path: &str, content: &str) -> Result<(), SyncError> {
	let path = local_path(root, relative_path);
	if let Some(parent) = path.parent() {
		afs::create_dir_all(parent).await?;
	}
	afs::write(&path, content).await?;
	Ok(())
}

/// Remove a local file; a file that is already gone is not an error
pub async fn remove_file(root: &Path, relative_path: &str) -> Result<bool, SyncError> {
	match afs::remove_file(local_path(root, relative_path)).await {
		Ok(()) => Ok(true),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
		Err(e) => Err(e.into()),
	}
}

/// Modification time of a local file, None when it does not exist
pub async fn modified_time(root: &Path, relative_path: &str) -> Result<Option<DateTime<Utc>>, SyncError> {
	match afs::metadata(local_path(root, relative_path)).await {
		Ok(meta) => Ok(Some(DateTime::<Utc>::from(meta.modified()?))),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e.into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_is_safe_relative() {
		assert!(is_safe_relative("file.txt"));
		assert!(is_safe_relative("dir/sub/file.txt"));
		assert!(!is_safe_relative("../file.txt"));
		assert!(!is_safe_relative("dir/../../file.txt"));
		assert!(!is_safe_relative("/etc/passwd"));
		assert!(!is_safe_relative("./file.txt"));
		assert!(!is_safe_relative(""));
	}

	#[test]
	fn test_local_path_and_relative_name() {
		let root = Path::new("/project");
		let path = local_path(root, "a/b/c.txt");
		assert_eq!(path, Path::new("/project").join("a").join("b").join("c.txt"));
		assert_eq!(relative_name(root, &path).as_deref(), Some("a/b/c.txt"));
		assert_eq!(relative_name(root, Path::new("/elsewhere/x")), None);
	}

	#[tokio::test]
	async fn test_write_read_remove() {
		let temp = TempDir::new().unwrap();
		write_text(temp.path(), "nested/dir/f.txt", "content").await.unwrap();
		assert_eq!(read_text(temp.path(), "nested/dir/f.txt").await.unwrap(), "content");
		assert!(modified_time(temp.path(), "nested/dir/f.txt").await.unwrap().is_some());

		assert!(remove_file(temp.path(), "nested/dir/f.txt").await.unwrap());
		assert!(!remove_file(temp.path(), "nested/dir/f.txt").await.unwrap());
		assert!(modified_time(temp.path(), "nested/dir/f.txt").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_read_binary_is_decode_error() {
		let temp = TempDir::new().unwrap();
		std::fs::write(temp.path().join("bin"), [0xc3, 0x28]).unwrap();
		assert!(matches!(read_text(temp.path(), "bin").await, Err(SyncError::Decode { .. })));
	}
}

// vim: ts=4
