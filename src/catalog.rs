//! Enumerate the local files eligible for sync
//!
//! `WalkCatalog` honors `.gitignore` and `.claudeignore` the way ripgrep does
//! (through the `ignore` crate) and layers configured glob exclusions, a size
//! cap and a UTF-8 check on top.

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Config, METADATA_DIR};
use crate::error::SyncError;
use crate::logging::*;
use crate::normalize::{self, ContentNormalizer};
use crate::types::LocalFiles;
use crate::util;

/// Per-project ignore file, gitignore syntax
pub const CLAUDE_IGNORE: &str = ".claudeignore";

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &[".git", METADATA_DIR];

/// Source of the local half of a run
#[async_trait]
pub trait LocalFileCatalog: Send + Sync {
	/// Map every eligible file below `root` to its fingerprint
	async fn eligible_files(&self, root: &Path) -> Result<LocalFiles, SyncError>;
}

/// Catalog backed by a directory walk
#[derive(Debug, Clone)]
pub struct WalkCatalog {
	normalizer: ContentNormalizer,

	/// Files larger than this are skipped; 0 disables the cap
	max_file_size: u64,

	exclude: GlobSet,
}

impl WalkCatalog {
	pub fn new(normalizer: ContentNormalizer) -> Self {
		WalkCatalog { normalizer, max_file_size: 0, exclude: GlobSet::empty() }
	}

	pub fn from_config(config: &Config) -> Result<Self, SyncError> {
		WalkCatalog::new(ContentNormalizer::new(config.autocrlf))
			.with_max_file_size(config.max_file_size)
			.with_exclude_patterns(&config.exclude_patterns)
	}

	pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
		self.max_file_size = max_file_size;
		self
	}

	/// Exclude relative paths matching any of the glob patterns
	pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self, SyncError> {
		let mut builder = GlobSetBuilder::new();
		for pattern in patterns {
			let glob = Glob::new(pattern).map_err(|e| {
				SyncError::config(format!("Invalid exclude pattern {}: {}", pattern, e))
			})?;
			builder.add(glob);
		}
		self.exclude = builder
			.build()
			.map_err(|e| SyncError::config(format!("Failed to build exclude patterns: {}", e)))?;
		Ok(self)
	}

	/// Walk `root` on the calling thread
	pub fn walk(&self, root: &Path) -> Result<LocalFiles, SyncError> {
		let mut files = LocalFiles::new();

		let walker = WalkBuilder::new(root)
			.hidden(false)
			.parents(false)
			.git_global(false)
			.git_exclude(false)
			.require_git(false)
			.add_custom_ignore_filename(CLAUDE_IGNORE)
			.filter_entry(|entry| {
				entry.depth() == 0
					|| entry.file_name().to_str().map_or(true, |name| !SKIPPED_DIRS.contains(&name))
			})
			.build();

		for result in walker {
			let entry = match result {
				Ok(entry) => entry,
				Err(e) => {
					warn!("Skipping unreadable entry: {}", e);
					continue;
				}
			};
			if !entry.file_type().map_or(false, |t| t.is_file()) {
				continue;
			}

			let relative = match util::relative_name(root, entry.path()) {
				Some(relative) => relative,
				None => {
					warn!("Skipping {}: path is not valid UTF-8", entry.path().display());
					continue;
				}
			};
			if self.exclude.is_match(&relative) {
				debug!("Excluded by pattern: {}", relative);
				continue;
			}

			if self.max_file_size > 0 {
				let len = entry.metadata().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?.len();
				if len > self.max_file_size {
					debug!("Skipping {}: {} bytes exceeds limit of {}", relative, len, self.max_file_size);
					continue;
				}
			}

			let content = match normalize::decode(std::fs::read(entry.path())?, &relative) {
				Ok(content) => content,
				Err(SyncError::Decode { .. }) => {
					debug!("Skipping {}: not UTF-8 text", relative);
					continue;
				}
				Err(e) => return Err(e),
			};

			files.insert(relative, self.normalizer.local_fingerprint(&content));
		}

		debug!("Found {} eligible files under {}", files.len(), root.display());
		Ok(files)
	}
}

#[async_trait]
impl LocalFileCatalog for WalkCatalog {
	async fn eligible_files(&self, root: &Path) -> Result<LocalFiles, SyncError> {
		let catalog = self.clone();
		let root: PathBuf = root.to_path_buf();
		tokio::task::spawn_blocking(move || catalog.walk(&root))
			.await
			.map_err(|e| SyncError::Io(io::Error::new(io::ErrorKind::Other, e)))?
	}
}


// vim: ts=4
