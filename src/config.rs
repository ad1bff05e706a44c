//! Configuration for claudesync runs
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (<root>/.claudesync/config.json, or any .toml/.json given explicitly)
//! 3. Environment variables (CLAUDESYNC_* prefix)
//! 4. CLI flags (highest priority)
//!
//! Engines never read a `Config` directly: `Config::settings()` validates it
//! into a `SyncSettings` value that is passed to their constructors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::SyncError;
use crate::remote::ProjectRef;
use crate::strategies::{AutoCrlf, SyncMode};

/// Project-local metadata directory
pub const METADATA_DIR: &str = ".claudesync";

/// Snapshot file name inside the metadata directory
pub const STATE_FILE: &str = "sync_state.json";

/// Config file name inside the metadata directory
pub const CONFIG_FILE: &str = "config.json";

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// User-facing configuration, as stored in config files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	/// Remote organization holding the project
	pub organization_id: Option<String>,

	/// Remote project the local tree is synced with
	pub project_id: Option<String>,

	/// Project root on the local filesystem
	pub local_path: Option<PathBuf>,

	/// Seconds to pause after each remote mutation (0 disables)
	pub upload_delay: f64,

	/// Line-ending policy
	pub autocrlf: AutoCrlf,

	/// Delete remote documents that have no local counterpart
	pub prune_remote_files: bool,

	/// Use the two-way engine instead of one-way mirroring
	pub two_way_sync: bool,

	/// Files larger than this (bytes) are not synced
	pub max_file_size: u64,

	/// Extra glob patterns excluded from sync
	pub exclude_patterns: Vec<String>,

	/// Log level (trace, debug, info, warn, error)
	pub log_level: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			organization_id: None,
			project_id: None,
			local_path: None,
			upload_delay: 0.5,
			autocrlf: AutoCrlf::True,
			prune_remote_files: true,
			two_way_sync: false,
			max_file_size: 32 * 1024,
			exclude_patterns: vec![],
			log_level: "info".to_string(),
		}
	}
}

impl Config {
	/// Load a config file; TOML when the extension says so, JSON otherwise
	pub fn load_file(path: &Path) -> Result<Config, SyncError> {
		let contents = std::fs::read_to_string(path).map_err(|e| {
			SyncError::config(format!("Cannot read config file {}: {}", path.display(), e))
		})?;

		let is_toml = path.extension().map(|ext| ext == "toml").unwrap_or(false);
		if is_toml {
			toml::from_str(&contents).map_err(|e| {
				SyncError::config(format!("Invalid config file {}: {}", path.display(), e))
			})
		} else {
			serde_json::from_str(&contents).map_err(|e| {
				SyncError::config(format!("Invalid config file {}: {}", path.display(), e))
			})
		}
	}

	/// Load `<root>/.claudesync/config.json` if present, defaults otherwise
	///
	/// `local_path` is filled in with `root` when the file leaves it unset.
	pub fn load_for_root(root: &Path) -> Result<Config, SyncError> {
		let path = root.join(METADATA_DIR).join(CONFIG_FILE);
		let mut config = if path.exists() { Config::load_file(&path)? } else { Config::default() };
		if config.local_path.is_none() {
			config.local_path = Some(root.to_path_buf());
		}
		Ok(config)
	}

	/// Apply CLAUDESYNC_* overrides from the process environment
	pub fn apply_env(&mut self) -> Result<(), SyncError> {
		self.apply_env_from(|key| std::env::var(key).ok())
	}

	/// Apply CLAUDESYNC_* overrides from an arbitrary lookup
	pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), SyncError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(v) = lookup("CLAUDESYNC_ORGANIZATION_ID") {
			self.organization_id = Some(v);
		}
		if let Some(v) = lookup("CLAUDESYNC_PROJECT_ID") {
			self.project_id = Some(v);
		}
		if let Some(v) = lookup("CLAUDESYNC_LOCAL_PATH") {
			self.local_path = Some(PathBuf::from(v));
		}
		if let Some(v) = lookup("CLAUDESYNC_UPLOAD_DELAY") {
			self.upload_delay = v.parse().map_err(|_| {
				SyncError::config(format!("CLAUDESYNC_UPLOAD_DELAY is not a number: {}", v))
			})?;
		}
		if let Some(v) = lookup("CLAUDESYNC_AUTOCRLF") {
			self.autocrlf = AutoCrlf::from_str(&v).map_err(SyncError::config)?;
		}
		if let Some(v) = lookup("CLAUDESYNC_PRUNE") {
			self.prune_remote_files = parse_bool("CLAUDESYNC_PRUNE", &v)?;
		}
		if let Some(v) = lookup("CLAUDESYNC_TWO_WAY") {
			self.two_way_sync = parse_bool("CLAUDESYNC_TWO_WAY", &v)?;
		}
		if let Some(v) = lookup("CLAUDESYNC_LOG_LEVEL") {
			self.log_level = v;
		}
		Ok(())
	}

	pub fn mode(&self) -> SyncMode {
		if self.two_way_sync {
			SyncMode::TwoWay
		} else {
			SyncMode::OneWay
		}
	}

	/// Validate into the settings the engines consume
	///
	/// Runs before any network call so a missing setting aborts immediately.
	pub fn settings(&self) -> Result<SyncSettings, SyncError> {
		let organization_id = non_empty(&self.organization_id).ok_or_else(|| {
			SyncError::config("No active organization set. Please select an organization.")
		})?;
		let project_id = non_empty(&self.project_id).ok_or_else(|| {
			SyncError::config("No active project set. Please select or create a project.")
		})?;
		let local_root = self.local_path.clone().ok_or_else(|| {
			SyncError::config(
				"No local path set. Please select or create a project to set the local path.",
			)
		})?;
		if !local_root.is_dir() {
			return Err(SyncError::config(format!(
				"Local path {} is not a directory",
				local_root.display()
			)));
		}
		if !self.upload_delay.is_finite() || self.upload_delay < 0.0 {
			return Err(SyncError::config(format!(
				"uploadDelay must be a non-negative number of seconds, got {}",
				self.upload_delay
			)));
		}

		Ok(SyncSettings {
			project: ProjectRef::new(organization_id, project_id),
			local_root,
			autocrlf: self.autocrlf,
			upload_delay: Duration::from_secs_f64(self.upload_delay),
			prune: self.prune_remote_files,
			mode: self.mode(),
		})
	}
}

/// Validated, explicit settings handed to the engines
#[derive(Debug, Clone)]
pub struct SyncSettings {
	pub project: ProjectRef,
	pub local_root: PathBuf,
	pub autocrlf: AutoCrlf,
	pub upload_delay: Duration,
	pub prune: bool,
	pub mode: SyncMode,
}

impl SyncSettings {
	/// Settings with no throttling and pruning disabled, mostly for embedding and tests
	pub fn new(project: ProjectRef, local_root: impl Into<PathBuf>) -> Self {
		SyncSettings {
			project,
			local_root: local_root.into(),
			autocrlf: AutoCrlf::default(),
			upload_delay: Duration::ZERO,
			prune: false,
			mode: SyncMode::OneWay,
		}
	}

	/// Location of the two-way snapshot for this project
	pub fn state_path(&self) -> PathBuf {
		self.local_root.join(METADATA_DIR).join(STATE_FILE)
	}
}

fn non_empty(value: &Option<String>) -> Option<String> {
	value.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()).map(String::from)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SyncError> {
	match value.to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(SyncError::config(format!("{} must be a boolean, got {}", key, value))),
	}
}


// vim: ts=4
