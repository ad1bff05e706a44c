//! Config files are loaded from the project's metadata directory and merged
//! with the environment before being validated into engine settings

use std::fs;

use claudesync::{AutoCrlf, Config, SyncError, SyncMode};
use tempfile::TempDir;

#[test]
fn test_json_config_in_metadata_dir() {
	let temp = TempDir::new().expect("Failed to create temp dir");
	let meta = temp.path().join(".claudesync");
	fs::create_dir_all(&meta).unwrap();
	fs::write(
		meta.join("config.json"),
		r#"{
			"organizationId": "org-1",
			"projectId": "proj-1",
			"uploadDelay": 0.25,
			"autocrlf": "input",
			"pruneRemoteFiles": false,
			"twoWaySync": true,
			"excludePatterns": ["*.log"]
		}"#,
	)
	.unwrap();

	let config = Config::load_for_root(temp.path()).expect("Failed to load config");
	assert_eq!(config.local_path.as_deref(), Some(temp.path()));
	assert_eq!(config.autocrlf, AutoCrlf::Input);
	assert_eq!(config.exclude_patterns, vec!["*.log"]);
	// Unset keys keep their defaults
	assert_eq!(config.max_file_size, 32 * 1024);

	let settings = config.settings().expect("Config should validate");
	assert_eq!(settings.project.project_id, "proj-1");
	assert_eq!(settings.mode, SyncMode::TwoWay);
	assert!(!settings.prune);
	assert_eq!(settings.upload_delay.as_millis(), 250);
}

#[test]
fn test_toml_config_file() {
	let temp = TempDir::new().unwrap();
	let path = temp.path().join("claudesync.toml");
	fs::write(
		&path,
		r#"
organizationId = "org-toml"
projectId = "proj-toml"
autocrlf = "false"
logLevel = "debug"
"#,
	)
	.unwrap();

	let config = Config::load_file(&path).unwrap();
	assert_eq!(config.organization_id.as_deref(), Some("org-toml"));
	assert_eq!(config.autocrlf, AutoCrlf::False);
	assert_eq!(config.log_level, "debug");
	assert!(config.prune_remote_files);
}

#[test]
fn test_missing_config_uses_defaults() {
	let temp = TempDir::new().unwrap();
	let config = Config::load_for_root(temp.path()).unwrap();
	assert_eq!(config.mode(), SyncMode::OneWay);
	assert!(matches!(config.settings(), Err(SyncError::Configuration { .. })));
}

#[test]
fn test_invalid_config_file() {
	let temp = TempDir::new().unwrap();
	let path = temp.path().join("config.json");
	fs::write(&path, "{ not json").unwrap();
	let err = Config::load_file(&path).unwrap_err();
	assert!(matches!(err, SyncError::Configuration { .. }));
}

#[test]
fn test_environment_overrides_file() {
	let temp = TempDir::new().unwrap();
	let meta = temp.path().join(".claudesync");
	fs::create_dir_all(&meta).unwrap();
	fs::write(meta.join("config.json"), r#"{"organizationId": "from-file", "projectId": "p"}"#).unwrap();

	let mut config = Config::load_for_root(temp.path()).unwrap();
	config
		.apply_env_from(|key| match key {
			"CLAUDESYNC_ORGANIZATION_ID" => Some("from-env".to_string()),
			"CLAUDESYNC_PRUNE" => Some("false".to_string()),
			_ => None,
		})
		.unwrap();

	assert_eq!(config.organization_id.as_deref(), Some("from-env"));
	assert_eq!(config.project_id.as_deref(), Some("p"));
	assert!(!config.prune_remote_files);
}

#[test]
fn test_local_path_must_be_a_directory() {
	let temp = TempDir::new().unwrap();
	let file = temp.path().join("not-a-dir");
	fs::write(&file, "x").unwrap();

	let config = Config {
		organization_id: Some("o".to_string()),
		project_id: Some("p".to_string()),
		local_path: Some(file),
		..Config::default()
	};
	assert!(matches!(config.settings(), Err(SyncError::Configuration { .. })));
}

// vim: ts=4
