//! Entry point for a complete sync run
//!
//! A run validates the configuration, collects the local catalog, lists the
//! remote project and hands both to the engine matching the sync mode.

use std::path::PathBuf;
use std::sync::Arc;

use crate::callbacks::{NoCallbacks, SyncCallbacks};
use crate::catalog::{LocalFileCatalog, WalkCatalog};
use crate::config::Config;
use crate::error::SyncError;
use crate::logging::*;
use crate::normalize::ContentNormalizer;
use crate::one_way::OneWaySyncEngine;
use crate::remote::RemoteStore;
use crate::strategies::{AutoCrlf, SyncMode};
use crate::two_way::TwoWaySyncEngine;
use crate::types::SyncReport;

/// Builder for configuring and running a sync
pub struct SyncBuilder {
	config: Config,
	store: Option<Arc<dyn RemoteStore>>,
	catalog: Option<Arc<dyn LocalFileCatalog>>,
	callbacks: Arc<dyn SyncCallbacks>,
	crlf_platform: Option<bool>,
}

impl SyncBuilder {
	pub fn new() -> Self {
		Self::from_config(Config::default())
	}

	pub fn from_config(config: Config) -> Self {
		SyncBuilder {
			config,
			store: None,
			catalog: None,
			callbacks: Arc::new(NoCallbacks),
			crlf_platform: None,
		}
	}

	pub fn local_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.config.local_path = Some(path.into());
		self
	}

	pub fn project(mut self, organization_id: impl Into<String>, project_id: impl Into<String>) -> Self {
		self.config.organization_id = Some(organization_id.into());
		self.config.project_id = Some(project_id.into());
		self
	}

	pub fn mode(mut self, mode: SyncMode) -> Self {
		self.config.two_way_sync = mode == SyncMode::TwoWay;
		self
	}

	pub fn prune(mut self, prune: bool) -> Self {
		self.config.prune_remote_files = prune;
		self
	}

	/// Delay between remote mutations, in seconds
	pub fn upload_delay(mut self, seconds: f64) -> Self {
		self.config.upload_delay = seconds;
		self
	}

	pub fn autocrlf(mut self, autocrlf: AutoCrlf) -> Self {
		self.config.autocrlf = autocrlf;
		self
	}

	pub fn store(mut self, store: Arc<dyn RemoteStore>) -> Self {
		self.store = Some(store);
		self
	}

	/// Replace the default directory walk
	pub fn catalog(mut self, catalog: Arc<dyn LocalFileCatalog>) -> Self {
		self.catalog = Some(catalog);
		self
	}

	pub fn callbacks(mut self, callbacks: Arc<dyn SyncCallbacks>) -> Self {
		self.callbacks = callbacks;
		self
	}

	/// Override whether local files use CRLF line endings
	pub fn crlf_platform(mut self, crlf_platform: bool) -> Self {
		self.crlf_platform = Some(crlf_platform);
		self
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Run the sync
	pub async fn sync(self) -> Result<SyncReport, SyncError> {
		// Everything is validated before the first remote call
		let settings = self.config.settings()?;
		let store = self.store.ok_or_else(|| SyncError::config("No remote store configured"))?;

		let mut normalizer = ContentNormalizer::new(settings.autocrlf);
		if let Some(crlf_platform) = self.crlf_platform {
			normalizer = normalizer.with_crlf_platform(crlf_platform);
		}
		let catalog: Arc<dyn LocalFileCatalog> = match self.catalog {
			Some(catalog) => catalog,
			None => Arc::new(
				WalkCatalog::new(normalizer)
					.with_max_file_size(self.config.max_file_size)
					.with_exclude_patterns(&self.config.exclude_patterns)?,
			),
		};

		info!("Syncing {} with project {}", settings.local_root.display(), settings.project);
		let local = catalog.eligible_files(&settings.local_root).await?;
		let remote = store.list_files(&settings.project).await?;
		debug!("{} local files, {} remote documents", local.len(), remote.len());

		match settings.mode {
			SyncMode::OneWay => {
				OneWaySyncEngine::new(store, settings)
					.with_normalizer(normalizer)
					.with_callbacks(self.callbacks)
					.sync(&local, &remote)
					.await
			}
			SyncMode::TwoWay => {
				TwoWaySyncEngine::new(store, settings)
					.with_normalizer(normalizer)
					.with_callbacks(self.callbacks)
					.sync(&local, &remote)
					.await
			}
		}
	}
}

impl Default for SyncBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Run a sync with the given configuration and store
pub async fn sync(config: Config, store: Arc<dyn RemoteStore>) -> Result<SyncReport, SyncError> {
	SyncBuilder::from_config(config).store(store).sync().await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::remote::{MemoryRemoteStore, RemoteOp};
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_missing_project_fails_before_listing() {
		let temp = TempDir::new().unwrap();
		let store = Arc::new(MemoryRemoteStore::new());

		let err = SyncBuilder::new()
			.local_path(temp.path())
			.store(store.clone())
			.sync()
			.await
			.unwrap_err();

		assert!(matches!(err, SyncError::Configuration { .. }));
		assert!(store.ops().is_empty());
	}

	#[tokio::test]
	async fn test_missing_store_is_configuration_error() {
		let temp = TempDir::new().unwrap();
		let err = SyncBuilder::new()
			.local_path(temp.path())
			.project("org", "proj")
			.sync()
			.await
			.unwrap_err();
		assert!(matches!(err, SyncError::Configuration { .. }));
	}

	#[tokio::test]
	async fn test_builder_runs_one_way() {
		let temp = TempDir::new().unwrap();
		std::fs::write(temp.path().join("a.txt"), "hello\n").unwrap();
		let store = Arc::new(MemoryRemoteStore::new());

		let report = SyncBuilder::new()
			.local_path(temp.path())
			.project("org", "proj")
			.upload_delay(0.0)
			.store(store.clone())
			.sync()
			.await
			.unwrap();

		assert_eq!(report.uploaded, 1);
		assert_eq!(store.ops()[0], RemoteOp::List);
		assert_eq!(store.get("a.txt").unwrap().content, "// CLAUDESYNC_PATH: a.txt\nhello\n");
	}
}

// vim: ts=4
