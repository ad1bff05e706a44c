//! # claudesync - keep a local tree and a remote document project in step
//!
//! Two policies are supported: one-way mirroring, where the local tree is
//! authoritative, and two-way reconciliation against a snapshot of the last
//! successful run. The remote side has no in-place update, so every change
//! is an upload of a new document followed by deletion of the old one.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use claudesync::{Config, FolderRemoteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_for_root("./project".as_ref())?;
//!     let store = Arc::new(FolderRemoteStore::new("./store"));
//!     let report = claudesync::sync::sync(config, store).await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Using the Builder Pattern
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use claudesync::{MemoryRemoteStore, SyncBuilder, SyncMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = SyncBuilder::new()
//!         .local_path("./project")
//!         .project("org-uuid", "project-uuid")
//!         .mode(SyncMode::TwoWay)
//!         .store(Arc::new(MemoryRemoteStore::new()))
//!         .sync()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod callbacks;
pub mod catalog;
pub mod config;
pub mod conflict;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod one_way;
pub mod rate_limit;
pub mod remote;
pub mod state;
pub mod strategies;
pub mod sync;
pub mod two_way;
pub mod types;
pub mod util;

// Re-export commonly used types and functions
pub use callbacks::{CallbackBuilder, FileAction, NoCallbacks, SyncCallbacks};
pub use catalog::{LocalFileCatalog, WalkCatalog};
pub use config::{Config, SyncSettings};
pub use error::{ProviderError, StateError, SyncError};
pub use normalize::{ContentNormalizer, Direction};
pub use one_way::OneWaySyncEngine;
pub use remote::{FolderRemoteStore, MemoryRemoteStore, ProjectRef, RemoteEntry, RemoteStore};
pub use state::{StateStore, SyncState, SyncStateEntry};
pub use strategies::{AutoCrlf, SyncMode};
pub use sync::SyncBuilder;
pub use two_way::TwoWaySyncEngine;
pub use types::{LocalFiles, SyncReport};

// vim: ts=4
