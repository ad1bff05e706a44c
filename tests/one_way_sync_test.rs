//! One-way mirroring against the in-memory store
//!
//! The local tree is authoritative: new files are uploaded, changed files are
//! replaced (new copy first), and remote-only documents are pruned on request.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use claudesync::remote::RemoteOp;
use claudesync::{
	AutoCrlf, CallbackBuilder, ContentNormalizer, LocalFileCatalog, MemoryRemoteStore,
	OneWaySyncEngine, ProjectRef, ProviderError, RemoteStore, SyncError, SyncReport, SyncSettings,
	WalkCatalog,
};
use tempfile::TempDir;

fn project() -> ProjectRef {
	ProjectRef::new("org-1", "project-1")
}

fn settings(root: &Path, prune: bool) -> SyncSettings {
	let mut settings = SyncSettings::new(project(), root);
	settings.prune = prune;
	settings
}

async fn run(engine: OneWaySyncEngine, root: &Path, store: &MemoryRemoteStore) -> Result<SyncReport, SyncError> {
	let catalog = WalkCatalog::new(ContentNormalizer::new(AutoCrlf::True));
	let local = catalog.eligible_files(root).await?;
	let remote = store.list_files(&project()).await?;
	engine.sync(&local, &remote).await
}

async fn sync_once(root: &Path, store: &Arc<MemoryRemoteStore>, prune: bool) -> SyncReport {
	let engine = OneWaySyncEngine::new(store.clone(), settings(root, prune));
	run(engine, root, store).await.unwrap()
}

// ============================================================================
// Part 1: Upload and compare
// ============================================================================

#[tokio::test]
async fn test_new_file_is_uploaded_once_with_marker() {
	let temp = TempDir::new().unwrap();
	fs::write(temp.path().join("a.txt"), "hello\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());

	let report = sync_once(temp.path(), &store, false).await;

	assert_eq!(report.uploaded, 1);
	assert_eq!(store.mutations(), vec![RemoteOp::Upload { file_name: "a.txt".to_string() }]);
	assert_eq!(store.get("a.txt").unwrap().content, "// CLAUDESYNC_PATH: a.txt\nhello\n");
}

#[tokio::test]
async fn test_matching_remote_is_left_alone() {
	let temp = TempDir::new().unwrap();
	fs::write(temp.path().join("a.txt"), "hello\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());
	store.insert("a.txt", "// CLAUDESYNC_PATH: a.txt\nhello\n", Utc::now());

	let report = sync_once(temp.path(), &store, true).await;

	assert_eq!(report.unchanged, 1);
	assert!(store.mutations().is_empty());
}

#[tokio::test]
async fn test_line_endings_do_not_count_as_changes() {
	let temp = TempDir::new().unwrap();
	fs::write(temp.path().join("a.txt"), "one\r\ntwo\r\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());
	store.insert("a.txt", "// CLAUDESYNC_PATH: a.txt\none\ntwo\n", Utc::now());

	let report = sync_once(temp.path(), &store, false).await;

	assert!(report.is_noop());
	assert!(store.mutations().is_empty());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
	let temp = TempDir::new().unwrap();
	fs::create_dir_all(temp.path().join("src")).unwrap();
	fs::write(temp.path().join("a.txt"), "alpha\r\n").unwrap();
	fs::write(temp.path().join("src/lib.rs"), "pub fn f() {}\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());

	let first = sync_once(temp.path(), &store, true).await;
	assert_eq!(first.uploaded, 2);

	store.clear_ops();
	let second = sync_once(temp.path(), &store, true).await;
	assert!(second.is_noop());
	assert_eq!(second.unchanged, 2);
	assert!(store.mutations().is_empty());
}

// ============================================================================
// Part 2: Replace and prune
// ============================================================================

#[tokio::test]
async fn test_changed_file_uploads_new_copy_before_deleting_old() {
	let temp = TempDir::new().unwrap();
	fs::write(temp.path().join("a.txt"), "new body\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());
	let old = store.insert("a.txt", "// CLAUDESYNC_PATH: a.txt\nold body\n", Utc::now());

	let report = sync_once(temp.path(), &store, false).await;

	assert_eq!(report.replaced, 1);
	assert_eq!(report.remote_mutations(), 2);
	assert_eq!(
		store.mutations(),
		vec![
			RemoteOp::Upload { file_name: "a.txt".to_string() },
			RemoteOp::Delete { uuid: old.uuid.clone(), file_name: "a.txt".to_string() },
		]
	);

	let files = store.files();
	assert_eq!(files.len(), 1);
	assert_ne!(files[0].uuid, old.uuid);
	assert_eq!(files[0].content, "// CLAUDESYNC_PATH: a.txt\nnew body\n");
}

#[tokio::test]
async fn test_prune_removes_remote_only_documents() {
	let temp = TempDir::new().unwrap();
	fs::write(temp.path().join("keep.txt"), "keep\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());
	store.insert("keep.txt", "// CLAUDESYNC_PATH: keep.txt\nkeep\n", Utc::now());
	let orphan = store.insert("orphan.txt", "// CLAUDESYNC_PATH: orphan.txt\nbye\n", Utc::now());

	let report = sync_once(temp.path(), &store, true).await;

	assert_eq!(report.deleted_remote, 1);
	assert_eq!(
		store.mutations(),
		vec![RemoteOp::Delete { uuid: orphan.uuid, file_name: "orphan.txt".to_string() }]
	);
	assert!(store.get("orphan.txt").is_none());
}

#[tokio::test]
async fn test_without_prune_remote_only_documents_survive() {
	let temp = TempDir::new().unwrap();
	let store = Arc::new(MemoryRemoteStore::new());
	store.insert("orphan.txt", "bye\n", Utc::now());

	let report = sync_once(temp.path(), &store, false).await;

	assert!(report.is_noop());
	assert!(store.get("orphan.txt").is_some());
}

#[tokio::test]
async fn test_one_way_never_writes_locally() {
	let temp = TempDir::new().unwrap();
	let store = Arc::new(MemoryRemoteStore::new());
	store.insert("remote.txt", "// CLAUDESYNC_PATH: remote.txt\nremote\n", Utc::now());

	sync_once(temp.path(), &store, false).await;

	assert!(!temp.path().join("remote.txt").exists());
}

// ============================================================================
// Part 3: Failures and throttling
// ============================================================================

#[tokio::test]
async fn test_upload_failure_propagates_and_is_reported() {
	let temp = TempDir::new().unwrap();
	fs::write(temp.path().join("a.txt"), "a\n").unwrap();
	fs::write(temp.path().join("b.txt"), "b\n").unwrap();
	fs::write(temp.path().join("c.txt"), "c\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());
	store.fail_uploads_of("b.txt");

	let failed = Arc::new(Mutex::new(Vec::new()));
	let seen = Arc::clone(&failed);
	let callbacks = CallbackBuilder::new()
		.on_error(move |path, _| seen.lock().unwrap().push(path.to_string()))
		.build();

	let engine = OneWaySyncEngine::new(store.clone(), settings(temp.path(), true))
		.with_callbacks(Arc::from(callbacks));
	let err = run(engine, temp.path(), &store).await.unwrap_err();

	assert!(matches!(err, SyncError::Provider(ProviderError::RequestFailed { .. })));
	assert_eq!(*failed.lock().unwrap(), vec!["b.txt"]);
	// Files are handled in order and nothing runs after the failure
	assert!(store.get("a.txt").is_some());
	assert!(store.get("c.txt").is_none());
}

#[tokio::test]
async fn test_delay_between_remote_operations() {
	let temp = TempDir::new().unwrap();
	fs::write(temp.path().join("a.txt"), "a\n").unwrap();
	fs::write(temp.path().join("b.txt"), "b\n").unwrap();
	let store = Arc::new(MemoryRemoteStore::new());

	let mut settings = settings(temp.path(), false);
	settings.upload_delay = Duration::from_millis(60);
	let engine = OneWaySyncEngine::new(store.clone(), settings);

	let start = Instant::now();
	let report = run(engine, temp.path(), &store).await.unwrap();

	assert_eq!(report.uploaded, 2);
	assert!(start.elapsed() >= Duration::from_millis(120));
}

// vim: ts=4
