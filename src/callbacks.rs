//! Callback traits for progress reporting and event handling
//!
//! Engines report what they attempt through `SyncCallbacks` and never print
//! anything themselves.

use crate::conflict::Conflict;
use crate::error::SyncError;

// Type aliases to reduce complexity
type FileFn = dyn Fn(&str, FileAction) + Send + Sync;
type ErrorFn = dyn Fn(&str, &SyncError) + Send + Sync;
type ConflictFn = dyn Fn(&Conflict) + Send + Sync;

/// What an engine is doing to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
	/// Create a new remote document
	Upload,

	/// Replace an existing remote document (upload new, delete old)
	Replace,

	/// Write the remote document to the local tree
	Download,

	/// Delete the remote document
	DeleteRemote,

	/// Delete the local file
	DeleteLocal,

	/// Both sides already agree; only the snapshot changes
	Record,

	/// Drop the snapshot entry of a file gone from both sides
	Forget,
}

impl std::fmt::Display for FileAction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			FileAction::Upload => "upload",
			FileAction::Replace => "replace",
			FileAction::Download => "download",
			FileAction::DeleteRemote => "delete remote",
			FileAction::DeleteLocal => "delete local",
			FileAction::Record => "record",
			FileAction::Forget => "forget",
		};
		f.pad(s)
	}
}

/// Combined callback handler for all events
pub trait SyncCallbacks: Send + Sync {
	/// Called before an action is attempted on a file
	fn on_file_start(&self, _path: &str, _action: FileAction) {}

	/// Called after an action completed
	fn on_file_done(&self, _path: &str, _action: FileAction) {}

	/// Called when an action failed, right before the error propagates
	fn on_error(&self, _path: &str, _error: &SyncError) {}

	/// Called when both sides changed and a winner was picked
	fn on_conflict(&self, _conflict: &Conflict) {}
}

/// Default callback implementation that does nothing
pub struct NoCallbacks;

impl SyncCallbacks for NoCallbacks {}

/// Builder for callbacks using function closures
#[derive(Default)]
pub struct CallbackBuilder {
	file_start: Option<Box<FileFn>>,
	file_done: Option<Box<FileFn>>,
	error: Option<Box<ErrorFn>>,
	conflict: Option<Box<ConflictFn>>,
}

impl CallbackBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn on_file_start<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, FileAction) + Send + Sync + 'static,
	{
		self.file_start = Some(Box::new(callback));
		self
	}

	pub fn on_file_done<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, FileAction) + Send + Sync + 'static,
	{
		self.file_done = Some(Box::new(callback));
		self
	}

	pub fn on_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, &SyncError) + Send + Sync + 'static,
	{
		self.error = Some(Box::new(callback));
		self
	}

	pub fn on_conflict<F>(mut self, callback: F) -> Self
	where
		F: Fn(&Conflict) + Send + Sync + 'static,
	{
		self.conflict = Some(Box::new(callback));
		self
	}

	/// Build the callbacks handler
	pub fn build(self) -> Box<dyn SyncCallbacks> {
		Box::new(CompositeCallbacks {
			file_start: self.file_start,
			file_done: self.file_done,
			error: self.error,
			conflict: self.conflict,
		})
	}
}

/// Internal composite callbacks implementation
struct CompositeCallbacks {
	file_start: Option<Box<FileFn>>,
	file_done: Option<Box<FileFn>>,
	error: Option<Box<ErrorFn>>,
	conflict: Option<Box<ConflictFn>>,
}

impl SyncCallbacks for CompositeCallbacks {
	fn on_file_start(&self, path: &str, action: FileAction) {
		if let Some(ref callback) = self.file_start {
			callback(path, action);
		}
	}

	fn on_file_done(&self, path: &str, action: FileAction) {
		if let Some(ref callback) = self.file_done {
			callback(path, action);
		}
	}

	fn on_error(&self, path: &str, error: &SyncError) {
		if let Some(ref callback) = self.error {
			callback(path, error);
		}
	}

	fn on_conflict(&self, conflict: &Conflict) {
		if let Some(ref callback) = self.conflict {
			callback(conflict);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{Arc, Mutex};

	#[test]
	fn test_builder_routes_events() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let start = Arc::clone(&seen);
		let done = Arc::clone(&seen);
		let callbacks = CallbackBuilder::new()
			.on_file_start(move |p, a| start.lock().unwrap().push(format!("start {} {}", a, p)))
			.on_file_done(move |p, a| done.lock().unwrap().push(format!("done {} {}", a, p)))
			.build();

		callbacks.on_file_start("a.txt", FileAction::Upload);
		callbacks.on_file_done("a.txt", FileAction::Upload);
		callbacks.on_error("a.txt", &SyncError::config("ignored"));

		assert_eq!(*seen.lock().unwrap(), vec!["start upload a.txt", "done upload a.txt"]);
	}

	#[test]
	fn test_no_callbacks_is_silent() {
		let callbacks = NoCallbacks;
		callbacks.on_file_start("a.txt", FileAction::DeleteLocal);
		callbacks.on_error("a.txt", &SyncError::config("x"));
	}
}

// vim: ts=4
