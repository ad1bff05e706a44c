//! Error types for claudesync operations

use std::error::Error;
use std::fmt;
use std::io;

/// Main error type for sync operations
#[derive(Debug)]
pub enum SyncError {
	/// Required settings are missing or invalid (raised before any network call)
	Configuration { message: String },

	/// Remote store failure (not retried here)
	Provider(ProviderError),

	/// Content is not valid UTF-8
	Decode { path: String, source: std::str::Utf8Error },

	/// Local read/write failure
	Io(io::Error),

	/// Snapshot error (nested)
	State(StateError),
}

impl SyncError {
	/// Shorthand for a configuration error
	pub fn config(message: impl Into<String>) -> Self {
		SyncError::Configuration { message: message.into() }
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::Configuration { message } => write!(f, "{}", message),
			SyncError::Provider(e) => write!(f, "Provider error: {}", e),
			SyncError::Decode { path, source } => {
				write!(f, "Cannot decode {} as UTF-8: {}", path, source)
			}
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
			SyncError::State(e) => write!(f, "State error: {}", e),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::Provider(e) => Some(e),
			SyncError::Decode { source, .. } => Some(source),
			SyncError::Io(e) => Some(e),
			SyncError::State(e) => Some(e),
			SyncError::Configuration { .. } => None,
		}
	}
}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

impl From<ProviderError> for SyncError {
	fn from(e: ProviderError) -> Self {
		SyncError::Provider(e)
	}
}

impl From<StateError> for SyncError {
	fn from(e: StateError) -> Self {
		SyncError::State(e)
	}
}

/// Remote store errors
#[derive(Debug)]
pub enum ProviderError {
	/// Request to the remote store failed
	RequestFailed { operation: &'static str, message: String },

	/// Document with the given uuid does not exist
	NotFound { uuid: String },

	/// Remote returned a document we cannot use
	InvalidEntry { file_name: String, message: String },

	/// Backing storage failure
	Io(io::Error),
}

impl fmt::Display for ProviderError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProviderError::RequestFailed { operation, message } => {
				write!(f, "{} failed: {}", operation, message)
			}
			ProviderError::NotFound { uuid } => write!(f, "Document {} not found", uuid),
			ProviderError::InvalidEntry { file_name, message } => {
				write!(f, "Invalid remote document {}: {}", file_name, message)
			}
			ProviderError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for ProviderError {}

impl From<io::Error> for ProviderError {
	fn from(e: io::Error) -> Self {
		ProviderError::Io(e)
	}
}

/// Snapshot persistence errors
#[derive(Debug)]
pub enum StateError {
	/// Failed to load state
	LoadFailed { source: Box<dyn Error + Send + Sync> },

	/// Failed to save state
	SaveFailed { source: Box<dyn Error + Send + Sync> },

	/// State file is corrupted
	Corrupted { message: String },
}

impl fmt::Display for StateError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StateError::LoadFailed { source } => write!(f, "Failed to load state: {}", source),
			StateError::SaveFailed { source } => write!(f, "Failed to save state: {}", source),
			StateError::Corrupted { message } => write!(f, "State corrupted: {}", message),
		}
	}
}

impl Error for StateError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_configuration_error_is_verbatim() {
		let err = SyncError::config("No active project found");
		assert_eq!(err.to_string(), "No active project found");
	}

	#[test]
	fn test_provider_error_conversion() {
		let err: SyncError = ProviderError::NotFound { uuid: "abc".to_string() }.into();
		assert!(matches!(err, SyncError::Provider(ProviderError::NotFound { .. })));
		assert!(err.to_string().contains("abc"));
	}

	#[test]
	fn test_io_error_has_source() {
		let err: SyncError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
		assert!(err.source().is_some());
	}
}

// vim: ts=4
