//! Content canonicalization, path markers and fingerprints
//!
//! Remote documents live in a flat name→content map, so every uploaded copy
//! carries its project-relative path on a marker line:
//!
//! ```text
//! // CLAUDESYNC_PATH: src/lib.rs
//! ```
//!
//! Fingerprints are MD5 digests over the UTF-8 bytes of the canonical form,
//! so line-ending differences between operating systems never register as
//! content changes.

use md5::{Digest, Md5};

use crate::error::SyncError;
use crate::strategies::AutoCrlf;

/// Prefix identifying a marker line
pub const MARKER_PREFIX: &str = "// CLAUDESYNC_PATH:";

/// Which side normalized content is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	ToLocal,
	ToRemote,
}

/// Applies the line-ending policy and marker handling for one project
#[derive(Debug, Clone, Copy)]
pub struct ContentNormalizer {
	autocrlf: AutoCrlf,
	crlf_platform: bool,
}

impl ContentNormalizer {
	/// Create a normalizer for the current platform's line-ending convention
	pub fn new(autocrlf: AutoCrlf) -> Self {
		ContentNormalizer { autocrlf, crlf_platform: cfg!(windows) }
	}

	/// Override whether the local platform uses CRLF line endings
	pub fn with_crlf_platform(mut self, crlf_platform: bool) -> Self {
		self.crlf_platform = crlf_platform;
		self
	}

	pub fn autocrlf(&self) -> AutoCrlf {
		self.autocrlf
	}

	/// Canonicalize line endings for the given destination
	pub fn normalize(&self, content: &str, direction: Direction) -> String {
		let collapsed = content.replace("\r\n", "\n").replace('\r', "\n");

		match direction {
			Direction::ToLocal => {
				if self.crlf_platform && self.autocrlf == AutoCrlf::True {
					collapsed.replace('\n', "\r\n")
				} else {
					collapsed
				}
			}
			// input and true both keep LF, anything else stays as collapsed
			Direction::ToRemote => collapsed,
		}
	}

	/// Content exactly as it is uploaded for `relative_path`
	pub fn prepare_upload(&self, content: &str, relative_path: &str) -> String {
		self.normalize(&add_path_marker(content, relative_path), Direction::ToRemote)
	}

	/// Content exactly as it is written locally for a downloaded document
	pub fn prepare_download(&self, content: &str) -> String {
		self.normalize(remove_path_marker(content), Direction::ToLocal)
	}

	/// Fingerprint of local content in canonical form, without marker
	pub fn local_fingerprint(&self, content: &str) -> String {
		fingerprint(&self.normalize(content, Direction::ToRemote))
	}

	/// Fingerprint of content as it looks on the remote side
	///
	/// Applies to both local files and remote documents: a document that
	/// already carries a marker is left as is.
	pub fn remote_fingerprint(&self, content: &str, relative_path: &str) -> String {
		fingerprint(&self.prepare_upload(content, relative_path))
	}
}

/// MD5 hex digest of the UTF-8 bytes of `content`
pub fn fingerprint(content: &str) -> String {
	hex::encode(Md5::digest(content.as_bytes()))
}

/// Decode raw file bytes, rejecting anything that is not UTF-8
pub fn decode(bytes: Vec<u8>, path: &str) -> Result<String, SyncError> {
	String::from_utf8(bytes)
		.map_err(|e| SyncError::Decode { path: path.to_string(), source: e.utf8_error() })
}

/// Prepend the marker line unless one is already present
pub fn add_path_marker(content: &str, relative_path: &str) -> String {
	if content.starts_with(MARKER_PREFIX) {
		return content.to_string();
	}
	format!("{} {}\n{}", MARKER_PREFIX, relative_path, content)
}

/// Strip the first line if it is a marker line
pub fn remove_path_marker(content: &str) -> &str {
	if !content.starts_with(MARKER_PREFIX) {
		return content;
	}
	// The marker line may end in LF, CRLF or a lone CR
	match content.find(|c: char| c == '\n' || c == '\r') {
		Some(pos) if content[pos..].starts_with("\r\n") => &content[pos + 2..],
		Some(pos) => &content[pos + 1..],
		None => "",
	}
}

/// Path recorded on the marker line, if any
pub fn extract_marker_path(content: &str) -> Option<String> {
	let first_line = content.split(|c: char| c == '\n' || c == '\r').next()?;
	let rest = first_line.strip_prefix(MARKER_PREFIX)?;
	let path = rest.trim();
	if path.is_empty() {
		None
	} else {
		Some(path.to_string())
	}
}


// vim: ts=4
