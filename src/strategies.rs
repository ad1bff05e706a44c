//! Mode enums used by configuration and the sync engines
//!
//! Each enum includes a FromStr implementation for CLI and config parsing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// LINE ENDINGS
// ============================================================================

/// Line-ending policy, modelled on git's `core.autocrlf`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AutoCrlf {
	/// LF on the remote, CRLF in the working tree on CRLF platforms (default)
	#[default]
	True,

	/// LF on the remote, working tree left as LF
	Input,

	/// No conversion beyond the initial collapse to LF
	False,
}

impl FromStr for AutoCrlf {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"true" | "yes" | "on" => Ok(Self::True),
			"input" => Ok(Self::Input),
			"false" | "no" | "off" => Ok(Self::False),
			_ => Err(format!("Unknown autocrlf mode: {}. Valid options: true, input, false", s)),
		}
	}
}

impl std::fmt::Display for AutoCrlf {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::True => write!(f, "true"),
			Self::Input => write!(f, "input"),
			Self::False => write!(f, "false"),
		}
	}
}

// ============================================================================
// SYNC MODE
// ============================================================================

/// Which engine a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
	/// Local is authoritative, remote mirrors it
	#[default]
	OneWay,

	/// Both sides may change; reconcile using the snapshot
	TwoWay,
}

impl FromStr for SyncMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"one-way" | "oneway" | "push" => Ok(Self::OneWay),
			"two-way" | "twoway" | "bidirectional" => Ok(Self::TwoWay),
			_ => Err(format!("Unknown sync mode: {}. Valid options: one-way, two-way", s)),
		}
	}
}

impl std::fmt::Display for SyncMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::OneWay => write!(f, "one-way"),
			Self::TwoWay => write!(f, "two-way"),
		}
	}
}


// vim: ts=4
