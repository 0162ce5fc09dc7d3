//! Persisted session settings payload.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::mode::ModeSnapshot;

/// How the session reaches the wider internet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
	/// Unmetered connection; prefetching and parallel requests allowed.
	Broadband,
	/// Metered connection; the backend schedules requests conservatively.
	#[default]
	Mobile,
	/// Route through another peer running the same backend.
	Peer,
	/// Route through Tor.
	Tor,
}

/// Internet-facing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetSettings {
	#[serde(default)]
	pub connection: ConnectionKind,
}

/// A per-domain URL filter rule.
///
/// A request matches when its path starts with `prefix`, contains `midfix`,
/// or ends with `suffix`; absent parts are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
	pub domain: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prefix: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub midfix: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub suffix: Option<String>,
}

/// A static host resolution entry, bypassing DNS for the given domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRule {
	pub domain: String,
	#[serde(default)]
	pub hosts: Vec<IpAddr>,
}

/// A known peer running the same backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
	pub domain: String,
	#[serde(default)]
	pub connection: ConnectionKind,
}

/// Everything the backend persists for a session profile.
///
/// Read once per successful connect; individual mode entries are written
/// back piecemeal as they change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
	#[serde(default)]
	pub internet: InternetSettings,
	#[serde(default)]
	pub filters: Vec<FilterRule>,
	#[serde(default)]
	pub hosts: Vec<HostRule>,
	#[serde(default)]
	pub modes: Vec<ModeSnapshot>,
	#[serde(default)]
	pub peers: Vec<Peer>,
}
