//! Session configuration: immutable startup options and live settings.

use veil_protocol::{FilterRule, HostRule, InternetSettings, Peer, SettingsPayload};

use crate::mode::{self, ModeConfig, SharedMode};

/// Options fixed at session creation.
///
/// Constructed once and never mutated afterwards; the session reads them
/// for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
	/// Log settings loads at debug level.
	pub debug: bool,
	/// Host identifier handed to the backend client on connect.
	pub host: String,
}

impl Default for SessionOptions {
	fn default() -> Self {
		Self {
			debug: false,
			host: "localhost".to_string(),
		}
	}
}

/// The session's live settings.
///
/// `modes` holds the shared mode entries tabs point into; everything else
/// mirrors the persisted payload as-is. Cloning a `Settings` clones the
/// *pointers*, so a clone still observes in-place mode changes.
#[derive(Debug, Clone, Default)]
pub struct Settings {
	pub internet: InternetSettings,
	pub filters: Vec<FilterRule>,
	pub hosts: Vec<HostRule>,
	pub modes: Vec<SharedMode>,
	pub peers: Vec<Peer>,
}

impl Settings {
	/// Folds a freshly-read payload into the live settings.
	///
	/// Mode entries merge by domain: a known domain gets its flags updated
	/// in place so tabs pointing at the entry keep observing it, an unknown
	/// domain is appended. The remaining sections carry no shared identity
	/// and are replaced wholesale.
	pub(crate) fn apply_payload(&mut self, payload: SettingsPayload) {
		self.internet = payload.internet;
		self.filters = payload.filters;
		self.hosts = payload.hosts;
		self.peers = payload.peers;

		for snapshot in payload.modes {
			match mode::find_exact(&self.modes, &snapshot.domain).cloned() {
				Some(existing) => {
					existing.apply(snapshot.mode);
				}
				None => {
					self.modes
						.push(ModeConfig::for_domain(snapshot.domain, snapshot.mode));
				}
			}
		}
	}
}
