//! Error types for the veil runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a backend client implementation can surface.
///
/// The session core maps these to its sentinel-based public surface; the
/// full taxonomy exists for client implementations and their logs.
#[derive(Debug, Error)]
pub enum Error {
	/// Failed to establish a connection with the backend.
	#[error("failed to connect to backend at '{0}'")]
	ConnectionFailed(String),

	/// An operation required a live connection and there was none.
	#[error("not connected to a backend")]
	NotConnected,

	/// Transport-level error (socket closed, framing).
	#[error("transport error: {0}")]
	Transport(String),

	/// The backend answered with something the client could not interpret.
	#[error("protocol error: {0}")]
	Protocol(String),

	/// The backend refused or failed a session-level request.
	#[error("request failed for '{url}': {message}")]
	Request { url: String, message: String },

	/// Persisted settings could not be read.
	#[error("settings unavailable: {0}")]
	SettingsUnavailable(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Timeout waiting for the backend.
	#[error("timeout: {0}")]
	Timeout(String),
}

impl Error {
	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}

	/// Returns true if this failure happened before a connection existed.
	pub fn is_connection_failure(&self) -> bool {
		matches!(self, Error::ConnectionFailed(_) | Error::NotConnected)
	}
}
