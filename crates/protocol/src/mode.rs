//! Content-mode payload types.

use serde::{Deserialize, Serialize};

/// Which content categories a session renders for a domain.
///
/// Flags missing from a persisted payload deserialize as `false`, matching
/// the conservative default for unknown domains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMode {
	/// Render text content.
	#[serde(default)]
	pub text: bool,
	/// Render images.
	#[serde(default)]
	pub image: bool,
	/// Render audio.
	#[serde(default)]
	pub audio: bool,
	/// Render video.
	#[serde(default)]
	pub video: bool,
	/// Render everything else (fonts, downloads, plugins).
	#[serde(default)]
	pub other: bool,
}

impl ContentMode {
	/// All five categories enabled. Used for internal `veil:` pages.
	pub const fn all() -> Self {
		Self {
			text: true,
			image: true,
			audio: true,
			video: true,
			other: true,
		}
	}

	/// All five categories disabled. The default for unknown domains.
	pub const fn none() -> Self {
		Self {
			text: false,
			image: false,
			audio: false,
			video: false,
			other: false,
		}
	}
}

/// Persisted form of a per-domain mode entry.
///
/// The live session keeps mode entries behind shared pointers so that tabs
/// observe in-place changes; this is the flat shape those entries take when
/// read from or written to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSnapshot {
	/// Domain the entry applies to, e.g. `"example.com"`.
	pub domain: String,
	/// Content categories enabled for that domain.
	#[serde(default)]
	pub mode: ContentMode,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_mode_payload_defaults_missing_flags_to_false() {
		let snapshot: ModeSnapshot =
			serde_json::from_str(r#"{"domain":"example.com","mode":{"text":true}}"#).unwrap();
		assert_eq!(snapshot.domain, "example.com");
		assert!(snapshot.mode.text);
		assert!(!snapshot.mode.image);
		assert!(!snapshot.mode.other);
	}

	#[test]
	fn mode_constants() {
		assert_eq!(ContentMode::default(), ContentMode::none());
		assert!(ContentMode::all().video);
		assert!(!ContentMode::none().text);
	}
}
