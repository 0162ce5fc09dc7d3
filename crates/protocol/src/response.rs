//! Session response payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A response delivered by the backend for a session-level request.
///
/// The body travels base64-encoded on the wire; `payload` holds the decoded
/// bytes. `None` means the backend produced no body (e.g. a cache miss it
/// could not fill while offline).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
	/// Response headers as loosely-typed JSON, mirroring what the backend
	/// received or synthesized.
	#[serde(default)]
	pub headers: serde_json::Value,
	/// Decoded response body.
	#[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
	pub payload: Option<Vec<u8>>,
}

mod base64_bytes {
	use super::*;

	pub fn serialize<S: Serializer>(
		payload: &Option<Vec<u8>>,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		match payload {
			Some(bytes) => serializer.serialize_some(&BASE64.encode(bytes)),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<Vec<u8>>, D::Error> {
		let encoded: Option<String> = Option::deserialize(deserializer)?;
		match encoded {
			Some(s) => BASE64
				.decode(s.as_bytes())
				.map(Some)
				.map_err(serde::de::Error::custom),
			None => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn payload_decodes_from_base64() {
		let response: SessionResponse = serde_json::from_str(
			r#"{"headers":{"content-type":"text/html"},"payload":"aGVsbG8="}"#,
		)
		.unwrap();
		assert_eq!(response.payload.as_deref(), Some(b"hello".as_slice()));
		assert_eq!(response.headers["content-type"], "text/html");
	}

	#[test]
	fn missing_payload_is_none() {
		let response: SessionResponse = serde_json::from_str(r#"{"headers":{}}"#).unwrap();
		assert_eq!(response.payload, None);
	}
}
