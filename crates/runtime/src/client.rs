//! The backend client seam.
//!
//! The session core owns no sockets and no storage; everything that leaves
//! the process goes through [`BackendClient`]. Methods return boxed futures
//! so the trait stays object-safe and the core can hold `Arc<dyn
//! BackendClient>` without knowing the implementation.

use veil_protocol::{ModeSnapshot, SessionResponse, SettingsPayload};

use crate::error::Result;
use crate::url::UrlRef;

/// Boxed future returned by client calls.
pub type BoxFuture<T> = futures_util::future::BoxFuture<'static, T>;

/// Connection to whatever process answers for this session - a local
/// service daemon or a remote peer.
///
/// Every call suspends the caller until the backend answers; the client
/// invokes no callbacks of its own and each returned future completes
/// exactly once. Implementations are expected to be cheap to clone behind
/// an `Arc` and safe to call from any task.
pub trait BackendClient: Send + Sync {
	/// Opens the connection to the backend at `host`.
	///
	/// Idempotency is the session's concern, not the client's: the session
	/// gates this behind its connection state and never issues overlapping
	/// connects.
	fn connect(&self, host: &str) -> BoxFuture<Result<()>>;

	/// Closes the connection. Must succeed on a best-effort basis; the
	/// session transitions to disconnected regardless of the outcome.
	fn disconnect(&self) -> BoxFuture<Result<()>>;

	/// Reads the persisted settings profile. Issued once per successful
	/// session connect.
	fn read_settings(&self) -> BoxFuture<Result<SettingsPayload>>;

	/// Persists one mode entry. Fire-and-forget from the session's
	/// perspective: failures are logged, never retried here.
	fn save_mode(&self, snapshot: ModeSnapshot) -> BoxFuture<Result<()>>;

	/// Fetches a resource through the backend's request pipeline, used by
	/// session-level downloads.
	fn request(&self, reference: UrlRef) -> BoxFuture<Result<SessionResponse>>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	/// The trait must stay object-safe; holding it behind `Arc<dyn ...>`
	/// is how the session stores it.
	#[test]
	fn client_is_object_safe() {
		struct Offline;

		impl BackendClient for Offline {
			fn connect(&self, host: &str) -> BoxFuture<Result<()>> {
				let host = host.to_string();
				Box::pin(async move { Err(Error::ConnectionFailed(host)) })
			}
			fn disconnect(&self) -> BoxFuture<Result<()>> {
				Box::pin(async { Ok(()) })
			}
			fn read_settings(&self) -> BoxFuture<Result<SettingsPayload>> {
				Box::pin(async { Err(Error::NotConnected) })
			}
			fn save_mode(&self, _snapshot: ModeSnapshot) -> BoxFuture<Result<()>> {
				Box::pin(async { Err(Error::NotConnected) })
			}
			fn request(&self, reference: UrlRef) -> BoxFuture<Result<SessionResponse>> {
				Box::pin(async move {
					Err(Error::Request {
						url: reference.url,
						message: "offline".to_string(),
					})
				})
			}
		}

		let client: std::sync::Arc<dyn BackendClient> = std::sync::Arc::new(Offline);
		let rt = tokio::runtime::Builder::new_current_thread()
			.build()
			.unwrap();
		let result = rt.block_on(client.connect("localhost"));
		assert!(matches!(result, Err(Error::ConnectionFailed(_))));
	}
}
