//! [`Session`] - the orchestrator owning a browsing session's state.
//!
//! One session owns the open tabs, the active-tab pointer, the per-domain
//! mode entries, and the gate in front of the backend client. Every
//! user-facing action enters here, mutates that state under short-held
//! locks, and announces itself through [`SessionEvent`]s before returning.
//!
//! # Calling conventions
//!
//! In-memory operations (`open`, `show`, `kill`, `navigate`, `back`,
//! `next`, `pause`, `refresh`, `mode_for`, `set_mode`) are synchronous and
//! return their result directly. Backend-coupled operations come in two
//! forms: awaitable (`connect`, `disconnect`, `download`, `execute`)
//! resolving to the outcome, and `*_detached` returning only whether the
//! attempt was initiated.
//!
//! Failures never panic or return errors: invalid input and invalid state
//! both come back as `false`/`None`, matching the rest of the surface.

mod modes;
mod session_events;
mod tabs;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use veil_protocol::SessionResponse;
use veil_runtime::{BackendClient, UrlRef};

use crate::handlers::HandlerMap;
use crate::settings::{SessionOptions, Settings};
use crate::tab::Tab;

pub use session_events::{ExecuteReply, SessionEvent};
use session_events::EventMeta;

/// The internal page shown when the last tab is killed.
pub const WELCOME_URL: &str = "veil:welcome";

/// State of the gate in front of the backend client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
	/// No connection; `connect` may be issued.
	Disconnected,
	/// A connect attempt is in flight.
	Connecting,
	/// The backend answered; session operations may reach it.
	Connected,
}

/// A browsing session.
///
/// Cheap to clone; all clones share the same state. See the
/// [module docs](self) for the calling conventions.
#[derive(Clone)]
pub struct Session {
	pub(crate) inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
	pub(crate) options: SessionOptions,
	pub(crate) client: Arc<dyn BackendClient>,
	pub(crate) state: Mutex<SessionState>,
	pub(crate) handlers: HandlerMap<SessionEvent, EventMeta>,
}

pub(crate) struct SessionState {
	pub(crate) settings: Settings,
	pub(crate) tabs: Vec<Tab>,
	pub(crate) active: Option<Tab>,
	pub(crate) connection: ConnectionState,
}

impl Session {
	/// Creates a session with default options.
	pub fn new(client: Arc<dyn BackendClient>) -> Self {
		Self::with_options(SessionOptions::default(), client)
	}

	/// Creates a session with explicit options.
	pub fn with_options(options: SessionOptions, client: Arc<dyn BackendClient>) -> Self {
		Self {
			inner: Arc::new(SessionInner {
				options,
				client,
				state: Mutex::new(SessionState {
					settings: Settings::default(),
					tabs: Vec::new(),
					active: None,
					connection: ConnectionState::Disconnected,
				}),
				handlers: Arc::new(Mutex::new(indexmap::IndexMap::new())),
			}),
		}
	}

	/// The options this session was created with.
	pub fn options(&self) -> &SessionOptions {
		&self.inner.options
	}

	/// Snapshot of the live settings. Mode entries are shared pointers, so
	/// the snapshot observes later in-place changes.
	pub fn settings(&self) -> Settings {
		self.inner.state.lock().settings.clone()
	}

	/// Snapshot of the tab registry in display order.
	pub fn tabs(&self) -> Vec<Tab> {
		self.inner.state.lock().tabs.clone()
	}

	/// The currently presented tab, if any.
	pub fn active_tab(&self) -> Option<Tab> {
		self.inner.state.lock().active.clone()
	}

	/// Current gate state.
	pub fn connection_state(&self) -> ConnectionState {
		self.inner.state.lock().connection
	}

	/// Whether the backend connection is up.
	pub fn is_connected(&self) -> bool {
		self.connection_state() == ConnectionState::Connected
	}

	// --- connection gate -------------------------------------------------

	/// Connects to the backend and resolves with the outcome.
	///
	/// `false` without side effects when already connected or a connect is
	/// in flight. On success the persisted settings are loaded before this
	/// resolves; on failure the gate returns to disconnected and a
	/// [`SessionEvent::Disconnect`] fires.
	pub async fn connect(&self) -> bool {
		if !self.begin_connect() {
			return false;
		}
		self.finish_connect().await
	}

	/// Initiates a connect without waiting for the outcome.
	///
	/// Returns whether the attempt was initiated; the outcome arrives as a
	/// [`SessionEvent::Connect`] or [`SessionEvent::Disconnect`]. Requires
	/// a tokio runtime context.
	pub fn connect_detached(&self) -> bool {
		if !self.begin_connect() {
			return false;
		}
		let Ok(handle) = Handle::try_current() else {
			self.inner.state.lock().connection = ConnectionState::Disconnected;
			return false;
		};
		let session = self.clone();
		handle.spawn(async move {
			session.finish_connect().await;
		});
		true
	}

	fn begin_connect(&self) -> bool {
		let mut state = self.inner.state.lock();
		if state.connection != ConnectionState::Disconnected {
			return false;
		}
		state.connection = ConnectionState::Connecting;
		true
	}

	async fn finish_connect(&self) -> bool {
		let host = self.inner.options.host.clone();
		match self.inner.client.connect(&host).await {
			Ok(()) => {
				self.inner.state.lock().connection = ConnectionState::Connected;
				debug!(host = %host, "connected");
				self.emit(SessionEvent::Connect);
				self.load_settings().await;
				true
			}
			Err(err) => {
				warn!(host = %host, error = %err, "connect failed");
				self.inner.state.lock().connection = ConnectionState::Disconnected;
				self.emit(SessionEvent::Disconnect);
				false
			}
		}
	}

	async fn load_settings(&self) {
		match self.inner.client.read_settings().await {
			Ok(payload) => {
				self.inner.state.lock().settings.apply_payload(payload);
				if self.inner.options.debug {
					debug!(host = %self.inner.options.host, "session settings loaded");
				}
			}
			Err(err) => {
				warn!(error = %err, "settings read failed");
			}
		}
	}

	/// Disconnects from the backend and resolves with the outcome.
	///
	/// `false` without side effects when no connection is up. The client's
	/// disconnect is best-effort; the gate always ends disconnected and a
	/// [`SessionEvent::Disconnect`] fires.
	pub async fn disconnect(&self) -> bool {
		if self.connection_state() != ConnectionState::Connected {
			return false;
		}
		self.finish_disconnect().await;
		true
	}

	/// Initiates a disconnect without waiting for it to complete. Returns
	/// whether the attempt was initiated. Requires a tokio runtime context.
	pub fn disconnect_detached(&self) -> bool {
		if self.connection_state() != ConnectionState::Connected {
			return false;
		}
		let Ok(handle) = Handle::try_current() else {
			return false;
		};
		let session = self.clone();
		handle.spawn(async move {
			session.finish_disconnect().await;
		});
		true
	}

	async fn finish_disconnect(&self) {
		if let Err(err) = self.inner.client.disconnect().await {
			warn!(error = %err, "client disconnect reported failure");
		}
		self.inner.state.lock().connection = ConnectionState::Disconnected;
		debug!("disconnected");
		self.emit(SessionEvent::Disconnect);
	}

	// --- backend-coupled operations --------------------------------------

	/// Fetches `url` through the backend's request pipeline.
	///
	/// `None` for unparsable URLs, when not connected, and when the backend
	/// fails the request.
	pub async fn download(&self, url: &str) -> Option<SessionResponse> {
		let reference = UrlRef::parse(url);
		if !reference.is_valid() || !self.is_connected() {
			return None;
		}
		match self.inner.client.request(reference).await {
			Ok(response) => Some(response),
			Err(err) => {
				warn!(url = %url, error = %err, "download failed");
				None
			}
		}
	}

	/// Initiates a download, discarding the response. Returns whether the
	/// attempt was initiated. Requires a tokio runtime context.
	pub fn download_detached(&self, url: &str) -> bool {
		let reference = UrlRef::parse(url);
		if !reference.is_valid() || !self.is_connected() {
			return false;
		}
		let Ok(handle) = Handle::try_current() else {
			return false;
		};
		let client = self.inner.client.clone();
		let url = url.to_string();
		handle.spawn(async move {
			if let Err(err) = client.request(reference).await {
				warn!(url = %url, error = %err, "download failed");
			}
		});
		true
	}

	/// Asks listeners to run `code` and resolves with the first reply.
	///
	/// `None` for empty code and when every reply handle is dropped
	/// without an answer (no listener, or none that handles execution).
	pub async fn execute(&self, code: &str) -> Option<Value> {
		if code.trim().is_empty() {
			return None;
		}
		let (reply, rx) = ExecuteReply::channel();
		self.emit(SessionEvent::Execute {
			code: code.to_string(),
			reply,
		});
		rx.await.ok()
	}

	/// Emits the execute event without waiting for a reply. Returns
	/// whether the event was emitted.
	pub fn execute_detached(&self, code: &str) -> bool {
		if code.trim().is_empty() {
			return false;
		}
		let (reply, rx) = ExecuteReply::channel();
		drop(rx);
		self.emit(SessionEvent::Execute {
			code: code.to_string(),
			reply,
		});
		true
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Session")
			.field("host", &self.inner.options.host)
			.field("connection", &state.connection)
			.field("tabs", &state.tabs.len())
			.field("active", &state.active.as_ref().map(Tab::id))
			.finish()
	}
}
