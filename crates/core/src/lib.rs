//! veil-core: the session orchestrator for the veil browser.
//!
//! A [`Session`] owns everything mutable about one browsing session:
//!
//! - **Tab registry**: the ordered set of open [`Tab`]s plus the active-tab
//!   pointer, deduplicated by canonical URL
//! - **Mode entries**: per-domain [`ModeConfig`]s resolved by
//!   longest-suffix match and shared by identity across tabs
//! - **Connection gate**: the idempotent bridge to a
//!   [`BackendClient`](veil_runtime::BackendClient)
//! - **Events**: ordered, synchronous [`SessionEvent`] dispatch with RAII
//!   [`Subscription`]s
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use veil::{Session, SessionOptions};
//!
//! let session = Session::with_options(
//!     SessionOptions { host: "localhost".into(), ..Default::default() },
//!     Arc::new(my_client),
//! );
//! let _sub = session.on_event(|event| println!("{}", event.name()));
//!
//! session.connect().await;
//! let tab = session.open("https://example.com/").unwrap();
//! session.show(Some(&tab));
//! ```
//!
//! The session is single-writer by construction: state lives behind
//! short-held locks that are released before listeners run, so event
//! handlers are free to call back into the session.

pub mod handlers;
pub mod mode;
pub mod session;
pub mod settings;
pub mod tab;

pub use handlers::{HandlerId, Subscription};
pub use mode::{ModeConfig, SharedMode};
pub use session::{ConnectionState, ExecuteReply, Session, SessionEvent, WELCOME_URL};
pub use settings::{SessionOptions, Settings};
pub use tab::Tab;

// Payload and seam types callers need alongside the session.
pub use veil_protocol::{
	ConnectionKind, ContentMode, FilterRule, HostRule, InternetSettings, ModeSnapshot, Peer,
	SessionResponse, SettingsPayload,
};
pub use veil_runtime::{BackendClient, BoxFuture, Error, Result, UrlRef, url::INTERNAL_SCHEME};
