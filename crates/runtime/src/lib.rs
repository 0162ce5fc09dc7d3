//! Veil Runtime - Backend client seam, URL references, and error types
//!
//! This crate provides the infrastructure the session core is built on:
//!
//! - **Backend client**: The [`BackendClient`] trait - the async seam to
//!   whatever process answers connect/settings/request calls
//! - **URL references**: Parsing a URL string into the canonical form and
//!   domain parts the session keys its state on
//! - **Errors**: The runtime [`Error`]/[`Result`] types client
//!   implementations speak
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  veil-core   │  Session orchestrator (tabs, modes, events)
//! └──────┬───────┘
//!        │ calls through BackendClient
//! ┌──────▼───────┐
//! │ veil-runtime │  This crate
//! │  ┌─────────┐ │
//! │  │ Client  │ │  Boxed-future trait seam
//! │  └─────────┘ │
//! │  ┌─────────┐ │
//! │  │ UrlRef  │ │  Canonical URL + domain parts
//! │  └─────────┘ │
//! │  ┌─────────┐ │
//! │  │ Error   │ │  Failure taxonomy
//! │  └─────────┘ │
//! └──────────────┘
//! ```
//!
//! # Decoupling via BackendClient
//!
//! The session core never performs I/O itself; every suspension point goes
//! through [`BackendClient`]. This keeps the core deterministic and lets
//! tests drive it with a scripted in-memory client.

pub mod client;
pub mod error;
pub mod url;

pub use client::{BackendClient, BoxFuture};
pub use error::{Error, Result};
pub use url::UrlRef;
