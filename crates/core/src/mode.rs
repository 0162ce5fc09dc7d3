//! Live, identity-shared mode configuration.
//!
//! A [`ModeConfig`] is the in-memory form of one per-domain mode entry.
//! Entries are handed out as [`SharedMode`] pointers: every tab resolved to
//! the same domain holds the *same* allocation, so an in-place flag update
//! is observed by all of them without fan-out. Pointer equality is the
//! identity the session reasons about.

use std::sync::Arc;

use parking_lot::Mutex;
use veil_protocol::{ContentMode, ModeSnapshot};

/// Shared handle to a mode entry.
pub type SharedMode = Arc<ModeConfig>;

/// One mode entry: which content categories to render for a domain.
///
/// `domain` is fixed at construction; only the flags mutate. A config with
/// no domain is transient - the placeholder handed to tabs whose domain has
/// no persisted entry yet - and is never written to the backend.
pub struct ModeConfig {
	domain: Option<String>,
	mode: Mutex<ContentMode>,
}

impl ModeConfig {
	/// A transient config not tied to any domain.
	pub fn transient(mode: ContentMode) -> SharedMode {
		Arc::new(Self {
			domain: None,
			mode: Mutex::new(mode),
		})
	}

	/// A config for a concrete domain, eligible for persistence.
	pub fn for_domain(domain: impl Into<String>, mode: ContentMode) -> SharedMode {
		Arc::new(Self {
			domain: Some(domain.into()),
			mode: Mutex::new(mode),
		})
	}

	/// Domain this entry applies to; `None` for transient configs.
	pub fn domain(&self) -> Option<&str> {
		self.domain.as_deref()
	}

	/// Copies the current flags out.
	pub fn mode(&self) -> ContentMode {
		*self.mode.lock()
	}

	/// Overwrites the flags in place, preserving the allocation every
	/// holder shares. Returns `true` when any flag actually changed.
	pub(crate) fn apply(&self, next: ContentMode) -> bool {
		let mut mode = self.mode.lock();
		if *mode == next {
			return false;
		}
		*mode = next;
		true
	}

	/// The flat persisted form, or `None` for transient configs.
	pub fn snapshot(&self) -> Option<ModeSnapshot> {
		Some(ModeSnapshot {
			domain: self.domain.clone()?,
			mode: self.mode(),
		})
	}
}

impl std::fmt::Debug for ModeConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModeConfig")
			.field("domain", &self.domain)
			.field("mode", &self.mode())
			.finish()
	}
}

/// Longest-suffix match: of all entries whose domain is a suffix of
/// `effective_domain`, pick the longest one. Ties keep the first
/// encountered, which makes the result deterministic for a fixed store
/// order.
pub(crate) fn resolve_suffix<'a>(
	modes: &'a [SharedMode],
	effective_domain: &str,
) -> Option<&'a SharedMode> {
	let mut best: Option<&SharedMode> = None;
	for entry in modes {
		let Some(domain) = entry.domain() else {
			continue;
		};
		if !effective_domain.ends_with(domain) {
			continue;
		}
		match best {
			Some(current) if current.domain().is_some_and(|d| d.len() >= domain.len()) => {}
			_ => best = Some(entry),
		}
	}
	best
}

/// Exact-domain lookup, used by the merge path (suffix matching would make
/// `set` on `"example.com"` hit a `"shop.example.com"` entry).
pub(crate) fn find_exact<'a>(modes: &'a [SharedMode], domain: &str) -> Option<&'a SharedMode> {
	modes.iter().find(|entry| entry.domain() == Some(domain))
}
