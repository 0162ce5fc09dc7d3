//! Mode resolution and the merge-on-write path.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use veil_protocol::ContentMode;
use veil_runtime::UrlRef;

use crate::mode::{self, ModeConfig, SharedMode};
use crate::tab::Tab;

use super::{Session, SessionEvent};

impl Session {
	/// Resolves the mode entry for a URL string.
	///
	/// Internal `veil:` pages always render everything. Otherwise the
	/// stored entries are matched by domain suffix with the longest match
	/// winning, so `shop.example.com` beats `example.com` for
	/// `shop.example.com` requests. Unknown domains (and unparsable input)
	/// get a transient all-off config that is not persisted.
	pub fn mode_for(&self, url: &str) -> SharedMode {
		self.resolve_mode(&UrlRef::parse(url))
	}

	pub(crate) fn resolve_mode(&self, reference: &UrlRef) -> SharedMode {
		if reference.is_internal() {
			return ModeConfig::transient(ContentMode::all());
		}
		let Some(effective) = reference.effective_domain() else {
			return ModeConfig::transient(ContentMode::none());
		};
		let state = self.inner.state.lock();
		match mode::resolve_suffix(&state.settings.modes, &effective) {
			Some(entry) => Arc::clone(entry),
			None => ModeConfig::transient(ContentMode::none()),
		}
	}

	/// Merges a proposed mode for `domain` into the settings.
	///
	/// An unknown domain gets a new entry; a known one has its flags
	/// overwritten in place so every tab holding the entry observes the
	/// change. Either way the entry is persisted through the backend
	/// (fire-and-forget; a no-op overwrite skips the save) and every tab
	/// resolving to `domain` is re-pointed at the canonical entry. When
	/// the active tab ends up on the canonical entry, a
	/// [`Change`](SessionEvent::Change) fires.
	///
	/// `false` for an empty domain.
	pub fn set_mode(&self, domain: &str, mode: ContentMode) -> bool {
		let domain = domain.trim().to_ascii_lowercase();
		if domain.is_empty() {
			return false;
		}

		let (canonical, dirty) = {
			let mut state = self.inner.state.lock();
			match mode::find_exact(&state.settings.modes, &domain).cloned() {
				Some(existing) => {
					let changed = existing.apply(mode);
					(existing, changed)
				}
				None => {
					let created = ModeConfig::for_domain(domain.clone(), mode);
					state.settings.modes.push(Arc::clone(&created));
					(created, true)
				}
			}
		};

		if dirty {
			self.persist_mode(&canonical);
		}

		let active = {
			let state = self.inner.state.lock();
			for tab in &state.tabs {
				repoint_tab(tab, &domain, &canonical);
			}
			state.active.clone()
		};

		if let Some(active) = active {
			if Arc::ptr_eq(&active.mode(), &canonical) {
				self.emit(SessionEvent::Change { tab: active });
			}
		}
		true
	}

	/// Hands the entry to the backend for persistence and forgets about
	/// it. Failures are logged, never surfaced to the `set_mode` caller.
	fn persist_mode(&self, entry: &SharedMode) {
		let Some(snapshot) = entry.snapshot() else {
			return;
		};
		let Ok(handle) = Handle::try_current() else {
			warn!(domain = %snapshot.domain, "no runtime; mode save skipped");
			return;
		};
		debug!(domain = %snapshot.domain, "saving mode");
		let client = Arc::clone(&self.inner.client);
		handle.spawn(async move {
			if let Err(err) = client.save_mode(snapshot).await {
				warn!(error = %err, "mode save failed");
			}
		});
	}
}

/// Points `tab` at the canonical entry when its effective domain equals
/// `domain` exactly.
///
/// This is what picks up tabs opened before the domain had any entry: they
/// carry a transient config until the first `set_mode` for their domain
/// swaps the canonical entry in. Tabs on a more or less specific domain are
/// left alone and keep whatever their own domain resolves to.
fn repoint_tab(tab: &Tab, domain: &str, canonical: &SharedMode) {
	if Arc::ptr_eq(&tab.mode(), canonical) {
		return;
	}
	if tab
		.reference()
		.effective_domain()
		.is_some_and(|d| d == domain)
	{
		tab.set_mode_entry(Arc::clone(canonical));
	}
}
