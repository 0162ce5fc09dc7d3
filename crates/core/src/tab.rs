//! Tab handles.
//!
//! A [`Tab`] is a cheap-to-clone handle over shared inner state, the same
//! shape the session itself has. Tabs are constructed and destroyed only by
//! the session; everything here is the per-tab state machine - current
//! reference, back/next history, load flag - with no rendering attached.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use veil_runtime::UrlRef;

use crate::mode::SharedMode;

static NEXT_TAB_ID: AtomicU64 = AtomicU64::new(1);

/// An open tab.
///
/// Equality is identity: two handles are equal when they point at the same
/// tab, which is how the registry deduplicates and how the active pointer
/// is compared.
#[derive(Clone)]
pub struct Tab {
	inner: Arc<TabInner>,
}

struct TabInner {
	id: u64,
	/// Shared mode entry; re-pointed by the session when a canonical entry
	/// appears for this tab's domain.
	config: RwLock<SharedMode>,
	history: Mutex<History>,
	loading: AtomicBool,
	killed: AtomicBool,
}

struct History {
	/// Visited references; `entries[index]` is the current one.
	entries: Vec<UrlRef>,
	index: usize,
	/// A tab starts unloaded: the first navigation (or first show) claims
	/// the initial entry instead of pushing a second one.
	loaded: bool,
}

impl Tab {
	pub(crate) fn new(config: SharedMode, reference: UrlRef) -> Self {
		Self {
			inner: Arc::new(TabInner {
				id: NEXT_TAB_ID.fetch_add(1, Ordering::SeqCst),
				config: RwLock::new(config),
				history: Mutex::new(History {
					entries: vec![reference],
					index: 0,
					loaded: false,
				}),
				loading: AtomicBool::new(false),
				killed: AtomicBool::new(false),
			}),
		}
	}

	/// Monotonic tab identifier, for logs.
	pub fn id(&self) -> u64 {
		self.inner.id
	}

	/// Canonical URL of the current history entry.
	pub fn url(&self) -> String {
		let history = self.inner.history.lock();
		history.entries[history.index].url.clone()
	}

	/// Parsed reference of the current history entry.
	pub fn reference(&self) -> UrlRef {
		let history = self.inner.history.lock();
		history.entries[history.index].clone()
	}

	/// The mode entry this tab renders under.
	pub fn mode(&self) -> SharedMode {
		self.inner.config.read().clone()
	}

	pub(crate) fn set_mode_entry(&self, config: SharedMode) {
		*self.inner.config.write() = config;
	}

	/// Navigates to `url`, which may be relative (`./`, `../`) to the
	/// current reference.
	///
	/// Returns `false` for killed tabs, unparsable targets, and
	/// navigation to the URL already current. The first navigation of a
	/// fresh tab claims the tab's initial entry, so navigating a
	/// just-opened tab to its own URL counts as the initial load and
	/// succeeds.
	pub fn navigate(&self, url: &str) -> bool {
		if self.is_killed() {
			return false;
		}

		let target = if url.starts_with("./") || url.starts_with("../") {
			match self.reference().resolve(url) {
				Some(resolved) => resolved,
				None => return false,
			}
		} else {
			UrlRef::parse(url)
		};
		if !target.is_valid() {
			return false;
		}

		let mut history = self.inner.history.lock();
		let current = &history.entries[history.index];
		if history.loaded && current.url == target.url {
			return false;
		}

		if history.loaded {
			let index = history.index;
			history.entries.truncate(index + 1);
			history.entries.push(target);
			history.index += 1;
		} else {
			let index = history.index;
			history.entries[index] = target;
			history.loaded = true;
		}
		drop(history);

		self.inner.loading.store(true, Ordering::SeqCst);
		true
	}

	/// Steps back in history. `false` at the oldest entry.
	pub fn back(&self) -> bool {
		if self.is_killed() {
			return false;
		}
		let mut history = self.inner.history.lock();
		if history.index == 0 {
			return false;
		}
		history.index -= 1;
		drop(history);
		self.inner.loading.store(true, Ordering::SeqCst);
		true
	}

	/// Steps forward in history. `false` at the newest entry.
	pub fn next(&self) -> bool {
		if self.is_killed() {
			return false;
		}
		let mut history = self.inner.history.lock();
		if history.index + 1 >= history.entries.len() {
			return false;
		}
		history.index += 1;
		drop(history);
		self.inner.loading.store(true, Ordering::SeqCst);
		true
	}

	/// Stops the in-flight load, if any. Returns whether one was stopped.
	pub fn pause(&self) -> bool {
		if self.is_killed() {
			return false;
		}
		self.inner.loading.swap(false, Ordering::SeqCst)
	}

	/// Marks the tab presented: the initial entry no longer counts as
	/// pending, so the next navigation pushes history instead of claiming
	/// it.
	pub(crate) fn mark_loaded(&self) {
		self.inner.history.lock().loaded = true;
	}

	/// Teardown hook invoked by the session when the tab is removed.
	/// Subsequent operations on surviving handles return `false`.
	pub(crate) fn kill(&self) {
		self.inner.killed.store(true, Ordering::SeqCst);
		self.inner.loading.store(false, Ordering::SeqCst);
	}

	/// Whether the session has destroyed this tab.
	pub fn is_killed(&self) -> bool {
		self.inner.killed.load(Ordering::SeqCst)
	}
}

impl PartialEq for Tab {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Tab {}

impl std::fmt::Debug for Tab {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Tab")
			.field("id", &self.inner.id)
			.field("url", &self.url())
			.field("killed", &self.is_killed())
			.finish()
	}
}
