//! Tab registry operations and the active-tab state machine.

use tracing::debug;

use veil_runtime::UrlRef;

use crate::tab::Tab;

use super::{Session, SessionEvent, WELCOME_URL};

impl Session {
	/// Opens a tab for `url`, or returns the existing one when a tab with
	/// the same canonical URL is already registered (no event in that
	/// case). Never changes the active tab.
	///
	/// `None` when the URL does not parse to something a tab can hold.
	pub fn open(&self, url: &str) -> Option<Tab> {
		let reference = UrlRef::parse(url);
		if !reference.is_valid() {
			return None;
		}

		if let Some(existing) = {
			let state = self.inner.state.lock();
			state.tabs.iter().find(|t| t.url() == reference.url).cloned()
		} {
			return Some(existing);
		}

		let config = self.resolve_mode(&reference);
		let tab = Tab::new(config, reference);
		let tabs = {
			let mut state = self.inner.state.lock();
			state.tabs.push(tab.clone());
			state.tabs.clone()
		};
		debug!(id = tab.id(), url = %tab.url(), "tab opened");
		self.emit(SessionEvent::Open {
			tab: tab.clone(),
			tabs,
		});
		Some(tab)
	}

	/// Makes `tab` the active one, or falls back to the last registered
	/// tab when called with `None`.
	///
	/// With `Some(tab)`: an unregistered tab is appended first; the
	/// current active tab (if any) gets a [`Hide`](SessionEvent::Hide)
	/// even when it equals the target, and a [`Show`](SessionEvent::Show)
	/// fires only when the active tab actually changes.
	///
	/// With `None`: the current active tab is hidden, then the last tab in
	/// the registry is activated and shown; an empty registry just clears
	/// the active pointer.
	pub fn show(&self, tab: Option<&Tab>) -> Option<Tab> {
		match tab {
			Some(tab) => {
				let (hidden, changed, tabs) = {
					let mut state = self.inner.state.lock();
					if !state.tabs.iter().any(|t| t == tab) {
						state.tabs.push(tab.clone());
					}
					let hidden = state.active.clone();
					let changed = state.active.as_ref() != Some(tab);
					if changed {
						state.active = Some(tab.clone());
					}
					(hidden, changed, state.tabs.clone())
				};

				if let Some(hidden) = hidden {
					self.emit(SessionEvent::Hide {
						tab: hidden,
						tabs: tabs.clone(),
					});
				}
				if changed {
					tab.mark_loaded();
					self.emit(SessionEvent::Show {
						tab: tab.clone(),
						tabs,
					});
				}
				Some(tab.clone())
			}
			None => {
				let (hidden, next, tabs) = {
					let mut state = self.inner.state.lock();
					let hidden = state.active.take();
					let next = state.tabs.last().cloned();
					state.active = next.clone();
					(hidden, next, state.tabs.clone())
				};

				if let Some(hidden) = hidden {
					self.emit(SessionEvent::Hide {
						tab: hidden,
						tabs: tabs.clone(),
					});
				}
				if let Some(next) = &next {
					next.mark_loaded();
					self.emit(SessionEvent::Show {
						tab: next.clone(),
						tabs,
					});
				}
				next
			}
		}
	}

	/// Removes `tab` from the registry. `false` when it is not registered.
	///
	/// After the removal the session re-settles: the last remaining tab is
	/// shown, or - when the registry ran empty - the internal welcome page
	/// is opened and shown. A session therefore never stays at zero tabs.
	pub fn kill(&self, tab: &Tab) -> bool {
		let tabs = {
			let mut state = self.inner.state.lock();
			let Some(index) = state.tabs.iter().position(|t| t == tab) else {
				return false;
			};
			state.tabs.remove(index);
			state.tabs.clone()
		};

		tab.kill();
		debug!(id = tab.id(), url = %tab.url(), "tab killed");
		self.emit(SessionEvent::Kill {
			tab: tab.clone(),
			tabs,
		});

		let last = {
			let mut state = self.inner.state.lock();
			state.active = None;
			state.tabs.last().cloned()
		};
		match last {
			Some(last) => {
				self.show(Some(&last));
			}
			None => {
				if let Some(welcome) = self.open(WELCOME_URL) {
					self.show(Some(&welcome));
				}
			}
		}
		true
	}

	/// Navigates the active tab, or opens a fresh tab for `url` when none
	/// is active.
	///
	/// With an active tab, a successful navigation emits a hard
	/// [`Refresh`](SessionEvent::Refresh). Without one, relative paths are
	/// rejected outright (there is no base to resolve them against);
	/// otherwise the new tab is navigated and shown.
	pub fn navigate(&self, url: &str) -> bool {
		let url = url.trim();
		let active = self.inner.state.lock().active.clone();

		match active {
			Some(tab) => {
				if !tab.navigate(url) {
					return false;
				}
				let tabs = self.inner.state.lock().tabs.clone();
				self.emit(SessionEvent::Refresh {
					tab,
					tabs,
					soft: false,
				});
				true
			}
			None => {
				if url.is_empty() || url.starts_with("./") || url.starts_with("../") {
					return false;
				}
				let Some(tab) = self.open(url) else {
					return false;
				};
				if !tab.navigate(url) {
					return false;
				}
				self.show(Some(&tab));
				true
			}
		}
	}

	/// Steps the active tab back in history. `false` without an active tab
	/// or at the oldest entry.
	pub fn back(&self) -> bool {
		self.step(Tab::back)
	}

	/// Steps the active tab forward in history. `false` without an active
	/// tab or at the newest entry.
	pub fn next(&self) -> bool {
		self.step(Tab::next)
	}

	fn step(&self, op: fn(&Tab) -> bool) -> bool {
		let Some(tab) = self.inner.state.lock().active.clone() else {
			return false;
		};
		if !op(&tab) {
			return false;
		}
		let tabs = self.inner.state.lock().tabs.clone();
		self.emit(SessionEvent::Refresh {
			tab,
			tabs,
			soft: false,
		});
		true
	}

	/// Stops the active tab's in-flight load. `false` without an active
	/// tab or when nothing was loading.
	pub fn pause(&self) -> bool {
		let Some(tab) = self.inner.state.lock().active.clone() else {
			return false;
		};
		if !tab.pause() {
			return false;
		}
		let tabs = self.inner.state.lock().tabs.clone();
		self.emit(SessionEvent::Pause { tab, tabs });
		true
	}

	/// Re-renders the active tab without touching any state (a soft
	/// refresh). `false` without an active tab.
	pub fn refresh(&self) -> bool {
		let Some(tab) = self.inner.state.lock().active.clone() else {
			return false;
		};
		let tabs = self.inner.state.lock().tabs.clone();
		self.emit(SessionEvent::Refresh {
			tab,
			tabs,
			soft: true,
		});
		true
	}
}
