//! Session lifecycle events and listener registration.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::handlers::{HandlerEntry, HandlerFn, Subscription, next_handler_id};
use crate::tab::Tab;

use super::Session;

/// Everything the session announces to its listeners.
///
/// Events fire synchronously, in registration order, on the thread running
/// the operation that caused them. Tab-carrying variants include a snapshot
/// of the full registry at emit time.
#[derive(Debug, Clone)]
pub enum SessionEvent {
	/// The backend connection is up.
	Connect,
	/// The backend connection is down (or a connect attempt failed).
	Disconnect,
	/// A tab was appended to the registry.
	Open { tab: Tab, tabs: Vec<Tab> },
	/// A tab became the active one.
	Show { tab: Tab, tabs: Vec<Tab> },
	/// The previously active tab stopped being presented.
	Hide { tab: Tab, tabs: Vec<Tab> },
	/// A tab was removed from the registry.
	Kill { tab: Tab, tabs: Vec<Tab> },
	/// The active tab's load was stopped.
	Pause { tab: Tab, tabs: Vec<Tab> },
	/// The active tab needs re-rendering. `soft` is set when nothing about
	/// the tab changed (a plain refresh), clear after navigation.
	Refresh { tab: Tab, tabs: Vec<Tab>, soft: bool },
	/// The active tab's mode entry changed under it.
	Change { tab: Tab },
	/// A listener is asked to run `code` and answer through `reply`.
	Execute { code: String, reply: ExecuteReply },
}

impl SessionEvent {
	/// Stable event name, for logs.
	pub fn name(&self) -> &'static str {
		match self {
			SessionEvent::Connect => "connect",
			SessionEvent::Disconnect => "disconnect",
			SessionEvent::Open { .. } => "open",
			SessionEvent::Show { .. } => "show",
			SessionEvent::Hide { .. } => "hide",
			SessionEvent::Kill { .. } => "kill",
			SessionEvent::Pause { .. } => "pause",
			SessionEvent::Refresh { .. } => "refresh",
			SessionEvent::Change { .. } => "change",
			SessionEvent::Execute { .. } => "execute",
		}
	}
}

/// Reply handle carried by [`SessionEvent::Execute`].
///
/// The first [`send`](Self::send) wins; later calls (from any clone) are
/// dropped and report `false`. When every clone is dropped without a reply,
/// the awaiting [`Session::execute`] resolves to `None`.
#[derive(Clone)]
pub struct ExecuteReply {
	tx: Arc<Mutex<Option<oneshot::Sender<Value>>>>,
}

impl ExecuteReply {
	pub(crate) fn channel() -> (Self, oneshot::Receiver<Value>) {
		let (tx, rx) = oneshot::channel();
		(
			Self {
				tx: Arc::new(Mutex::new(Some(tx))),
			},
			rx,
		)
	}

	/// Delivers the execution result. Returns `false` when a reply was
	/// already delivered or nobody is waiting anymore.
	pub fn send(&self, value: Value) -> bool {
		match self.tx.lock().take() {
			Some(tx) => tx.send(value).is_ok(),
			None => false,
		}
	}
}

impl std::fmt::Debug for ExecuteReply {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ExecuteReply")
			.field("answered", &self.tx.lock().is_none())
			.finish()
	}
}

/// Listener metadata: once-listeners remove themselves before running.
#[derive(Clone, Copy, Default)]
pub(crate) struct EventMeta {
	pub once: bool,
}

impl Session {
	/// Registers a listener for every session event.
	///
	/// Returns a [`Subscription`] that unregisters the listener when
	/// dropped.
	pub fn on_event<F>(&self, handler: F) -> Subscription
	where
		F: Fn(&SessionEvent) + Send + Sync + 'static,
	{
		self.register(handler, EventMeta { once: false })
	}

	/// Registers a listener that runs for the next event only.
	pub fn once_event<F>(&self, handler: F) -> Subscription
	where
		F: Fn(&SessionEvent) + Send + Sync + 'static,
	{
		self.register(handler, EventMeta { once: true })
	}

	fn register<F>(&self, handler: F, meta: EventMeta) -> Subscription
	where
		F: Fn(&SessionEvent) + Send + Sync + 'static,
	{
		let id = next_handler_id();
		let handler: HandlerFn<SessionEvent> = Arc::new(handler);

		self.inner
			.handlers
			.lock()
			.insert(id, HandlerEntry { id, meta, handler });

		Subscription::from_handler_map(id, &self.inner.handlers)
	}

	/// Dispatches an event to all registered listeners, in registration
	/// order. No session lock is held here, so listeners may reenter the
	/// session.
	pub(crate) fn emit(&self, event: SessionEvent) {
		let handlers: Vec<HandlerFn<SessionEvent>> = {
			let mut map = self.inner.handlers.lock();
			let entries: Vec<_> = map.values().map(|e| (e.id, e.meta, e.handler.clone())).collect();
			for (id, meta, _) in &entries {
				if meta.once {
					map.shift_remove(id);
				}
			}
			entries.into_iter().map(|(_, _, h)| h).collect()
		};

		tracing::trace!(event = event.name(), listeners = handlers.len(), "emit");

		for handler in handlers {
			handler(&event);
		}
	}
}
