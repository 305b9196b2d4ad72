//! Name-addressed event sources.
//!
//! A backend pushes events by name (`translation_token`, ...). An
//! [`EventSource`] lets the client register a handler per name and remove it
//! again; [`EventBus`] is the in-process implementation that transports emit
//! into.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use simple_translate_protocol::SessionId;
use simple_translate_protocol::wire::EventMessage;

use crate::error::EventChannelError;

/// Handle returned by [`EventSource::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An event as delivered to a handler: the raw payload plus the session tag,
/// when the backend supplied one.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub session: Option<SessionId>,
    pub payload: Value,
}

impl From<EventMessage> for RawEvent {
    fn from(message: EventMessage) -> Self {
        Self {
            session: message.session,
            payload: message.payload,
        }
    }
}

pub type EventHandler = Arc<dyn Fn(RawEvent) + Send + Sync>;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Register `handler` for events named `event`. Registration may suspend.
    async fn listen(
        &self,
        event: &str,
        handler: EventHandler,
    ) -> Result<ListenerId, EventChannelError>;

    /// Remove a handler. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);
}

struct Listener {
    id: ListenerId,
    handler: EventHandler,
}

/// In-process event source.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `raw` to every handler registered for `event`, in registration
    /// order. Returns how many handlers ran.
    pub fn emit(&self, event: &str, raw: RawEvent) -> usize {
        // Handlers run outside the lock so they may register or unregister.
        let handlers: Vec<EventHandler> = self
            .lock()
            .get(event)
            .map(|listeners| listeners.iter().map(|l| Arc::clone(&l.handler)).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::trace!(event, "no listeners for event");
        }
        for handler in &handlers {
            handler(raw.clone());
        }
        handlers.len()
    }

    pub fn emit_message(&self, message: EventMessage) -> usize {
        let event = message.event.clone();
        self.emit(&event, message.into())
    }

    /// Total number of registered handlers.
    pub fn listener_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EventSource for EventBus {
    async fn listen(
        &self,
        event: &str,
        handler: EventHandler,
    ) -> Result<ListenerId, EventChannelError> {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(event.to_string())
            .or_default()
            .push(Listener { id, handler });
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) {
        let mut listeners = self.lock();
        for entries in listeners.values_mut() {
            entries.retain(|l| l.id != id);
        }
        listeners.retain(|_, entries| !entries.is_empty());
    }
}
