//! Event channel adapter.
//!
//! Registers one handler per translation event on an [`EventSource`] and
//! forwards decoded events into the translator's inbound queue. Handlers are
//! tied to an owning scope: once the scope is torn down no handler forwards
//! anything, and a subscription still being set up at that moment removes
//! whatever it managed to register.

use std::sync::Arc;

use serde_json::Value;
use simple_translate_protocol::TranslationResponse;
use simple_translate_protocol::wire::TRANSLATION_COMPLETE_EVENT;
use simple_translate_protocol::wire::TRANSLATION_ERROR_EVENT;
use simple_translate_protocol::wire::TRANSLATION_TOKEN_EVENT;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::error::EventChannelError;
use crate::events::EventHandler;
use crate::events::EventSource;
use crate::events::ListenerId;
use crate::events::RawEvent;
use crate::session::InboundEvent;
use crate::session::SessionEvent;

const SUBSCRIBED_EVENTS: [&str; 3] = [
    TRANSLATION_TOKEN_EVENT,
    TRANSLATION_COMPLETE_EVENT,
    TRANSLATION_ERROR_EVENT,
];

pub struct EventChannel {
    source: Arc<dyn EventSource>,
    sink: UnboundedSender<InboundEvent>,
    scope: CancellationToken,
    listeners: Vec<ListenerId>,
}

impl EventChannel {
    pub fn new(source: Arc<dyn EventSource>, sink: UnboundedSender<InboundEvent>) -> Self {
        Self::with_scope(source, sink, CancellationToken::new())
    }

    /// Use `scope` as the owning scope. Cancelling it tears the channel down.
    pub fn with_scope(
        source: Arc<dyn EventSource>,
        sink: UnboundedSender<InboundEvent>,
        scope: CancellationToken,
    ) -> Self {
        Self {
            source,
            sink,
            scope,
            listeners: Vec::new(),
        }
    }

    /// Token for the owning scope.
    pub fn scope(&self) -> CancellationToken {
        self.scope.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn is_torn_down(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Register the token, complete and error handlers.
    ///
    /// Any previous subscription is removed first. Fails with
    /// [`EventChannelError::TornDown`] if the scope is torn down before every
    /// handler is registered; nothing stays registered in that case.
    pub async fn subscribe(&mut self) -> Result<(), EventChannelError> {
        self.unsubscribe();

        for event in SUBSCRIBED_EVENTS {
            if self.scope.is_cancelled() {
                self.unsubscribe();
                return Err(EventChannelError::TornDown);
            }

            let handler = forwarding_handler(event, self.sink.clone(), self.scope.clone());
            let id = match self.source.listen(event, handler).await {
                Ok(id) => id,
                Err(err) => {
                    self.unsubscribe();
                    return Err(err);
                }
            };
            self.listeners.push(id);

            // Registration suspends; the scope may have gone away meanwhile.
            if self.scope.is_cancelled() {
                tracing::debug!(event, "scope torn down during subscribe");
                self.unsubscribe();
                return Err(EventChannelError::TornDown);
            }
        }

        tracing::debug!("subscribed to translation events");
        Ok(())
    }

    /// Remove every registered handler. Calling it again has no effect.
    pub fn unsubscribe(&mut self) {
        for id in self.listeners.drain(..) {
            self.source.unlisten(id);
        }
    }

    /// Tear down the owning scope and unsubscribe.
    pub fn teardown(&mut self) {
        self.scope.cancel();
        self.unsubscribe();
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn forwarding_handler(
    event: &'static str,
    sink: UnboundedSender<InboundEvent>,
    scope: CancellationToken,
) -> EventHandler {
    Arc::new(move |raw: RawEvent| {
        if scope.is_cancelled() {
            tracing::trace!(event, "dropping event after teardown");
            return;
        }
        let Some(decoded) = decode(event, raw.payload) else {
            return;
        };
        if sink
            .send(InboundEvent {
                session: raw.session,
                event: decoded,
            })
            .is_err()
        {
            tracing::trace!(event, "translator gone; dropping event");
        }
    })
}

fn decode(event: &str, payload: Value) -> Option<SessionEvent> {
    match event {
        TRANSLATION_TOKEN_EVENT => match payload {
            Value::String(token) => Some(SessionEvent::Token(token)),
            other => {
                tracing::warn!(event, payload = %other, "token payload is not a string");
                None
            }
        },
        TRANSLATION_COMPLETE_EVENT => {
            match serde_json::from_value::<TranslationResponse>(payload) {
                Ok(response) => Some(SessionEvent::Complete(response)),
                Err(err) => {
                    tracing::warn!(event, "malformed completion payload: {err}");
                    None
                }
            }
        }
        TRANSLATION_ERROR_EVENT => match payload {
            Value::String(message) => Some(SessionEvent::Error(message)),
            other => {
                tracing::warn!(event, payload = %other, "error payload is not a string");
                None
            }
        },
        _ => {
            tracing::warn!(event, "unexpected event name");
            None
        }
    }
}
