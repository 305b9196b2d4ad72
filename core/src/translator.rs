//! Streaming translation coordinator.
//!
//! The translator owns the active [`StreamingSession`] and the inbound event
//! queue. Each `translate()` call mints a new [`SessionId`]; events tagged
//! with any other id are dropped so a superseded job can never write into the
//! current buffer.

use simple_translate_protocol::SessionId;
use simple_translate_protocol::Settings;
use simple_translate_protocol::TranslationRequest;
use tokio::sync::mpsc;

use crate::dispatcher::RequestDispatcher;
use crate::error::TranslationError;
use crate::error::ValidationError;
use crate::session::InboundEvent;
use crate::session::PendingTranslation;
use crate::session::SessionStatus;
use crate::session::SessionUpdate;
use crate::session::StreamingSession;

pub struct StreamingTranslator {
    dispatcher: RequestDispatcher,
    session: StreamingSession,
    /// Last minted session id; ids start at 1.
    session_seq: SessionId,
    /// Log dropped stale events at warn instead of debug.
    log_stale_events: bool,
    events_tx: mpsc::UnboundedSender<InboundEvent>,
    events_rx: mpsc::UnboundedReceiver<InboundEvent>,
}

impl StreamingTranslator {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            dispatcher,
            session: StreamingSession::default(),
            session_seq: SessionId::new(0),
            log_stale_events: false,
            events_tx,
            events_rx,
        }
    }

    pub fn with_stale_event_logging(mut self, enabled: bool) -> Self {
        self.log_stale_events = enabled;
        self
    }

    /// Sender for the inbound queue; hand it to an [`crate::EventChannel`].
    pub fn event_sender(&self) -> mpsc::UnboundedSender<InboundEvent> {
        self.events_tx.clone()
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Start a new session for `request`.
    ///
    /// Whitespace-only text is rejected without touching any state. Otherwise
    /// the previous session is superseded, the new one enters `Requesting`
    /// with an empty buffer, and the request is submitted. If submission
    /// fails the session is already `Errored` when this returns.
    ///
    /// The returned future resolves when the session's terminal event is
    /// applied by [`Self::process_next`] or [`Self::drain_events`].
    pub async fn translate(
        &mut self,
        request: TranslationRequest,
        settings: &Settings,
    ) -> Result<PendingTranslation, TranslationError> {
        if !request.has_text() {
            return Err(ValidationError::EmptyText.into());
        }

        // Queued events belong to the outgoing session.
        self.drain_events();

        self.session_seq = self.session_seq.next();
        let id = self.session_seq;
        let (session, pending) = StreamingSession::begin(id);
        let mut previous = std::mem::replace(&mut self.session, session);
        if previous.status().is_active() {
            tracing::info!(previous = ?previous.id(), session = %id, "superseding translation");
        }
        previous.supersede();

        tracing::info!(
            session = %id,
            source = %request.source_language,
            target = %request.target_language,
            "starting translation"
        );

        match self.dispatcher.submit(id, &request, settings).await {
            Ok(()) => {
                self.session.mark_streaming();
                Ok(pending)
            }
            Err(err) => {
                tracing::warn!(session = %id, "translation dispatch failed: {err}");
                self.session.fail_dispatch(err.clone());
                Err(TranslationError::Dispatch(err))
            }
        }
    }

    /// Wait for the next inbound event and apply it.
    ///
    /// Returns `None` only when every sender is gone, which cannot happen
    /// while the translator holds its own.
    pub async fn process_next(&mut self) -> Option<SessionUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    /// Apply every queued event without waiting.
    pub fn drain_events(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            updates.push(self.apply(event));
        }
        updates
    }

    /// Apply one inbound event to the active session.
    pub fn apply(&mut self, event: InboundEvent) -> SessionUpdate {
        if let Some(tag) = event.session
            && Some(tag) != self.session.id()
        {
            if self.log_stale_events {
                tracing::warn!(session = %tag, active = ?self.session.id(), "dropping stale event");
            } else {
                tracing::debug!(session = %tag, active = ?self.session.id(), "dropping stale event");
            }
            return SessionUpdate::Stale(tag);
        }

        let update = self.session.apply(event.event);
        match &update {
            SessionUpdate::Token(token) => {
                tracing::debug!(session = ?self.session.id(), len = token.len(), "token");
            }
            SessionUpdate::Completed(text) => {
                tracing::info!(session = ?self.session.id(), len = text.len(), "translation complete");
            }
            SessionUpdate::Failed(message) => {
                tracing::info!(session = ?self.session.id(), "translation failed: {message}");
            }
            SessionUpdate::Ignored => {
                tracing::debug!(status = ?self.session.status(), "no active session; event ignored");
            }
            SessionUpdate::Stale(_) => {}
        }
        update
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.id()
    }

    /// Requesting or streaming.
    pub fn translating(&self) -> bool {
        self.session.status().is_active()
    }

    pub fn streaming_text(&self) -> &str {
        self.session.accumulated_text()
    }

    pub fn error(&self) -> Option<&str> {
        self.session.error_message()
    }

    /// Empty the buffer. Status is unchanged.
    pub fn clear_text(&mut self) {
        self.session.clear_text();
    }

    pub fn clear_error(&mut self) {
        self.session.clear_error();
    }
}
