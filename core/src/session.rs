//! Lifecycle of a single streamed translation.
//!
//! A [`StreamingSession`] is created for every `translate()` call and is
//! replaced, never reused, by the next one. Tokens accumulate in arrival
//! order; the first terminal event (complete or error) ends the session and
//! resolves its [`PendingTranslation`].

use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use simple_translate_protocol::SessionId;
use simple_translate_protocol::TranslationResponse;
use tokio::sync::oneshot;

use crate::error::DispatchError;
use crate::error::TranslationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Requesting,
    Streaming,
    Complete,
    Errored,
}

impl SessionStatus {
    /// Requesting or streaming.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Requesting | Self::Streaming)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Errored)
    }
}

/// A decoded backend event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Token(String),
    Complete(TranslationResponse),
    Error(String),
}

/// An event on its way to the translator, with the session tag the backend
/// attached to it (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub session: Option<SessionId>,
    pub event: SessionEvent,
}

impl InboundEvent {
    pub fn untagged(event: SessionEvent) -> Self {
        Self {
            session: None,
            event,
        }
    }

    pub fn tagged(session: SessionId, event: SessionEvent) -> Self {
        Self {
            session: Some(session),
            event,
        }
    }
}

/// What applying one inbound event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// A token was appended.
    Token(String),
    /// The session completed; carries the final buffer.
    Completed(String),
    /// The session failed with this message.
    Failed(String),
    /// The event was tagged with a session that is no longer active.
    Stale(SessionId),
    /// No session was accepting events (idle or already finished).
    Ignored,
}

impl SessionUpdate {
    /// Whether the event changed session state.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Token(_) | Self::Completed(_) | Self::Failed(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

/// Result of a successful session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTranslation {
    /// The accumulated token buffer. Authoritative.
    pub text: String,
    /// The backend's completion payload. Informational only.
    pub response: TranslationResponse,
}

type Completion = oneshot::Sender<Result<CompletedTranslation, TranslationError>>;

#[derive(Debug, Default)]
pub struct StreamingSession {
    id: Option<SessionId>,
    status: SessionStatus,
    accumulated_text: String,
    error_message: Option<String>,
    completion: Option<Completion>,
}

impl StreamingSession {
    /// Start a session in `Requesting` with an empty buffer.
    pub fn begin(id: SessionId) -> (Self, PendingTranslation) {
        let (tx, rx) = oneshot::channel();
        let session = Self {
            id: Some(id),
            status: SessionStatus::Requesting,
            accumulated_text: String::new(),
            error_message: None,
            completion: Some(tx),
        };
        (session, PendingTranslation { session: id, rx })
    }

    pub fn id(&self) -> Option<SessionId> {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The backend accepted the job.
    pub fn mark_streaming(&mut self) {
        if self.status == SessionStatus::Requesting {
            self.status = SessionStatus::Streaming;
        }
    }

    /// Submission failed; the session ends without waiting for an event.
    pub fn fail_dispatch(&mut self, err: DispatchError) {
        if !self.status.is_active() {
            return;
        }
        self.status = SessionStatus::Errored;
        self.error_message = Some(err.to_string());
        self.resolve(Err(TranslationError::Dispatch(err)));
    }

    pub fn apply(&mut self, event: SessionEvent) -> SessionUpdate {
        if !self.status.is_active() {
            return SessionUpdate::Ignored;
        }
        match event {
            SessionEvent::Token(token) => {
                self.status = SessionStatus::Streaming;
                self.accumulated_text.push_str(&token);
                SessionUpdate::Token(token)
            }
            SessionEvent::Complete(response) => {
                self.status = SessionStatus::Complete;
                let text = self.accumulated_text.clone();
                self.resolve(Ok(CompletedTranslation {
                    text: text.clone(),
                    response,
                }));
                SessionUpdate::Completed(text)
            }
            SessionEvent::Error(message) => {
                self.status = SessionStatus::Errored;
                self.error_message = Some(message.clone());
                self.resolve(Err(TranslationError::Stream(message.clone())));
                SessionUpdate::Failed(message)
            }
        }
    }

    /// Resolve the pending completion with `Superseded`, if still open.
    pub fn supersede(&mut self) {
        self.resolve(Err(TranslationError::Superseded));
    }

    pub fn clear_text(&mut self) {
        self.accumulated_text.clear();
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    fn resolve(&mut self, result: Result<CompletedTranslation, TranslationError>) {
        if let Some(tx) = self.completion.take() {
            // The caller may have dropped its handle.
            let _ = tx.send(result);
        }
    }
}

/// Resolves when the session's terminal event is applied.
///
/// Resolves with [`TranslationError::Superseded`] when a newer session
/// replaces this one first, and with [`TranslationError::Abandoned`] when the
/// translator is dropped.
#[derive(Debug)]
pub struct PendingTranslation {
    session: SessionId,
    rx: oneshot::Receiver<Result<CompletedTranslation, TranslationError>>,
}

impl PendingTranslation {
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Non-blocking check. `None` while the session is still running.
    pub fn try_result(&mut self) -> Option<Result<CompletedTranslation, TranslationError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(TranslationError::Abandoned)),
        }
    }
}

impl Future for PendingTranslation {
    type Output = Result<CompletedTranslation, TranslationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TranslationError::Abandoned)))
    }
}
