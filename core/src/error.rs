//! Translation error types.
//!
//! Every error that ends a session collapses into the single message shown to
//! the user (`StreamingTranslator::error`). Nothing here is retried
//! automatically; retrying is a user-initiated re-submission.

use thiserror::Error;

/// Request rejected before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Nothing to translate: source text is empty")]
    EmptyText,
}

/// The backend rejected the job or could not be reached to accept it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The provider needs an API key and none is configured.
    #[error("API key not configured. Please set your API key in Settings.")]
    MissingApiKey,

    /// The backend refused the job; the message is the backend's own.
    #[error("{0}")]
    Rejected(String),

    /// The job could not be delivered.
    #[error("Backend unavailable: {0}")]
    Transport(String),
}

/// Failure of a settings command. Reported to the settings view only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{0}")]
    Rejected(String),

    #[error("Backend unavailable: {0}")]
    Transport(String),

    #[error("Unexpected backend reply: {0}")]
    Parse(String),
}

/// Failure of the event channel adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventChannelError {
    /// The owning scope was torn down; nothing is registered.
    #[error("Event channel torn down")]
    TornDown,

    #[error("Event source error: {0}")]
    Source(String),
}

/// How a translation session ended, when it did not end in success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The backend accepted the job and later reported a failure.
    #[error("{0}")]
    Stream(String),

    /// A newer `translate()` call replaced this session.
    #[error("Translation superseded by a newer request")]
    Superseded,

    /// The translator was dropped before the session finished.
    #[error("Translation abandoned before completion")]
    Abandoned,
}
