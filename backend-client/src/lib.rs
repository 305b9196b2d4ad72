//! Stdio transport to an out-of-process translation backend.
//!
//! [`StdioBackend`] implements `TranslationBackend` over JSON lines on a
//! child process's stdin/stdout and re-emits the backend's events on an
//! `EventBus` for the event channel to subscribe to.

mod client;
mod error;

pub use client::StdioBackend;
pub use error::ClientError;
