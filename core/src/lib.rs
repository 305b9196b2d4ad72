//! Streaming translation coordinator.
//!
//! This crate provides:
//! - `EventChannel` - subscribes to the backend's token/complete/error events
//! - `StreamingTranslator` - the session state machine and its event loop
//! - `RequestDispatcher` - submits jobs to a `TranslationBackend`
//! - `TranslationContext` - shared source/target text and languages
//! - `SettingsState` - settings loaded from and saved through the backend
//! - `TranslationController` - translate-view glue over the above
//! - `ClientConfig` - client configuration (`~/.simple-translate/config.toml`)

mod channel;
mod config;
mod context;
mod controller;
mod dispatcher;
pub mod error;
mod events;
mod session;
mod settings;
mod translator;

pub use channel::EventChannel;
pub use config::ClientConfig;
pub use context::TranslationContext;
pub use context::TranslationState;
pub use controller::TranslationController;
pub use dispatcher::RequestDispatcher;
pub use dispatcher::TranslationBackend;
pub use error::BackendError;
pub use error::DispatchError;
pub use error::EventChannelError;
pub use error::TranslationError;
pub use error::ValidationError;
pub use events::EventBus;
pub use events::EventHandler;
pub use events::EventSource;
pub use events::ListenerId;
pub use events::RawEvent;
pub use session::CompletedTranslation;
pub use session::InboundEvent;
pub use session::PendingTranslation;
pub use session::SessionEvent;
pub use session::SessionStatus;
pub use session::SessionUpdate;
pub use session::StreamingSession;
pub use settings::SettingsState;
pub use translator::StreamingTranslator;
