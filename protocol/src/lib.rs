//! Shared data model for the translation client and its backend.
//!
//! This crate provides:
//! - `TranslationRequest` / `TranslationResponse` - the job and its result
//! - `Settings` - user settings passed through to every request
//! - `Language` - the static language catalogue
//! - `ProviderId` - supported model providers and selectable models
//! - `wire` - the JSON-lines envelope spoken with an out-of-process backend

mod language;
mod provider;
mod settings;
mod translation;
pub mod wire;

pub use language::LANGUAGES;
pub use language::Language;
pub use provider::AVAILABLE_MODELS;
pub use provider::ModelInfo;
pub use provider::ProviderDef;
pub use provider::ProviderId;
pub use settings::DEFAULT_SYSTEM_PROMPT;
pub use settings::Settings;
pub use translation::SessionId;
pub use translation::TranslationRequest;
pub use translation::TranslationResponse;
