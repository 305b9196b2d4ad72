//! User settings.
//!
//! The backend owns persistence; the client only reads these values and
//! passes them through with every translation request.

use serde::Deserialize;
use serde::Serialize;

use crate::provider::ProviderId;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert translator. Your goal is to preserve the semantic meaning and contextual nuance of the source text rather than providing a word-for-word literal translation. Consider cultural context, idiomatic expressions, and the intended tone of the original text. Produce a natural, fluent translation that a native speaker would find authentic and easy to understand.";

/// Settings supplied by the settings collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Provider identifier (e.g., "openai").
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_source_language")]
    pub default_source_language: String,

    #[serde(default = "default_target_language")]
    pub default_target_language: String,
}

fn default_model() -> String {
    ProviderId::default().definition().default_model.to_string()
}

fn default_provider() -> String {
    ProviderId::default().as_str().to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: default_provider(),
            system_prompt: default_system_prompt(),
            default_source_language: default_source_language(),
            default_target_language: default_target_language(),
        }
    }
}

impl Settings {
    /// Get the effective provider ID, falling back to the default provider.
    pub fn effective_provider(&self) -> ProviderId {
        ProviderId::from_str(&self.provider).unwrap_or_default()
    }

    /// Get the effective API key.
    pub fn effective_api_key(&self) -> Option<&str> {
        Some(self.api_key.trim()).filter(|k| !k.is_empty())
    }

    /// Get the effective model name.
    pub fn effective_model(&self) -> &str {
        Some(self.model.as_str())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.effective_provider().definition().default_model)
    }

    /// Whether the provider can be called with these settings.
    pub fn is_valid(&self) -> bool {
        !self.effective_provider().definition().requires_api_key
            || self.effective_api_key().is_some()
    }
}
