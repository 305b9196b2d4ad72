//! Model provider definitions.
//!
//! The backend performs the actual model call; the client only needs enough
//! to validate settings and to offer a model picker.

use serde::Deserialize;
use serde::Serialize;

/// Provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    #[default]
    OpenAI,
}

impl ProviderId {
    /// Get all provider IDs.
    pub const ALL: &'static [Self] = &[Self::OpenAI];

    /// Get the provider definition.
    pub fn definition(self) -> &'static ProviderDef {
        match self {
            Self::OpenAI => &OPENAI,
        }
    }

    /// Get provider ID from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }

    /// Convert to lowercase string identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition().name)
    }
}

/// Provider definition with default configuration.
#[derive(Debug)]
pub struct ProviderDef {
    pub id: ProviderId,
    /// Display name.
    pub name: &'static str,
    /// Default model name.
    pub default_model: &'static str,
    /// Whether API key is required.
    pub requires_api_key: bool,
}

static OPENAI: ProviderDef = ProviderDef {
    id: ProviderId::OpenAI,
    name: "OpenAI",
    default_model: "gpt-4.1-mini",
    requires_api_key: true,
};

/// A model offered in the settings picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
}

pub static AVAILABLE_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-5.2",
        name: "GPT-5.2",
    },
    ModelInfo {
        id: "gpt-4.1",
        name: "GPT-4.1",
    },
    ModelInfo {
        id: "gpt-4.1-mini",
        name: "GPT-4.1 Mini",
    },
    ModelInfo {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
    },
];
