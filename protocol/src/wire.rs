//! JSON-lines envelope spoken with an out-of-process backend.
//!
//! Every line written to the backend is a [`CommandEnvelope`]. Every line read
//! back is a [`BackendMessage`]: either the reply to an earlier command (same
//! `id`) or a pushed event.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::Settings;
use crate::TranslationRequest;
use crate::TranslationResponse;
use crate::translation::SessionId;

/// Incremental token; payload is a string.
pub const TRANSLATION_TOKEN_EVENT: &str = "translation_token";
/// Successful end of a job; payload is a `TranslationResponse`.
pub const TRANSLATION_COMPLETE_EVENT: &str = "translation_complete";
/// Failed job; payload is the error message.
pub const TRANSLATION_ERROR_EVENT: &str = "translation_error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: u64,
    #[serde(flatten)]
    pub command: BackendCommand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum BackendCommand {
    /// Accept a job. The reply only confirms acceptance.
    Translate {
        /// Echoed on the job's events by backends that support tagging.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<SessionId>,
        request: TranslationRequest,
        settings: Settings,
    },
    LoadSettings,
    SaveSettings {
        settings: Settings,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendMessage {
    Event(EventMessage),
    Reply(Reply),
}

/// Reply to the command with the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(message.into()),
        }
    }

    /// `error` wins over `result`; a reply with neither is a unit success.
    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// A pushed, name-addressed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(default)]
    pub payload: Value,
}

impl EventMessage {
    pub fn token(session: Option<SessionId>, token: impl Into<String>) -> Self {
        Self {
            event: TRANSLATION_TOKEN_EVENT.to_string(),
            session,
            payload: Value::String(token.into()),
        }
    }

    pub fn complete(session: Option<SessionId>, response: &TranslationResponse) -> Self {
        Self {
            event: TRANSLATION_COMPLETE_EVENT.to_string(),
            session,
            payload: serde_json::to_value(response).unwrap_or(Value::Null),
        }
    }

    pub fn error(session: Option<SessionId>, message: impl Into<String>) -> Self {
        Self {
            event: TRANSLATION_ERROR_EVENT.to_string(),
            session,
            payload: Value::String(message.into()),
        }
    }
}
