use simple_translate_core::BackendError;
use simple_translate_core::DispatchError;
use thiserror::Error;

/// Stdio transport error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Failed to spawn backend \"{command}\": {message}")]
    Spawn { command: String, message: String },

    /// The backend's stdout closed; no further replies will arrive.
    #[error("Backend closed the connection")]
    Closed,

    #[error("Backend I/O error: {0}")]
    Io(String),

    /// The backend answered with an error message.
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected backend reply: {0}")]
    Parse(String),
}

impl From<ClientError> for DispatchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(message) => DispatchError::Rejected(message),
            other => DispatchError::Transport(other.to_string()),
        }
    }
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(message) => BackendError::Rejected(message),
            ClientError::Parse(message) => BackendError::Parse(message),
            other => BackendError::Transport(other.to_string()),
        }
    }
}
