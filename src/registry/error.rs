// ABOUTME: Errors returned by registry collaborator calls.
// ABOUTME: Distinguishes HTTP status failures from transport failures.

use hyper::StatusCode;

/// Errors from registry operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// The registry answered with a non-success status.
    #[error("registry returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl RegistryError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        RegistryError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(StatusCode::NOT_FOUND, message)
    }

    /// The HTTP status, if the registry responded at all.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            RegistryError::Status { status, .. } => Some(*status),
            RegistryError::Transport(_) => None,
        }
    }

    /// Whether the registry reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND)
    }
}
