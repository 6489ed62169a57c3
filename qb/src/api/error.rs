//! API client error types

use thiserror::Error;

use crate::domain::FormError;

/// Errors from talking to the quest backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid form: {0}")]
    Form(#[from] FormError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Plan generation failed: {0}")]
    PlanFailed(String),
}

impl ClientError {
    /// HTTP status of a server-side rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ApiError { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The backend answers 404 on `/game_state` until a plan exists
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Raised by the client before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::InvalidRequest(_) | ClientError::Form(_))
    }
}
