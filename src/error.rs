//! Service-level errors and their mapping onto HTTP responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{dao::storage::StorageError, integrations::IntegrationError, state::BoardError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The board refused the action; its state is unchanged.
    #[error(transparent)]
    Rejected(#[from] BoardError),
    /// A collaborator needed to answer the request failed.
    #[error("collaborator failure: {0}")]
    Integration(#[from] IntegrationError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("{message}")]
    NotFound {
        /// Text shown to the client.
        message: String,
        /// Stable reason code, when the board supplied one.
        code: Option<&'static str>,
    },
    /// Conflict with current board state.
    #[error("{message}")]
    Conflict {
        /// Text shown to the client.
        message: String,
        /// Stable reason code, when the board supplied one.
        code: Option<&'static str>,
    },
    /// Well-formed request carrying values the board cannot accept.
    #[error("{message}")]
    Unprocessable {
        /// Text shown to the client.
        message: String,
        /// Stable reason code.
        code: &'static str,
    },
    /// A collaborator failed.
    #[error("bad gateway: {0}")]
    BadGateway(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict {
                message,
                code: None,
            },
            ServiceError::NotFound(message) => AppError::NotFound {
                message,
                code: None,
            },
            ServiceError::Rejected(err) => err.into(),
            ServiceError::Integration(err) => AppError::BadGateway(err.to_string()),
        }
    }
}

impl From<BoardError> for AppError {
    fn from(err: BoardError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            BoardError::CourtNotFound(_) | BoardError::PlayerNotFound(_) => AppError::NotFound {
                message,
                code: Some(code),
            },
            BoardError::InvalidScore(_)
            | BoardError::EmptyGuestName
            | BoardError::SlotOutOfRange(_)
            | BoardError::PoolIndexOutOfRange { .. } => AppError::Unprocessable { message, code },
            _ => AppError::Conflict {
                message,
                code: Some(code),
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl AppError {
    fn code(&self) -> Option<&'static str> {
        match self {
            AppError::NotFound { code, .. } | AppError::Conflict { code, .. } => *code,
            AppError::Unprocessable { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            code: self.code(),
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
