use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Errors surfaced as an HTTP status with a plain-text body.
///
/// Failures of the upload and of the partitioning script are not errors in this sense: they
/// are reported with status 200 and `success: false` in the JSON body.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Missing or malformed client input
    #[error("{message}")]
    BadRequest { message: String },

    /// Route exists but does not accept the request method
    #[error("Invalid request method")]
    MethodNotAllowed,

    /// Filesystem or other internal failure; `operation` is shown to the client verbatim
    #[error("{operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::MethodNotAllowed => self.to_string(),
            Error::Internal { operation } => operation.clone(),
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::BadRequest { .. } | Error::MethodNotAllowed => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
