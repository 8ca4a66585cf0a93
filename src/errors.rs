//! Unified error type for the product service.
//!
//! Storage and configuration code returns [`Error`] directly; the HTTP layer turns
//! it into a response through [`IntoResponse`], so handlers can use `?` end to end.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Everything that can go wrong in the service, from startup to a single request.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Any failure reported by the store
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The store could not be opened at startup
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// Socket or file failures outside the store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No active product carries the given identifier
    #[error("Product with ID {id} not found")]
    ProductNotFound { id: i64 },

    /// Product fields that fail validation (e.g. a negative price)
    #[error("Invalid product: {message}")]
    InvalidProduct { message: String },

    /// Malformed request input such as unparseable JSON or a non-numeric id
    #[error("{message}")]
    BadRequest { message: String },

    /// Something the service expected to be present was not
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

impl Error {
    /// HTTP status a request failing with this error answers with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::InvalidProduct { .. } => StatusCode::BAD_REQUEST,
            Self::ProductNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Config { .. }
            | Self::StorageUnavailable { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a client; server-side details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                message: self.user_message(),
            }),
        )
            .into_response()
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::BadRequest {
                message: "bad".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::ProductNotFound { id: 7 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::StorageUnavailable {
                message: "gone".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = Error::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        assert_eq!(err.user_message(), "Internal server error");

        let err = Error::ProductNotFound { id: 42 };
        assert_eq!(err.user_message(), "Product with ID 42 not found");
    }
}
