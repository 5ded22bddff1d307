use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::AuthError;

/// Localized messages surfaced to admin panel users.
pub mod messages {
    pub const ACCESS_DENIED: &str = "Brak dostępu";
    pub const INVALID_STATUS: &str = "Nieprawidłowy status";
    pub const ORDER_NOT_FOUND: &str = "Nie znaleziono zamówienia";
    pub const PRODUCT_NOT_FOUND: &str = "Nie znaleziono produktu";
    pub const NOT_FOUND: &str = "Nie znaleziono";
    pub const INTERNAL: &str = "Błąd serwera";
    pub const CREATED: &str = "Utworzono";
    pub const UPDATED: &str = "Zaktualizowano";
    pub const DELETED: &str = "Usunięto";
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message placed in the response body. Persistence and internal
    /// failures never leak their details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => messages::INTERNAL.to_string(),
            Self::NotFound(msg) | Self::InvalidInput(msg) | Self::Forbidden(msg) => msg.clone(),
        }
    }
}

/// Callers without an admin identity all get the same 403, whatever the reason.
impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => ServiceError::DatabaseError(e),
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::UnknownUser
            | AuthError::NotAdmin => ServiceError::Forbidden(messages::ACCESS_DENIED.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            let request_id = crate::telemetry::current_request_id();
            error!(
                error = %self,
                request_id = request_id.as_ref().map(|rid| rid.as_str()),
                "request failed"
            );
        }

        let body = ErrorResponse {
            error: self.response_message(),
        };

        (status, Json(body)).into_response()
    }
}
