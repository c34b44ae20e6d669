// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::auth::password::PasswordError;
use crate::services::catalog::CatalogError;
use crate::services::users::UserError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 401 Unauthorized (missing/invalid/expired/revoked token, insufficient privilege)
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (uniqueness violation, blocked delete)
    Conflict(String),

    // 422 Unprocessable Entity (cross-entity invariant violated)
    InvalidOperation(String),

    // 500 Internal Server Error
    ServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidOperation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InvalidOperation(msg)
            | ApiError::ServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InvalidOperation(_) => "INVALID_OPERATION",
            ApiError::ServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        ApiError::InvalidOperation(message.into())
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        ApiError::ServerError(message.into())
    }
}

// Convert service error types to ApiError
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::StoreNotFound => ApiError::not_found("Store not found."),
            CatalogError::ItemNotFound => ApiError::not_found("Item not found."),
            CatalogError::TagNotFound => ApiError::not_found("Tag not found."),
            CatalogError::StoreNameTaken => {
                ApiError::conflict("A store with that name already exists.")
            }
            CatalogError::TagNameTaken => {
                ApiError::conflict("A tag with that name already exists in that store.")
            }
            CatalogError::StoreMismatch => ApiError::invalid_operation(
                "Make sure item and tag belong to the same store before linking.",
            ),
            CatalogError::TagInUse => ApiError::conflict(
                "Could not delete tag. Make sure tag is not associated with any items, then try again.",
            ),
            CatalogError::EmptyName => ApiError::invalid_operation("Name must not be empty."),
            CatalogError::NegativePrice => {
                ApiError::invalid_operation("Price must not be negative.")
            }
            CatalogError::MissingStoreId => {
                ApiError::invalid_operation("A store_id is required when creating an item.")
            }
            CatalogError::Database(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Catalog database error: {}", e);
                ApiError::server_error("An error occurred while processing your request.")
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Taken => {
                ApiError::conflict("A user with that username or email already exists.")
            }
            UserError::Database(e) => {
                tracing::error!("User database error: {}", e);
                ApiError::server_error("An error occurred while processing your request.")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(msg) => {
                tracing::error!("Token signing error: {}", msg);
                ApiError::server_error("An error occurred while processing your request.")
            }
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::server_error("An error occurred while processing your request.")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
