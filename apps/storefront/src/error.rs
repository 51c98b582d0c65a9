//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Shell line ("add KLOW 2")                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Unknown SKU? ──── CoreError::ProductNotFound ─────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Wrong state? ─── CoreError::InvalidTransition ── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Shell prints "error [NOT_FOUND]: Product not found: KLOW"              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form field errors and a rejected coupon are not `ApiError`s. They come
//! back inside normal responses so the session carries on.

use serde::Serialize;

use biosynth_core::{AccessError, CoreError, ValidationError};
use biosynth_db::DbError;

/// API error returned from storefront commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: BPC5"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Storage operation failed
    StorageError,

    /// Action not allowed in the current checkout state
    InvalidState,

    /// Checkout started with an empty requisition
    EmptyRequisition,

    /// Document access code rejected
    AccessDenied,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Corrupt { key, reason } => {
                tracing::warn!(key = %key, reason = %reason, "Stored data is corrupt");
                ApiError::new(ErrorCode::StorageError, "Stored data could not be read")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Storage connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Storage migration failed")
            }
            DbError::PoolExhausted => ApiError::new(ErrorCode::StorageError, "Storage busy"),
            DbError::Serialization(e) | DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Storage operation failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::UnknownCountry(name) => ApiError::not_found("Country", &name),
            CoreError::CartEmpty => {
                ApiError::new(ErrorCode::EmptyRequisition, err.to_string())
            }
            CoreError::InvalidTransition { .. } => {
                ApiError::new(ErrorCode::InvalidState, err.to_string())
            }
            CoreError::Dataset { .. } | CoreError::HandoffUrl(_) => {
                tracing::error!(error = %err, "Internal storefront error");
                ApiError::internal(err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::new(ErrorCode::AccessDenied, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for storefront commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::ProductNotFound("BPC5".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: BPC5");

        let err: ApiError = CoreError::CartEmpty.into();
        assert_eq!(err.code, ErrorCode::EmptyRequisition);

        let err: ApiError = CoreError::transition("submitting", "cancel").into();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let err: ApiError = DbError::QueryFailed("no such table".into()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("no such table"));
    }

    #[test]
    fn test_serialized_shape() {
        let err: ApiError = AccessError::InvalidCode.into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ACCESS_DENIED");
        assert_eq!(json["message"], "Invalid access code");
    }
}
