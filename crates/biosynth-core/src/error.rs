//! # Error Types
//!
//! Domain-specific error types for biosynth-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  biosynth-core errors (this file)                                      │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input / configuration validation failures      │
//! │                                                                         │
//! │  biosynth-db errors (separate crate)                                   │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  storefront errors (in app)                                            │
//! │  └── ApiError         - What the front-end sees (code + message)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front-end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout form problems are NOT errors in this sense: they come back as a
//! field-keyed map from [`crate::validation::validate_form`] so the page can
//! render them inline.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No catalog entry carries this SKU.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Destination is not in the shipping table.
    #[error("Unknown shipping destination: {0}")]
    UnknownCountry(String),

    /// Checkout was requested with nothing in the requisition.
    #[error("Requisition is empty")]
    CartEmpty,

    /// The checkout flow cannot perform `action` from its current state.
    ///
    /// ## When This Occurs
    /// - Submitting while the shipping warning is still open
    /// - Cancelling after the hand-off already happened
    #[error("Cannot {action} while checkout is {state}")]
    InvalidTransition { state: String, action: String },

    /// An embedded dataset failed to parse.
    #[error("Invalid {dataset} dataset: {reason}")]
    Dataset { dataset: String, reason: String },

    /// The outbound hand-off link could not be built.
    #[error("Invalid hand-off link: {0}")]
    HandoffUrl(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidTransition error.
    pub fn transition(state: impl Into<String>, action: impl Into<String>) -> Self {
        CoreError::InvalidTransition {
            state: state.into(),
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation of quantities, search queries, rates and
/// configuration values before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., phone number with symbols).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two coupons with the same code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
