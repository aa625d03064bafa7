//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caja-core errors (this file)                                          │
//! │  ├── CoreError        - Shift lifecycle and entry rule violations      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  caja-db errors (separate crate)                                       │
//! │  └── DbError          - Store and archive failures                     │
//! │                                                                         │
//! │  Register errors (in app)                                              │
//! │  └── ApiError         - code + severity + message for the caller       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RegisterError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is raised before any mutation of the workbook, so a
//! failed call never leaves a partial write behind.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Opening a shift with missing cashier/label or a non-positive float.
    #[error("Invalid shift parameters: {reason}")]
    InvalidShiftParams { reason: String },

    /// A guarded operation was attempted while no shift is open.
    ///
    /// ## When This Occurs
    /// ```text
    /// record_sale()
    ///      │
    ///      ▼
    /// ShiftState::require_open()
    ///      │
    ///      ├── Open    → continue
    ///      └── Closed  → NoActiveShift (nothing is written)
    /// ```
    #[error("No active shift: open a shift before recording entries")]
    NoActiveShift,

    /// Denomination outside the fixed set, or a non-positive count.
    #[error("Invalid denomination count: value {value}, count {count}")]
    InvalidDenomination { value: i64, count: i64 },

    /// Amount is non-numeric or negative where it must not be.
    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: String, reason: String },

    /// Deletion passphrase did not match the configured policy.
    #[error("Operation not permitted")]
    Forbidden,

    /// Row position outside `2..=max_row` of the table.
    #[error("No row at position {position} in '{table}'")]
    NotFound { table: String, position: usize },

    /// Table is missing from the workbook.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidAmount error for a negative value.
    pub fn negative_amount(field: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: "must not be negative".to_string(),
        }
    }

    /// An amount or running total that does not fit in `Money`.
    pub fn amount_too_large(field: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: "is too large".to_string(),
        }
    }

    /// Creates a NotFound error for a row position.
    pub fn row_not_found(table: impl Into<String>, position: usize) -> Self {
        CoreError::NotFound {
            table: table.into(),
            position,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the entry builders before anything touches the workbook.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
