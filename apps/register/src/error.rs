//! # Register Errors
//!
//! Error types for till commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Register                           │
//! │                                                                         │
//! │  Presentation layer           Rust Backend                              │
//! │  ──────────────────           ────────────                              │
//! │                                                                         │
//! │  record_sale(..)                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Till operation: RegisterResult<T>                               │  │
//! │  │         │                                                        │  │
//! │  │         ├── CoreError::NoActiveShift ──┐                         │  │
//! │  │         ├── DbError::QueryFailed ──────┤                         │  │
//! │  │         │                              ▼                         │  │
//! │  │         │                  RegisterError ──► ApiError ──────────►│  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NO_ACTIVE_SHIFT", "severity": "warning",                   │
//! │    "message": "No active shift: open a shift before ..." }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core returns structured errors; this module decides how each one is
//! shown: a machine-readable `code`, a `severity` tag and a message.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use caja_core::{CoreError, ValidationError};
use caja_db::DbError;

// =============================================================================
// Register Error
// =============================================================================

/// Errors raised by the till.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Domain rule or validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Workbook store or archive store failure.
    #[error(transparent)]
    Store(#[from] DbError),

    /// Configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ValidationError> for RegisterError {
    fn from(err: ValidationError) -> Self {
        RegisterError::Core(CoreError::Validation(err))
    }
}

/// Result type for till operations.
pub type RegisterResult<T> = Result<T, RegisterError>;

// =============================================================================
// API Error
// =============================================================================

/// Error shape handed to a presentation layer.
///
/// ```json
/// {
///   "code": "FORBIDDEN",
///   "severity": "error",
///   "message": "Operation not permitted"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// How prominently the presentation layer should show it
    pub severity: Severity,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Opening a shift without cashier, label or a positive float
    InvalidShiftParams,

    /// Guarded operation with no open shift
    NoActiveShift,

    /// Denomination outside the fixed set or non-positive count
    InvalidDenomination,

    /// Non-numeric, negative or oversized amount
    InvalidAmount,

    /// Missing or malformed field
    ValidationError,

    /// Wrong deletion passphrase
    Forbidden,

    /// Row position or artifact does not exist
    NotFound,

    /// An archive with the same name already exists
    ArchiveExists,

    /// Workbook store or archive store failed
    StoreError,

    /// Configuration could not be resolved
    ConfigError,
}

/// Severity tag for user-visible failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl ApiError {
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        ApiError {
            code,
            severity,
            message: message.into(),
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::new(code, Severity::Warning, message)
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::new(code, Severity::Error, message)
    }
}

/// Converts core errors to API errors.
///
/// Validation and lifecycle failures are warnings; `Forbidden` is an error.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidShiftParams { .. } => {
                ApiError::warning(ErrorCode::InvalidShiftParams, message)
            }
            CoreError::NoActiveShift => ApiError::warning(ErrorCode::NoActiveShift, message),
            CoreError::InvalidDenomination { .. } => {
                ApiError::warning(ErrorCode::InvalidDenomination, message)
            }
            CoreError::InvalidAmount { .. } => ApiError::warning(ErrorCode::InvalidAmount, message),
            CoreError::Validation(_) => ApiError::warning(ErrorCode::ValidationError, message),
            CoreError::Forbidden => ApiError::error(ErrorCode::Forbidden, message),
            CoreError::NotFound { .. } => ApiError::warning(ErrorCode::NotFound, message),
            CoreError::UnknownTable(table) => {
                error!(table = %table, "Workbook is missing a table");
                ApiError::error(ErrorCode::StoreError, message)
            }
        }
    }
}

/// Converts store errors to API errors.
///
/// Details of database failures are logged, not shown.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::warning(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::ArchiveExists(id) => ApiError::error(
                ErrorCode::ArchiveExists,
                format!("Archive already exists: {}", id),
            ),
            other => {
                error!(error = %other, "Store operation failed");
                ApiError::error(ErrorCode::StoreError, "Store operation failed")
            }
        }
    }
}

impl From<RegisterError> for ApiError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::Core(e) => e.into(),
            RegisterError::Store(e) => e.into(),
            RegisterError::Config(message) => {
                ApiError::error(ErrorCode::ConfigError, format!("Configuration error: {}", message))
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
