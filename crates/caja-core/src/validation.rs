//! # Validation Module
//!
//! Input validation utilities for the till.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation layer                                           │
//! │  ├── Form fields arrive as text ("$12.345")                            │
//! │  └── parse_amount() turns them into Money                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Entry builders (entries.rs)                                  │
//! │  └── THIS MODULE: required text, non-negative amounts                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Workbook                                                     │
//! │  └── Only rows that passed layers 1-2 are appended                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::validation::{parse_amount, validate_required};
//!
//! assert_eq!(parse_amount("$12.345").unwrap().pesos(), 12_345);
//! assert_eq!(validate_required("reason", "  gas  ").unwrap(), "gas");
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use caja_core::validation::validate_required;
///
/// assert!(validate_required("courier", "Juan").is_ok());
/// assert!(validate_required("courier", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects negative amounts. Zero is allowed (e.g. a sale with no tip).
pub fn validate_non_negative(field: &str, amount: Money) -> CoreResult<Money> {
    if amount.is_negative() {
        return Err(CoreError::negative_amount(field));
    }
    Ok(amount)
}

/// Parses a currency string typed at the till.
///
/// ## Rules
/// - `$`, `.`, `,` and whitespace are stripped (`.` is the thousands
///   separator in the till's locale, and pesos have no decimals)
/// - An empty field reads as zero
/// - Non-numeric or negative input is `InvalidAmount`
///
/// ## Example
/// ```rust
/// use caja_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("$12.345").unwrap().pesos(), 12_345);
/// assert_eq!(parse_amount("12,345").unwrap().pesos(), 12_345);
/// assert_eq!(parse_amount(" 500 ").unwrap().pesos(), 500);
/// assert_eq!(parse_amount("").unwrap().pesos(), 0);
/// assert!(parse_amount("abc").is_err());
/// assert!(parse_amount("-500").is_err());
/// ```
pub fn parse_amount(text: &str) -> CoreResult<Money> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '.' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(Money::zero());
    }

    let pesos: i64 = cleaned.parse().map_err(|_| CoreError::InvalidAmount {
        field: "amount".to_string(),
        reason: format!("'{}' is not a number", text.trim()),
    })?;

    validate_non_negative("amount", Money::from_pesos(pesos))
}

/// Parses a plain count (denomination quantities). Commas are ignored.
pub fn parse_count(text: &str) -> CoreResult<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(0);
    }

    cleaned.parse().map_err(|_| {
        CoreError::Validation(ValidationError::InvalidFormat {
            field: "count".to_string(),
            reason: format!("'{}' is not a whole number", text.trim()),
        })
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("reason", " gas ").unwrap(), "gas");
        assert!(matches!(
            validate_required("reason", ""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("tip", Money::zero()).is_ok());
        assert!(validate_non_negative("tip", Money::from_pesos(100)).is_ok());
        assert!(matches!(
            validate_non_negative("tip", Money::from_pesos(-1)),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_parse_amount_strips_formatting() {
        assert_eq!(parse_amount("$12.345").unwrap(), Money::from_pesos(12_345));
        assert_eq!(parse_amount("$ 1.000.000").unwrap(), Money::from_pesos(1_000_000));
        assert_eq!(parse_amount("500").unwrap(), Money::from_pesos(500));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("doce mil"),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount("-$300"),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12").unwrap(), 12);
        assert_eq!(parse_count("1,200").unwrap(), 1200);
        assert_eq!(parse_count("").unwrap(), 0);
        assert!(parse_count("x").is_err());
    }
}
