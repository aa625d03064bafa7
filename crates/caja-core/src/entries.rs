//! # Entry Recorder Rules
//!
//! Validation and row building for every entry type, plus the positional
//! mutations (edit/delete) applied to an in-memory [`Workbook`].
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register command                                                       │
//! │       │                                                                 │
//! │       ├── 1. ShiftState::require_open()   (guard, no I/O yet)           │
//! │       ├── 2. load workbook                                              │
//! │       ├── 3. build_*()  ◄── THIS MODULE: validate + derive fields       │
//! │       ├── 4. schema::append()                                           │
//! │       └── 5. save workbook                                              │
//! │                                                                         │
//! │  Any error in 1-3 returns before the document is touched.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::schema::{self, TableRow, DELETED_SALES, DELETED_SALES_HEADER, EXPENSES, NO_REASON};
use crate::types::{
    Complimentary, CountPurpose, DeletedSale, Delivery, Denomination, DenominationCount, Expense,
    PaymentMethod, Positioned, SaleLeg, Shrinkage,
};
use crate::validation::{validate_non_negative, validate_required};
use crate::workbook::{cell_at, Cell, Workbook};

// =============================================================================
// Sales
// =============================================================================

/// One payment leg as entered at the till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegInput {
    pub method: String,
    pub amount: Money,
    #[serde(default)]
    pub tip: Money,
}

impl LegInput {
    pub fn new(method: impl Into<String>, amount: Money, tip: Money) -> Self {
        LegInput {
            method: method.into(),
            amount,
            tip,
        }
    }
}

/// Rows produced for one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedSale {
    pub ticket_number: String,
    pub legs: Vec<SaleLeg>,
    /// Sum of every leg's `amount + tip`.
    pub grand_total: Money,
}

/// Builds the sale-leg rows for one ticket.
///
/// ## Rules
/// - ticket number is required (trimmed)
/// - at least one leg
/// - amount and tip are non-negative
/// - every leg total and the grand total must fit in `Money`
/// - method is stored trimmed and lowercased; unknown methods are kept
///   as-is and ignored later by the engine
/// - the authorization code is stored only on debit and credit legs
///
/// ## Example
/// ```rust
/// use caja_core::entries::{build_sale, LegInput};
/// use caja_core::Money;
///
/// let sale = build_sale(
///     "42",
///     "AUTH9",
///     &[
///         LegInput::new("debito", Money::from_pesos(1000), Money::from_pesos(100)),
///         LegInput::new("efectivo", Money::from_pesos(500), Money::zero()),
///     ],
///     "2026-10-19 13:00:00",
/// )
/// .unwrap();
///
/// assert_eq!(sale.grand_total.pesos(), 1600);
/// assert_eq!(sale.legs[0].auth_code, "AUTH9");
/// assert_eq!(sale.legs[1].auth_code, "");
/// ```
pub fn build_sale(
    ticket_number: &str,
    auth_code: &str,
    legs: &[LegInput],
    recorded_at: &str,
) -> CoreResult<RecordedSale> {
    let ticket_number = validate_required("ticket number", ticket_number)?;
    if legs.is_empty() {
        return Err(ValidationError::Required {
            field: "payment legs".to_string(),
        }
        .into());
    }

    let auth_code = auth_code.trim();
    let mut rows = Vec::with_capacity(legs.len());
    let mut grand_total = Money::zero();

    for leg in legs {
        let amount = validate_non_negative("amount", leg.amount)?;
        let tip = validate_non_negative("tip", leg.tip)?;
        let method = leg.method.trim().to_lowercase();
        let keeps_auth = PaymentMethod::parse(&method).map_or(false, PaymentMethod::keeps_auth_code);
        let total = amount
            .checked_add(tip)
            .ok_or_else(|| CoreError::amount_too_large("sale leg"))?;
        grand_total = grand_total
            .checked_add(total)
            .ok_or_else(|| CoreError::amount_too_large("sale total"))?;

        rows.push(SaleLeg {
            recorded_at: recorded_at.to_string(),
            auth_code: if keeps_auth { auth_code.to_string() } else { String::new() },
            ticket_number: ticket_number.clone(),
            method,
            amount,
            tip,
            total,
        });
    }

    Ok(RecordedSale {
        ticket_number,
        legs: rows,
        grand_total,
    })
}

// =============================================================================
// Deliveries
// =============================================================================

/// The floor fee to store for a new delivery.
///
/// Zero when any prior delivery for the same courier (trimmed,
/// case-insensitive) already carries a nonzero floor fee.
pub fn effective_floor_fee(courier: &str, requested: Money, prior: &[Delivery]) -> Money {
    let key = courier.trim().to_lowercase();
    let already_charged = prior
        .iter()
        .any(|d| d.courier.trim().to_lowercase() == key && !d.floor_fee.is_zero());
    if already_charged {
        Money::zero()
    } else {
        requested
    }
}

/// A built delivery row, plus whether the requested floor fee was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedDelivery {
    pub delivery: Delivery,
    pub floor_fee_waived: bool,
}

pub fn build_delivery(
    courier: &str,
    address: &str,
    amount: Money,
    floor_fee: Money,
    prior: &[Delivery],
    recorded_at: &str,
) -> CoreResult<RecordedDelivery> {
    let courier = validate_required("courier", courier)?;
    let amount = validate_non_negative("amount", amount)?;
    let requested = validate_non_negative("floor fee", floor_fee)?;
    let floor_fee = effective_floor_fee(&courier, requested, prior);

    Ok(RecordedDelivery {
        floor_fee_waived: floor_fee != requested,
        delivery: Delivery {
            recorded_at: recorded_at.to_string(),
            courier,
            address: address.trim().to_string(),
            amount,
            floor_fee,
        },
    })
}

// =============================================================================
// Cash Outflows
// =============================================================================

pub fn build_expense(
    reason: &str,
    amount: Money,
    receipt_ref: &str,
    recorded_at: &str,
) -> CoreResult<Expense> {
    Ok(Expense {
        recorded_at: recorded_at.to_string(),
        reason: validate_required("reason", reason)?,
        amount: validate_non_negative("amount", amount)?,
        receipt_ref: receipt_ref.trim().to_string(),
    })
}

pub fn build_shrinkage(reason: &str, amount: Money, recorded_at: &str) -> CoreResult<Shrinkage> {
    Ok(Shrinkage {
        recorded_at: recorded_at.to_string(),
        reason: validate_required("reason", reason)?,
        amount: validate_non_negative("amount", amount)?,
    })
}

pub fn build_complimentary(
    amount: Money,
    reason: &str,
    recorded_at: &str,
) -> CoreResult<Complimentary> {
    Ok(Complimentary {
        recorded_at: recorded_at.to_string(),
        amount: validate_non_negative("amount", amount)?,
        reason: validate_required("reason", reason)?,
    })
}

/// Builds a denomination count; `total = value × count`.
///
/// Fails with `InvalidDenomination` when the value is outside the fixed
/// set, the count is not positive, or the total would overflow.
pub fn build_denomination(
    value: i64,
    count: i64,
    purpose: CountPurpose,
    recorded_at: &str,
) -> CoreResult<DenominationCount> {
    let invalid = || CoreError::InvalidDenomination { value, count };
    let denomination = Denomination::from_pesos(value)
        .filter(|_| count > 0)
        .ok_or_else(invalid)?;
    let total = denomination.value().checked_mul(count).ok_or_else(invalid)?;

    Ok(DenominationCount {
        recorded_at: recorded_at.to_string(),
        value: denomination.pesos(),
        count,
        total,
        purpose,
    })
}

// =============================================================================
// Positional Mutations
// =============================================================================

/// Rewrites reason, amount and receipt of the expense at `position`.
/// The recorded timestamp is kept.
pub fn apply_expense_edit(
    wb: &mut Workbook,
    position: usize,
    reason: &str,
    amount: Money,
    receipt_ref: &str,
) -> CoreResult<Positioned<Expense>> {
    let reason = validate_required("reason", reason)?;
    let amount = validate_non_negative("amount", amount)?;
    wb.row(EXPENSES, position)?;

    wb.update_cell(EXPENSES, position, 2, reason.into())?;
    wb.update_cell(EXPENSES, position, 3, amount.into())?;
    wb.update_cell(EXPENSES, position, 4, receipt_ref.trim().into())?;

    schema::read_row::<Expense>(wb, position)
}

/// Moves the sale leg at `position` into the deleted-sales table.
///
/// The deleted-sales table is created on first use. Cells missing from a
/// short row are archived as `-` (text) or 0 (amounts).
pub fn remove_sale(
    wb: &mut Workbook,
    position: usize,
    reason: &str,
    deleted_at: &str,
) -> CoreResult<DeletedSale> {
    let row = wb.row(SaleLeg::TABLE, position)?.to_vec();

    let text_or_dash = |index: usize| match row.get(index) {
        Some(cell) => cell.as_text(),
        None => "-".to_string(),
    };
    let reason = reason.trim();
    let deleted = DeletedSale {
        deleted_at: deleted_at.to_string(),
        auth_code: text_or_dash(1),
        ticket_number: text_or_dash(2),
        method: text_or_dash(3),
        amount: cell_at(&row, 4).as_money(),
        tip: cell_at(&row, 5).as_money(),
        total: cell_at(&row, 6).as_money(),
        reason: if reason.is_empty() { NO_REASON.to_string() } else { reason.to_string() },
    };

    wb.delete_rows(SaleLeg::TABLE, position, position)?;
    wb.ensure_table(DELETED_SALES, DELETED_SALES_HEADER);
    schema::append(wb, &deleted)?;
    Ok(deleted)
}

/// Removes the row at `position` from `table`, returning the removed cells.
pub fn remove_row(wb: &mut Workbook, table: &str, position: usize) -> CoreResult<Vec<Cell>> {
    let row = wb.row(table, position)?.to_vec();
    wb.delete_rows(table, position, position)?;
    Ok(row)
}

// =============================================================================
// Deletion Policy
// =============================================================================

/// Authorizes sale deletion against a configured passphrase.
///
/// With no passphrase configured every attempt is `Forbidden`.
#[derive(Clone, Default)]
pub struct DeletionPolicy {
    passphrase: Option<String>,
}

impl DeletionPolicy {
    /// An empty or whitespace-only passphrase counts as unset.
    pub fn new(passphrase: Option<String>) -> Self {
        DeletionPolicy {
            passphrase: passphrase.filter(|p| !p.trim().is_empty()),
        }
    }

    /// A policy that refuses every deletion.
    pub fn disabled() -> Self {
        DeletionPolicy::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.passphrase.is_some()
    }

    pub fn authorize(&self, attempt: &str) -> CoreResult<()> {
        match &self.passphrase {
            Some(expected) if attempt.trim() == expected.as_str() => Ok(()),
            _ => Err(CoreError::Forbidden),
        }
    }
}

impl fmt::Debug for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeletionPolicy")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
