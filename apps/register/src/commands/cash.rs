//! # Cash Commands
//!
//! Cash outflows (expenses, shrinkage, complimentary items) and
//! denomination counts.
//!
//! ```text
//! record_expense ──────► planilla egresos   (editable, deletable by position)
//! record_shrinkage ────► planilla mermas
//! record_complimentary ► planilla cortesias
//! record_denomination ─► planilla desgloses (drawer / deposit)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use caja_core::entries::{
    apply_expense_edit, build_complimentary, build_denomination, build_expense, build_shrinkage,
    remove_row,
};
use caja_core::schema::{self, format_timestamp, read_row, read_rows, TableRow};
use caja_core::{
    Complimentary, CountPurpose, DenominationCount, Expense, Money, Positioned, Shrinkage,
    Workbook,
};

use crate::error::{ApiError, RegisterResult};
use crate::state::Till;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordExpenseRequest {
    pub reason: String,
    pub amount: Money,
    /// Receipt or invoice number.
    #[serde(default)]
    pub receipt_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditExpenseRequest {
    pub position: usize,
    pub reason: String,
    pub amount: Money,
    #[serde(default)]
    pub receipt_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordShrinkageRequest {
    pub reason: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordComplimentaryRequest {
    pub amount: Money,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDenominationRequest {
    /// Face value in pesos; must be one of the fixed denominations.
    pub value: i64,
    pub count: i64,
    #[serde(default)]
    pub purpose: CountPurpose,
}

// =============================================================================
// Expenses
// =============================================================================

pub async fn record_expense(
    till: &Till,
    request: RecordExpenseRequest,
) -> Result<Positioned<Expense>, ApiError> {
    debug!("record_expense command");

    let recorded_at = format_timestamp(till.now());
    let recorded = till
        .guarded("record_expense", |_, workbook| {
            let expense = build_expense(
                &request.reason,
                request.amount,
                &request.receipt_ref,
                &recorded_at,
            )?;
            append_positioned(workbook, expense)
        })
        .await?;

    info!(
        position = recorded.position,
        amount = %recorded.entry.amount,
        reason = %recorded.entry.reason,
        "Expense recorded"
    );
    Ok(recorded)
}

/// Rewrites reason, amount and receipt of an expense. No passphrase.
pub async fn edit_expense(
    till: &Till,
    request: EditExpenseRequest,
) -> Result<Positioned<Expense>, ApiError> {
    debug!(position = request.position, "edit_expense command");

    let edited = till
        .mutate(|_, workbook| {
            Ok(apply_expense_edit(
                workbook,
                request.position,
                &request.reason,
                request.amount,
                &request.receipt_ref,
            )?)
        })
        .await?;

    info!(position = edited.position, amount = %edited.entry.amount, "Expense edited");
    Ok(edited)
}

pub async fn delete_expense(till: &Till, position: usize) -> Result<Expense, ApiError> {
    debug!(position, "delete_expense command");

    let removed = till
        .mutate(|_, workbook| {
            let expense = read_row::<Expense>(workbook, position)?.entry;
            remove_row(workbook, schema::EXPENSES, position)?;
            Ok(expense)
        })
        .await?;

    info!(position, amount = %removed.amount, "Expense deleted");
    Ok(removed)
}

/// One expense, for the edit form.
pub async fn get_expense(till: &Till, position: usize) -> Result<Positioned<Expense>, ApiError> {
    Ok(till
        .read(|_, workbook| Ok(read_row::<Expense>(workbook, position)?))
        .await?)
}

pub async fn list_expenses(till: &Till) -> Result<Vec<Positioned<Expense>>, ApiError> {
    Ok(till.read(|_, workbook| Ok(read_rows::<Expense>(workbook))).await?)
}

// =============================================================================
// Shrinkage and complimentary items
// =============================================================================

pub async fn record_shrinkage(
    till: &Till,
    request: RecordShrinkageRequest,
) -> Result<Positioned<Shrinkage>, ApiError> {
    debug!("record_shrinkage command");

    let recorded_at = format_timestamp(till.now());
    let recorded = till
        .guarded("record_shrinkage", |_, workbook| {
            let shrinkage = build_shrinkage(&request.reason, request.amount, &recorded_at)?;
            append_positioned(workbook, shrinkage)
        })
        .await?;

    info!(position = recorded.position, amount = %recorded.entry.amount, "Shrinkage recorded");
    Ok(recorded)
}

/// Records a complimentary item. Uses the same open-shift guard as every
/// other entry.
pub async fn record_complimentary(
    till: &Till,
    request: RecordComplimentaryRequest,
) -> Result<Positioned<Complimentary>, ApiError> {
    debug!("record_complimentary command");

    let recorded_at = format_timestamp(till.now());
    let recorded = till
        .guarded("record_complimentary", |_, workbook| {
            let item = build_complimentary(request.amount, &request.reason, &recorded_at)?;
            append_positioned(workbook, item)
        })
        .await?;

    info!(
        position = recorded.position,
        amount = %recorded.entry.amount,
        "Complimentary item recorded"
    );
    Ok(recorded)
}

// =============================================================================
// Denomination counts
// =============================================================================

pub async fn record_denomination(
    till: &Till,
    request: RecordDenominationRequest,
) -> Result<Positioned<DenominationCount>, ApiError> {
    debug!(value = request.value, count = request.count, "record_denomination command");

    let recorded_at = format_timestamp(till.now());
    let recorded = till
        .guarded("record_denomination", |_, workbook| {
            let count = build_denomination(
                request.value,
                request.count,
                request.purpose,
                &recorded_at,
            )?;
            append_positioned(workbook, count)
        })
        .await?;

    info!(
        position = recorded.position,
        value = recorded.entry.value,
        count = recorded.entry.count,
        purpose = ?recorded.entry.purpose,
        "Denomination counted"
    );
    Ok(recorded)
}

fn append_positioned<T: TableRow>(workbook: &mut Workbook, entry: T) -> RegisterResult<Positioned<T>> {
    let position = schema::append(workbook, &entry)?;
    Ok(Positioned { position, entry })
}
