//! # Report Commands
//!
//! Reconciliation of the live shift without closing it.

use serde::Serialize;
use tracing::debug;

use caja_core::{reconcile, ShiftArchive, ShiftLedger, ShiftSummary, SummarySection};
use caja_db::DbError;

use crate::error::{ApiError, RegisterError};
use crate::state::Till;

/// A live snapshot in the same shape as a close archive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentExport {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Runs the reconciliation engine over the live tables.
///
/// Works whether or not a shift is open; with none open the header shows
/// an empty cashier and label and a zero float.
pub async fn current_summary(till: &Till) -> Result<ShiftSummary, ApiError> {
    debug!("current_summary command");

    let now = till.now();
    let summary = till
        .read(|shift, workbook| {
            let ledger = ShiftLedger::from_workbook(workbook);
            Ok(reconcile(&ledger, shift.params(), now)?)
        })
        .await?;
    Ok(summary)
}

/// The ordered report sections of [`current_summary`].
pub async fn current_sections(till: &Till) -> Result<Vec<SummarySection>, ApiError> {
    Ok(current_summary(till).await?.sections())
}

/// Serializes the live workbook, summary and tickets without writing or
/// mutating anything.
pub async fn export_current(till: &Till) -> Result<CurrentExport, ApiError> {
    debug!("export_current command");

    let now = till.now();
    let export = till
        .read(|shift, workbook| {
            let snapshot = ShiftArchive::build(workbook, shift.params(), now, till.location())?;
            let bytes = snapshot
                .to_json_pretty()
                .map_err(|e| RegisterError::Store(DbError::from(e)))?;
            Ok(CurrentExport {
                name: snapshot.name,
                bytes,
            })
        })
        .await?;
    Ok(export)
}
