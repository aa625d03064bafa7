//! # Shift Archive Snapshot
//!
//! The immutable record written when a shift closes: the full pre-close
//! workbook, the reconciled summary, and the ticket block.
//!
//! ```text
//! ShiftArchive
//! ├── name          "Cierre caja 19-10-2026_22-00-00 Camilo Henriquez"
//! ├── generated_at  "2026-10-19 22:00:00"
//! ├── workbook      every sheet, exactly as it was before the close
//! ├── summary       ShiftSummary
//! └── tickets       Vec<TicketSummary>
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::reconcile::reconcile;
use crate::schema::{format_timestamp, ShiftLedger};
use crate::shift::ShiftParams;
use crate::summary::ShiftSummary;
use crate::tickets::{group_tickets, TicketSummary};
use crate::workbook::Workbook;

/// Timestamp format embedded in archive names.
pub const ARCHIVE_NAME_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";

/// `Cierre caja DD-MM-YYYY_HH-MM-SS <location>`.
pub fn archive_name(at: NaiveDateTime, location: &str) -> String {
    let stamp = at.format(ARCHIVE_NAME_FORMAT);
    let location = location.trim();
    if location.is_empty() {
        format!("Cierre caja {}", stamp)
    } else {
        format!("Cierre caja {} {}", stamp, location)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftArchive {
    pub name: String,
    pub generated_at: String,
    pub workbook: Workbook,
    pub summary: ShiftSummary,
    pub tickets: Vec<TicketSummary>,
}

impl ShiftArchive {
    /// Reconciles `workbook` and bundles it with its summary and tickets.
    ///
    /// Used both for the close artifact and for a live export. Fails when
    /// a total overflows; nothing is written in that case.
    pub fn build(
        workbook: &Workbook,
        params: &ShiftParams,
        at: NaiveDateTime,
        location: &str,
    ) -> CoreResult<Self> {
        let ledger = ShiftLedger::from_workbook(workbook);
        Ok(ShiftArchive {
            name: archive_name(at, location),
            generated_at: format_timestamp(at),
            workbook: workbook.clone(),
            summary: reconcile(&ledger, params, at)?,
            tickets: group_tickets(&ledger.sales)?,
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
