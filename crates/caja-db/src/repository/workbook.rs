//! # Workbook Repository
//!
//! Loads and saves the till's workbook as one document.
//!
//! ## Storage Layout
//! ```text
//! sheets                          sheet_rows
//! ┌──────────────────┬──────┐     ┌──────────────────┬───────────┬──────────────────────┐
//! │ name             │ pos  │     │ sheet            │ row_index │ cells (JSON array)   │
//! ├──────────────────┼──────┤     ├──────────────────┼───────────┼──────────────────────┤
//! │ planilla trans.. │ 0    │◄────│ planilla trans.. │ 1         │ ["Fecha", ...]       │
//! │ parametros       │ 5    │     │ planilla trans.. │ 2         │ ["2026-..", "", ..]  │
//! └──────────────────┴──────┘     └──────────────────┴───────────┴──────────────────────┘
//! ```
//!
//! ## Save Semantics
//! `save` replaces the stored document inside a single transaction: either
//! the whole new workbook is committed or the previous one remains.

use sqlx::SqlitePool;
use tracing::debug;

use caja_core::schema::ensure_schema;
use caja_core::{Cell, Sheet, Workbook};

use crate::error::{DbError, DbResult};

/// Repository for the workbook document.
#[derive(Debug, Clone)]
pub struct WorkbookRepository {
    pool: SqlitePool,
}

impl WorkbookRepository {
    /// Creates a new workbook repository.
    pub fn new(pool: SqlitePool) -> Self {
        WorkbookRepository { pool }
    }

    /// Loads the stored workbook exactly as saved.
    ///
    /// An empty database loads as a workbook with no sheets.
    pub async fn load(&self) -> DbResult<Workbook> {
        let sheets: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sheets ORDER BY position ASC")
                .fetch_all(&self.pool)
                .await?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT r.sheet, r.cells
            FROM sheet_rows r
            JOIN sheets s ON s.name = r.sheet
            ORDER BY s.position ASC, r.row_index ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut workbook = Workbook {
            sheets: sheets
                .into_iter()
                .map(|(name,)| Sheet {
                    name,
                    rows: Vec::new(),
                })
                .collect(),
        };

        for (sheet_name, cells) in rows {
            let cells: Vec<Cell> = serde_json::from_str(&cells)?;
            if let Some(sheet) = workbook.sheets.iter_mut().find(|s| s.name == sheet_name) {
                sheet.rows.push(cells);
            }
        }

        debug!(sheets = workbook.sheets.len(), "Workbook loaded");
        Ok(workbook)
    }

    /// Loads the workbook and brings its schema up to date.
    ///
    /// Missing tables are created with their headers and a malformed
    /// complimentary table is rebuilt. When that changed anything, the
    /// repaired workbook is saved before it is returned.
    pub async fn load_with_schema(&self) -> DbResult<Workbook> {
        let mut workbook = self.load().await?;
        let changed =
            ensure_schema(&mut workbook).map_err(|e| DbError::Internal(e.to_string()))?;
        if changed {
            debug!("Workbook schema repaired on load");
            self.save(&workbook).await?;
        }
        Ok(workbook)
    }

    /// Replaces the stored workbook with `workbook` in one transaction.
    pub async fn save(&self, workbook: &Workbook) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM sheet_rows")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sheets").execute(&mut *tx).await?;

        for (position, sheet) in workbook.sheets.iter().enumerate() {
            sqlx::query("INSERT INTO sheets (name, position) VALUES (?1, ?2)")
                .bind(&sheet.name)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;

            for (index, row) in sheet.rows.iter().enumerate() {
                let cells = serde_json::to_string(row)?;
                sqlx::query("INSERT INTO sheet_rows (sheet, row_index, cells) VALUES (?1, ?2, ?3)")
                    .bind(&sheet.name)
                    .bind(index as i64 + 1)
                    .bind(cells)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(sheets = workbook.sheets.len(), "Workbook saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
