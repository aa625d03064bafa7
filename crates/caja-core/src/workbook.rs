//! # Workbook Document Model
//!
//! The in-memory form of the tabular store: named sheets of rows of cells.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Workbook                                                               │
//! │  ├── Sheet "planilla egresos"                                           │
//! │  │     row 1 │ Fecha │ Motivo │ Valor │ Nº Boleta/Factura │ ◄── header  │
//! │  │     row 2 │ 2026… │ gas    │ 3000  │ B-11              │ ◄── data    │
//! │  │     row 3 │ 2026… │ hielo  │ 1500  │                   │             │
//! │  └── Sheet "parametros" ...                                             │
//! │                                                                         │
//! │  Positions are 1-based. Only 2..=max_row is addressable for            │
//! │  edit/delete; the header is never a valid target.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation works on the in-memory document; the caller persists it
//! with a single full-document save (see `caja-db`).

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Position of the header row.
pub const HEADER_ROW: usize = 1;

/// Position of the first data row.
pub const FIRST_DATA_ROW: usize = 2;

// =============================================================================
// Cell
// =============================================================================

/// A single cell value.
///
/// Serialized untagged, so a row reads naturally as JSON:
/// `[null, 1500, "hielo"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(i64),
    Text(String),
}

impl Cell {
    /// Text content; numbers are rendered, empty cells are `""`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Integer content, read leniently: empty or unparsable cells are 0.
    pub fn as_int(&self) -> i64 {
        match self {
            Cell::Empty => 0,
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }

    /// Integer content as Money.
    #[inline]
    pub fn as_money(&self) -> Money {
        Money::from_pesos(self.as_int())
    }

    /// Whether the cell holds nothing (or only whitespace).
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value)
    }
}

impl From<Money> for Cell {
    fn from(value: Money) -> Self {
        Cell::Number(value.pesos())
    }
}

/// Reads cell `index` (0-based) of a row, treating missing cells as empty.
pub fn cell_at(row: &[Cell], index: usize) -> &Cell {
    const EMPTY: &Cell = &Cell::Empty;
    row.get(index).unwrap_or(EMPTY)
}

// =============================================================================
// Sheet
// =============================================================================

/// A named table. `rows[0]` is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Creates a sheet holding only a header row.
    pub fn with_header(name: impl Into<String>, header: &[&str]) -> Self {
        Sheet {
            name: name.into(),
            rows: vec![header_cells(header)],
        }
    }

    /// The header row, if the sheet has one.
    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Position of the last row (0 for a sheet with no rows at all).
    #[inline]
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows.
    #[inline]
    pub fn data_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    fn check_data_position(&self, position: usize) -> CoreResult<usize> {
        if position < FIRST_DATA_ROW || position > self.max_row() {
            return Err(CoreError::row_not_found(&self.name, position));
        }
        Ok(position - 1)
    }
}

fn header_cells(header: &[&str]) -> Vec<Cell> {
    header.iter().map(|h| Cell::from(*h)).collect()
}

// =============================================================================
// Workbook
// =============================================================================

/// The whole tabular store as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook::default()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub fn sheet(&self, name: &str) -> CoreResult<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CoreError::UnknownTable(name.to_string()))
    }

    pub fn sheet_mut(&mut self, name: &str) -> CoreResult<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| CoreError::UnknownTable(name.to_string()))
    }

    /// Creates the table with `header` if it is missing, or writes the
    /// header into an existing table that has no rows at all.
    ///
    /// Returns `true` when anything changed.
    pub fn ensure_table(&mut self, name: &str, header: &[&str]) -> bool {
        match self.sheets.iter_mut().find(|s| s.name == name) {
            Some(sheet) if sheet.rows.is_empty() => {
                sheet.rows.push(header_cells(header));
                true
            }
            Some(_) => false,
            None => {
                self.sheets.push(Sheet::with_header(name, header));
                true
            }
        }
    }

    /// Replaces row 1 of the table.
    pub fn set_header(&mut self, name: &str, header: &[&str]) -> CoreResult<()> {
        let sheet = self.sheet_mut(name)?;
        let cells = header_cells(header);
        match sheet.rows.first_mut() {
            Some(first) => *first = cells,
            None => sheet.rows.push(cells),
        }
        Ok(())
    }

    /// Appends a data row and returns its position.
    pub fn append_row(&mut self, table: &str, values: Vec<Cell>) -> CoreResult<usize> {
        let sheet = self.sheet_mut(table)?;
        if sheet.rows.is_empty() {
            // keep position 1 reserved for the header
            sheet.rows.push(Vec::new());
        }
        sheet.rows.push(values);
        Ok(sheet.rows.len())
    }

    /// Rows from `from_row` (1-based) to the end, with their positions.
    pub fn iterate_rows(
        &self,
        table: &str,
        from_row: usize,
    ) -> CoreResult<impl Iterator<Item = (usize, &[Cell])> + '_> {
        let sheet = self.sheet(table)?;
        let skip = from_row.saturating_sub(1);
        Ok(sheet
            .rows
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, row)| (i + 1, row.as_slice())))
    }

    /// Data rows (position 2 onward) with their positions.
    pub fn data_rows(
        &self,
        table: &str,
    ) -> CoreResult<impl Iterator<Item = (usize, &[Cell])> + '_> {
        self.iterate_rows(table, FIRST_DATA_ROW)
    }

    /// One data row by position.
    pub fn row(&self, table: &str, position: usize) -> CoreResult<&[Cell]> {
        let sheet = self.sheet(table)?;
        let index = sheet.check_data_position(position)?;
        Ok(sheet.rows[index].as_slice())
    }

    /// Overwrites cell `col` (1-based) of data row `row`, padding short rows.
    pub fn update_cell(
        &mut self,
        table: &str,
        row: usize,
        col: usize,
        value: Cell,
    ) -> CoreResult<()> {
        let sheet = self.sheet_mut(table)?;
        let index = sheet.check_data_position(row)?;
        if col == 0 {
            return Err(CoreError::row_not_found(table, row));
        }
        let cells = &mut sheet.rows[index];
        if cells.len() < col {
            cells.resize(col, Cell::Empty);
        }
        cells[col - 1] = value;
        Ok(())
    }

    /// Deletes data rows `from..=to`. Later rows shift up.
    pub fn delete_rows(&mut self, table: &str, from: usize, to: usize) -> CoreResult<()> {
        let sheet = self.sheet_mut(table)?;
        let start = sheet.check_data_position(from)?;
        let end = sheet.check_data_position(to)?;
        if start > end {
            return Err(CoreError::row_not_found(table, to));
        }
        sheet.rows.drain(start..=end);
        Ok(())
    }

    /// Drops every data row, keeping the header.
    pub fn clear_data(&mut self, table: &str) -> CoreResult<usize> {
        let sheet = self.sheet_mut(table)?;
        let removed = sheet.data_len();
        sheet.rows.truncate(HEADER_ROW);
        Ok(removed)
    }

    /// Number of data rows in the table.
    pub fn data_row_count(&self, table: &str) -> CoreResult<usize> {
        Ok(self.sheet(table)?.data_len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
