//! # Workbook Schema
//!
//! Sheet names, headers, and the mapping between typed rows and cells.
//!
//! ## Tables
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────────┐
//! │ Sheet                    │ Row type                                     │
//! ├──────────────────────────┼──────────────────────────────────────────────┤
//! │ planilla transacciones   │ SaleLeg             (cleared on close)       │
//! │ planilla repartos        │ Delivery            (cleared on close)       │
//! │ planilla egresos         │ Expense             (cleared on close)       │
//! │ planilla mermas          │ Shrinkage           (cleared on close)       │
//! │ planilla desgloses       │ DenominationCount   (cleared on close)       │
//! │ planilla cortesias       │ Complimentary       (cleared on close)       │
//! │ parametros               │ key → value         (reset on close)         │
//! │ Ventas Borradas          │ DeletedSale         (lazy; cleared on close) │
//! └──────────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Sheet names and headers are the persisted format and stay in Spanish.
//! Readers are lenient: missing or unparsable numeric cells read as 0.

use chrono::NaiveDateTime;

use crate::error::{CoreError, CoreResult};
use crate::shift::ShiftParams;
use crate::types::{
    Complimentary, CountPurpose, DeletedSale, Delivery, DenominationCount, Expense, Positioned,
    SaleLeg, Shrinkage,
};
use crate::workbook::{cell_at, Cell, Workbook, FIRST_DATA_ROW};

// =============================================================================
// Table Names & Headers
// =============================================================================

pub const SALES: &str = "planilla transacciones";
pub const DELIVERIES: &str = "planilla repartos";
pub const EXPENSES: &str = "planilla egresos";
pub const SHRINKAGE: &str = "planilla mermas";
pub const DENOMINATIONS: &str = "planilla desgloses";
pub const PARAMETERS: &str = "parametros";
pub const COMPLIMENTARY: &str = "planilla cortesias";
pub const DELETED_SALES: &str = "Ventas Borradas";

pub const SALES_HEADER: &[&str] = &[
    "Fecha",
    "Código Autorización Tarjetas",
    "Nº Interno Software",
    "Medio de Pago",
    "Monto sin Propina",
    "Propina",
    "Total con Propina",
];
pub const DELIVERIES_HEADER: &[&str] = &["Fecha", "Repartidor", "Dirección", "Monto", "Piso Empresa"];
pub const EXPENSES_HEADER: &[&str] = &["Fecha", "Motivo", "Valor", "Nº Boleta/Factura"];
pub const SHRINKAGE_HEADER: &[&str] = &["Fecha", "Motivo", "Valor"];
pub const DENOMINATIONS_HEADER: &[&str] = &["Fecha", "Denominación", "Cantidad", "Total", "Tipo"];
pub const PARAMETERS_HEADER: &[&str] = &["Parametro", "Valor"];
pub const COMPLIMENTARY_HEADER: &[&str] = &["Fecha", "Monto", "Motivo"];
pub const DELETED_SALES_HEADER: &[&str] = &[
    "Fecha Eliminación",
    "Código Autorización",
    "N° Interno",
    "Medio Pago",
    "Monto",
    "Propina",
    "Total",
    "Motivo",
];

/// Tables created on every load when missing.
pub const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    (SALES, SALES_HEADER),
    (DELIVERIES, DELIVERIES_HEADER),
    (EXPENSES, EXPENSES_HEADER),
    (SHRINKAGE, SHRINKAGE_HEADER),
    (DENOMINATIONS, DENOMINATIONS_HEADER),
    (PARAMETERS, PARAMETERS_HEADER),
    (COMPLIMENTARY, COMPLIMENTARY_HEADER),
];

/// Entry tables emptied back to header-only when a shift closes.
pub const SHIFT_TABLES: &[&str] = &[
    SALES,
    DELIVERIES,
    EXPENSES,
    SHRINKAGE,
    DENOMINATIONS,
    COMPLIMENTARY,
];

/// Shift parameter keys.
pub const PARAM_CASHIER: &str = "cajero";
pub const PARAM_SHIFT_LABEL: &str = "turno";
pub const PARAM_OPENING_FLOAT: &str = "caja_inicial";
pub const PARAM_LAST_ARCHIVE: &str = "ultimo_cierre";

/// Local-time text format used in every `Fecha` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reason archived when a sale is deleted without one.
pub const NO_REASON: &str = "(sin motivo)";

/// Formats a timestamp for a `Fecha` column.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

// =============================================================================
// Self-Healing Initialization
// =============================================================================

/// Creates every missing required table and repairs the complimentary
/// header. Returns `true` when the document changed.
///
/// ## Load Flow
/// ```text
/// repository.load()
///      │
///      ▼
/// ensure_schema()
///      ├── missing "planilla mermas"?      → create with header
///      ├── "planilla cortesias" malformed? → rebuild header-only
///      └── everything present              → no change
/// ```
pub fn ensure_schema(wb: &mut Workbook) -> CoreResult<bool> {
    let mut changed = false;
    for (name, header) in REQUIRED_TABLES {
        changed |= wb.ensure_table(name, header);
    }
    changed |= repair_complimentary_header(wb)?;
    Ok(changed)
}

/// Rebuilds the complimentary table when its header is not exactly
/// `Fecha, Monto, Motivo`. A malformed table is dropped to header-only,
/// since its rows cannot be trusted to line up with the columns.
pub fn repair_complimentary_header(wb: &mut Workbook) -> CoreResult<bool> {
    let sheet = wb.sheet_mut(COMPLIMENTARY)?;
    let well_formed = sheet.header().map_or(false, |header| {
        header.len() == COMPLIMENTARY_HEADER.len()
            && header
                .iter()
                .zip(COMPLIMENTARY_HEADER)
                .all(|(cell, expected)| cell.as_text() == *expected)
    });
    if well_formed {
        return Ok(false);
    }
    sheet.rows.clear();
    wb.set_header(COMPLIMENTARY, COMPLIMENTARY_HEADER)?;
    Ok(true)
}

/// Clears every entry table to header-only, clears deletion history, and
/// resets the shift parameters. Used by shift close after the archive is
/// safely written.
pub fn clear_shift_data(wb: &mut Workbook) -> CoreResult<()> {
    ensure_schema(wb)?;
    for table in SHIFT_TABLES {
        wb.clear_data(table)?;
    }
    repair_complimentary_header(wb)?;
    if wb.has_table(DELETED_SALES) {
        wb.clear_data(DELETED_SALES)?;
    }
    reset_shift_params(wb)
}

// =============================================================================
// Row Mapping
// =============================================================================

/// A typed row stored in one table.
pub trait TableRow: Sized {
    /// Sheet that holds this row type.
    const TABLE: &'static str;

    /// Cells in header order.
    fn to_row(&self) -> Vec<Cell>;

    /// Reads a stored row; `None` when the row cannot be interpreted.
    fn from_row(row: &[Cell]) -> Option<Self>;
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

fn text(row: &[Cell], index: usize) -> String {
    cell_at(row, index).as_text()
}

impl TableRow for SaleLeg {
    const TABLE: &'static str = SALES;

    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.recorded_at.clone().into(),
            self.auth_code.clone().into(),
            self.ticket_number.clone().into(),
            self.method.clone().into(),
            self.amount.into(),
            self.tip.into(),
            self.total.into(),
        ]
    }

    /// Rows shorter than the seven sale columns are ignored.
    fn from_row(row: &[Cell]) -> Option<Self> {
        if row.len() < SALES_HEADER.len() || is_blank_row(row) {
            return None;
        }
        Some(SaleLeg {
            recorded_at: text(row, 0),
            auth_code: text(row, 1),
            ticket_number: text(row, 2),
            method: text(row, 3),
            amount: row[4].as_money(),
            tip: row[5].as_money(),
            total: row[6].as_money(),
        })
    }
}

impl TableRow for Delivery {
    const TABLE: &'static str = DELIVERIES;

    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.recorded_at.clone().into(),
            self.courier.clone().into(),
            self.address.clone().into(),
            self.amount.into(),
            self.floor_fee.into(),
        ]
    }

    fn from_row(row: &[Cell]) -> Option<Self> {
        if is_blank_row(row) {
            return None;
        }
        Some(Delivery {
            recorded_at: text(row, 0),
            courier: text(row, 1),
            address: text(row, 2),
            amount: cell_at(row, 3).as_money(),
            floor_fee: cell_at(row, 4).as_money(),
        })
    }
}

impl TableRow for Expense {
    const TABLE: &'static str = EXPENSES;

    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.recorded_at.clone().into(),
            self.reason.clone().into(),
            self.amount.into(),
            self.receipt_ref.clone().into(),
        ]
    }

    fn from_row(row: &[Cell]) -> Option<Self> {
        if is_blank_row(row) {
            return None;
        }
        Some(Expense {
            recorded_at: text(row, 0),
            reason: text(row, 1),
            amount: cell_at(row, 2).as_money(),
            receipt_ref: text(row, 3),
        })
    }
}

impl TableRow for Shrinkage {
    const TABLE: &'static str = SHRINKAGE;

    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.recorded_at.clone().into(),
            self.reason.clone().into(),
            self.amount.into(),
        ]
    }

    fn from_row(row: &[Cell]) -> Option<Self> {
        if is_blank_row(row) {
            return None;
        }
        Some(Shrinkage {
            recorded_at: text(row, 0),
            reason: text(row, 1),
            amount: cell_at(row, 2).as_money(),
        })
    }
}

impl TableRow for Complimentary {
    const TABLE: &'static str = COMPLIMENTARY;

    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.recorded_at.clone().into(),
            self.amount.into(),
            self.reason.clone().into(),
        ]
    }

    fn from_row(row: &[Cell]) -> Option<Self> {
        if is_blank_row(row) {
            return None;
        }
        Some(Complimentary {
            recorded_at: text(row, 0),
            amount: cell_at(row, 1).as_money(),
            reason: text(row, 2),
        })
    }
}

impl TableRow for DenominationCount {
    const TABLE: &'static str = DENOMINATIONS;

    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.recorded_at.clone().into(),
            self.value.into(),
            self.count.into(),
            self.total.into(),
            self.purpose.as_stored().into(),
        ]
    }

    fn from_row(row: &[Cell]) -> Option<Self> {
        if is_blank_row(row) {
            return None;
        }
        Some(DenominationCount {
            recorded_at: text(row, 0),
            value: cell_at(row, 1).as_int(),
            count: cell_at(row, 2).as_int(),
            total: cell_at(row, 3).as_money(),
            purpose: CountPurpose::from_stored(&text(row, 4)),
        })
    }
}

impl TableRow for DeletedSale {
    const TABLE: &'static str = DELETED_SALES;

    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.deleted_at.clone().into(),
            self.auth_code.clone().into(),
            self.ticket_number.clone().into(),
            self.method.clone().into(),
            self.amount.into(),
            self.tip.into(),
            self.total.into(),
            self.reason.clone().into(),
        ]
    }

    fn from_row(row: &[Cell]) -> Option<Self> {
        if is_blank_row(row) {
            return None;
        }
        Some(DeletedSale {
            deleted_at: text(row, 0),
            auth_code: text(row, 1),
            ticket_number: text(row, 2),
            method: text(row, 3),
            amount: cell_at(row, 4).as_money(),
            tip: cell_at(row, 5).as_money(),
            total: cell_at(row, 6).as_money(),
            reason: text(row, 7),
        })
    }
}

/// Reads every interpretable data row of `T`'s table with its position.
///
/// A missing table reads as empty.
pub fn read_rows<T: TableRow>(wb: &Workbook) -> Vec<Positioned<T>> {
    match wb.iterate_rows(T::TABLE, FIRST_DATA_ROW) {
        Ok(rows) => rows
            .filter_map(|(position, cells)| {
                T::from_row(cells).map(|entry| Positioned { position, entry })
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Reads one data row of `T`'s table.
pub fn read_row<T: TableRow>(wb: &Workbook, position: usize) -> CoreResult<Positioned<T>> {
    let cells = wb.row(T::TABLE, position)?;
    T::from_row(cells)
        .map(|entry| Positioned { position, entry })
        .ok_or_else(|| CoreError::row_not_found(T::TABLE, position))
}

/// Appends a typed row, returning its position.
pub fn append<T: TableRow>(wb: &mut Workbook, entry: &T) -> CoreResult<usize> {
    wb.append_row(T::TABLE, entry.to_row())
}

fn entries<T: TableRow>(wb: &Workbook) -> Vec<T> {
    read_rows::<T>(wb).into_iter().map(|p| p.entry).collect()
}

// =============================================================================
// Shift Ledger
// =============================================================================

/// Every entry of the current shift, read from the live tables.
///
/// The reconciliation engine works on this, never on raw cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftLedger {
    pub sales: Vec<SaleLeg>,
    pub deliveries: Vec<Delivery>,
    pub expenses: Vec<Expense>,
    pub shrinkage: Vec<Shrinkage>,
    pub complimentary: Vec<Complimentary>,
    pub counts: Vec<DenominationCount>,
}

impl ShiftLedger {
    pub fn from_workbook(wb: &Workbook) -> Self {
        ShiftLedger {
            sales: entries(wb),
            deliveries: entries(wb),
            expenses: entries(wb),
            shrinkage: entries(wb),
            complimentary: entries(wb),
            counts: entries(wb),
        }
    }

    /// Whether the shift has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
            && self.deliveries.is_empty()
            && self.expenses.is_empty()
            && self.shrinkage.is_empty()
            && self.complimentary.is_empty()
            && self.counts.is_empty()
    }
}

// =============================================================================
// Shift Parameters
// =============================================================================

/// Value of the first `parametros` row whose key matches.
pub fn read_param(wb: &Workbook, key: &str) -> Option<Cell> {
    wb.data_rows(PARAMETERS)
        .ok()?
        .find(|(_, row)| cell_at(row, 0).as_text() == key)
        .map(|(_, row)| cell_at(row, 1).clone())
}

/// Overwrites the value for `key`, appending the key if it is new.
pub fn write_param(wb: &mut Workbook, key: &str, value: Cell) -> CoreResult<()> {
    let existing = wb
        .data_rows(PARAMETERS)?
        .find(|(_, row)| cell_at(row, 0).as_text() == key)
        .map(|(position, _)| position);

    match existing {
        Some(position) => wb.update_cell(PARAMETERS, position, 2, value),
        None => wb.append_row(PARAMETERS, vec![key.into(), value]).map(|_| ()),
    }
}

/// Reads cashier, label and float. Missing keys read as empty / zero.
pub fn read_shift_params(wb: &Workbook) -> ShiftParams {
    let param_text = |key: &str| read_param(wb, key).map(|c| c.as_text()).unwrap_or_default();
    ShiftParams {
        cashier: param_text(PARAM_CASHIER),
        shift_label: param_text(PARAM_SHIFT_LABEL),
        opening_float: read_param(wb, PARAM_OPENING_FLOAT)
            .map(|c| c.as_money())
            .unwrap_or_default(),
    }
}

/// Persists the three shift parameters.
pub fn write_shift_params(wb: &mut Workbook, params: &ShiftParams) -> CoreResult<()> {
    write_param(wb, PARAM_CASHIER, params.cashier.clone().into())?;
    write_param(wb, PARAM_SHIFT_LABEL, params.shift_label.clone().into())?;
    write_param(wb, PARAM_OPENING_FLOAT, params.opening_float.into())
}

/// Cashier and label become empty, the float becomes 0.
pub fn reset_shift_params(wb: &mut Workbook) -> CoreResult<()> {
    write_param(wb, PARAM_CASHIER, Cell::Empty)?;
    write_param(wb, PARAM_SHIFT_LABEL, Cell::Empty)?;
    write_param(wb, PARAM_OPENING_FLOAT, Cell::Number(0))
}

/// Id of the most recent archive artifact, if one was recorded.
pub fn read_last_archive(wb: &Workbook) -> Option<String> {
    read_param(wb, PARAM_LAST_ARCHIVE)
        .map(|c| c.as_text())
        .filter(|id| !id.trim().is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn fresh() -> Workbook {
        let mut wb = Workbook::new();
        ensure_schema(&mut wb).unwrap();
        wb
    }

    fn leg(ticket: &str, method: &str, amount: i64, tip: i64) -> SaleLeg {
        SaleLeg {
            recorded_at: "2026-10-19 12:00:00".to_string(),
            auth_code: String::new(),
            ticket_number: ticket.to_string(),
            method: method.to_string(),
            amount: Money::from_pesos(amount),
            tip: Money::from_pesos(tip),
            total: Money::from_pesos(amount + tip),
        }
    }

    #[test]
    fn test_ensure_schema_creates_required_tables() {
        let mut wb = Workbook::new();
        assert!(ensure_schema(&mut wb).unwrap());
        for (name, _) in REQUIRED_TABLES {
            assert!(wb.has_table(name), "missing {}", name);
        }
        assert!(!wb.has_table(DELETED_SALES));
        // second pass is a no-op
        assert!(!ensure_schema(&mut wb).unwrap());
    }

    #[test]
    fn test_malformed_complimentary_header_is_rebuilt() {
        let mut wb = fresh();
        wb.set_header(COMPLIMENTARY, &["Fecha", "Valor"]).unwrap();
        wb.append_row(COMPLIMENTARY, vec!["x".into(), 5.into()]).unwrap();

        assert!(ensure_schema(&mut wb).unwrap());
        let sheet = wb.sheet(COMPLIMENTARY).unwrap();
        assert_eq!(sheet.max_row(), 1);
        assert_eq!(sheet.header().unwrap()[2].as_text(), "Motivo");
    }

    #[test]
    fn test_sale_rows_shorter_than_seven_cells_are_skipped() {
        let mut wb = fresh();
        append(&mut wb, &leg("1", "efectivo", 500, 0)).unwrap();
        wb.append_row(SALES, vec!["solo fecha".into(), "".into()]).unwrap();
        append(&mut wb, &leg("2", "debito", 1000, 100)).unwrap();

        let rows = read_rows::<SaleLeg>(&wb);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 2);
        assert_eq!(rows[1].position, 4);
        assert_eq!(rows[1].entry.total, Money::from_pesos(1100));
    }

    #[test]
    fn test_denomination_purpose_round_trip() {
        let mut wb = fresh();
        let count = DenominationCount {
            recorded_at: "t".to_string(),
            value: 5000,
            count: 3,
            total: Money::from_pesos(15_000),
            purpose: CountPurpose::Deposit,
        };
        append(&mut wb, &count).unwrap();
        assert_eq!(wb.row(DENOMINATIONS, 2).unwrap()[4].as_text(), "Depositar");
        assert_eq!(read_rows::<DenominationCount>(&wb)[0].entry, count);
    }

    #[test]
    fn test_params_read_write_and_reset() {
        let mut wb = fresh();
        assert_eq!(read_shift_params(&wb), ShiftParams::default());

        let params = ShiftParams {
            cashier: "Ana".to_string(),
            shift_label: "Mañana".to_string(),
            opening_float: Money::from_pesos(50_000),
        };
        write_shift_params(&mut wb, &params).unwrap();
        write_shift_params(&mut wb, &params).unwrap();
        assert_eq!(read_shift_params(&wb), params);
        // overwrite, not append
        assert_eq!(wb.data_row_count(PARAMETERS).unwrap(), 3);

        reset_shift_params(&mut wb).unwrap();
        assert_eq!(read_shift_params(&wb), ShiftParams::default());
    }

    #[test]
    fn test_clear_shift_data_keeps_headers_and_last_archive() {
        let mut wb = fresh();
        append(&mut wb, &leg("1", "efectivo", 500, 0)).unwrap();
        wb.ensure_table(DELETED_SALES, DELETED_SALES_HEADER);
        wb.append_row(DELETED_SALES, vec!["x".into()]).unwrap();
        write_param(&mut wb, PARAM_LAST_ARCHIVE, "a.json".into()).unwrap();

        clear_shift_data(&mut wb).unwrap();

        for table in SHIFT_TABLES {
            assert_eq!(wb.data_row_count(table).unwrap(), 0);
        }
        assert_eq!(wb.data_row_count(DELETED_SALES).unwrap(), 0);
        assert_eq!(read_last_archive(&wb).as_deref(), Some("a.json"));
    }

    #[test]
    fn test_ledger_from_empty_workbook() {
        let wb = fresh();
        assert!(ShiftLedger::from_workbook(&wb).is_empty());
        // tables missing entirely also read as empty
        assert!(ShiftLedger::from_workbook(&Workbook::new()).is_empty());
    }
}
