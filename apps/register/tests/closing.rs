//! Closing a shift: archive, clear, reset, and retrieval afterwards.

mod common;

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;

use caja_core::entries::LegInput;
use caja_core::schema::{
    read_last_archive, read_param, read_shift_params, DELETED_SALES, PARAM_CASHIER,
    PARAM_OPENING_FLOAT, PARAM_SHIFT_LABEL, SALES,
};
use caja_core::{Cell, Money, ShiftArchive, ShiftPhase};
use caja_db::{ArchiveStore, ArtifactId, DbError, DbResult};
use caja_register::commands::{cash, closing, delivery, report, sale, shift};
use caja_register::{ErrorCode, RegisterConfig, Till};

use common::{harness, harness_with_store, open, row_count, stored_workbook, PASSPHRASE};

async fn record_ticket(till: &Till, number: &str) {
    sale::record_sale(
        till,
        sale::RecordSaleRequest {
            ticket_number: number.into(),
            auth_code: String::new(),
            legs: vec![
                LegInput::new("credito", Money::from_pesos(4000), Money::from_pesos(400)),
                LegInput::new("efectivo", Money::from_pesos(1000), Money::zero()),
            ],
        },
    )
    .await
    .unwrap();
}

/// An archive store whose writes always fail.
struct FailingStore;

#[async_trait]
impl ArchiveStore for FailingStore {
    async fn write(&self, _name: &str, _snapshot: &ShiftArchive) -> DbResult<ArtifactId> {
        Err(DbError::ArchiveIo(io::Error::new(io::ErrorKind::Other, "disk full")))
    }

    async fn list(&self) -> DbResult<Vec<ArtifactId>> {
        Ok(Vec::new())
    }

    async fn read(&self, id: &str) -> DbResult<Vec<u8>> {
        Err(DbError::not_found("Archive", id))
    }

    async fn exists(&self, _id: &str) -> DbResult<bool> {
        Ok(false)
    }
}

/// An archive store whose writes never complete.
struct StalledStore {
    reached: Arc<Notify>,
}

#[async_trait]
impl ArchiveStore for StalledStore {
    async fn write(&self, _name: &str, _snapshot: &ShiftArchive) -> DbResult<ArtifactId> {
        self.reached.notify_one();
        std::future::pending().await
    }

    async fn list(&self) -> DbResult<Vec<ArtifactId>> {
        Ok(Vec::new())
    }

    async fn read(&self, id: &str) -> DbResult<Vec<u8>> {
        Err(DbError::not_found("Archive", id))
    }

    async fn exists(&self, _id: &str) -> DbResult<bool> {
        Ok(false)
    }
}

async fn record_cash_sale(till: &Till, number: &str, pesos: i64) {
    sale::record_sale(
        till,
        sale::RecordSaleRequest {
            ticket_number: number.into(),
            auth_code: String::new(),
            legs: vec![LegInput::new("efectivo", Money::from_pesos(pesos), Money::zero())],
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_full_shift_lifecycle() {
    let h = harness().await;
    open(&h.till).await;

    record_ticket(&h.till, "1").await;
    sale::delete_sale(
        &h.till,
        sale::DeleteSaleRequest {
            position: 3,
            passphrase: PASSPHRASE.into(),
            reason: "duplicada".into(),
        },
    )
    .await
    .unwrap();
    delivery::record_delivery(
        &h.till,
        delivery::RecordDeliveryRequest {
            courier: "Pedro".into(),
            address: String::new(),
            amount: Money::from_pesos(2500),
            floor_fee: Money::zero(),
        },
    )
    .await
    .unwrap();
    cash::record_expense(
        &h.till,
        cash::RecordExpenseRequest {
            reason: "Hielo".into(),
            amount: Money::from_pesos(3000),
            receipt_ref: String::new(),
        },
    )
    .await
    .unwrap();

    let closed = closing::close_shift(&h.till).await.unwrap();
    assert!(closed.artifact_id.as_str().ends_with(".json"));
    assert!(closed.artifact_id.as_str().contains("Local Test"));
    assert_eq!(closed.summary.cashier, "Ana");
    assert_eq!(closed.summary.total_sales, Money::from_pesos(4400));
    assert_eq!(closed.summary.expected_cash, Money::from_pesos(17_000));

    let status = shift::shift_status(&h.till).await.unwrap();
    assert_eq!(status.phase, ShiftPhase::Closed);
    assert!(!status.is_open);
    assert!(status.params.cashier.is_empty());

    let stored = stored_workbook(&h.till).await;
    assert_eq!(row_count(&stored, SALES), 0);
    assert_eq!(row_count(&stored, DELETED_SALES), 0);
    assert!(sale::list_sales(&h.till).await.unwrap().is_empty());
    assert!(delivery::list_deliveries(&h.till).await.unwrap().is_empty());
    assert!(cash::list_expenses(&h.till).await.unwrap().is_empty());

    let err = sale::record_sale(
        &h.till,
        sale::RecordSaleRequest {
            ticket_number: "2".into(),
            auth_code: String::new(),
            legs: vec![LegInput::new("efectivo", Money::from_pesos(100), Money::zero())],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::NoActiveShift);

    assert_eq!(
        closing::latest_archive(&h.till).await.unwrap(),
        Some(closed.artifact_id)
    );
}

#[tokio::test]
async fn test_close_without_open_shift() {
    let h = harness().await;
    let err = closing::close_shift(&h.till).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NoActiveShift);
    assert!(closing::archive_history(&h.till).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_close_empty_shift() {
    let h = harness().await;
    open(&h.till).await;

    let closed = closing::close_shift(&h.till).await.unwrap();
    assert_eq!(closed.summary.total_sales, Money::zero());
    assert_eq!(closed.summary.loss_ratio.bps(), 0);
    assert_eq!(closed.summary.total_cash_drawer, Money::from_pesos(20_000));
    assert!(closed.summary.couriers.is_empty());
    assert_eq!(closing::archive_history(&h.till).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_archive_round_trip() {
    let h = harness().await;
    open(&h.till).await;
    record_ticket(&h.till, "8").await;
    record_ticket(&h.till, "9").await;
    sale::delete_sale(
        &h.till,
        sale::DeleteSaleRequest {
            position: 4,
            passphrase: PASSPHRASE.into(),
            reason: "repetida".into(),
        },
    )
    .await
    .unwrap();
    let before = stored_workbook(&h.till).await;
    assert_eq!(row_count(&before, DELETED_SALES), 1);

    let closed = closing::close_shift(&h.till).await.unwrap();
    let bytes = closing::read_archive(&h.till, closed.artifact_id.as_str())
        .await
        .unwrap();
    let archive = ShiftArchive::from_json(&bytes).unwrap();

    // the archive holds the whole pre-close document, deleted sales included
    assert_eq!(archive.workbook, before);
    assert_eq!(archive.summary, closed.summary);
    assert_eq!(archive.workbook.data_row_count(SALES).unwrap(), 3);
    assert_eq!(archive.workbook.data_row_count(DELETED_SALES).unwrap(), 1);
    assert_eq!(archive.tickets.len(), 2);
    assert_eq!(archive.tickets[0].total, Money::from_pesos(5400));
    assert_eq!(archive.tickets[1].total, Money::from_pesos(1000));

    let download = closing::download_latest_archive(&h.till)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(download.artifact_id, closed.artifact_id);
    assert_eq!(download.bytes, bytes);
}

#[tokio::test]
async fn test_failed_archive_write_keeps_shift_open() {
    let h = harness_with_store(Arc::new(FailingStore), TempDir::new().unwrap()).await;
    open(&h.till).await;
    record_ticket(&h.till, "3").await;
    let before = stored_workbook(&h.till).await;

    let err = closing::close_shift(&h.till).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::StoreError);

    let status = shift::shift_status(&h.till).await.unwrap();
    assert_eq!(status.phase, ShiftPhase::Open);
    assert_eq!(status.params.cashier, "Ana");
    assert_eq!(stored_workbook(&h.till).await, before);

    // still usable after the failed close
    record_ticket(&h.till, "4").await;
    assert_eq!(sale::list_sales(&h.till).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_close_resets_stored_parameters() {
    let h = harness().await;
    open(&h.till).await;
    record_ticket(&h.till, "5").await;

    let closed = closing::close_shift(&h.till).await.unwrap();

    let stored = stored_workbook(&h.till).await;
    assert_eq!(read_param(&stored, PARAM_CASHIER), Some(Cell::Empty));
    assert_eq!(read_param(&stored, PARAM_SHIFT_LABEL), Some(Cell::Empty));
    assert_eq!(read_param(&stored, PARAM_OPENING_FLOAT), Some(Cell::Number(0)));

    let params = read_shift_params(&stored);
    assert!(params.cashier.is_empty());
    assert!(params.shift_label.is_empty());
    assert_eq!(params.opening_float, Money::zero());
    assert_eq!(
        read_last_archive(&stored).as_deref(),
        Some(closed.artifact_id.as_str())
    );
}

#[tokio::test]
async fn test_failed_clear_after_archive_write_keeps_shift_open() {
    let h = harness().await;
    open(&h.till).await;
    record_ticket(&h.till, "6").await;
    let before = stored_workbook(&h.till).await;

    // only the clearing save carries the new artifact id in `parametros`
    sqlx::query(
        "CREATE TRIGGER reject_clear BEFORE INSERT ON sheet_rows \
         WHEN NEW.cells LIKE '%Cierre caja%' \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END",
    )
    .execute(h.till.database().pool())
    .await
    .unwrap();

    let err = closing::close_shift(&h.till).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::StoreError);

    let status = shift::shift_status(&h.till).await.unwrap();
    assert_eq!(status.phase, ShiftPhase::Open);
    assert_eq!(status.params.cashier, "Ana");
    assert_eq!(stored_workbook(&h.till).await, before);
    // the artifact was written before the save failed
    assert_eq!(closing::archive_history(&h.till).await.unwrap().len(), 1);

    sqlx::query("DROP TRIGGER reject_clear")
        .execute(h.till.database().pool())
        .await
        .unwrap();
    let closed = closing::close_shift(&h.till).await.unwrap();
    assert_eq!(closed.summary.total_sales, Money::from_pesos(5400));
    assert_eq!(row_count(&stored_workbook(&h.till).await, SALES), 0);
}

#[tokio::test]
async fn test_overflowing_totals_fail_without_closing() {
    let h = harness().await;
    open(&h.till).await;
    record_cash_sale(&h.till, "1", i64::MAX / 2 + 1).await;
    record_cash_sale(&h.till, "2", i64::MAX / 2 + 1).await;
    let before = stored_workbook(&h.till).await;

    let err = report::current_summary(&h.till).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAmount);
    let err = report::export_current(&h.till).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAmount);

    let err = closing::close_shift(&h.till).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAmount);

    let status = shift::shift_status(&h.till).await.unwrap();
    assert_eq!(status.phase, ShiftPhase::Open);
    assert_eq!(stored_workbook(&h.till).await, before);
    assert!(closing::archive_history(&h.till).await.unwrap().is_empty());

    // deleting one of the sales makes the shift closable again
    sale::delete_sale(
        &h.till,
        sale::DeleteSaleRequest {
            position: 3,
            passphrase: PASSPHRASE.into(),
            reason: "monto erróneo".into(),
        },
    )
    .await
    .unwrap();
    let closed = closing::close_shift(&h.till).await.unwrap();
    assert_eq!(closed.summary.total_sales, Money::from_pesos(i64::MAX / 2 + 1));
}

#[tokio::test]
async fn test_cancelled_close_reopens_shift() {
    let reached = Arc::new(Notify::new());
    let store = StalledStore {
        reached: Arc::clone(&reached),
    };
    let h = harness_with_store(Arc::new(store), TempDir::new().unwrap()).await;
    open(&h.till).await;
    record_ticket(&h.till, "7").await;

    tokio::select! {
        _ = closing::close_shift(&h.till) => panic!("stalled close finished"),
        _ = reached.notified() => {}
    }

    let status = shift::shift_status(&h.till).await.unwrap();
    assert_eq!(status.phase, ShiftPhase::Open);
    record_ticket(&h.till, "8").await;
    assert_eq!(sale::list_sales(&h.till).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_latest_archive_falls_back_to_newest() {
    let h = harness().await;

    open(&h.till).await;
    let first = closing::close_shift(&h.till).await.unwrap().artifact_id;
    open(&h.till).await;
    let second = closing::close_shift(&h.till).await.unwrap().artifact_id;
    assert_ne!(first, second);

    let history = closing::archive_history(&h.till).await.unwrap();
    assert_eq!(history.len(), 2);

    std::fs::remove_file(h.archive_dir.path().join(second.as_str())).unwrap();
    assert_eq!(closing::latest_archive(&h.till).await.unwrap(), Some(first));
}

#[tokio::test]
async fn test_export_current_does_not_mutate() {
    let h = harness().await;
    open(&h.till).await;
    record_ticket(&h.till, "11").await;
    let before = stored_workbook(&h.till).await;

    let export = report::export_current(&h.till).await.unwrap();
    assert!(export.name.starts_with("Cierre caja"));
    let snapshot = ShiftArchive::from_json(&export.bytes).unwrap();
    assert_eq!(snapshot.summary.total_sales, Money::from_pesos(5400));

    assert_eq!(stored_workbook(&h.till).await, before);
    assert!(closing::archive_history(&h.till).await.unwrap().is_empty());
    assert!(shift::shift_status(&h.till).await.unwrap().is_open);
}

#[tokio::test]
async fn test_restart_resumes_open_shift() {
    let temp = TempDir::new().unwrap();
    let config = RegisterConfig::new(temp.path().join("data/caja.db"), temp.path().join("cierres"));

    {
        let till = Till::open(&config).await.unwrap();
        open(&till).await;
        record_ticket(&till, "21").await;
        till.database().close().await;
    }

    let till = Till::open(&config).await.unwrap();
    let status = shift::shift_status(&till).await.unwrap();
    assert!(status.is_open);
    assert_eq!(status.params.cashier, "Ana");
    assert_eq!(status.params.opening_float, Money::from_pesos(20_000));
    assert_eq!(sale::list_sales(&till).await.unwrap().len(), 2);

    let closed = closing::close_shift(&till).await.unwrap();
    assert!(temp.path().join("cierres").join(closed.artifact_id.as_str()).exists());
}
