//! Shared harness for the till integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use caja_core::{DeletionPolicy, Money, Workbook};
use caja_db::{ArchiveStore, Database, DbConfig, FilesystemArchiveStore};
use caja_register::commands::shift::{self, OpenShiftRequest};
use caja_register::{Clock, Till};

pub const PASSPHRASE: &str = "clave-turno";

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|d| d.and_hms_opt(13, 0, 0))
        .expect("valid date")
}

/// A clock that moves one second forward on every reading.
pub fn ticking_clock() -> Clock {
    let ticks = Arc::new(AtomicI64::new(0));
    Arc::new(move || base_time() + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst)))
}

pub struct Harness {
    pub till: Till,
    pub archive_dir: TempDir,
}

/// In-memory store, temporary archive directory, deletion enabled.
pub async fn harness() -> Harness {
    let archive_dir = TempDir::new().unwrap();
    let archives = FilesystemArchiveStore::new(archive_dir.path()).await.unwrap();
    harness_with_store(Arc::new(archives), archive_dir).await
}

pub async fn harness_with_store(archives: Arc<dyn ArchiveStore>, archive_dir: TempDir) -> Harness {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let till = Till::new(
        db,
        archives,
        DeletionPolicy::new(Some(PASSPHRASE.to_string())),
        "Local Test",
    )
    .await
    .unwrap()
    .with_clock(ticking_clock());
    Harness { till, archive_dir }
}

pub async fn open(till: &Till) {
    shift::open_shift(
        till,
        OpenShiftRequest {
            cashier: "Ana".into(),
            shift_label: "Mañana".into(),
            opening_float: Money::from_pesos(20_000),
        },
    )
    .await
    .unwrap();
}

/// The persisted workbook, bypassing the till.
pub async fn stored_workbook(till: &Till) -> Workbook {
    till.database().workbooks().load().await.unwrap()
}

pub fn row_count(workbook: &Workbook, table: &str) -> usize {
    if workbook.has_table(table) {
        workbook.data_row_count(table).unwrap()
    } else {
        0
    }
}
