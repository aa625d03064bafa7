//! # Till
//!
//! The single authoritative owner of the workbook and the shift state.
//!
//! ## Operation Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One till operation                                   │
//! │                                                                         │
//! │  lock inner ──► guard (shift open?) ──► load workbook                  │
//! │                      │                       │                          │
//! │                      │ NoActiveShift         ▼                          │
//! │                      ▼                 mutate in memory                 │
//! │                 return (nothing            │                            │
//! │                 loaded or saved)           ├── Err → return, no save    │
//! │                                            ▼                            │
//! │                                      save (one transaction)             │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                 commit shift state, unlock              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Close Sequence
//! ```text
//!  Open ──begin_closing──► Closing ──archive write ok──► clear + save ok ──► Closed
//!                             │                               │
//!                             └── reconcile, write or save failed,
//!                                 or the close future dropped
//!                                         │
//!                                         ▼
//!                              abort_closing → Open (live tables untouched)
//! ```

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use caja_core::schema::{
    clear_shift_data, ensure_schema, read_last_archive, read_shift_params, write_param,
    PARAM_LAST_ARCHIVE,
};
use caja_core::{DeletionPolicy, ShiftArchive, ShiftParams, ShiftState, ShiftSummary, Workbook};
use caja_db::{ArchiveStore, ArtifactId, Database, DbConfig, FilesystemArchiveStore};

use crate::config::RegisterConfig;
use crate::error::{RegisterError, RegisterResult};

/// Source of wall-clock time for timestamps and archive names.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

fn local_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Result of a successful shift close.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedShift {
    pub artifact_id: ArtifactId,
    pub summary: ShiftSummary,
}

struct TillInner {
    shift: ShiftState,
    last_archive: Option<ArtifactId>,
}

/// Holds the lock while a shift is `Closing`. Dropping it before
/// [`ClosingGuard::finish`] returns the shift to `Open`, whether the close
/// failed, panicked, or was cancelled.
struct ClosingGuard<'a> {
    inner: MutexGuard<'a, TillInner>,
    finished: bool,
}

impl<'a> ClosingGuard<'a> {
    fn begin(mut inner: MutexGuard<'a, TillInner>) -> RegisterResult<(Self, ShiftParams)> {
        let params = inner.shift.begin_closing()?;
        Ok((
            ClosingGuard {
                inner,
                finished: false,
            },
            params,
        ))
    }

    fn finish(mut self, artifact_id: ArtifactId) {
        self.inner.shift.finish_closing();
        self.inner.last_archive = Some(artifact_id);
        self.finished = true;
    }
}

impl Drop for ClosingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.inner.shift.abort_closing();
        }
    }
}

/// The till: store lock, shift state and collaborators.
pub struct Till {
    db: Database,
    archives: Arc<dyn ArchiveStore>,
    policy: DeletionPolicy,
    location: String,
    clock: Clock,
    inner: Mutex<TillInner>,
}

impl Till {
    /// Opens the database and archive directory named by `config`.
    pub async fn open(config: &RegisterConfig) -> RegisterResult<Self> {
        config.validate()?;
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    RegisterError::Config(format!(
                        "Cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db = Database::new(DbConfig::new(&config.database_path)).await?;
        let archives = FilesystemArchiveStore::new(&config.archive_dir).await?;

        Till::new(
            db,
            Arc::new(archives),
            config.deletion_policy(),
            config.location.clone(),
        )
        .await
    }

    /// Builds a till over an existing database and archive store.
    ///
    /// Brings the workbook schema up to date and restores the shift state
    /// from the persisted parameters, so a restarted process resumes an
    /// open shift.
    pub async fn new(
        db: Database,
        archives: Arc<dyn ArchiveStore>,
        policy: DeletionPolicy,
        location: impl Into<String>,
    ) -> RegisterResult<Self> {
        let workbook = db.workbooks().load_with_schema().await?;
        let shift = ShiftState::from_params(read_shift_params(&workbook));
        let last_archive = read_last_archive(&workbook).map(ArtifactId::new);

        info!(
            phase = ?shift.phase(),
            cashier = %shift.params().cashier,
            deletion_enabled = policy.is_enabled(),
            "Till ready"
        );

        Ok(Till {
            db,
            archives,
            policy,
            location: location.into(),
            clock: local_clock(),
            inner: Mutex::new(TillInner {
                shift,
                last_archive,
            }),
        })
    }

    /// Replaces the wall clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn policy(&self) -> &DeletionPolicy {
        &self.policy
    }

    pub fn archives(&self) -> &dyn ArchiveStore {
        self.archives.as_ref()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Snapshot of the current shift state.
    pub async fn shift(&self) -> ShiftState {
        self.inner.lock().await.shift.clone()
    }

    // =========================================================================
    // Operation helpers
    // =========================================================================

    async fn load_workbook(&self) -> RegisterResult<Workbook> {
        let mut workbook = self.db.workbooks().load().await?;
        ensure_schema(&mut workbook)?;
        Ok(workbook)
    }

    /// Runs `f` against the shift state and the live workbook without saving.
    pub(crate) async fn read<T, F>(&self, f: F) -> RegisterResult<T>
    where
        F: FnOnce(&ShiftState, &Workbook) -> RegisterResult<T>,
    {
        let inner = self.inner.lock().await;
        let workbook = self.load_workbook().await?;
        f(&inner.shift, &workbook)
    }

    /// Runs `f` and saves the workbook if it succeeds.
    ///
    /// Changes `f` makes to the shift state only take effect once the save
    /// has landed.
    pub(crate) async fn mutate<T, F>(&self, f: F) -> RegisterResult<T>
    where
        F: FnOnce(&mut ShiftState, &mut Workbook) -> RegisterResult<T>,
    {
        let mut inner = self.inner.lock().await;
        let mut workbook = self.load_workbook().await?;
        let mut shift = inner.shift.clone();

        let value = f(&mut shift, &mut workbook)?;

        self.db.workbooks().save(&workbook).await?;
        inner.shift = shift;
        Ok(value)
    }

    /// Like [`mutate`](Self::mutate), for operations that need an open shift.
    ///
    /// With no open shift nothing is loaded or saved.
    pub(crate) async fn guarded<T, F>(&self, operation: &'static str, f: F) -> RegisterResult<T>
    where
        F: FnOnce(&ShiftParams, &mut Workbook) -> RegisterResult<T>,
    {
        let inner = self.inner.lock().await;
        let params = match inner.shift.require_open() {
            Ok(params) => params.clone(),
            Err(e) => {
                warn!(operation, "Rejected: no active shift");
                return Err(e.into());
            }
        };

        let mut workbook = self.load_workbook().await?;
        let value = f(&params, &mut workbook)?;
        self.db.workbooks().save(&workbook).await?;
        Ok(value)
    }

    // =========================================================================
    // Shift close
    // =========================================================================

    /// Archives the open shift and resets the live tables.
    pub(crate) async fn close_shift(&self) -> RegisterResult<ClosedShift> {
        let inner = self.inner.lock().await;
        let (closing, params) = match ClosingGuard::begin(inner) {
            Ok(begun) => begun,
            Err(e) => {
                warn!(operation = "close_shift", "Rejected: no active shift");
                return Err(e);
            }
        };

        info!(cashier = %params.cashier, shift = %params.shift_label, "Closing shift");

        match self.archive_and_clear(&params).await {
            Ok(closed) => {
                closing.finish(closed.artifact_id.clone());
                info!(artifact = %closed.artifact_id, "Shift closed");
                Ok(closed)
            }
            Err(e) => {
                drop(closing);
                error!(error = %e, "Shift close aborted; shift remains open");
                Err(e)
            }
        }
    }

    async fn archive_and_clear(&self, params: &ShiftParams) -> RegisterResult<ClosedShift> {
        let workbook = self.load_workbook().await?;
        let archive = ShiftArchive::build(&workbook, params, self.now(), &self.location)?;
        debug!(
            name = %archive.name,
            tickets = archive.tickets.len(),
            "Shift reconciled"
        );

        let artifact_id = self.archives.write(&archive.name, &archive).await?;

        let mut cleared = workbook;
        clear_shift_data(&mut cleared)?;
        write_param(&mut cleared, PARAM_LAST_ARCHIVE, artifact_id.as_str().into())?;

        if let Err(e) = self.db.workbooks().save(&cleared).await {
            error!(
                artifact = %artifact_id,
                error = %e,
                "Live tables could not be cleared; archive artifact is orphaned"
            );
            return Err(e.into());
        }

        Ok(ClosedShift {
            artifact_id,
            summary: archive.summary,
        })
    }

    // =========================================================================
    // Archive retrieval
    // =========================================================================

    /// The most recent close: the remembered id if its artifact still
    /// exists, otherwise the newest artifact in the store.
    pub(crate) async fn latest_archive(&self) -> RegisterResult<Option<ArtifactId>> {
        let inner = self.inner.lock().await;
        if let Some(id) = &inner.last_archive {
            if self.archives.exists(id.as_str()).await? {
                return Ok(Some(id.clone()));
            }
            debug!(artifact = %id, "Remembered archive is gone; using newest");
        }
        Ok(self.archives.latest().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
