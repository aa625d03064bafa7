//! # Archive Store
//!
//! Durable storage for close-of-shift snapshots.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  close_shift                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.write("Cierre caja 19-10-2026_22-00-00 Local", &snapshot)       │
//! │       │                                                                 │
//! │       ├── Ok(ArtifactId)  → clear the workbook, record last archive    │
//! │       └── Err(..)         → workbook untouched, shift stays open       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Artifacts are write-once. A store never overwrites an existing id.

pub mod filesystem;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use caja_core::ShiftArchive;

use crate::error::DbResult;

pub use filesystem::FilesystemArchiveStore;

/// Identifier of a stored archive artifact (its file name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        ArtifactId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.0
    }
}

/// Storage backend for shift archives.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Durably writes `snapshot` under a name derived from `name`.
    ///
    /// The artifact is either fully present afterwards or absent.
    /// Fails with `ArchiveExists` rather than overwrite.
    async fn write(&self, name: &str, snapshot: &ShiftArchive) -> DbResult<ArtifactId>;

    /// All artifact ids, oldest first.
    async fn list(&self) -> DbResult<Vec<ArtifactId>>;

    /// Raw bytes of an artifact.
    async fn read(&self, id: &str) -> DbResult<Vec<u8>>;

    async fn exists(&self, id: &str) -> DbResult<bool>;

    /// Newest artifact, if any.
    async fn latest(&self) -> DbResult<Option<ArtifactId>> {
        Ok(self.list().await?.pop())
    }
}
