//! # Closing Commands
//!
//! Shift close and retrieval of closed-shift archives.
//!
//! ```text
//! close_shift ──► ClosedShift { artifactId, summary }
//!                       │
//!                       └── remembered as the latest archive
//!
//! latest_archive ───────► remembered id (if still present) or newest in store
//! archive_history ──────► every id, newest first
//! read_archive(id) ─────► artifact bytes (pretty JSON)
//! ```

use serde::Serialize;
use tracing::{debug, info};

use caja_db::ArtifactId;

use crate::error::ApiError;
use crate::state::{ClosedShift, Till};

/// An artifact together with its bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveDownload {
    pub artifact_id: ArtifactId,
    pub bytes: Vec<u8>,
}

/// Closes the open shift: reconcile, archive, clear, reset.
///
/// Nothing in the live tables changes unless the archive was written.
pub async fn close_shift(till: &Till) -> Result<ClosedShift, ApiError> {
    debug!("close_shift command");
    Ok(till.close_shift().await?)
}

/// Id of the most recent close, if any.
pub async fn latest_archive(till: &Till) -> Result<Option<ArtifactId>, ApiError> {
    Ok(till.latest_archive().await?)
}

/// The most recent close with its bytes, for re-download.
pub async fn download_latest_archive(till: &Till) -> Result<Option<ArchiveDownload>, ApiError> {
    let Some(artifact_id) = till.latest_archive().await? else {
        return Ok(None);
    };
    let bytes = till.archives().read(artifact_id.as_str()).await?;
    info!(artifact = %artifact_id, size = bytes.len(), "Latest archive downloaded");
    Ok(Some(ArchiveDownload { artifact_id, bytes }))
}

/// Every archive id, newest first.
pub async fn archive_history(till: &Till) -> Result<Vec<ArtifactId>, ApiError> {
    let mut ids = till.archives().list().await?;
    ids.reverse();
    Ok(ids)
}

pub async fn read_archive(till: &Till, artifact_id: &str) -> Result<Vec<u8>, ApiError> {
    debug!(artifact = %artifact_id, "read_archive command");
    Ok(till.archives().read(artifact_id).await?)
}
