//! Filesystem-based archive storage.
//!
//! Stores each closed shift as one pretty-printed JSON file:
//! ```text
//! {base_path}/
//!   Cierre caja 18-10-2026_22-01-10 Camilo Henriquez.json
//!   Cierre caja 19-10-2026_22-00-00 Camilo Henriquez.json
//!   .3f2a...e1.tmp          ← in-flight write, never listed
//! ```
//!
//! Writes land in a hidden temp file, are synced, then hard-linked to the
//! final name and the temp name removed. Linking fails when the final name
//! already exists, so a reader never sees a partial artifact and an
//! artifact is never replaced, even by two writers racing on one name.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use caja_core::ShiftArchive;

use super::{ArchiveStore, ArtifactId};
use crate::error::{DbError, DbResult};

const EXTENSION: &str = "json";

/// Archive store backed by a single directory.
#[derive(Debug, Clone)]
pub struct FilesystemArchiveStore {
    base_path: PathBuf,
}

impl FilesystemArchiveStore {
    /// Create a new filesystem archive store.
    ///
    /// Creates the base directory if it doesn't exist.
    pub async fn new(base_path: impl AsRef<Path>) -> DbResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await?;
        info!(path = %base_path.display(), "Archive store ready");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolves an artifact id to a path inside the base directory.
    ///
    /// Ids that could name anything else are treated as unknown.
    fn path_for_id(&self, id: &str) -> Option<PathBuf> {
        if !is_plain_file_name(id) {
            return None;
        }
        Some(self.base_path.join(id))
    }

    fn staging_path(&self) -> PathBuf {
        self.base_path.join(format!(".{}.tmp", Uuid::new_v4()))
    }

    async fn stage(&self, staging: &Path, bytes: &[u8]) -> DbResult<()> {
        let mut file = fs::File::create(staging).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Gives the staged file its final name. Never replaces an existing file.
    async fn publish(staging: &Path, path: &Path, file_name: &str) -> DbResult<()> {
        fs::hard_link(staging, path).await.map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => DbError::ArchiveExists(file_name.to_string()),
            _ => DbError::from(e),
        })
    }

    async fn discard(staging: &Path) {
        if let Err(e) = fs::remove_file(staging).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %staging.display(),
                    error = %e,
                    "Failed to remove staged archive"
                );
            }
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

fn artifact_file_name(name: &str) -> String {
    let suffix = format!(".{}", EXTENSION);
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

#[async_trait]
impl ArchiveStore for FilesystemArchiveStore {
    async fn write(&self, name: &str, snapshot: &ShiftArchive) -> DbResult<ArtifactId> {
        let name = name.trim();
        if !is_plain_file_name(name) {
            return Err(DbError::InvalidArchiveName(name.to_string()));
        }

        let file_name = artifact_file_name(name);
        let path = self.base_path.join(&file_name);
        if fs::try_exists(&path).await? {
            return Err(DbError::ArchiveExists(file_name));
        }

        let bytes = snapshot.to_json_pretty()?;
        let staging = self.staging_path();

        let published = match self.stage(&staging, &bytes).await {
            Ok(()) => Self::publish(&staging, &path, &file_name).await,
            Err(e) => Err(e),
        };
        Self::discard(&staging).await;
        published?;

        info!(artifact = %file_name, size = bytes.len(), "Archive written");
        Ok(ArtifactId::new(file_name))
    }

    async fn list(&self) -> DbResult<Vec<ArtifactId>> {
        let mut found: Vec<(SystemTime, String)> = Vec::new();

        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |e| e != EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_plain_file_name(file_name) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let stamp = metadata
                .modified()
                .or_else(|_| metadata.created())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((stamp, file_name.to_string()));
        }

        found.sort();
        debug!(count = found.len(), "Listed archives");
        Ok(found
            .into_iter()
            .map(|(_, name)| ArtifactId::new(name))
            .collect())
    }

    async fn read(&self, id: &str) -> DbResult<Vec<u8>> {
        let path = self
            .path_for_id(id)
            .ok_or_else(|| DbError::not_found("Archive", id))?;

        if !fs::try_exists(&path).await? {
            return Err(DbError::not_found("Archive", id));
        }

        Ok(fs::read(&path).await?)
    }

    async fn exists(&self, id: &str) -> DbResult<bool> {
        match self.path_for_id(id) {
            Some(path) => Ok(fs::try_exists(&path).await?),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::schema::ensure_schema;
    use caja_core::{ShiftParams, Workbook};
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    async fn create_temp_store() -> (FilesystemArchiveStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemArchiveStore::new(temp_dir.path()).await.unwrap();
        (store, temp_dir)
    }

    fn snapshot(stamp: &str) -> ShiftArchive {
        let mut wb = Workbook::new();
        ensure_schema(&mut wb).unwrap();
        let at = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").unwrap();
        ShiftArchive::build(&wb, &ShiftParams::default(), at, "Local").unwrap()
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (store, _temp) = create_temp_store().await;
        let archive = snapshot("2026-10-19 22:00:00");

        let id = store.write(&archive.name, &archive).await.unwrap();
        assert_eq!(id.as_str(), "Cierre caja 19-10-2026_22-00-00 Local.json");
        assert!(store.exists(id.as_str()).await.unwrap());

        let bytes = store.read(id.as_str()).await.unwrap();
        assert_eq!(ShiftArchive::from_json(&bytes).unwrap(), archive);
    }

    #[tokio::test]
    async fn test_write_never_overwrites() {
        let (store, _temp) = create_temp_store().await;
        let archive = snapshot("2026-10-19 22:00:00");

        store.write(&archive.name, &archive).await.unwrap();
        let err = store.write(&archive.name, &archive).await.unwrap_err();
        assert!(matches!(err, DbError::ArchiveExists(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_racing_writes_keep_the_first_artifact() {
        let (store, temp) = create_temp_store().await;
        let first = snapshot("2026-10-19 22:00:00");
        let mut second = first.clone();
        second.summary.cashier = "Luis".to_string();

        let (a, b) = tokio::join!(
            store.write(&first.name, &first),
            store.write(&second.name, &second)
        );
        let (winner, loser) = match (a, b) {
            (Ok(id), Err(e)) => ((id, &first), e),
            (Err(e), Ok(id)) => ((id, &second), e),
            other => panic!("expected exactly one write to succeed: {:?}", other),
        };
        assert!(matches!(loser, DbError::ArchiveExists(_)));

        let bytes = store.read(winner.0.as_str()).await.unwrap();
        assert_eq!(&ShiftArchive::from_json(&bytes).unwrap(), winner.1);

        let names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![winner.0.as_str().to_string()]);
    }

    #[tokio::test]
    async fn test_existing_artifact_is_untouched_by_a_late_writer() {
        let (store, temp) = create_temp_store().await;
        let archive = snapshot("2026-10-19 22:00:00");
        let path = temp.path().join("Cierre caja 19-10-2026_22-00-00 Local.json");
        std::fs::write(&path, b"original").unwrap();

        // skips the existence check and goes straight to linking
        let staging = store.staging_path();
        store.stage(&staging, b"replacement").await.unwrap();
        let err = FilesystemArchiveStore::publish(&staging, &path, "x.json")
            .await
            .unwrap_err();
        FilesystemArchiveStore::discard(&staging).await;

        assert!(matches!(err, DbError::ArchiveExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
        assert!(!staging.exists());
        assert!(store.write(&archive.name, &archive).await.is_err());
    }

    #[tokio::test]
    async fn test_no_staging_files_left_behind() {
        let (store, temp) = create_temp_store().await;
        let archive = snapshot("2026-10-19 22:00:00");
        store.write(&archive.name, &archive).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Cierre caja 19-10-2026_22-00-00 Local.json"]);
    }

    #[tokio::test]
    async fn test_list_oldest_first_and_latest() {
        let (store, temp) = create_temp_store().await;
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.latest().await.unwrap().is_none());

        // Later date, written first.
        let first = snapshot("2026-11-02 22:00:00");
        let second = snapshot("2026-10-19 22:00:00");
        store.write(&first.name, &first).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        store.write(&second.name, &second).await.unwrap();

        std::fs::write(temp.path().join(".abc.tmp"), b"partial").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"x").unwrap();

        let ids = store.list().await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), "Cierre caja 02-11-2026_22-00-00 Local.json");
        assert_eq!(
            store.latest().await.unwrap().unwrap().as_str(),
            "Cierre caja 19-10-2026_22-00-00 Local.json"
        );
    }

    #[tokio::test]
    async fn test_path_like_ids_are_not_found() {
        let (store, _temp) = create_temp_store().await;

        for id in ["../secret.json", "a/b.json", "a\\b.json", ".hidden.json", ""] {
            assert!(!store.exists(id).await.unwrap());
            assert!(matches!(
                store.read(id).await.unwrap_err(),
                DbError::NotFound { .. }
            ));
        }
        assert!(matches!(
            store.read("missing.json").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_write_rejects_path_like_names() {
        let (store, _temp) = create_temp_store().await;
        let archive = snapshot("2026-10-19 22:00:00");
        let err = store.write("../escape", &archive).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidArchiveName(_)));
    }

    #[tokio::test]
    async fn test_new_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        let store = FilesystemArchiveStore::new(&nested).await.unwrap();
        assert!(store.base_path().is_dir());
    }
}
