//! # Register Configuration
//!
//! Where the workbook and archives live, the archive-name location, and
//! the deletion passphrase.
//!
//! ## Environment Variables
//! | Variable                 | Default                              |
//! |--------------------------|--------------------------------------|
//! | `CAJA_DB_PATH`           | `<data dir>/caja.db`                 |
//! | `CAJA_ARCHIVE_DIR`       | `<data dir>/cierres`                 |
//! | `CAJA_LOCATION`          | `Camilo Henriquez`                   |
//! | `CAJA_DELETE_PASSPHRASE` | unset: every sale deletion is refused |
//!
//! `CAJA_LOCATION` becomes part of every archive file name, so it may not
//! contain `/`, `\` or `..`.
//!
//! `<data dir>` is the platform data directory:
//! - **macOS**: `~/Library/Application Support/com.caja.register/`
//! - **Windows**: `%APPDATA%\caja\register\data\`
//! - **Linux**: `~/.local/share/register/`

use std::fmt;
use std::path::PathBuf;

use directories::ProjectDirs;

use caja_core::{DeletionPolicy, DEFAULT_LOCATION};

use crate::error::{RegisterError, RegisterResult};

pub const ENV_DB_PATH: &str = "CAJA_DB_PATH";
pub const ENV_ARCHIVE_DIR: &str = "CAJA_ARCHIVE_DIR";
pub const ENV_LOCATION: &str = "CAJA_LOCATION";
pub const ENV_DELETE_PASSPHRASE: &str = "CAJA_DELETE_PASSPHRASE";

const DB_FILE: &str = "caja.db";
const ARCHIVE_DIR: &str = "cierres";

/// Till configuration.
#[derive(Clone)]
pub struct RegisterConfig {
    /// SQLite file holding the workbook.
    pub database_path: PathBuf,

    /// Directory receiving one JSON artifact per closed shift.
    pub archive_dir: PathBuf,

    /// Suffix of archive names.
    pub location: String,

    /// Shared secret for sale deletion. `None` disables deletion.
    pub delete_passphrase: Option<String>,
}

impl RegisterConfig {
    /// Creates a configuration with explicit paths and defaults elsewhere.
    pub fn new(database_path: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        RegisterConfig {
            database_path: database_path.into(),
            archive_dir: archive_dir.into(),
            location: DEFAULT_LOCATION.to_string(),
            delete_passphrase: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_delete_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.delete_passphrase = Some(passphrase.into());
        self
    }

    /// Reads the `CAJA_*` environment variables.
    pub fn from_env() -> RegisterResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// Defaults for the two paths come from the platform data directory,
    /// which is only resolved when one of them is unset.
    pub fn from_lookup<F>(lookup: F) -> RegisterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_override = value(ENV_DB_PATH).map(PathBuf::from);
        let archive_override = value(ENV_ARCHIVE_DIR).map(PathBuf::from);

        let (database_path, archive_dir) = match (db_override, archive_override) {
            (Some(db), Some(archives)) => (db, archives),
            (db, archives) => {
                let data_dir = default_data_dir()?;
                (
                    db.unwrap_or_else(|| data_dir.join(DB_FILE)),
                    archives.unwrap_or_else(|| data_dir.join(ARCHIVE_DIR)),
                )
            }
        };

        let config = RegisterConfig {
            database_path,
            archive_dir,
            location: value(ENV_LOCATION).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            delete_passphrase: value(ENV_DELETE_PASSPHRASE),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make every shift close fail.
    pub fn validate(&self) -> RegisterResult<()> {
        let location = self.location.trim();
        if location.contains(['/', '\\']) || location.contains("..") {
            return Err(RegisterError::Config(format!(
                "{} must not contain '/', '\\' or '..': {:?}",
                ENV_LOCATION, self.location
            )));
        }
        Ok(())
    }

    /// The deletion policy this configuration describes.
    pub fn deletion_policy(&self) -> DeletionPolicy {
        DeletionPolicy::new(self.delete_passphrase.clone())
    }
}

impl fmt::Debug for RegisterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterConfig")
            .field("database_path", &self.database_path)
            .field("archive_dir", &self.archive_dir)
            .field("location", &self.location)
            .field("delete_passphrase", &self.delete_passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_data_dir() -> RegisterResult<PathBuf> {
    let dirs = ProjectDirs::from("com", "caja", "register").ok_or_else(|| {
        RegisterError::Config("Could not determine app data directory".to_string())
    })?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_values() {
        let config = RegisterConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/caja/caja.db"),
            (ENV_ARCHIVE_DIR, "/tmp/caja/cierres"),
            (ENV_LOCATION, "Providencia"),
            (ENV_DELETE_PASSPHRASE, "secreto"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/caja/caja.db"));
        assert_eq!(config.archive_dir, PathBuf::from("/tmp/caja/cierres"));
        assert_eq!(config.location, "Providencia");
        assert!(config.deletion_policy().authorize("secreto").is_ok());
    }

    #[test]
    fn test_defaults_for_location_and_passphrase() {
        let config = RegisterConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "a.db"),
            (ENV_ARCHIVE_DIR, "archives"),
            (ENV_DELETE_PASSPHRASE, "   "),
        ]))
        .unwrap();

        assert_eq!(config.location, DEFAULT_LOCATION);
        assert!(config.delete_passphrase.is_none());
        assert!(!config.deletion_policy().is_enabled());
    }

    #[test]
    fn test_path_like_location_is_rejected() {
        for location in ["Sucursal/Centro", "..", "a\\b", "Local.."] {
            let err = RegisterConfig::from_lookup(lookup(&[
                (ENV_DB_PATH, "a.db"),
                (ENV_ARCHIVE_DIR, "archives"),
                (ENV_LOCATION, location),
            ]))
            .unwrap_err();
            assert!(matches!(err, RegisterError::Config(_)), "{}", location);
        }

        assert!(RegisterConfig::new("a.db", "archives")
            .with_location("Ñuñoa 2")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_debug_redacts_passphrase() {
        let config = RegisterConfig::new("a.db", "archives").with_delete_passphrase("secreto");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secreto"));
        assert!(debug.contains("<redacted>"));
    }
}
