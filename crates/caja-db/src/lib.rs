//! # caja-db: Persistence Layer for the Caja Till
//!
//! This crate provides storage for the till: the working workbook in
//! SQLite (via sqlx) and closed-shift archives on the filesystem.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja Data Flow                                   │
//! │                                                                         │
//! │  Till command (record_sale, close_shift, ...)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caja-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Workbook     │    │   Archive    │  │   │
//! │  │   │   (pool.rs)   │◄───│  Repository   │    │   Store      │  │   │
//! │  │   │ SqlitePool    │    │ load / save   │    │ write / list │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘  │   │
//! │  │          │                                         │          │   │
//! │  └──────────┼─────────────────────────────────────────┼──────────┘   │
//! │             ▼                                         ▼              │
//! │        caja.db (WAL)                         archives/*.json         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Persistence error types
//! - [`repository`] - Workbook repository
//! - [`archive`] - Archive store trait and filesystem backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caja_db::{Database, DbConfig, FilesystemArchiveStore};
//!
//! let db = Database::new(DbConfig::new("caja.db")).await?;
//! let workbook = db.workbooks().load_with_schema().await?;
//!
//! let archives = FilesystemArchiveStore::new("archives").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod archive;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use archive::{ArchiveStore, ArtifactId, FilesystemArchiveStore};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::workbook::WorkbookRepository;
