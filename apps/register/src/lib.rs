//! # caja-register: The Till
//!
//! Orchestration layer of the Caja till. It owns the store lock and the
//! authoritative shift state and exposes one async command per operation.
//!
//! ## Module Organization
//! ```text
//! caja_register/
//! ├── lib.rs          ◄─── You are here (exports, logging setup)
//! ├── config.rs       ◄─── RegisterConfig from CAJA_* variables
//! ├── error.rs        ◄─── RegisterError, ApiError (code + severity)
//! ├── state/
//! │   ├── mod.rs      ◄─── State exports
//! │   └── till.rs     ◄─── Till: lock, shift state, close sequence
//! ├── commands/
//! │   ├── shift.rs    ◄─── open_shift, shift_status
//! │   ├── sale.rs     ◄─── record_sale, delete_sale, listings
//! │   ├── delivery.rs ◄─── record_delivery, delete_delivery
//! │   ├── cash.rs     ◄─── expenses, shrinkage, complimentary, counts
//! │   ├── closing.rs  ◄─── close_shift, archive retrieval
//! │   └── report.rs   ◄─── current_summary, export_current
//! └── bin/seed.rs     ◄─── Demo shift end to end
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or "info,caja=debug,sqlx=warn"   │
//! │  2. RegisterConfig::from_env  paths, location, deletion passphrase      │
//! │  3. Till::open(&config)       SQLite (WAL, migrations), archive dir,    │
//! │                               schema repair, shift state restored       │
//! │  4. commands::*(&till, ..)    called by the presentation layer          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use config::RegisterConfig;
pub use error::{ApiError, ErrorCode, RegisterError, RegisterResult, Severity};
pub use state::{Clock, ClosedShift, Till};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=caja_register=trace` - Trace for the register only
/// - Default: INFO, DEBUG for the caja crates, WARN for sqlx
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caja=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
