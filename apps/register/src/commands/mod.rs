//! # Till Commands
//!
//! One async function per operation. These are the seam a presentation
//! layer (web handlers, a desktop shell) calls into.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── shift.rs     ◄─── open_shift, shift_status
//! ├── sale.rs      ◄─── record_sale, delete_sale, list_sales, list_tickets
//! ├── delivery.rs  ◄─── record_delivery, delete_delivery, list_deliveries
//! ├── cash.rs      ◄─── expenses, shrinkage, complimentary, denomination counts
//! ├── closing.rs   ◄─── close_shift, latest_archive, archive_history, read_archive
//! └── report.rs    ◄─── current_summary, export_current
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  presentation layer                                                     │
//! │         │  record_sale(&till, RecordSaleRequest { .. })                 │
//! │         ▼                                                               │
//! │  async fn record_sale(                                                  │
//! │      till: &Till,              ◄── shared till                         │
//! │      request: RecordSaleRequest, ◄── parsed form input                 │
//! │  ) -> Result<RecordSaleResponse, ApiError>                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  till.guarded(..) ── caja-core builds rows ── caja-db saves            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Ok(response) or Err(ApiError { code, severity, message })             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests and responses serialize in camelCase.

pub mod cash;
pub mod closing;
pub mod delivery;
pub mod report;
pub mod sale;
pub mod shift;
