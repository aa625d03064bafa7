//! # caja-core: Pure Business Logic for the Caja Till
//!
//! This crate is the **heart** of the till. It holds every rule about
//! shifts, entries and reconciliation as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Caja Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation layer (out of tree)                  │   │
//! │  │     forms, listings, report rendering, downloads                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  caja-register (Till + commands)                │   │
//! │  │     open_shift, record_sale, close_shift, latest_archive ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caja-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────────┐          │   │
//! │  │  │ workbook │ │  shift   │ │ entries  │ │ reconcile │          │   │
//! │  │  │  schema  │ │  State   │ │  rules   │ │  summary  │          │   │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └───────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO WALL CLOCK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                caja-db (workbook store + archives)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in whole pesos (no floating point)
//! - [`types`] - Payment methods, denominations, row types
//! - [`workbook`] - The tabular store as an in-memory document
//! - [`schema`] - Sheet names, headers, typed row mapping, parameters
//! - [`shift`] - Shift parameters and lifecycle state
//! - [`entries`] - Entry validation, positional edits, deletion policy
//! - [`reconcile`] / [`summary`] - The reconciliation engine and its report
//! - [`tickets`] / [`archive`] - Ticket grouping and the close snapshot
//! - [`validation`] - Input parsing and field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use caja_core::{reconcile, Money, PaymentMethod, ShiftLedger, ShiftParams};
//! use caja_core::entries::{build_sale, LegInput};
//!
//! let sale = build_sale(
//!     "17",
//!     "",
//!     &[
//!         LegInput::new("debito", Money::from_pesos(1000), Money::from_pesos(100)),
//!         LegInput::new("efectivo", Money::from_pesos(500), Money::zero()),
//!     ],
//!     "2026-10-19 13:00:00",
//! )
//! .unwrap();
//!
//! let ledger = ShiftLedger { sales: sale.legs, ..Default::default() };
//! let params = ShiftParams::validated("Ana", "Mañana", Money::from_pesos(20_000)).unwrap();
//! let now = chrono::NaiveDateTime::parse_from_str("2026-10-19 22:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
//!
//! let summary = reconcile(&ledger, &params, now).unwrap();
//! assert_eq!(summary.sales_by_method[PaymentMethod::Debit].pesos(), 1100);
//! assert_eq!(summary.expected_cash.pesos(), 20_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod archive;
pub mod entries;
pub mod error;
pub mod money;
pub mod reconcile;
pub mod schema;
pub mod shift;
pub mod summary;
pub mod tickets;
pub mod types;
pub mod validation;
pub mod workbook;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caja_core::Money` instead of
// `use caja_core::money::Money`

pub use archive::{archive_name, ShiftArchive};
pub use entries::DeletionPolicy;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconcile::reconcile;
pub use schema::ShiftLedger;
pub use shift::{ShiftParams, ShiftPhase, ShiftState};
pub use summary::{
    CourierSummary, DenominationBreakdown, DenominationLine, MethodTotals, SectionKind,
    ShiftSummary, SummaryRow, SummarySection, SummaryValue,
};
pub use tickets::{group_tickets, TicketSummary};
pub use types::*;
pub use workbook::{Cell, Sheet, Workbook};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Archive-name suffix used when no location is configured.
pub const DEFAULT_LOCATION: &str = "Camilo Henriquez";
