//! # Shift State
//!
//! Tracks whether a shift is open and, if so, who opened it with what float.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            open(params)                begin_closing()                  │
//! │   ┌────────┐ ──────────► ┌────────┐ ─────────────────► ┌─────────┐     │
//! │   │ Closed │             │  Open  │                    │ Closing │     │
//! │   └────────┘ ◄────────── └────────┘ ◄───────────────── └─────────┘     │
//! │        ▲        close()       │ ▲      abort_closing()       │          │
//! │        │                      │ │                            │          │
//! │        │                      └─┘ open(params)               │          │
//! │        │                     (overwrites)                    │          │
//! │        └─────────────────────────────────────────────────────┘          │
//! │                          finish_closing()                               │
//! │                                                                         │
//! │  Guarded operations call require_open(): only `Open` passes.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One authoritative `ShiftState` lives behind the register's store lock;
//! nothing here is global.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Shift Parameters
// =============================================================================

/// Cashier, shift label and opening float, as persisted in `parametros`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftParams {
    pub cashier: String,
    pub shift_label: String,
    pub opening_float: Money,
}

impl ShiftParams {
    /// Builds parameters for a new shift.
    ///
    /// ## Rules
    /// - cashier and label are trimmed and must not be empty
    /// - the opening float must be greater than zero
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::{Money, ShiftParams};
    ///
    /// assert!(ShiftParams::validated("Ana", "Mañana", Money::from_pesos(50_000)).is_ok());
    /// assert!(ShiftParams::validated("", "Mañana", Money::from_pesos(50_000)).is_err());
    /// assert!(ShiftParams::validated("Ana", "Mañana", Money::zero()).is_err());
    /// ```
    pub fn validated(cashier: &str, shift_label: &str, opening_float: Money) -> CoreResult<Self> {
        let cashier = cashier.trim();
        let shift_label = shift_label.trim();

        if cashier.is_empty() {
            return Err(CoreError::InvalidShiftParams {
                reason: "cashier is required".to_string(),
            });
        }
        if shift_label.is_empty() {
            return Err(CoreError::InvalidShiftParams {
                reason: "shift label is required".to_string(),
            });
        }
        if !opening_float.is_positive() {
            return Err(CoreError::InvalidShiftParams {
                reason: "opening float must be greater than zero".to_string(),
            });
        }

        Ok(ShiftParams {
            cashier: cashier.to_string(),
            shift_label: shift_label.to_string(),
            opening_float,
        })
    }

    /// Whether these parameters describe an open shift.
    pub fn is_complete(&self) -> bool {
        !self.cashier.trim().is_empty()
            && !self.shift_label.trim().is_empty()
            && self.opening_float.is_positive()
    }
}

// =============================================================================
// Shift State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShiftPhase {
    Closed,
    Open,
    Closing,
}

/// The authoritative shift state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftState {
    phase: ShiftPhase,
    params: ShiftParams,
}

impl Default for ShiftState {
    fn default() -> Self {
        ShiftState::closed()
    }
}

impl ShiftState {
    pub fn closed() -> Self {
        ShiftState {
            phase: ShiftPhase::Closed,
            params: ShiftParams::default(),
        }
    }

    /// Restores state from persisted parameters: open when all three are
    /// present, closed otherwise. Lets a restarted process resume a shift.
    pub fn from_params(params: ShiftParams) -> Self {
        if params.is_complete() {
            ShiftState {
                phase: ShiftPhase::Open,
                params,
            }
        } else {
            ShiftState::closed()
        }
    }

    #[inline]
    pub fn phase(&self) -> ShiftPhase {
        self.phase
    }

    #[inline]
    pub fn params(&self) -> &ShiftParams {
        &self.params
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.phase == ShiftPhase::Open
    }

    /// Gate for guarded operations.
    pub fn require_open(&self) -> CoreResult<&ShiftParams> {
        if self.is_open() {
            Ok(&self.params)
        } else {
            Err(CoreError::NoActiveShift)
        }
    }

    /// Marks the shift open. Opening over an open shift overwrites it.
    pub fn open(&mut self, params: ShiftParams) {
        self.phase = ShiftPhase::Open;
        self.params = params;
    }

    /// `Open → Closing`. Returns the parameters of the shift being closed.
    pub fn begin_closing(&mut self) -> CoreResult<ShiftParams> {
        self.require_open()?;
        self.phase = ShiftPhase::Closing;
        Ok(self.params.clone())
    }

    /// `Closing → Open`, after a failed archive or save.
    pub fn abort_closing(&mut self) {
        if self.phase == ShiftPhase::Closing {
            self.phase = ShiftPhase::Open;
        }
    }

    /// `Closing → Closed`.
    pub fn finish_closing(&mut self) {
        if self.phase == ShiftPhase::Closing {
            self.close();
        }
    }

    /// Clears cashier and label, zeroes the float, marks closed.
    pub fn close(&mut self) {
        *self = ShiftState::closed();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
