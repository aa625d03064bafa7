//! # Domain Types
//!
//! Core domain types used throughout the till.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PaymentMethod  │   │  Denomination   │   │  CountPurpose   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  efectivo       │   │  $10 .. $20,000 │   │  Drawer (Caja)  │       │
//! │  │  debito, ...    │   │  (9 values)     │   │  Deposit        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Rows: SaleLeg, Delivery, Expense, Shrinkage, Complimentary,            │
//! │        DenominationCount, DeletedSale                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row types mirror one workbook row each; see [`crate::schema`] for the
//! cell layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so the loss ratio keeps two decimals
/// without floats: 1250 bps = 12.50%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(i64);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percentage(bps)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// `part / whole * 100`, rounded half up to the nearest basis point.
    ///
    /// Defined as zero when `whole` is not positive, so an empty shift
    /// never divides by zero.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::{Money, Percentage};
    ///
    /// let loss = Percentage::ratio(Money::from_pesos(500), Money::from_pesos(4000));
    /// assert_eq!(loss.bps(), 1250); // 12.50%
    ///
    /// let none = Percentage::ratio(Money::from_pesos(500), Money::zero());
    /// assert_eq!(none.bps(), 0);
    /// ```
    pub fn ratio(part: Money, whole: Money) -> Self {
        if !whole.is_positive() {
            return Percentage::zero();
        }
        // i128 keeps part * 10000 from overflowing on large shifts
        let whole = whole.pesos() as i128;
        let bps = (part.pesos() as i128 * 10_000 + whole / 2) / whole;
        Percentage(bps as i64)
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// The fixed set of payment methods the till recognizes.
///
/// Serialized as the lowercase name stored in the workbook. Legs carrying
/// any other method are kept in the sales table but left out of every
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[serde(rename = "efectivo")]
    Cash,
    #[serde(rename = "debito")]
    Debit,
    #[serde(rename = "credito")]
    Credit,
    #[serde(rename = "transferencia")]
    Transfer,
    #[serde(rename = "pluxee")]
    Pluxee,
    #[serde(rename = "edenred")]
    Edenred,
    #[serde(rename = "amipass")]
    Amipass,
    #[serde(rename = "pedidos ya")]
    PedidosYa,
    #[serde(rename = "uber eats")]
    UberEats,
    #[serde(rename = "prepago")]
    Prepaid,
}

impl PaymentMethod {
    /// Number of enumerated methods.
    pub const COUNT: usize = 10;

    /// Every method in report order.
    pub const ALL: [PaymentMethod; PaymentMethod::COUNT] = [
        PaymentMethod::Cash,
        PaymentMethod::Debit,
        PaymentMethod::Credit,
        PaymentMethod::Transfer,
        PaymentMethod::Pluxee,
        PaymentMethod::Edenred,
        PaymentMethod::Amipass,
        PaymentMethod::PedidosYa,
        PaymentMethod::UberEats,
        PaymentMethod::Prepaid,
    ];

    /// Methods that settle through the card terminal.
    pub const CARDS: [PaymentMethod; 3] = [
        PaymentMethod::Debit,
        PaymentMethod::Credit,
        PaymentMethod::Prepaid,
    ];

    /// Position in [`PaymentMethod::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name as stored in the sales table.
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "efectivo",
            PaymentMethod::Debit => "debito",
            PaymentMethod::Credit => "credito",
            PaymentMethod::Transfer => "transferencia",
            PaymentMethod::Pluxee => "pluxee",
            PaymentMethod::Edenred => "edenred",
            PaymentMethod::Amipass => "amipass",
            PaymentMethod::PedidosYa => "pedidos ya",
            PaymentMethod::UberEats => "uber eats",
            PaymentMethod::Prepaid => "prepago",
        }
    }

    /// Report label: the stored name with its first letter capitalized.
    pub fn label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Parses a stored method, ignoring case and surrounding whitespace.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::PaymentMethod;
    ///
    /// assert_eq!(PaymentMethod::parse("  Debito "), Some(PaymentMethod::Debit));
    /// assert_eq!(PaymentMethod::parse("UBER EATS"), Some(PaymentMethod::UberEats));
    /// assert_eq!(PaymentMethod::parse("bitcoin"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
    }

    /// Whether the authorization code is kept for this method.
    #[inline]
    pub const fn keeps_auth_code(self) -> bool {
        matches!(self, PaymentMethod::Debit | PaymentMethod::Credit)
    }

    /// Whether the method settles through the card terminal.
    #[inline]
    pub const fn is_card(self) -> bool {
        matches!(
            self,
            PaymentMethod::Debit | PaymentMethod::Credit | PaymentMethod::Prepaid
        )
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Denomination
// =============================================================================

/// Coin and note values counted into the drawer or the deposit bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Denomination {
    #[serde(rename = "10")]
    Coin10,
    #[serde(rename = "50")]
    Coin50,
    #[serde(rename = "100")]
    Coin100,
    #[serde(rename = "500")]
    Coin500,
    #[serde(rename = "1000")]
    Note1000,
    #[serde(rename = "2000")]
    Note2000,
    #[serde(rename = "5000")]
    Note5000,
    #[serde(rename = "10000")]
    Note10000,
    #[serde(rename = "20000")]
    Note20000,
}

impl Denomination {
    /// Number of denominations.
    pub const COUNT: usize = 9;

    /// Every denomination, smallest first.
    pub const ALL: [Denomination; Denomination::COUNT] = [
        Denomination::Coin10,
        Denomination::Coin50,
        Denomination::Coin100,
        Denomination::Coin500,
        Denomination::Note1000,
        Denomination::Note2000,
        Denomination::Note5000,
        Denomination::Note10000,
        Denomination::Note20000,
    ];

    /// Position in [`Denomination::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Face value in pesos.
    pub const fn pesos(self) -> i64 {
        match self {
            Denomination::Coin10 => 10,
            Denomination::Coin50 => 50,
            Denomination::Coin100 => 100,
            Denomination::Coin500 => 500,
            Denomination::Note1000 => 1000,
            Denomination::Note2000 => 2000,
            Denomination::Note5000 => 5000,
            Denomination::Note10000 => 10_000,
            Denomination::Note20000 => 20_000,
        }
    }

    /// Face value as Money.
    #[inline]
    pub const fn value(self) -> Money {
        Money::from_pesos(self.pesos())
    }

    /// Looks up a face value in the fixed set.
    pub fn from_pesos(pesos: i64) -> Option<Self> {
        Denomination::ALL.into_iter().find(|d| d.pesos() == pesos)
    }
}

// =============================================================================
// Count Purpose
// =============================================================================

/// Where counted cash goes: stays in the drawer, or leaves for the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CountPurpose {
    /// Cash physically retained in the till (stored as `Caja`).
    Drawer,
    /// Cash counted out for bank deposit (stored as `Depositar`).
    Deposit,
}

impl CountPurpose {
    /// Value written to the `Tipo` column.
    pub const fn as_stored(self) -> &'static str {
        match self {
            CountPurpose::Drawer => "Caja",
            CountPurpose::Deposit => "Depositar",
        }
    }

    /// Reads the `Tipo` column: empty means drawer, `caja` in any case
    /// means drawer, anything else is a deposit.
    pub fn from_stored(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("caja") {
            CountPurpose::Drawer
        } else {
            CountPurpose::Deposit
        }
    }
}

impl Default for CountPurpose {
    fn default() -> Self {
        CountPurpose::Drawer
    }
}

// =============================================================================
// Rows
// =============================================================================

/// One payment-method portion of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLeg {
    pub recorded_at: String,
    /// Card authorization code; empty unless the method is debit or credit.
    pub auth_code: String,
    pub ticket_number: String,
    /// Method as stored (lowercased at recording time).
    pub method: String,
    /// Amount excluding tip.
    pub amount: Money,
    pub tip: Money,
    /// `amount + tip`.
    pub total: Money,
}

impl SaleLeg {
    /// The recognized method, if any.
    #[inline]
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        PaymentMethod::parse(&self.method)
    }
}

/// A delivery run paid out to a courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub recorded_at: String,
    pub courier: String,
    pub address: String,
    pub amount: Money,
    /// Building/floor surcharge; nonzero at most once per courier per shift.
    pub floor_fee: Money,
}

/// A cash expense paid out of the drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub recorded_at: String,
    pub reason: String,
    pub amount: Money,
    pub receipt_ref: String,
}

/// Waste or shrinkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shrinkage {
    pub recorded_at: String,
    pub reason: String,
    pub amount: Money,
}

/// An item given away on the house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complimentary {
    pub recorded_at: String,
    pub amount: Money,
    pub reason: String,
}

/// A counted stack of one denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationCount {
    pub recorded_at: String,
    /// Face value as stored; rows outside the fixed set are ignored by the engine.
    pub value: i64,
    pub count: i64,
    /// `value * count`.
    pub total: Money,
    pub purpose: CountPurpose,
}

/// A sale leg moved out of the live table by an authorized deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedSale {
    pub deleted_at: String,
    pub auth_code: String,
    pub ticket_number: String,
    pub method: String,
    pub amount: Money,
    pub tip: Money,
    pub total: Money,
    pub reason: String,
}

/// A row together with its 1-based position in its table.
///
/// Positions double as identifiers for edit/delete. Row 1 is the header,
/// so the first data row is position 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Positioned<T> {
    pub position: usize,
    pub entry: T,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_ratio_rounds_half_up() {
        // 1 / 3 = 33.333..% → 3333 bps
        let p = Percentage::ratio(Money::from_pesos(1), Money::from_pesos(3));
        assert_eq!(p.bps(), 3333);
        // 2 / 3 = 66.666..% → 6667 bps
        let p = Percentage::ratio(Money::from_pesos(2), Money::from_pesos(3));
        assert_eq!(p.bps(), 6667);
    }

    #[test]
    fn test_percentage_ratio_zero_whole() {
        let p = Percentage::ratio(Money::from_pesos(9000), Money::zero());
        assert_eq!(p, Percentage::zero());
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.50%");
        assert_eq!(Percentage::from_bps(5).to_string(), "0.05%");
        assert_eq!(Percentage::zero().to_string(), "0.00%");
        assert!((Percentage::from_bps(1250).percentage() - 12.5).abs() < 0.001);
    }

    #[test]
    fn test_payment_method_index_matches_all() {
        for (i, method) in PaymentMethod::ALL.iter().enumerate() {
            assert_eq!(method.index(), i);
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(*method));
        }
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::Cash.label(), "Efectivo");
        assert_eq!(PaymentMethod::PedidosYa.label(), "Pedidos ya");
    }

    #[test]
    fn test_payment_method_serde_uses_stored_name() {
        let json = serde_json::to_string(&PaymentMethod::UberEats).unwrap();
        assert_eq!(json, "\"uber eats\"");
    }

    #[test]
    fn test_auth_code_and_card_sets() {
        assert!(PaymentMethod::Debit.keeps_auth_code());
        assert!(PaymentMethod::Credit.keeps_auth_code());
        assert!(!PaymentMethod::Prepaid.keeps_auth_code());
        assert!(PaymentMethod::Prepaid.is_card());
        assert!(!PaymentMethod::Cash.is_card());
        assert!(PaymentMethod::CARDS.iter().all(|m| m.is_card()));
    }

    #[test]
    fn test_denomination_lookup() {
        assert_eq!(Denomination::from_pesos(5000), Some(Denomination::Note5000));
        assert_eq!(Denomination::from_pesos(200), None);
        for (i, d) in Denomination::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn test_count_purpose_from_stored() {
        assert_eq!(CountPurpose::from_stored("Caja"), CountPurpose::Drawer);
        assert_eq!(CountPurpose::from_stored("CAJA "), CountPurpose::Drawer);
        assert_eq!(CountPurpose::from_stored(""), CountPurpose::Drawer);
        assert_eq!(CountPurpose::from_stored("Depositar"), CountPurpose::Deposit);
        assert_eq!(CountPurpose::from_stored("banco"), CountPurpose::Deposit);
    }
}
