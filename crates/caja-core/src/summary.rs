//! # Shift Summary
//!
//! The typed output of the reconciliation engine and its ordered report
//! sections.
//!
//! ## Section Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Desglose de Ventas            every method, zero included          │
//! │  2. Resumen Tarjetas              debit, credit, prepaid, subtotals    │
//! │  3. Resumen Efectivo              float + cash sales - expenses        │
//! │  4. Propinas por Medio de Pago    nonzero tips, then total             │
//! │  5. Desglose Caja                 nonzero denominations, then total    │
//! │  6. Desglose Efectivo a Depositar nonzero denominations, then total    │
//! │  7. Repartos                      per courier fees, floor, final       │
//! │  8. Resumen de Caja               grand totals and loss ratio          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values stay typed (`currency | percentage | count`); the presentation
//! layer decides how to render them.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Denomination, PaymentMethod, Percentage};

// =============================================================================
// Per-Method Totals
// =============================================================================

/// A fixed-size accumulator indexed by [`PaymentMethod`].
///
/// Every method starts at zero, so lookups never miss. Serialized as a map
/// keyed by the stored method name, which is also its TypeScript shape
/// (see the field overrides on [`ShiftSummary`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PaymentMethod, Money>", into = "BTreeMap<PaymentMethod, Money>")]
pub struct MethodTotals([Money; PaymentMethod::COUNT]);

impl MethodTotals {
    pub fn new() -> Self {
        MethodTotals::default()
    }

    #[inline]
    pub fn get(&self, method: PaymentMethod) -> Money {
        self.0[method.index()]
    }

    /// Adds to one method and returns its new total. `None` on overflow,
    /// leaving the total unchanged.
    #[inline]
    pub fn add(&mut self, method: PaymentMethod, amount: Money) -> Option<Money> {
        let slot = &mut self.0[method.index()];
        *slot = slot.checked_add(amount)?;
        Some(*slot)
    }

    /// Sum over every method, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum(self.0)
    }

    /// Sum over a subset of methods, `None` on overflow.
    pub fn total_of(&self, methods: &[PaymentMethod]) -> Option<Money> {
        Money::checked_sum(methods.iter().map(|m| self.get(*m)))
    }

    /// `(method, amount)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (PaymentMethod, Money)> + '_ {
        PaymentMethod::ALL
            .into_iter()
            .map(move |m| (m, self.get(m)))
    }
}

impl Index<PaymentMethod> for MethodTotals {
    type Output = Money;

    fn index(&self, method: PaymentMethod) -> &Money {
        &self.0[method.index()]
    }
}

impl IndexMut<PaymentMethod> for MethodTotals {
    fn index_mut(&mut self, method: PaymentMethod) -> &mut Money {
        &mut self.0[method.index()]
    }
}

impl From<BTreeMap<PaymentMethod, Money>> for MethodTotals {
    fn from(map: BTreeMap<PaymentMethod, Money>) -> Self {
        let mut totals = MethodTotals::new();
        for (method, amount) in map {
            totals[method] = amount;
        }
        totals
    }
}

impl From<MethodTotals> for BTreeMap<PaymentMethod, Money> {
    fn from(totals: MethodTotals) -> Self {
        totals.iter().collect()
    }
}

// =============================================================================
// Breakdowns
// =============================================================================

/// One nonzero denomination in a count breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationLine {
    pub denomination: Denomination,
    pub count: i64,
    pub total: Money,
}

/// Counted cash for one purpose (drawer or deposit).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationBreakdown {
    /// Denominations with a nonzero count, smallest first.
    pub lines: Vec<DenominationLine>,
    pub total: Money,
}

/// Payout to one courier for the shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CourierSummary {
    pub courier: String,
    pub total_fees: Money,
    /// First nonzero floor fee recorded for this courier.
    pub floor_fee: Money,
    /// `total_fees + floor_fee`.
    pub final_total: Money,
}

// =============================================================================
// Shift Summary
// =============================================================================

/// Reconciled totals for one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftSummary {
    pub cashier: String,
    pub shift_label: String,
    pub opening_float: Money,
    /// Local time the summary was produced (`YYYY-MM-DD HH:MM:SS`).
    pub generated_at: String,

    /// Leg totals (tips included) per method.
    #[ts(as = "BTreeMap<PaymentMethod, Money>")]
    pub sales_by_method: MethodTotals,
    #[ts(as = "BTreeMap<PaymentMethod, Money>")]
    pub tips_by_method: MethodTotals,

    /// Card legs' amounts, tips excluded.
    pub cards_without_tips: Money,
    /// Card legs' totals, tips included.
    pub cards_with_tips: Money,

    pub cash_sales: Money,
    pub total_expenses: Money,
    /// `opening_float + cash_sales - total_expenses`.
    pub expected_cash: Money,

    pub total_tips: Money,

    pub drawer: DenominationBreakdown,
    pub deposit: DenominationBreakdown,

    pub couriers: Vec<CourierSummary>,

    pub total_sales: Money,
    pub total_complimentary: Money,
    pub total_shrinkage: Money,
    /// `opening_float + total_sales - expenses - complimentary - shrinkage`.
    pub total_cash_drawer: Money,
    /// `(complimentary + shrinkage) / total_sales`, zero without sales.
    pub loss_ratio: Percentage,
}

// =============================================================================
// Report Sections
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    SalesBreakdown,
    CardSummary,
    CashSummary,
    TipsByMethod,
    DrawerCount,
    DepositCount,
    Couriers,
    ShiftTotals,
}

/// A typed report value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SummaryValue {
    Currency(Money),
    Percentage(Percentage),
    Count(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummaryRow {
    pub label: String,
    pub values: Vec<SummaryValue>,
}

impl SummaryRow {
    fn currency(label: impl Into<String>, amount: Money) -> Self {
        SummaryRow {
            label: label.into(),
            values: vec![SummaryValue::Currency(amount)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummarySection {
    pub kind: SectionKind,
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

impl SummarySection {
    fn new(kind: SectionKind, title: &str, rows: Vec<SummaryRow>) -> Self {
        SummarySection {
            kind,
            title: title.to_string(),
            rows,
        }
    }

    /// First row with this label.
    pub fn row(&self, label: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

fn count_rows(breakdown: &DenominationBreakdown, total_label: &str) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = breakdown
        .lines
        .iter()
        .map(|line| SummaryRow {
            label: line.denomination.value().to_string(),
            values: vec![SummaryValue::Count(line.count), SummaryValue::Currency(line.total)],
        })
        .collect();
    rows.push(SummaryRow::currency(total_label, breakdown.total));
    rows
}

impl ShiftSummary {
    /// The eight report sections, in report order.
    pub fn sections(&self) -> Vec<SummarySection> {
        let sales = PaymentMethod::ALL
            .iter()
            .map(|m| SummaryRow::currency(m.label(), self.sales_by_method.get(*m)))
            .collect();

        let cards = vec![
            SummaryRow::currency("Débito", self.sales_by_method[PaymentMethod::Debit]),
            SummaryRow::currency("Crédito", self.sales_by_method[PaymentMethod::Credit]),
            SummaryRow::currency("Prepago", self.sales_by_method[PaymentMethod::Prepaid]),
            SummaryRow::currency("Total sin Propinas", self.cards_without_tips),
            SummaryRow::currency("Total con Propinas", self.cards_with_tips),
        ];

        let cash = vec![
            SummaryRow::currency("Caja Inicial", self.opening_float),
            SummaryRow::currency("Venta Efectivo", self.cash_sales),
            SummaryRow::currency("Total Egresos Efectivo", self.total_expenses),
            SummaryRow::currency("Total Resumen Efectivo", self.expected_cash),
        ];

        let mut tips: Vec<SummaryRow> = self
            .tips_by_method
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(method, amount)| SummaryRow::currency(format!("Propinas {}", method.label()), amount))
            .collect();
        tips.push(SummaryRow::currency("Total Propinas", self.total_tips));

        let couriers = self
            .couriers
            .iter()
            .map(|c| SummaryRow {
                label: c.courier.clone(),
                values: vec![
                    SummaryValue::Currency(c.total_fees),
                    SummaryValue::Currency(c.floor_fee),
                    SummaryValue::Currency(c.final_total),
                ],
            })
            .collect();

        let totals = vec![
            SummaryRow::currency("Caja Inicial", self.opening_float),
            SummaryRow::currency("Ventas Totales", self.total_sales),
            SummaryRow::currency("Egresos", -self.total_expenses),
            SummaryRow::currency("Cortesías", -self.total_complimentary),
            SummaryRow::currency("Mermas", -self.total_shrinkage),
            SummaryRow::currency("TOTAL CAJA FINAL", self.total_cash_drawer),
            SummaryRow {
                label: "% Pérdidas sobre Ventas".to_string(),
                values: vec![SummaryValue::Percentage(self.loss_ratio)],
            },
        ];

        vec![
            SummarySection::new(SectionKind::SalesBreakdown, "Desglose de Ventas", sales),
            SummarySection::new(SectionKind::CardSummary, "Resumen Tarjetas", cards),
            SummarySection::new(SectionKind::CashSummary, "Resumen Efectivo", cash),
            SummarySection::new(SectionKind::TipsByMethod, "Propinas por Medio de Pago", tips),
            SummarySection::new(
                SectionKind::DrawerCount,
                "Desglose Caja",
                count_rows(&self.drawer, "Total Caja"),
            ),
            SummarySection::new(
                SectionKind::DepositCount,
                "Desglose Efectivo a Depositar",
                count_rows(&self.deposit, "Total a Depositar"),
            ),
            SummarySection::new(SectionKind::Couriers, "Repartos", couriers),
            SummarySection::new(SectionKind::ShiftTotals, "Resumen de Caja", totals),
        ]
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
