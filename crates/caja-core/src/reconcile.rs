//! # Reconciliation Engine
//!
//! Aggregates the current shift's rows into a [`ShiftSummary`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ShiftLedger (typed rows)                                              │
//! │       │                                                                 │
//! │       ├── sales ──────► per-method totals + tips, card subtotals        │
//! │       ├── expenses ───► expected cash                                   │
//! │       ├── counts ─────► drawer / deposit breakdowns                     │
//! │       ├── deliveries ─► courier payouts                                 │
//! │       └── all ────────► grand total + loss ratio                        │
//! │                                                                         │
//! │  Pure: no wall clock, no store. Same ledger in, same summary out.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::schema::{format_timestamp, ShiftLedger};
use crate::shift::ShiftParams;
use crate::summary::{
    CourierSummary, DenominationBreakdown, DenominationLine, MethodTotals, ShiftSummary,
};
use crate::types::{
    CountPurpose, Delivery, Denomination, DenominationCount, PaymentMethod, Percentage, SaleLeg,
};

/// Reconciles one shift.
///
/// `params` supplies the header (cashier, label, opening float);
/// `generated_at` is stamped on the summary. Fails with `InvalidAmount`
/// when a total does not fit in `Money`.
pub fn reconcile(
    ledger: &ShiftLedger,
    params: &ShiftParams,
    generated_at: NaiveDateTime,
) -> CoreResult<ShiftSummary> {
    let opening_float = params.opening_float;

    // 1-2. per-method totals and card subtotals
    let sales = SalesTotals::from_legs(&ledger.sales)?;
    let cards_with_tips = sales
        .by_method
        .total_of(&PaymentMethod::CARDS)
        .ok_or_else(|| CoreError::amount_too_large("card sales"))?;

    // 3. cash reconciliation
    let total_expenses = sum_of("expenses", ledger.expenses.iter().map(|e| e.amount))?;
    let cash_sales = sales.by_method[PaymentMethod::Cash];
    let expected_cash = opening_float
        .checked_add(cash_sales)
        .and_then(|m| m.checked_sub(total_expenses))
        .ok_or_else(|| CoreError::amount_too_large("expected cash"))?;

    // 4. tips
    let total_tips = sales
        .tips
        .total()
        .ok_or_else(|| CoreError::amount_too_large("tips"))?;

    // 5. denominations
    let drawer = denomination_breakdown(&ledger.counts, CountPurpose::Drawer)?;
    let deposit = denomination_breakdown(&ledger.counts, CountPurpose::Deposit)?;

    // 6. grand total and loss ratio
    let total_sales = sales
        .by_method
        .total()
        .ok_or_else(|| CoreError::amount_too_large("sales"))?;
    let total_complimentary =
        sum_of("complimentary", ledger.complimentary.iter().map(|c| c.amount))?;
    let total_shrinkage = sum_of("shrinkage", ledger.shrinkage.iter().map(|s| s.amount))?;
    let total_cash_drawer = opening_float
        .checked_add(total_sales)
        .and_then(|m| m.checked_sub(total_expenses))
        .and_then(|m| m.checked_sub(total_complimentary))
        .and_then(|m| m.checked_sub(total_shrinkage))
        .ok_or_else(|| CoreError::amount_too_large("cash drawer"))?;
    let losses = total_complimentary
        .checked_add(total_shrinkage)
        .ok_or_else(|| CoreError::amount_too_large("losses"))?;
    let loss_ratio = Percentage::ratio(losses, total_sales);

    // 7. couriers
    let couriers = courier_summaries(&ledger.deliveries)?;

    Ok(ShiftSummary {
        cashier: params.cashier.clone(),
        shift_label: params.shift_label.clone(),
        opening_float,
        generated_at: format_timestamp(generated_at),
        sales_by_method: sales.by_method,
        tips_by_method: sales.tips,
        cards_without_tips: sales.cards_without_tips,
        cards_with_tips,
        cash_sales,
        total_expenses,
        expected_cash,
        total_tips,
        drawer,
        deposit,
        couriers,
        total_sales,
        total_complimentary,
        total_shrinkage,
        total_cash_drawer,
        loss_ratio,
    })
}

fn sum_of(field: &str, amounts: impl Iterator<Item = Money>) -> CoreResult<Money> {
    Money::checked_sum(amounts).ok_or_else(|| CoreError::amount_too_large(field))
}

// =============================================================================
// Sales
// =============================================================================

struct SalesTotals {
    by_method: MethodTotals,
    tips: MethodTotals,
    cards_without_tips: Money,
}

impl SalesTotals {
    /// Legs with an unrecognized method are skipped entirely.
    fn from_legs(legs: &[SaleLeg]) -> CoreResult<Self> {
        let mut totals = SalesTotals {
            by_method: MethodTotals::new(),
            tips: MethodTotals::new(),
            cards_without_tips: Money::zero(),
        };

        for leg in legs {
            let Some(method) = leg.payment_method() else {
                continue;
            };
            totals
                .by_method
                .add(method, leg.total)
                .ok_or_else(|| CoreError::amount_too_large("sales"))?;
            totals
                .tips
                .add(method, leg.tip)
                .ok_or_else(|| CoreError::amount_too_large("tips"))?;
            if method.is_card() {
                totals.cards_without_tips = totals
                    .cards_without_tips
                    .checked_add(leg.amount)
                    .ok_or_else(|| CoreError::amount_too_large("card sales"))?;
            }
        }

        Ok(totals)
    }
}

// =============================================================================
// Denominations
// =============================================================================

/// Accumulates counts per denomination for one purpose. Rows outside the
/// fixed set or with a non-positive count contribute nothing.
pub fn denomination_breakdown(
    counts: &[DenominationCount],
    purpose: CountPurpose,
) -> CoreResult<DenominationBreakdown> {
    let too_large = || CoreError::amount_too_large(format!("{} count", purpose.as_stored()));
    let mut accumulated = [0i64; Denomination::COUNT];

    for row in counts.iter().filter(|r| r.purpose == purpose && r.count > 0) {
        if let Some(denomination) = Denomination::from_pesos(row.value) {
            let slot = &mut accumulated[denomination.index()];
            *slot = slot.checked_add(row.count).ok_or_else(too_large)?;
        }
    }

    let mut lines = Vec::new();
    for d in Denomination::ALL {
        let count = accumulated[d.index()];
        if count > 0 {
            let total = d.value().checked_mul(count).ok_or_else(too_large)?;
            lines.push(DenominationLine {
                denomination: d,
                count,
                total,
            });
        }
    }
    let total = Money::checked_sum(lines.iter().map(|l| l.total)).ok_or_else(too_large)?;

    Ok(DenominationBreakdown { lines, total })
}

// =============================================================================
// Couriers
// =============================================================================

/// Groups deliveries by courier name as stored (trimmed, case-sensitive),
/// in order of first appearance. Deliveries without a courier are skipped.
pub fn courier_summaries(deliveries: &[Delivery]) -> CoreResult<Vec<CourierSummary>> {
    let mut couriers: Vec<CourierSummary> = Vec::new();

    for delivery in deliveries {
        let name = delivery.courier.trim();
        if name.is_empty() {
            continue;
        }

        let index = match couriers.iter().position(|c| c.courier == name) {
            Some(index) => index,
            None => {
                couriers.push(CourierSummary {
                    courier: name.to_string(),
                    total_fees: Money::zero(),
                    floor_fee: Money::zero(),
                    final_total: Money::zero(),
                });
                couriers.len() - 1
            }
        };

        let entry = &mut couriers[index];
        entry.total_fees = entry
            .total_fees
            .checked_add(delivery.amount)
            .ok_or_else(|| CoreError::amount_too_large("courier fees"))?;
        if entry.floor_fee.is_zero() && delivery.floor_fee.is_positive() {
            entry.floor_fee = delivery.floor_fee;
        }
    }

    for courier in &mut couriers {
        courier.final_total = courier
            .total_fees
            .checked_add(courier.floor_fee)
            .ok_or_else(|| CoreError::amount_too_large("courier fees"))?;
    }
    Ok(couriers)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{SectionKind, SummaryValue};
    use crate::types::{Complimentary, Expense, Shrinkage};

    fn pesos(n: i64) -> Money {
        Money::from_pesos(n)
    }

    fn at() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-10-19 22:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn params(float: i64) -> ShiftParams {
        ShiftParams {
            cashier: "Ana".to_string(),
            shift_label: "Noche".to_string(),
            opening_float: pesos(float),
        }
    }

    fn leg(ticket: &str, method: &str, amount: i64, tip: i64) -> SaleLeg {
        SaleLeg {
            recorded_at: String::new(),
            auth_code: String::new(),
            ticket_number: ticket.to_string(),
            method: method.to_string(),
            amount: pesos(amount),
            tip: pesos(tip),
            total: pesos(amount + tip),
        }
    }

    fn delivery(courier: &str, amount: i64, floor: i64) -> Delivery {
        Delivery {
            recorded_at: String::new(),
            courier: courier.to_string(),
            address: String::new(),
            amount: pesos(amount),
            floor_fee: pesos(floor),
        }
    }

    fn count(value: i64, n: i64, purpose: CountPurpose) -> DenominationCount {
        DenominationCount {
            recorded_at: String::new(),
            value,
            count: n,
            total: pesos(value * n),
            purpose,
        }
    }

    #[test]
    fn test_empty_shift_is_all_zero() {
        let summary = reconcile(&ShiftLedger::default(), &ShiftParams::default(), at()).unwrap();

        assert_eq!(summary.total_sales, Money::zero());
        assert_eq!(summary.expected_cash, Money::zero());
        assert_eq!(summary.total_cash_drawer, Money::zero());
        assert_eq!(summary.loss_ratio, Percentage::zero());
        assert!(summary.drawer.lines.is_empty());
        assert!(summary.couriers.is_empty());
        assert_eq!(summary.sections().len(), 8);
    }

    #[test]
    fn test_split_ticket_buckets_by_method() {
        let ledger = ShiftLedger {
            sales: vec![leg("1", "debito", 1000, 100), leg("1", "efectivo", 500, 0)],
            ..Default::default()
        };
        let summary = reconcile(&ledger, &params(10_000), at()).unwrap();

        assert_eq!(summary.sales_by_method[PaymentMethod::Debit], pesos(1100));
        assert_eq!(summary.sales_by_method[PaymentMethod::Cash], pesos(500));
        assert_eq!(summary.tips_by_method[PaymentMethod::Debit], pesos(100));
        assert_eq!(summary.total_sales, pesos(1600));
        assert_eq!(summary.cards_without_tips, pesos(1000));
        assert_eq!(summary.cards_with_tips, pesos(1100));
        assert_eq!(summary.total_tips, pesos(100));
    }

    #[test]
    fn test_method_normalization_and_unknown_methods() {
        let ledger = ShiftLedger {
            sales: vec![
                leg("1", "  Credito ", 2000, 0),
                leg("2", "cheque", 9999, 0),
                leg("3", "prepago", 300, 50),
            ],
            ..Default::default()
        };
        let summary = reconcile(&ledger, &params(1), at()).unwrap();

        assert_eq!(summary.sales_by_method[PaymentMethod::Credit], pesos(2000));
        // unknown method is excluded everywhere
        assert_eq!(summary.total_sales, pesos(2350));
        assert_eq!(summary.cards_without_tips, pesos(2300));
        assert_eq!(summary.cards_with_tips, pesos(2350));
    }

    #[test]
    fn test_conservation_of_leg_totals() {
        let legs: Vec<SaleLeg> = PaymentMethod::ALL
            .iter()
            .enumerate()
            .map(|(i, m)| leg(&i.to_string(), m.as_str(), 100 * (i as i64 + 1), i as i64))
            .collect();
        let expected: Money = legs.iter().map(|l| l.total).sum();
        let ledger = ShiftLedger {
            sales: legs,
            ..Default::default()
        };

        let summary = reconcile(&ledger, &params(1), at()).unwrap();
        assert_eq!(summary.sales_by_method.total(), Some(expected));
    }

    #[test]
    fn test_cash_and_grand_total_identities() {
        let ledger = ShiftLedger {
            sales: vec![leg("1", "efectivo", 8000, 0), leg("2", "transferencia", 4000, 500)],
            expenses: vec![Expense {
                recorded_at: String::new(),
                reason: "gas".to_string(),
                amount: pesos(3000),
                receipt_ref: String::new(),
            }],
            shrinkage: vec![Shrinkage {
                recorded_at: String::new(),
                reason: "pan".to_string(),
                amount: pesos(700),
            }],
            complimentary: vec![Complimentary {
                recorded_at: String::new(),
                amount: pesos(550),
                reason: "postre".to_string(),
            }],
            ..Default::default()
        };
        let summary = reconcile(&ledger, &params(20_000), at()).unwrap();

        // shrinkage and complimentary do not touch expected cash
        assert_eq!(summary.expected_cash, pesos(20_000 + 8000 - 3000));
        assert_eq!(
            summary.total_cash_drawer,
            pesos(20_000 + 12_500 - 3000 - 550 - 700)
        );
        // (550 + 700) / 12500 = 10.00%
        assert_eq!(summary.loss_ratio, Percentage::from_bps(1000));
    }

    #[test]
    fn test_loss_ratio_zero_without_sales() {
        let ledger = ShiftLedger {
            shrinkage: vec![Shrinkage {
                recorded_at: String::new(),
                reason: "todo".to_string(),
                amount: pesos(5000),
            }],
            ..Default::default()
        };
        let summary = reconcile(&ledger, &params(1000), at()).unwrap();
        assert_eq!(summary.loss_ratio, Percentage::zero());
        assert_eq!(summary.total_cash_drawer, pesos(-4000));
    }

    #[test]
    fn test_denomination_breakdown_by_purpose() {
        let counts = vec![
            count(1000, 3, CountPurpose::Drawer),
            count(1000, 2, CountPurpose::Drawer),
            count(20_000, 1, CountPurpose::Deposit),
            count(500, 0, CountPurpose::Drawer),
            count(300, 4, CountPurpose::Drawer),
        ];

        let drawer = denomination_breakdown(&counts, CountPurpose::Drawer).unwrap();
        assert_eq!(drawer.lines.len(), 1);
        assert_eq!(drawer.lines[0].count, 5);
        assert_eq!(drawer.total, pesos(5000));

        let deposit = denomination_breakdown(&counts, CountPurpose::Deposit).unwrap();
        assert_eq!(deposit.lines[0].denomination, Denomination::Note20000);
        assert_eq!(deposit.total, pesos(20_000));
    }

    #[test]
    fn test_courier_floor_fee_counted_once() {
        let deliveries = vec![
            delivery("Juan", 3000, 5000),
            delivery("Juan", 2500, 0),
            delivery("juan", 1000, 0),
            delivery("  ", 9999, 9999),
        ];
        let couriers = courier_summaries(&deliveries).unwrap();

        assert_eq!(couriers.len(), 2);
        assert_eq!(couriers[0].courier, "Juan");
        assert_eq!(couriers[0].total_fees, pesos(5500));
        assert_eq!(couriers[0].floor_fee, pesos(5000));
        assert_eq!(couriers[0].final_total, pesos(10_500));
        // grouping is case-sensitive
        assert_eq!(couriers[1].courier, "juan");
    }

    #[test]
    fn test_floor_fee_is_first_nonzero() {
        let couriers = courier_summaries(&[
            delivery("Ana", 1000, 0),
            delivery("Ana", 1000, 10_000),
            delivery("Ana", 1000, 5000),
        ])
        .unwrap();
        assert_eq!(couriers[0].floor_fee, pesos(10_000));
    }

    #[test]
    fn test_sales_that_overflow_are_rejected() {
        let half = i64::MAX / 2 + 1;
        let ledger = ShiftLedger {
            sales: vec![leg("1", "efectivo", half, 0), leg("2", "efectivo", half, 0)],
            ..Default::default()
        };
        assert!(matches!(
            reconcile(&ledger, &params(0), at()),
            Err(CoreError::InvalidAmount { .. })
        ));

        // split across methods the per-method totals fit, the grand total does not
        let ledger = ShiftLedger {
            sales: vec![leg("1", "efectivo", half, 0), leg("2", "debito", half, 0)],
            ..Default::default()
        };
        assert!(reconcile(&ledger, &params(0), at()).is_err());
    }

    #[test]
    fn test_opening_float_overflow_is_rejected() {
        let ledger = ShiftLedger {
            sales: vec![leg("1", "efectivo", i64::MAX, 0)],
            ..Default::default()
        };
        assert!(reconcile(&ledger, &params(1), at()).is_err());
    }

    #[test]
    fn test_oversized_counts_and_fees_are_rejected() {
        let counts = vec![
            count(20_000, 1, CountPurpose::Drawer),
            DenominationCount {
                recorded_at: String::new(),
                value: 20_000,
                count: i64::MAX / 10,
                total: Money::zero(),
                purpose: CountPurpose::Drawer,
            },
        ];
        assert!(denomination_breakdown(&counts, CountPurpose::Drawer).is_err());
        // the other purpose is unaffected
        assert!(denomination_breakdown(&counts, CountPurpose::Deposit).is_ok());

        let deliveries = vec![delivery("Juan", i64::MAX, 0), delivery("Juan", 1, 0)];
        assert!(courier_summaries(&deliveries).is_err());
        assert!(courier_summaries(&[delivery("Juan", i64::MAX, 1)]).is_err());
    }

    #[test]
    fn test_sections_carry_typed_values() {
        let ledger = ShiftLedger {
            sales: vec![leg("1", "debito", 1000, 100)],
            counts: vec![count(5000, 2, CountPurpose::Drawer)],
            ..Default::default()
        };
        let sections = reconcile(&ledger, &params(10_000), at()).unwrap().sections();

        let kinds: Vec<SectionKind> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds[0], SectionKind::SalesBreakdown);
        assert_eq!(kinds[7], SectionKind::ShiftTotals);
        assert_eq!(sections[0].rows.len(), PaymentMethod::COUNT);

        let tips = &sections[3];
        assert_eq!(tips.rows.len(), 2);
        assert_eq!(tips.rows[0].label, "Propinas Debito");

        let drawer = &sections[4];
        assert_eq!(
            drawer.rows[0].values,
            vec![SummaryValue::Count(2), SummaryValue::Currency(pesos(10_000))]
        );

        let totals = &sections[7];
        let ratio = totals.row("% Pérdidas sobre Ventas").unwrap();
        assert_eq!(ratio.values, vec![SummaryValue::Percentage(Percentage::zero())]);
    }
}
