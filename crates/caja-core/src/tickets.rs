//! # Ticket Summary
//!
//! Regroups sale legs into the customer tickets they came from. Used only
//! when a shift is archived.
//!
//! ```text
//!   legs                                   tickets
//!   ─────────────────────────────          ───────────────────────────────────
//!   #17  debito    1000 + 100   ──┐
//!   #17  efectivo   500 +   0   ──┴──►     #17  $1,600  Debito $1,100 + Efectivo $500
//!   #18  pluxee    4000 +   0   ─────►     #18  $4,000  Pluxee $4,000
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::SaleLeg;

/// One customer ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TicketSummary {
    pub ticket_number: String,
    pub total: Money,
    /// `"Method $amount"` per leg, in the order the legs were recorded.
    pub detail: Vec<String>,
}

impl TicketSummary {
    /// Detail joined the way it is printed: `Debito $1,100 + Efectivo $500`.
    pub fn detail_line(&self) -> String {
        self.detail.join(" + ")
    }
}

/// Groups legs by ticket number in encounter order. Legs without a ticket
/// number are skipped. Every leg counts, whatever its method.
pub fn group_tickets(legs: &[SaleLeg]) -> CoreResult<Vec<TicketSummary>> {
    let too_large = || CoreError::amount_too_large("ticket total");
    let mut tickets: Vec<TicketSummary> = Vec::new();

    for leg in legs {
        let number = leg.ticket_number.trim();
        if number.is_empty() {
            continue;
        }

        let amount = leg.amount.checked_add(leg.tip).ok_or_else(too_large)?;
        let line = format!("{} {}", capitalize(leg.method.trim()), amount);

        match tickets.iter_mut().find(|t| t.ticket_number == number) {
            Some(ticket) => {
                ticket.total = ticket.total.checked_add(amount).ok_or_else(too_large)?;
                ticket.detail.push(line);
            }
            None => tickets.push(TicketSummary {
                ticket_number: number.to_string(),
                total: amount,
                detail: vec![line],
            }),
        }
    }

    Ok(tickets)
}

/// First letter upper, the rest lower.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
