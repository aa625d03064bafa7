//! # Sale Commands

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use caja_core::entries::{build_sale, remove_sale, LegInput};
use caja_core::schema::{self, format_timestamp, read_rows};
use caja_core::{group_tickets, CoreResult, DeletedSale, Money, Positioned, SaleLeg, TicketSummary};

use crate::error::ApiError;
use crate::state::Till;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    pub ticket_number: String,
    /// Card authorization code; kept only on debit and credit legs.
    #[serde(default)]
    pub auth_code: String,
    pub legs: Vec<LegInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleResponse {
    pub ticket_number: String,
    /// Row position of each leg, in leg order.
    pub positions: Vec<usize>,
    pub grand_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSaleRequest {
    pub position: usize,
    pub passphrase: String,
    #[serde(default)]
    pub reason: String,
}

/// Records one ticket as one sale-leg row per payment leg.
pub async fn record_sale(
    till: &Till,
    request: RecordSaleRequest,
) -> Result<RecordSaleResponse, ApiError> {
    debug!(ticket = %request.ticket_number, legs = request.legs.len(), "record_sale command");

    let recorded_at = format_timestamp(till.now());
    let response = till
        .guarded("record_sale", |_, workbook| {
            let sale = build_sale(
                &request.ticket_number,
                &request.auth_code,
                &request.legs,
                &recorded_at,
            )?;
            let positions = sale
                .legs
                .iter()
                .map(|leg| schema::append(workbook, leg))
                .collect::<CoreResult<Vec<_>>>()?;

            Ok(RecordSaleResponse {
                ticket_number: sale.ticket_number,
                positions,
                grand_total: sale.grand_total,
            })
        })
        .await?;

    info!(
        ticket = %response.ticket_number,
        legs = response.positions.len(),
        total = %response.grand_total,
        "Sale recorded"
    );
    Ok(response)
}

/// Moves a sale leg to the deleted-sales table.
///
/// The passphrase is checked before the store is touched.
pub async fn delete_sale(till: &Till, request: DeleteSaleRequest) -> Result<DeletedSale, ApiError> {
    debug!(position = request.position, "delete_sale command");

    if let Err(e) = till.policy().authorize(&request.passphrase) {
        warn!(position = request.position, "Sale deletion refused");
        return Err(e.into());
    }

    let deleted_at = format_timestamp(till.now());
    let deleted = till
        .mutate(|_, workbook| {
            Ok(remove_sale(
                workbook,
                request.position,
                &request.reason,
                &deleted_at,
            )?)
        })
        .await?;

    info!(
        position = request.position,
        ticket = %deleted.ticket_number,
        total = %deleted.total,
        reason = %deleted.reason,
        "Sale deleted"
    );
    Ok(deleted)
}

pub async fn list_sales(till: &Till) -> Result<Vec<Positioned<SaleLeg>>, ApiError> {
    Ok(till.read(|_, workbook| Ok(read_rows::<SaleLeg>(workbook))).await?)
}

/// Sale legs of the live shift grouped by ticket number.
pub async fn list_tickets(till: &Till) -> Result<Vec<TicketSummary>, ApiError> {
    let tickets = till
        .read(|_, workbook| {
            let legs: Vec<SaleLeg> = read_rows::<SaleLeg>(workbook)
                .into_iter()
                .map(|p| p.entry)
                .collect();
            Ok(group_tickets(&legs)?)
        })
        .await?;
    Ok(tickets)
}
