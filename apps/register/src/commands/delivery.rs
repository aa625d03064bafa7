//! # Delivery Commands
//!
//! The floor fee is charged once per courier per shift: when the courier
//! already has a nonzero floor fee on record, the new row stores 0.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use caja_core::entries::{build_delivery, remove_row};
use caja_core::schema::{self, format_timestamp, read_row, read_rows};
use caja_core::{Delivery, Money, Positioned};

use crate::error::ApiError;
use crate::state::Till;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeliveryRequest {
    pub courier: String,
    #[serde(default)]
    pub address: String,
    pub amount: Money,
    #[serde(default)]
    pub floor_fee: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeliveryResponse {
    pub position: usize,
    /// Floor fee actually stored.
    pub floor_fee: Money,
    /// True when a requested floor fee was dropped because the courier
    /// was already charged this shift.
    pub floor_fee_waived: bool,
}

pub async fn record_delivery(
    till: &Till,
    request: RecordDeliveryRequest,
) -> Result<RecordDeliveryResponse, ApiError> {
    debug!(courier = %request.courier, "record_delivery command");

    let recorded_at = format_timestamp(till.now());
    let response = till
        .guarded("record_delivery", |_, workbook| {
            let prior: Vec<Delivery> = read_rows::<Delivery>(workbook)
                .into_iter()
                .map(|p| p.entry)
                .collect();
            let recorded = build_delivery(
                &request.courier,
                &request.address,
                request.amount,
                request.floor_fee,
                &prior,
                &recorded_at,
            )?;
            let position = schema::append(workbook, &recorded.delivery)?;

            Ok(RecordDeliveryResponse {
                position,
                floor_fee: recorded.delivery.floor_fee,
                floor_fee_waived: recorded.floor_fee_waived,
            })
        })
        .await?;

    info!(
        courier = %request.courier.trim(),
        position = response.position,
        floor_fee = %response.floor_fee,
        floor_fee_waived = response.floor_fee_waived,
        "Delivery recorded"
    );
    Ok(response)
}

/// Removes the delivery at `position`, returning it.
pub async fn delete_delivery(till: &Till, position: usize) -> Result<Delivery, ApiError> {
    debug!(position, "delete_delivery command");

    let removed = till
        .mutate(|_, workbook| {
            let delivery = read_row::<Delivery>(workbook, position)?.entry;
            remove_row(workbook, schema::DELIVERIES, position)?;
            Ok(delivery)
        })
        .await?;

    info!(position, courier = %removed.courier, "Delivery deleted");
    Ok(removed)
}

pub async fn list_deliveries(till: &Till) -> Result<Vec<Positioned<Delivery>>, ApiError> {
    Ok(till.read(|_, workbook| Ok(read_rows::<Delivery>(workbook))).await?)
}
