//! # Shift Commands

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use caja_core::schema::write_shift_params;
use caja_core::{Money, ShiftParams, ShiftPhase, ShiftState};

use crate::error::ApiError;
use crate::state::Till;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftRequest {
    pub cashier: String,
    pub shift_label: String,
    pub opening_float: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStatus {
    pub phase: ShiftPhase,
    pub is_open: bool,
    pub params: ShiftParams,
}

impl From<&ShiftState> for ShiftStatus {
    fn from(state: &ShiftState) -> Self {
        ShiftStatus {
            phase: state.phase(),
            is_open: state.is_open(),
            params: state.params().clone(),
        }
    }
}

/// Opens a shift, persisting cashier, label and opening float.
///
/// Opening while a shift is already open overwrites it.
pub async fn open_shift(till: &Till, request: OpenShiftRequest) -> Result<ShiftStatus, ApiError> {
    debug!("open_shift command");

    let params = ShiftParams::validated(
        &request.cashier,
        &request.shift_label,
        request.opening_float,
    )?;

    let status = till
        .mutate(|shift, workbook| {
            write_shift_params(workbook, &params)?;
            shift.open(params.clone());
            Ok(ShiftStatus::from(&*shift))
        })
        .await?;

    info!(
        cashier = %params.cashier,
        shift = %params.shift_label,
        opening_float = %params.opening_float,
        "Shift opened"
    );
    Ok(status)
}

pub async fn shift_status(till: &Till) -> Result<ShiftStatus, ApiError> {
    Ok(ShiftStatus::from(&till.shift().await))
}
