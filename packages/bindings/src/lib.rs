use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Full bond calculation: current yield, YTM, totals, and the cash-flow
/// schedule. Takes and returns JSON strings so the Node side stays
/// decimal-safe.
#[napi]
pub fn calculate_bond(input_json: String) -> NapiResult<String> {
    let input: bond_analytics_core::calculator::BondInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bond_analytics_core::calculator::calculate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Cash-flow schedule on its own.
#[napi]
pub fn build_cash_flow_schedule(input_json: String) -> NapiResult<String> {
    let input: bond_analytics_core::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bond_analytics_core::schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
