use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use credit_desk_core::CreditDeskResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Deserialise the core input, run `op`, serialise the envelope.
fn call<I, O>(input_json: &str, op: impl FnOnce(&I) -> CreditDeskResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = op(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_holdings(input_json: String) -> NapiResult<String> {
    call(&input_json, credit_desk_core::holdings::evaluate::evaluate_holdings)
}

#[napi]
pub fn filter_holdings(input_json: String) -> NapiResult<String> {
    call(&input_json, credit_desk_core::holdings::filter::apply_filters)
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_recovery(input_json: String) -> NapiResult<String> {
    call(&input_json, credit_desk_core::recovery::run_recovery_request)
}

#[napi]
pub fn swap_screen(input_json: String) -> NapiResult<String> {
    call(&input_json, credit_desk_core::recovery::swap_screen::screen_swaps)
}
