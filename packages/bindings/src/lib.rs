use napi::Result as NapiResult;
use napi_derive::napi;

use debt_payoff_core::payoff::{self, PlanInputs};
use debt_payoff_core::report;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_inputs(input_json: &str) -> NapiResult<PlanInputs> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Repayment planning
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_debt_payoff(input_json: String) -> NapiResult<String> {
    let input = parse_inputs(&input_json)?;
    let output = payoff::plan_repayment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_debt_strategies(input_json: String) -> NapiResult<String> {
    let input = parse_inputs(&input_json)?;
    let output = payoff::plan_repayment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&report::compare_strategies(&output.result)).map_err(to_napi_error)
}

#[napi]
pub fn build_debt_report(input_json: String) -> NapiResult<String> {
    let input = parse_inputs(&input_json)?;
    let output = payoff::plan_repayment(&input).map_err(to_napi_error)?;
    let summary = report::build_report(&output.result, &input.budget());
    serde_json::to_string(&summary).map_err(to_napi_error)
}

#[napi]
pub fn sample_debt_inputs() -> NapiResult<String> {
    serde_json::to_string(&PlanInputs::sample()).map_err(to_napi_error)
}
