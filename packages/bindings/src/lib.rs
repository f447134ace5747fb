use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_scenario_core::config::EngineConfig;
use mortgage_scenario_core::scenario::Scenario;
use mortgage_scenario_core::validation::ValidatorConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(serde::Deserialize)]
struct CalculateBindingInput {
    scenario: Scenario,
    #[serde(default)]
    config: EngineConfig,
}

#[derive(serde::Deserialize)]
struct ValidateBindingInput {
    scenario: Scenario,
    #[serde(default)]
    config: EngineConfig,
    #[serde(default)]
    rules: ValidatorConfig,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_scenario(input_json: String) -> NapiResult<String> {
    let input: CalculateBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_scenario_core::engine::calculate_scenario(&input.scenario, &input.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_scenario(input_json: String) -> NapiResult<String> {
    let input: ValidateBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let results = mortgage_scenario_core::engine::calculate(&input.scenario, &input.config);
    let issues =
        mortgage_scenario_core::validation::validate(&input.scenario, &results, &input.rules);
    serde_json::to_string(&issues).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Quick calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(principal: String, annual_rate: String, term_months: u32) -> NapiResult<String> {
    let principal: rust_decimal::Decimal = principal.parse().map_err(to_napi_error)?;
    let rate: rust_decimal::Decimal = annual_rate.parse().map_err(to_napi_error)?;
    let payment = mortgage_scenario_core::amortization::monthly_payment(
        principal, rate, term_months,
    );
    Ok(mortgage_scenario_core::types::round_cents(payment).to_string())
}
