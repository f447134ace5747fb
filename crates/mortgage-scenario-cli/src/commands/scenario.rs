use clap::Args;
use serde_json::{json, Value};

use mortgage_scenario_core::config::EngineConfig;
use mortgage_scenario_core::engine::{calculate, calculate_scenario};
use mortgage_scenario_core::scenario::Scenario;
use mortgage_scenario_core::validation::{validate, Severity, ValidatorConfig};

use crate::input;

#[derive(Args)]
pub struct CalculateArgs {
    /// Scenario JSON file; stdin is used when omitted
    #[arg(long)]
    pub input: Option<String>,
    /// Engine configuration overrides (PMI tiers, title bands, caps)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Scenario JSON file; stdin is used when omitted
    #[arg(long)]
    pub input: Option<String>,
    /// Engine configuration overrides
    #[arg(long)]
    pub config: Option<String>,
    /// Validator configuration overrides (loan limits, LTV rules, thresholds)
    #[arg(long)]
    pub rules: Option<String>,
}

fn read_scenario(input: &Option<String>) -> Result<Scenario, Box<dyn std::error::Error>> {
    if let Some(path) = input {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input <scenario.json> or stdin required".into())
    }
}

fn read_engine_config(
    config: &Option<String>,
) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match config {
        Some(path) => input::file::read_json(path),
        None => Ok(EngineConfig::default()),
    }
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = read_scenario(&args.input)?;
    let config = read_engine_config(&args.config)?;
    let output = calculate_scenario(&scenario, &config)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = read_scenario(&args.input)?;
    let config = read_engine_config(&args.config)?;
    let rules: ValidatorConfig = match &args.rules {
        Some(path) => input::file::read_json(path)?,
        None => ValidatorConfig::default(),
    };

    let results = calculate(&scenario, &config);
    let issues = validate(&scenario, &results, &rules);
    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warnings = issues.len() - errors;

    Ok(json!({
        "issues": issues,
        "errors": errors,
        "warnings": warnings,
        "passes": errors == 0,
    }))
}
