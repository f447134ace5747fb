use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values, kept in fixed-point decimal end to end.
pub type Money = Decimal;

/// Percentages expressed whole-number-scaled: 6.5 means 6.5%, never 0.065.
/// Conversion to a fraction happens inside the engine, at the point of use.
pub type Percent = Decimal;

pub(crate) const HUNDRED: Decimal = dec!(100);
pub(crate) const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Round a monetary amount to the nearest cent. Applied only at
/// display-relevant aggregation points, never mid-pipeline.
pub fn round_cents(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a whole-number-scaled percentage into a fraction (6.5 -> 0.065).
pub(crate) fn pct(p: Percent) -> Decimal {
    p / HUNDRED
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
