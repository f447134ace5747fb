//! Deterministic mortgage scenario calculation and validation.
//!
//! The engine is a pure transformation: `Scenario` in, `CalculatedResults`
//! out, plus an independent validator that checks the computed result
//! against configurable loan-program rules. No internal state, no I/O;
//! safe to call concurrently for independent scenarios.

pub mod amortization;
pub mod assistance;
pub mod buydown;
pub mod cash_to_close;
pub mod closing_costs;
pub mod config;
pub mod engine;
pub mod error;
pub mod mortgage_insurance;
pub mod qualification;
pub mod scenario;
pub mod types;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{calculate, calculate_scenario, CalculatedResults};
pub use error::MortgageError;
pub use scenario::Scenario;
pub use types::*;
pub use validation::{validate, Severity, ValidationIssue, ValidatorConfig};

/// Standard result type for all mortgage-scenario operations
pub type MortgageResult<T> = Result<T, MortgageError>;
