//! Qualification engine: LTV, DTI/DSCR ratios, and the parallel what-if
//! breakdown against conventional and FHA reference limits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::scenario::{LoanProgram, Occupancy, Scenario};
use crate::types::{pct, Money, Percent, HUNDRED};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum QualificationKind {
    /// Front/back debt-to-income, whole-scaled percents.
    Dti { front: Percent, back: Percent },
    /// Debt-service-coverage for flagged investment scenarios.
    Dscr { ratio: Decimal, passes: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qualification {
    pub kind: QualificationKind,
    /// Rental income actually fed into qualification: vacancy-adjusted for
    /// DTI, gross for DSCR.
    pub effective_rental_income: Money,
    pub gross_monthly_income: Money,
}

/// One program's evaluation in the what-if breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramQual {
    pub front_ratio: Percent,
    pub back_ratio: Percent,
    pub front_limit: Percent,
    pub back_limit: Percent,
    pub front_pass: bool,
    pub back_pass: bool,
    pub passes: bool,
}

/// Line-by-line qualification arithmetic, evaluated against both the
/// conventional and FHA reference limits regardless of the scenario's
/// selected program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathBreakdown {
    pub gross_monthly_income: Money,
    pub housing_payment: Money,
    pub total_obligations: Money,
    pub conventional: ProgramQual,
    pub fha: ProgramQual,
}

// ---------------------------------------------------------------------------
// LTV
// ---------------------------------------------------------------------------

/// Loan-to-value, whole-scaled percent. Zero purchase price yields zero,
/// never a division error.
pub fn ltv(loan_amount: Money, purchase_price: Money) -> Percent {
    if purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        loan_amount / purchase_price * HUNDRED
    }
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Whether this scenario underwrites on DSCR instead of borrower DTI.
pub fn uses_dscr(scenario: &Scenario) -> bool {
    scenario.dscr_loan && scenario.occupancy == Occupancy::Investment
}

fn ratio_pct(numerator: Money, denominator: Money) -> Percent {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator * HUNDRED
    }
}

/// Gross monthly income for DTI purposes: borrower + other income plus
/// vacancy-adjusted rent.
fn dti_income(scenario: &Scenario, config: &EngineConfig) -> (Money, Money) {
    let adjusted_rent = scenario.gross_rental_income() * pct(config.dscr.vacancy_factor);
    let gross = scenario.monthly_income + scenario.other_income + adjusted_rent;
    (gross, adjusted_rent)
}

/// Qualify the scenario given its full monthly housing payment (PITIA,
/// subordinate-lien payments included).
pub fn qualify(scenario: &Scenario, pitia: Money, config: &EngineConfig) -> Qualification {
    if uses_dscr(scenario) {
        let rent = scenario.gross_rental_income();
        let ratio = if pitia.is_zero() {
            Decimal::ZERO
        } else {
            rent / pitia
        };
        return Qualification {
            kind: QualificationKind::Dscr {
                ratio,
                passes: ratio >= config.dscr.pass_threshold,
            },
            effective_rental_income: rent,
            gross_monthly_income: rent,
        };
    }

    let (gross, adjusted_rent) = dti_income(scenario, config);
    Qualification {
        kind: QualificationKind::Dti {
            front: ratio_pct(pitia, gross),
            back: ratio_pct(pitia + scenario.monthly_debts, gross),
        },
        effective_rental_income: adjusted_rent,
        gross_monthly_income: gross,
    }
}

fn evaluate(front: Percent, back: Percent, front_limit: Percent, back_limit: Percent) -> ProgramQual {
    let front_pass = front <= front_limit;
    let back_pass = back <= back_limit;
    ProgramQual {
        front_ratio: front,
        back_ratio: back,
        front_limit,
        back_limit,
        front_pass,
        back_pass,
        passes: front_pass && back_pass,
    }
}

/// What-if breakdown against fixed reference limits for both programs.
pub fn math_breakdown(scenario: &Scenario, pitia: Money, config: &EngineConfig) -> MathBreakdown {
    let (gross, _) = dti_income(scenario, config);
    let front = ratio_pct(pitia, gross);
    let back = ratio_pct(pitia + scenario.monthly_debts, gross);
    let limits = &config.reference_limits;

    MathBreakdown {
        gross_monthly_income: gross,
        housing_payment: pitia,
        total_obligations: pitia + scenario.monthly_debts,
        conventional: evaluate(
            front,
            back,
            limits.conventional_front,
            limits.conventional_back,
        ),
        fha: evaluate(front, back, limits.fha_front, limits.fha_back),
    }
}

/// Maximum seller-concession percent for this program/occupancy/LTV.
pub fn max_concession_percent(
    scenario: &Scenario,
    display_ltv: Percent,
    config: &EngineConfig,
) -> Percent {
    config
        .concession_caps
        .max_percent(scenario.program, scenario.occupancy, display_ltv)
}

/// FHA loan-limit and LTV rule checks run on the base (pre-premium) loan;
/// every other program rules on the full financed amount.
pub fn rule_loan_amount(program: LoanProgram, base_loan: Money, total_loan: Money) -> Money {
    match program {
        LoanProgram::Fha => base_loan,
        _ => total_loan,
    }
}
