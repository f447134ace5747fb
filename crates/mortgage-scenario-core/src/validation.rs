//! Rule-based scenario validation.
//!
//! A pure pass over the raw scenario and its computed results. Checks are
//! independent: every failing check appends exactly one issue, nothing
//! short-circuits, and nothing is mutated.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::engine::CalculatedResults;
use crate::qualification::QualificationKind;
use crate::scenario::{LoanProgram, Scenario};
use crate::types::{Money, Percent, HUNDRED};

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hard program violation.
    Error,
    /// Soft risk signal.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(field: &str, message: String) -> Self {
        Self {
            field: field.into(),
            message,
            severity: Severity::Error,
        }
    }

    fn warning(field: &str, message: String) -> Self {
        Self {
            field: field.into(),
            message,
            severity: Severity::Warning,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Loan-amount limits. Defaults are the 2024 single-unit figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanLimits {
    pub conforming: Money,
    pub high_balance: Money,
    pub fha_floor: Money,
    pub fha_ceiling: Money,
    pub va_limit: Money,
}

impl Default for LoanLimits {
    fn default() -> Self {
        Self {
            conforming: dec!(766_550),
            high_balance: dec!(1_149_825),
            fha_floor: dec!(498_257),
            fha_ceiling: dec!(1_149_825),
            va_limit: dec!(766_550),
        }
    }
}

/// Per-program down-payment and LTV rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramLtvRule {
    pub min_down_percent: Percent,
    pub max_ltv: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LtvRules {
    pub conventional: ProgramLtvRule,
    pub fha: ProgramLtvRule,
    pub va: ProgramLtvRule,
    pub jumbo: ProgramLtvRule,
    /// LTV at or below which conventional PMI is not required.
    pub pmi_trigger_ltv: Percent,
}

impl Default for LtvRules {
    fn default() -> Self {
        Self {
            conventional: ProgramLtvRule {
                min_down_percent: dec!(3),
                max_ltv: dec!(97),
            },
            fha: ProgramLtvRule {
                min_down_percent: dec!(3.5),
                max_ltv: dec!(96.5),
            },
            va: ProgramLtvRule {
                min_down_percent: Decimal::ZERO,
                max_ltv: dec!(100),
            },
            jumbo: ProgramLtvRule {
                min_down_percent: dec!(10),
                max_ltv: dec!(90),
            },
            pmi_trigger_ltv: dec!(80),
        }
    }
}

impl LtvRules {
    pub fn for_program(&self, program: LoanProgram) -> &ProgramLtvRule {
        match program {
            LoanProgram::Conventional => &self.conventional,
            LoanProgram::Fha => &self.fha,
            LoanProgram::Va => &self.va,
            LoanProgram::Jumbo => &self.jumbo,
        }
    }
}

/// Numeric sanity thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_purchase_price: Money,
    pub dti_front_limit: Percent,
    pub dti_back_limit: Percent,
    /// Back-end ratio above which a soft risk warning is raised.
    pub dti_back_comfort: Percent,
    pub min_credit_conventional: u32,
    pub min_credit_fha: u32,
    pub min_credit_va: u32,
    pub min_credit_jumbo: u32,
    pub rate_floor: Percent,
    pub rate_ceiling: Percent,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_purchase_price: dec!(10_000),
            dti_front_limit: dec!(46.99),
            dti_back_limit: dec!(56.99),
            dti_back_comfort: dec!(43),
            min_credit_conventional: 620,
            min_credit_fha: 580,
            min_credit_va: 580,
            min_credit_jumbo: 700,
            rate_floor: dec!(1),
            rate_ceiling: dec!(15),
        }
    }
}

impl Thresholds {
    pub fn min_credit(&self, program: LoanProgram) -> u32 {
        match program {
            LoanProgram::Conventional => self.min_credit_conventional,
            LoanProgram::Fha => self.min_credit_fha,
            LoanProgram::Va => self.min_credit_va,
            LoanProgram::Jumbo => self.min_credit_jumbo,
        }
    }
}

/// Three independently overridable configuration structures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub loan_limits: LoanLimits,
    pub ltv_rules: LtvRules,
    pub thresholds: Thresholds,
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn check_purchase_price(s: &Scenario, t: &Thresholds, issues: &mut Vec<ValidationIssue>) {
    if s.purchase_price <= Decimal::ZERO {
        issues.push(ValidationIssue::error(
            "purchase_price",
            "Purchase price must be greater than zero".into(),
        ));
    } else if s.purchase_price < t.min_purchase_price {
        issues.push(ValidationIssue::warning(
            "purchase_price",
            format!(
                "Purchase price {} is below the sanity floor of {}",
                s.purchase_price, t.min_purchase_price
            ),
        ));
    }
}

fn check_loan_limits(
    s: &Scenario,
    r: &CalculatedResults,
    limits: &LoanLimits,
    issues: &mut Vec<ValidationIssue>,
) {
    match s.program {
        LoanProgram::Conventional => {
            if r.total_loan_amount > limits.high_balance {
                issues.push(ValidationIssue::error(
                    "loan_amount",
                    format!(
                        "Loan amount {} exceeds the high-balance conforming limit {}",
                        r.total_loan_amount, limits.high_balance
                    ),
                ));
            } else if r.total_loan_amount > limits.conforming {
                issues.push(ValidationIssue::warning(
                    "loan_amount",
                    format!(
                        "Loan amount {} is above the baseline conforming limit {}; high-balance pricing applies",
                        r.total_loan_amount, limits.conforming
                    ),
                ));
            }
        }
        // FHA limits judge the base, pre-premium loan amount
        LoanProgram::Fha => {
            if r.base_loan_amount > limits.fha_ceiling {
                issues.push(ValidationIssue::error(
                    "loan_amount",
                    format!(
                        "FHA base loan {} exceeds the area ceiling {}",
                        r.base_loan_amount, limits.fha_ceiling
                    ),
                ));
            } else if r.base_loan_amount > limits.fha_floor {
                issues.push(ValidationIssue::warning(
                    "loan_amount",
                    format!(
                        "FHA base loan {} exceeds the national floor {}; county limits vary",
                        r.base_loan_amount, limits.fha_floor
                    ),
                ));
            }
        }
        LoanProgram::Va => {
            if r.total_loan_amount > limits.va_limit {
                issues.push(ValidationIssue::warning(
                    "loan_amount",
                    format!(
                        "VA loan {} exceeds the basic entitlement limit {}; remaining entitlement required",
                        r.total_loan_amount, limits.va_limit
                    ),
                ));
            }
        }
        LoanProgram::Jumbo => {
            if r.total_loan_amount <= limits.conforming {
                issues.push(ValidationIssue::warning(
                    "loan_amount",
                    format!(
                        "Jumbo loan {} is within the conforming limit {}; conventional pricing may be better",
                        r.total_loan_amount, limits.conforming
                    ),
                ));
            }
        }
    }
}

/// Down payment as a percent, reconciling amount-only input the same way
/// the engine does: a populated dollar amount wins over a zero percent.
fn effective_down_percent(s: &Scenario) -> Percent {
    if s.down_payment_percent.is_zero()
        && !s.down_payment_amount.is_zero()
        && !s.purchase_price.is_zero()
    {
        s.down_payment_amount / s.purchase_price * HUNDRED
    } else {
        s.down_payment_percent
    }
}

fn check_ltv(
    s: &Scenario,
    r: &CalculatedResults,
    rules: &LtvRules,
    issues: &mut Vec<ValidationIssue>,
) {
    let rule = rules.for_program(s.program);
    let down_percent = effective_down_percent(s);
    if down_percent < rule.min_down_percent {
        issues.push(ValidationIssue::error(
            "down_payment",
            format!(
                "Down payment {}% is below the program minimum {}%",
                down_percent.round_dp(2),
                rule.min_down_percent
            ),
        ));
    }
    // FHA rule LTV is computed on the base loan; see CalculatedResults
    if r.rule_ltv > rule.max_ltv {
        issues.push(ValidationIssue::error(
            "ltv",
            format!(
                "LTV {}% exceeds the program maximum {}%",
                r.rule_ltv.round_dp(2),
                rule.max_ltv
            ),
        ));
    }
}

fn check_pmi_trigger(
    s: &Scenario,
    r: &CalculatedResults,
    rules: &LtvRules,
    issues: &mut Vec<ValidationIssue>,
) {
    if s.program == LoanProgram::Conventional
        && r.ltv <= rules.pmi_trigger_ltv
        && !r.monthly_mortgage_insurance.is_zero()
    {
        issues.push(ValidationIssue::warning(
            "mortgage_insurance",
            format!(
                "Monthly PMI of {} is charged at {}% LTV, at or below the {}% removal trigger",
                r.monthly_mortgage_insurance,
                r.ltv.round_dp(2),
                rules.pmi_trigger_ltv
            ),
        ));
    }
}

/// DSCR-style underwriting: the only qualifying income is rental.
fn dscr_style(s: &Scenario, r: &CalculatedResults) -> bool {
    if matches!(r.qualification.kind, QualificationKind::Dscr { .. }) {
        return true;
    }
    s.monthly_income.is_zero() && s.other_income.is_zero() && !s.rental_income.is_zero()
}

fn check_dti(
    s: &Scenario,
    r: &CalculatedResults,
    t: &Thresholds,
    issues: &mut Vec<ValidationIssue>,
) {
    if dscr_style(s, r) {
        return;
    }
    if let QualificationKind::Dti { front, back } = r.qualification.kind {
        if front > t.dti_front_limit {
            issues.push(ValidationIssue::error(
                "dti_front",
                format!(
                    "Front-end DTI {}% exceeds the limit {}%",
                    front.round_dp(2),
                    t.dti_front_limit
                ),
            ));
        }
        if back > t.dti_back_limit {
            issues.push(ValidationIssue::error(
                "dti_back",
                format!(
                    "Back-end DTI {}% exceeds the limit {}%",
                    back.round_dp(2),
                    t.dti_back_limit
                ),
            ));
        } else if back > t.dti_back_comfort {
            issues.push(ValidationIssue::warning(
                "dti_back",
                format!(
                    "Back-end DTI {}% is above the comfort threshold {}%",
                    back.round_dp(2),
                    t.dti_back_comfort
                ),
            ));
        }
    }
}

fn check_credit_score(s: &Scenario, t: &Thresholds, issues: &mut Vec<ValidationIssue>) {
    let min = t.min_credit(s.program);
    if s.credit_score < min {
        issues.push(ValidationIssue::error(
            "credit_score",
            format!(
                "Credit score {} is below the program minimum {}",
                s.credit_score, min
            ),
        ));
    }
}

fn check_interest_only(s: &Scenario, issues: &mut Vec<ValidationIssue>) {
    let permitted = matches!(s.program, LoanProgram::Conventional | LoanProgram::Jumbo);
    if s.interest_only && !permitted {
        issues.push(ValidationIssue::warning(
            "interest_only",
            format!(
                "Interest-only is not available on {:?} loans; the payment amortizes",
                s.program
            ),
        ));
    }
}

fn check_interest_rate(s: &Scenario, t: &Thresholds, issues: &mut Vec<ValidationIssue>) {
    if s.interest_rate > t.rate_ceiling {
        issues.push(ValidationIssue::warning(
            "interest_rate",
            format!(
                "Interest rate {}% is unusually high (ceiling {}%)",
                s.interest_rate, t.rate_ceiling
            ),
        ));
    } else if s.interest_rate < t.rate_floor {
        issues.push(ValidationIssue::warning(
            "interest_rate",
            format!(
                "Interest rate {}% is unusually low (floor {}%)",
                s.interest_rate, t.rate_floor
            ),
        ));
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate a scenario against its computed results. Pure: borrows both,
/// mutates neither, returns every violation found.
pub fn validate(
    scenario: &Scenario,
    results: &CalculatedResults,
    config: &ValidatorConfig,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_purchase_price(scenario, &config.thresholds, &mut issues);
    check_loan_limits(scenario, results, &config.loan_limits, &mut issues);
    check_ltv(scenario, results, &config.ltv_rules, &mut issues);
    check_pmi_trigger(scenario, results, &config.ltv_rules, &mut issues);
    check_dti(scenario, results, &config.thresholds, &mut issues);
    check_credit_score(scenario, &config.thresholds, &mut issues);
    check_interest_only(scenario, &mut issues);
    check_interest_rate(scenario, &config.thresholds, &mut issues);
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::calculate;
    use crate::scenario::MiOverride;
    use rust_decimal_macros::dec;

    fn passing_scenario() -> Scenario {
        let mut s = Scenario::purchase(dec!(500_000));
        s.set_down_payment_percent(dec!(20));
        s.interest_rate = dec!(6.5);
        s.credit_score = 740;
        s.monthly_income = dec!(15_000);
        s.monthly_debts = dec!(500);
        s
    }

    fn run(s: &Scenario) -> Vec<ValidationIssue> {
        let results = calculate(s, &EngineConfig::default());
        validate(s, &results, &ValidatorConfig::default())
    }

    #[test]
    fn clean_scenario_produces_no_issues() {
        assert!(run(&passing_scenario()).is_empty());
    }

    #[test]
    fn zero_price_is_an_error() {
        let mut s = passing_scenario();
        s.set_purchase_price(Decimal::ZERO);
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "purchase_price" && i.severity == Severity::Error));
    }

    #[test]
    fn conventional_over_high_balance_is_an_error() {
        let mut s = passing_scenario();
        s.set_purchase_price(dec!(2_000_000));
        s.set_down_payment_percent(dec!(20)); // 1.6M loan
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "loan_amount" && i.severity == Severity::Error));
    }

    #[test]
    fn conventional_in_high_balance_band_is_a_warning() {
        let mut s = passing_scenario();
        s.set_purchase_price(dec!(1_000_000));
        s.set_down_payment_percent(dec!(20)); // 800k loan
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "loan_amount" && i.severity == Severity::Warning));
    }

    #[test]
    fn amount_only_down_payment_is_not_rejected() {
        let mut s = passing_scenario();
        s.down_payment_percent = Decimal::ZERO;
        s.down_payment_amount = dec!(100_000); // 20% of price
        let issues = run(&s);
        assert!(!issues.iter().any(|i| i.field == "down_payment"));
        assert!(!issues.iter().any(|i| i.field == "ltv"));
    }

    #[test]
    fn fha_base_loan_above_floor_is_a_soft_warning() {
        let mut s = passing_scenario();
        s.program = LoanProgram::Fha;
        s.set_purchase_price(dec!(600_000));
        s.set_down_payment_percent(dec!(3.5));
        // Base loan 579,000 clears the national floor but not the ceiling
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "loan_amount" && i.severity == Severity::Warning));
    }

    #[test]
    fn pmi_charged_at_or_below_trigger_ltv_warns() {
        let mut s = passing_scenario(); // 20% down, 80% LTV
        s.mi_override = Some(MiOverride::from_monthly(dec!(95), s.base_loan_amount()));
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "mortgage_insurance" && i.severity == Severity::Warning));
    }

    #[test]
    fn low_down_payment_violates_program_minimum() {
        let mut s = passing_scenario();
        s.set_down_payment_percent(dec!(2));
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "down_payment" && i.severity == Severity::Error));
    }

    #[test]
    fn fha_ltv_judged_on_base_loan() {
        let mut s = passing_scenario();
        s.program = LoanProgram::Fha;
        s.set_down_payment_percent(dec!(3.5));
        // Base-loan LTV is exactly 96.5; the financed premium pushes the
        // display LTV past the cap but must not fail the rule check.
        let issues = run(&s);
        assert!(!issues.iter().any(|i| i.field == "ltv"));
    }

    #[test]
    fn high_back_end_dti_is_an_error_and_comfort_band_a_warning() {
        let mut s = passing_scenario();
        s.set_down_payment_percent(dec!(5));
        s.monthly_income = dec!(5_000);
        s.monthly_debts = dec!(1_500);
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "dti_back" && i.severity == Severity::Error));

        s.monthly_income = dec!(9_000);
        s.monthly_debts = dec!(800);
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "dti_back" && i.severity == Severity::Warning));
    }

    #[test]
    fn dti_checks_skip_dscr_style_underwriting() {
        let mut s = passing_scenario();
        s.occupancy = crate::scenario::Occupancy::Investment;
        s.dscr_loan = true;
        s.monthly_income = Decimal::ZERO;
        s.monthly_debts = dec!(10_000);
        s.rental_income = dec!(4_000);
        let issues = run(&s);
        assert!(!issues.iter().any(|i| i.field.starts_with("dti")));
    }

    #[test]
    fn credit_score_minimum_depends_on_program() {
        let mut s = passing_scenario();
        s.credit_score = 600;
        let issues = run(&s);
        assert!(issues.iter().any(|i| i.field == "credit_score"));

        s.program = LoanProgram::Fha;
        s.set_down_payment_percent(dec!(3.5));
        let issues = run(&s);
        assert!(!issues.iter().any(|i| i.field == "credit_score"));
    }

    #[test]
    fn interest_only_on_fha_is_a_soft_warning() {
        let mut s = passing_scenario();
        s.program = LoanProgram::Fha;
        s.set_down_payment_percent(dec!(3.5));
        s.credit_score = 700;
        s.interest_only = true;
        let issues = run(&s);
        assert!(issues
            .iter()
            .any(|i| i.field == "interest_only" && i.severity == Severity::Warning));

        s.program = LoanProgram::Conventional;
        s.set_down_payment_percent(dec!(20));
        let issues = run(&s);
        assert!(!issues.iter().any(|i| i.field == "interest_only"));
    }

    #[test]
    fn rate_out_of_bounds_warns_both_directions() {
        let mut s = passing_scenario();
        s.interest_rate = dec!(18);
        assert!(run(&s).iter().any(|i| i.field == "interest_rate"));

        s.interest_rate = dec!(0.25);
        assert!(run(&s).iter().any(|i| i.field == "interest_rate"));
    }

    #[test]
    fn issues_accumulate_without_short_circuiting() {
        let mut s = passing_scenario();
        s.set_down_payment_percent(dec!(1));
        s.credit_score = 500;
        s.interest_rate = dec!(20);
        s.monthly_income = dec!(4_000);
        let issues = run(&s);
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"down_payment"));
        assert!(fields.contains(&"credit_score"));
        assert!(fields.contains(&"interest_rate"));
    }

    #[test]
    fn overridden_thresholds_are_honored() {
        let s = passing_scenario();
        let results = calculate(&s, &EngineConfig::default());
        let mut config = ValidatorConfig::default();
        config.thresholds.min_credit_conventional = 780;
        let issues = validate(&s, &results, &config);
        assert!(issues.iter().any(|i| i.field == "credit_score"));
    }
}
