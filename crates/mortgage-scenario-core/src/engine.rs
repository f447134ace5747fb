//! Scenario calculation pipeline.
//!
//! `calculate` is the pure core: it borrows a `Scenario`, reads the
//! configuration tables, and returns a fresh `CalculatedResults` with no
//! side effects, no I/O and no retained state. It is re-run in full on
//! every input change. `calculate_scenario` wraps it in the standard
//! computation envelope with input-shape checks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{interest_only_payment, monthly_payment};
use crate::assistance::{resolve_assistance, AssistanceBreakdown};
use crate::buydown::{schedule_buydown, BuydownResult};
use crate::cash_to_close::{resolve_cash_to_close, CashToClose};
use crate::closing_costs::{aggregate_costs, CalcWarning, CostBreakdown};
use crate::config::EngineConfig;
use crate::error::MortgageError;
use crate::mortgage_insurance::{resolve_mortgage_insurance, MiBreakdown};
use crate::qualification::{
    ltv, math_breakdown, qualify, rule_loan_amount, MathBreakdown, Qualification,
};
use crate::scenario::{LoanProgram, Scenario};
use crate::types::{
    round_cents, with_metadata, ComputationOutput, Money, Percent, MONTHS_PER_YEAR,
};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Fully derived result set. Never mutated in place; recomputed wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatedResults {
    pub base_loan_amount: Money,
    pub financed_mi_amount: Money,
    pub total_loan_amount: Money,

    /// LTV on the full financed amount, used for display and PMI tiering.
    pub ltv: Percent,
    /// LTV on the amount program rules judge (base loan for FHA).
    pub rule_ltv: Percent,

    /// Monthly P&I at the nominal note rate.
    pub monthly_principal_interest: Money,
    /// Monthly P&I at the buydown-adjusted rate where applicable.
    pub monthly_principal_interest_effective: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_mortgage_insurance: Money,
    pub monthly_hoa: Money,
    pub monthly_assistance_payments: Money,

    /// Full monthly payment at the nominal rate.
    pub total_monthly_payment_base: Money,
    /// Full monthly payment with any year-one buydown subsidy applied.
    pub total_monthly_payment: Money,

    pub mortgage_insurance: MiBreakdown,
    pub buydown: BuydownResult,
    pub assistance: AssistanceBreakdown,
    pub qualification: Qualification,
    pub math_breakdown: MathBreakdown,
    pub closing_costs: CostBreakdown,
    pub cash_to_close: CashToClose,

    pub warnings: Vec<CalcWarning>,
}

// ---------------------------------------------------------------------------
// Input sanitation
// ---------------------------------------------------------------------------

fn clamp_non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Clamp negative numeric inputs to zero and reconcile amount/percent pairs
/// so downstream primitives can assume sanitized values.
fn sanitized(scenario: &Scenario) -> Scenario {
    let mut s = scenario.clone();

    s.purchase_price = clamp_non_negative(s.purchase_price);
    s.interest_rate = clamp_non_negative(s.interest_rate);
    s.yearly_property_tax = clamp_non_negative(s.yearly_property_tax);
    s.yearly_insurance = clamp_non_negative(s.yearly_insurance);
    s.monthly_hoa = clamp_non_negative(s.monthly_hoa);
    s.earnest_money = clamp_non_negative(s.earnest_money);
    s.seller_concession = clamp_non_negative(s.seller_concession);
    s.monthly_income = clamp_non_negative(s.monthly_income);
    s.rental_income = clamp_non_negative(s.rental_income);
    s.other_income = clamp_non_negative(s.other_income);
    s.monthly_debts = clamp_non_negative(s.monthly_debts);

    // Whichever side of a duality is populated wins; the other re-derives.
    if !s.down_payment_amount.is_zero() {
        let amount = clamp_non_negative(s.down_payment_amount);
        s.set_down_payment_amount(amount);
    } else {
        let percent = clamp_non_negative(s.down_payment_percent);
        s.set_down_payment_percent(percent);
    }
    let price = s.purchase_price;
    for lien in [&mut s.assistance_first, &mut s.assistance_second] {
        if !lien.amount.is_zero() {
            let amount = clamp_non_negative(lien.amount);
            lien.set_amount(amount, price);
        } else {
            let percent = clamp_non_negative(lien.percent);
            lien.set_percent(percent, price);
        }
        lien.rate = clamp_non_negative(lien.rate);
    }

    s
}

fn interest_only_allowed(program: LoanProgram) -> bool {
    matches!(program, LoanProgram::Conventional | LoanProgram::Jumbo)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Pure calculation over a sanitized copy of the scenario. Total: every
/// degenerate numeric case resolves to a defined value rather than an error.
pub fn calculate(scenario: &Scenario, config: &EngineConfig) -> CalculatedResults {
    let s = sanitized(scenario);
    let mut warnings: Vec<CalcWarning> = Vec::new();

    // Loan amounts and mortgage insurance
    let mi = resolve_mortgage_insurance(&s, config);
    let base_loan = s.base_loan_amount();
    let total_loan = mi.total_loan_amount;

    let display_ltv = ltv(total_loan, s.purchase_price);
    let rule_ltv = ltv(
        rule_loan_amount(s.program, base_loan, total_loan),
        s.purchase_price,
    );

    // Principal & interest
    let interest_only = s.interest_only && interest_only_allowed(s.program);
    if s.interest_only && !interest_only {
        warnings.push(CalcWarning::InterestOnlyNotPermitted);
    }
    let pi_nominal = if interest_only {
        interest_only_payment(total_loan, s.interest_rate)
    } else {
        monthly_payment(total_loan, s.interest_rate, s.term_months)
    };

    // Buydown schedule (amortizing basis, nominal-rate baseline)
    let buydown = schedule_buydown(&s.buydown, total_loan, s.interest_rate, s.term_months);
    let pi_effective = buydown
        .schedule
        .first()
        .map(|year| year.monthly_payment)
        .unwrap_or(pi_nominal);

    // Recurring monthly components
    let monthly_tax = s.yearly_property_tax / MONTHS_PER_YEAR;
    let monthly_insurance = s.yearly_insurance / MONTHS_PER_YEAR;
    let assistance = resolve_assistance(&s);

    let pitia = pi_nominal
        + monthly_tax
        + monthly_insurance
        + mi.monthly_mi
        + s.monthly_hoa
        + assistance.total_monthly_payment;
    let total_monthly = pi_effective
        + monthly_tax
        + monthly_insurance
        + mi.monthly_mi
        + s.monthly_hoa
        + assistance.total_monthly_payment;

    // Qualification runs on the nominal-rate payment
    let qualification = qualify(&s, pitia, config);
    let breakdown = math_breakdown(&s, pitia, config);

    // Closing costs, concessions and cash to close
    let costs = aggregate_costs(&s, total_loan, display_ltv, config);
    let cash = resolve_cash_to_close(&s, costs.net_total, assistance.total_funding);

    warnings.extend(costs.warnings.iter().cloned());

    CalculatedResults {
        base_loan_amount: round_cents(base_loan),
        financed_mi_amount: round_cents(mi.financed_upfront),
        total_loan_amount: round_cents(total_loan),
        ltv: display_ltv,
        rule_ltv,
        monthly_principal_interest: round_cents(pi_nominal),
        monthly_principal_interest_effective: round_cents(pi_effective),
        monthly_property_tax: round_cents(monthly_tax),
        monthly_insurance: round_cents(monthly_insurance),
        monthly_mortgage_insurance: round_cents(mi.monthly_mi),
        monthly_hoa: round_cents(s.monthly_hoa),
        monthly_assistance_payments: round_cents(assistance.total_monthly_payment),
        total_monthly_payment_base: round_cents(pitia),
        total_monthly_payment: round_cents(total_monthly),
        mortgage_insurance: mi,
        buydown,
        assistance,
        qualification,
        math_breakdown: breakdown,
        closing_costs: costs,
        cash_to_close: cash,
        warnings,
    }
}

/// Envelope entry point: input-shape checks, then the pure pipeline.
pub fn calculate_scenario(
    scenario: &Scenario,
    config: &EngineConfig,
) -> MortgageResult<ComputationOutput<CalculatedResults>> {
    let start = Instant::now();

    if scenario.units == 0 || scenario.units > 4 {
        return Err(MortgageError::InvalidInput {
            field: "units".into(),
            reason: "unit count must be between 1 and 4".into(),
        });
    }
    if scenario.term_months == 0 {
        return Err(MortgageError::InvalidInput {
            field: "term_months".into(),
            reason: "term must be at least one month".into(),
        });
    }

    let results = calculate(scenario, config);
    let warning_strings = results.warnings.iter().map(|w| w.to_string()).collect();

    Ok(with_metadata(
        "Deterministic scenario pipeline: amortization, program-dispatched MI, \
         itemized closing costs, buydown schedule, DTI/DSCR qualification, \
         cash-to-close netting",
        scenario,
        warning_strings,
        start.elapsed().as_micros() as u64,
        results,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{AssistanceLoan, Buydown, BuydownKind, Occupancy, TransactionKind};
    use rust_decimal_macros::dec;

    fn conventional_scenario() -> Scenario {
        let mut s = Scenario::purchase(dec!(500_000));
        s.set_down_payment_percent(dec!(5));
        s.interest_rate = dec!(6.5);
        s.term_months = 360;
        s.credit_score = 740;
        s.monthly_income = dec!(12_000);
        s.monthly_debts = dec!(900);
        s.yearly_property_tax = dec!(6_000);
        s.yearly_insurance = dec!(1_800);
        s
    }

    #[test]
    fn conventional_five_percent_down_reference() {
        let r = calculate(&conventional_scenario(), &EngineConfig::default());
        assert_eq!(r.base_loan_amount, dec!(475_000));
        assert_eq!(r.total_loan_amount, dec!(475_000));
        assert_eq!(r.ltv, dec!(95));
        assert!(r.monthly_mortgage_insurance > Decimal::ZERO);
        match r.qualification.kind {
            crate::qualification::QualificationKind::Dti { back, .. } => {
                assert!(back > Decimal::ZERO);
            }
            _ => panic!("expected DTI"),
        }
    }

    #[test]
    fn fha_finances_upfront_mip() {
        let mut s = conventional_scenario();
        s.program = LoanProgram::Fha;
        s.set_down_payment_percent(dec!(3.5));
        let r = calculate(&s, &EngineConfig::default());

        let base = dec!(482_500);
        let upfront = base * dec!(0.0175);
        assert_eq!(r.base_loan_amount, base);
        assert_eq!(r.financed_mi_amount, round_cents(upfront));
        assert_eq!(r.total_loan_amount, round_cents(base + upfront));
        // Rule LTV judges the base loan; display LTV the financed total
        assert_eq!(r.rule_ltv, dec!(96.5));
        assert!(r.ltv > r.rule_ltv);
    }

    #[test]
    fn buydown_year_payments_stay_below_base() {
        let mut s = conventional_scenario();
        s.interest_rate = dec!(7);
        s.buydown = Buydown {
            active: true,
            kind: BuydownKind::TwoOne,
        };
        let r = calculate(&s, &EngineConfig::default());

        assert_eq!(r.buydown.schedule.len(), 2);
        assert_eq!(r.buydown.schedule[0].effective_rate, dec!(5));
        assert_eq!(r.buydown.schedule[1].effective_rate, dec!(6));
        for year in &r.buydown.schedule {
            assert!(year.monthly_payment < r.monthly_principal_interest);
        }
        assert!(r.total_monthly_payment < r.total_monthly_payment_base);
    }

    #[test]
    fn inactive_buydown_leaves_payment_at_base() {
        let r = calculate(&conventional_scenario(), &EngineConfig::default());
        assert!(r.buydown.schedule.is_empty());
        assert_eq!(r.total_monthly_payment, r.total_monthly_payment_base);
    }

    #[test]
    fn ltv_falls_and_mi_never_rises_with_more_down() {
        let config = EngineConfig::default();
        let mut prev_ltv = dec!(101);
        let mut prev_mi = Decimal::MAX;
        for down in [dec!(3), dec!(7), dec!(12), dec!(18), dec!(25)] {
            let mut s = conventional_scenario();
            s.set_down_payment_percent(down);
            let r = calculate(&s, &config);
            assert!(r.ltv < prev_ltv);
            assert!(r.monthly_mortgage_insurance <= prev_mi);
            prev_ltv = r.ltv;
            prev_mi = r.monthly_mortgage_insurance;
        }
    }

    #[test]
    fn deferred_assistance_funds_cash_to_close_without_payment() {
        let mut s = conventional_scenario();
        s.assistance_first = AssistanceLoan {
            active: true,
            amount: dec!(15_000),
            percent: Decimal::ZERO,
            rate: dec!(3),
            term_months: 120,
            deferred: true,
        };
        let without = calculate(&conventional_scenario(), &EngineConfig::default());
        let with = calculate(&s, &EngineConfig::default());

        assert_eq!(with.monthly_assistance_payments, Decimal::ZERO);
        assert_eq!(
            with.cash_to_close.amount,
            without.cash_to_close.amount - dec!(15_000)
        );
    }

    #[test]
    fn interest_only_disallowed_on_fha_warns_and_amortizes() {
        let mut s = conventional_scenario();
        s.program = LoanProgram::Fha;
        s.set_down_payment_percent(dec!(3.5));
        s.interest_only = true;
        let r = calculate(&s, &EngineConfig::default());
        assert!(r.warnings.contains(&CalcWarning::InterestOnlyNotPermitted));

        let amortizing = monthly_payment(r.total_loan_amount, dec!(6.5), 360);
        let diff = (r.monthly_principal_interest - round_cents(amortizing)).abs();
        assert!(diff < dec!(0.02), "diff={}", diff);
    }

    #[test]
    fn refinance_cash_to_close_skips_down_payment() {
        let mut s = conventional_scenario();
        s.transaction = TransactionKind::Refinance;
        s.cash_out_or_payoff = dec!(4_000);
        let r = calculate(&s, &EngineConfig::default());
        assert_eq!(r.cash_to_close.down_payment_required, Decimal::ZERO);
        assert_eq!(
            r.cash_to_close.amount,
            dec!(4_000) + r.closing_costs.net_total
        );
    }

    #[test]
    fn negative_inputs_clamp_instead_of_poisoning_results() {
        let mut s = conventional_scenario();
        s.monthly_hoa = dec!(-50);
        s.monthly_debts = dec!(-1);
        let r = calculate(&s, &EngineConfig::default());
        assert_eq!(r.monthly_hoa, Decimal::ZERO);
    }

    #[test]
    fn dscr_flag_shields_qualification_from_borrower_fields() {
        let mut s = conventional_scenario();
        s.occupancy = Occupancy::Investment;
        s.dscr_loan = true;
        s.rental_income = dec!(4_500);

        let r1 = calculate(&s, &EngineConfig::default());
        s.monthly_income = dec!(1);
        s.monthly_debts = dec!(50_000);
        let r2 = calculate(&s, &EngineConfig::default());

        let (k1, k2) = (
            serde_json::to_value(&r1.qualification.kind).unwrap(),
            serde_json::to_value(&r2.qualification.kind).unwrap(),
        );
        assert_eq!(k1, k2);
    }

    #[test]
    fn envelope_rejects_malformed_shape() {
        let mut s = conventional_scenario();
        s.units = 0;
        assert!(calculate_scenario(&s, &EngineConfig::default()).is_err());

        let mut s = conventional_scenario();
        s.term_months = 0;
        assert!(calculate_scenario(&s, &EngineConfig::default()).is_err());
    }

    #[test]
    fn envelope_carries_warning_strings() {
        let mut s = conventional_scenario();
        s.seller_concession_enabled = true;
        s.seller_concession = dec!(50_000);
        let out = calculate_scenario(&s, &EngineConfig::default()).unwrap();
        assert!(!out.warnings.is_empty());
    }
}
