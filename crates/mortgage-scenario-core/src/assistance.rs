//! Subordinate (assistance) loan calculator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::monthly_payment;
use crate::scenario::{AssistanceLoan, Scenario};
use crate::types::Money;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistanceLien {
    pub amount: Money,
    /// Zero for a deferred (silent) second.
    pub monthly_payment: Money,
    pub deferred: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistanceBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<AssistanceLien>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<AssistanceLien>,
    pub total_monthly_payment: Money,
    /// Funding applied against cash-to-close, deferred liens included.
    pub total_funding: Money,
}

fn resolve_lien(loan: &AssistanceLoan) -> AssistanceLien {
    let payment = if loan.deferred {
        Decimal::ZERO
    } else {
        monthly_payment(loan.amount, loan.rate, loan.term_months)
    };
    AssistanceLien {
        amount: loan.amount,
        monthly_payment: payment,
        deferred: loan.deferred,
    }
}

/// Resolve up to two subordinate loans. The second lien only participates
/// when the first is active; that is a structural dependency, not a
/// validation rule.
pub fn resolve_assistance(scenario: &Scenario) -> AssistanceBreakdown {
    let first = scenario
        .assistance_first
        .active
        .then(|| resolve_lien(&scenario.assistance_first));
    let second = (scenario.assistance_first.active && scenario.assistance_second.active)
        .then(|| resolve_lien(&scenario.assistance_second));

    let total_monthly_payment = first
        .iter()
        .chain(second.iter())
        .map(|l| l.monthly_payment)
        .sum();
    let total_funding = first.iter().chain(second.iter()).map(|l| l.amount).sum();

    AssistanceBreakdown {
        first,
        second,
        total_monthly_payment,
        total_funding,
    }
}
