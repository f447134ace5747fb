//! Temporary-buydown scheduler.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::payment_at_rate;
use crate::scenario::Buydown;
use crate::types::{round_cents, Money, Percent, MONTHS_PER_YEAR};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuydownYear {
    /// 1-based loan year.
    pub year: u32,
    pub effective_rate: Percent,
    pub monthly_payment: Money,
    /// Twelve months of payment delta against the full-rate payment.
    pub annual_subsidy: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuydownResult {
    pub schedule: Vec<BuydownYear>,
    pub total_cost: Money,
}

/// Year-by-year subsidized payments and total subsidy for a temporary
/// buydown. The baseline is always the payment at the nominal rate; an
/// inactive buydown yields an empty schedule at zero cost.
///
/// Payments are settled to the cent here so each year's subsidy is exactly
/// twelve times the displayed payment delta.
pub fn schedule_buydown(
    buydown: &Buydown,
    principal: Money,
    nominal_rate: Percent,
    term_months: u32,
) -> BuydownResult {
    if !buydown.active {
        return BuydownResult::default();
    }

    let full_payment = round_cents(payment_at_rate(principal, nominal_rate, term_months));
    let mut schedule = Vec::new();
    let mut total_cost = Decimal::ZERO;

    for (i, reduction) in buydown.kind.reductions().iter().enumerate() {
        let effective_rate = (nominal_rate - reduction).max(Decimal::ZERO);
        let payment = round_cents(payment_at_rate(principal, effective_rate, term_months));
        let annual_subsidy = (full_payment - payment) * MONTHS_PER_YEAR;
        total_cost += annual_subsidy;
        schedule.push(BuydownYear {
            year: (i + 1) as u32,
            effective_rate,
            monthly_payment: payment,
            annual_subsidy,
        });
    }

    BuydownResult {
        schedule,
        total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::monthly_payment;
    use crate::scenario::BuydownKind;
    use rust_decimal_macros::dec;

    fn active(kind: BuydownKind) -> Buydown {
        Buydown { active: true, kind }
    }

    #[test]
    fn inactive_buydown_is_empty_and_free() {
        let result = schedule_buydown(&Buydown::default(), dec!(400_000), dec!(7), 360);
        assert!(result.schedule.is_empty());
        assert_eq!(result.total_cost, Decimal::ZERO);
    }

    #[test]
    fn two_one_steps_through_five_then_six_percent() {
        let result = schedule_buydown(&active(BuydownKind::TwoOne), dec!(400_000), dec!(7), 360);
        assert_eq!(result.schedule.len(), 2);
        assert_eq!(result.schedule[0].effective_rate, dec!(5));
        assert_eq!(result.schedule[1].effective_rate, dec!(6));

        let full = round_cents(monthly_payment(dec!(400_000), dec!(7), 360));
        for year in &result.schedule {
            assert!(year.monthly_payment < full);
            let expected = (full - year.monthly_payment) * dec!(12);
            assert_eq!(year.annual_subsidy, expected);
        }
        let sum: Decimal = result.schedule.iter().map(|y| y.annual_subsidy).sum();
        assert_eq!(result.total_cost, sum);
    }

    #[test]
    fn three_two_one_has_three_active_years() {
        let result =
            schedule_buydown(&active(BuydownKind::ThreeTwoOne), dec!(300_000), dec!(6.5), 360);
        assert_eq!(result.schedule.len(), 3);
        assert_eq!(result.schedule[0].effective_rate, dec!(3.5));
        assert_eq!(result.schedule[2].effective_rate, dec!(5.5));
        // Deeper reductions earlier mean strictly decreasing subsidies
        assert!(result.schedule[0].annual_subsidy > result.schedule[1].annual_subsidy);
        assert!(result.schedule[1].annual_subsidy > result.schedule[2].annual_subsidy);
    }

    #[test]
    fn reduction_below_zero_clamps_rate() {
        let result = schedule_buydown(&active(BuydownKind::ThreeTwoOne), dec!(300_000), dec!(2), 360);
        assert_eq!(result.schedule[0].effective_rate, Decimal::ZERO);
    }
}
