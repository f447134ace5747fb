//! Closing-cost aggregation and concession/credit netting.
//!
//! Percent-mode items always resolve against the *total* loan amount
//! (financed mortgage insurance included), never the base loan.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, TitleInsuranceBands};
use crate::scenario::{
    AmountKind, CostCategory, ReserveSource, Scenario, SpecialPricing,
};
use crate::types::{pct, Money, Percent, HUNDRED, MONTHS_PER_YEAR};

const DAYS_PER_YEAR: Decimal = dec!(365);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCost {
    pub id: String,
    pub category: CostCategory,
    pub name: String,
    pub amount: Money,
}

/// Machine-readable calculation warnings, surfaced alongside results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CalcWarning {
    /// Seller concessions above the program/LTV cap; the effective amount
    /// used in net-cost math was clipped to `allowed`.
    ExcessConcessions { requested: Money, allowed: Money },
    /// Concessions plus credits exceed total closing costs; `amount` of
    /// credit goes unused.
    UnusedCredits { amount: Money },
    /// Interest-only requested on a program that does not permit it.
    InterestOnlyNotPermitted,
}

impl std::fmt::Display for CalcWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcWarning::ExcessConcessions { requested, allowed } => write!(
                f,
                "Seller concessions of {requested} exceed the maximum allowed {allowed}; excess is not applied"
            ),
            CalcWarning::UnusedCredits { amount } => write!(
                f,
                "Concessions and credits exceed total closing costs; {amount} goes unused"
            ),
            CalcWarning::InterestOnlyNotPermitted => {
                write!(f, "Interest-only is not available for this loan program")
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub items: Vec<ResolvedCost>,
    pub total: Money,
    pub seller_concession_requested: Money,
    /// Concession actually applied in net-cost math (clipped to the cap).
    pub seller_concession_effective: Money,
    /// Effective concession as a percent of purchase price.
    pub concession_percent_used: Percent,
    pub max_concession_percent: Percent,
    pub lender_credit_amount: Money,
    pub net_total: Money,
    pub warnings: Vec<CalcWarning>,
}

// ---------------------------------------------------------------------------
// Item resolution
// ---------------------------------------------------------------------------

/// Banded lender's-title premium: decreasing marginal rate per band, flat
/// add-on above the top band.
pub fn title_premium(total_loan: Money, bands: &TitleInsuranceBands) -> Money {
    let in_band_one = total_loan.min(bands.band_one_limit);
    let mut premium = in_band_one * pct(bands.band_one_rate);

    if total_loan > bands.band_one_limit {
        let in_band_two = total_loan.min(bands.band_two_limit) - bands.band_one_limit;
        premium += in_band_two * pct(bands.band_two_rate);
    }
    if total_loan > bands.band_two_limit {
        premium += bands.above_band_flat;
    }
    premium
}

fn resolve_item_amount(
    item_amount: Decimal,
    unit: AmountKind,
    special: Option<SpecialPricing>,
    scenario: &Scenario,
    total_loan: Money,
    config: &EngineConfig,
) -> Money {
    if let Some(pricing) = special {
        return match pricing {
            SpecialPricing::PerDiemInterest { days } => {
                total_loan * pct(scenario.interest_rate) / DAYS_PER_YEAR * Decimal::from(days)
            }
            SpecialPricing::Reserve { source, months } => {
                let yearly = match source {
                    ReserveSource::PropertyTax => scenario.yearly_property_tax,
                    ReserveSource::Insurance => scenario.yearly_insurance,
                };
                yearly / MONTHS_PER_YEAR * Decimal::from(months)
            }
            SpecialPricing::LendersTitle => title_premium(total_loan, &config.title_bands),
        };
    }
    match unit {
        AmountKind::FixedDollar => item_amount,
        AmountKind::PercentOfLoan => total_loan * pct(item_amount),
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Walk the scenario's item list, resolve each to dollars, then net
/// concessions and credits against the total.
pub fn aggregate_costs(
    scenario: &Scenario,
    total_loan: Money,
    display_ltv: Percent,
    config: &EngineConfig,
) -> CostBreakdown {
    let mut items = Vec::with_capacity(scenario.closing_costs.len());
    let mut total = Decimal::ZERO;

    for item in &scenario.closing_costs {
        if item.hoa_linked && scenario.monthly_hoa.is_zero() {
            continue;
        }
        let amount = resolve_item_amount(
            item.amount,
            item.unit,
            item.special,
            scenario,
            total_loan,
            config,
        );
        total += amount;
        items.push(ResolvedCost {
            id: item.id.clone(),
            category: item.category,
            name: item.name.clone(),
            amount,
        });
    }

    let mut warnings = Vec::new();

    // Concession cap by program/occupancy/LTV, as a percent of price.
    let max_pct = config
        .concession_caps
        .max_percent(scenario.program, scenario.occupancy, display_ltv);
    let max_allowed = scenario.purchase_price * pct(max_pct);

    let requested = if scenario.seller_concession_enabled {
        scenario.seller_concession
    } else {
        Decimal::ZERO
    };
    let effective = requested.min(max_allowed);
    if requested > max_allowed {
        warnings.push(CalcWarning::ExcessConcessions {
            requested,
            allowed: max_allowed,
        });
    }

    let credit = match scenario.lender_credit_kind {
        AmountKind::FixedDollar => scenario.lender_credit,
        AmountKind::PercentOfLoan => total_loan * pct(scenario.lender_credit),
    };

    let applied = effective + credit;
    if applied > total {
        warnings.push(CalcWarning::UnusedCredits {
            amount: applied - total,
        });
    }
    let net_total = (total - applied).max(Decimal::ZERO);

    let concession_percent_used = if scenario.purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        effective / scenario.purchase_price * HUNDRED
    };

    CostBreakdown {
        items,
        total,
        seller_concession_requested: requested,
        seller_concession_effective: effective,
        concession_percent_used,
        max_concession_percent: max_pct,
        lender_credit_amount: credit,
        net_total,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ClosingCostItem;
    use rust_decimal_macros::dec;

    fn bare_scenario(items: Vec<ClosingCostItem>) -> Scenario {
        let mut s = Scenario::purchase(dec!(500_000));
        s.interest_rate = dec!(6.5);
        s.closing_costs = items;
        s
    }

    #[test]
    fn fixed_and_percent_items_resolve_against_total_loan() {
        let s = bare_scenario(vec![
            ClosingCostItem::fixed("a", CostCategory::LenderFees, "Flat", dec!(500)),
            ClosingCostItem::percent_of_loan("b", CostCategory::LenderFees, "Points", dec!(1)),
        ]);
        // Total loan includes a financed premium the base loan does not
        let b = aggregate_costs(&s, dec!(490_000), dec!(80), &EngineConfig::default());
        assert_eq!(b.total, dec!(500) + dec!(4_900));
    }

    #[test]
    fn per_diem_interest_uses_day_count() {
        let s = bare_scenario(vec![ClosingCostItem {
            special: Some(SpecialPricing::PerDiemInterest { days: 10 }),
            ..ClosingCostItem::fixed("ppi", CostCategory::EscrowsPrepaids, "Prepaid interest", Decimal::ZERO)
        }]);
        let b = aggregate_costs(&s, dec!(400_000), dec!(80), &EngineConfig::default());
        let expected = dec!(400_000) * dec!(0.065) / dec!(365) * dec!(10);
        assert_eq!(b.total, expected);
    }

    #[test]
    fn reserves_scale_yearly_base_by_months() {
        let mut s = bare_scenario(vec![ClosingCostItem {
            special: Some(SpecialPricing::Reserve {
                source: ReserveSource::PropertyTax,
                months: 3,
            }),
            ..ClosingCostItem::fixed("tax", CostCategory::EscrowsPrepaids, "Tax escrow", Decimal::ZERO)
        }]);
        s.yearly_property_tax = dec!(6_000);
        let b = aggregate_costs(&s, dec!(400_000), dec!(80), &EngineConfig::default());
        assert_eq!(b.total, dec!(1_500));
    }

    #[test]
    fn hoa_items_vanish_without_hoa() {
        let mut item = ClosingCostItem::fixed("hoa", CostCategory::OtherFees, "HOA transfer", dec!(250));
        item.hoa_linked = true;
        let mut s = bare_scenario(vec![item]);
        let b = aggregate_costs(&s, dec!(400_000), dec!(80), &EngineConfig::default());
        assert!(b.items.is_empty());
        assert_eq!(b.total, Decimal::ZERO);

        s.monthly_hoa = dec!(150);
        let b = aggregate_costs(&s, dec!(400_000), dec!(80), &EngineConfig::default());
        assert_eq!(b.total, dec!(250));
    }

    #[test]
    fn title_bands_decrease_marginally_and_flatten_on_top() {
        let bands = TitleInsuranceBands::default();
        let low = title_premium(dec!(200_000), &bands);
        assert_eq!(low, dec!(200_000) * dec!(0.00575));

        let mid = title_premium(dec!(400_000), &bands);
        let expected_mid = dec!(250_000) * dec!(0.00575) + dec!(150_000) * dec!(0.0045);
        assert_eq!(mid, expected_mid);

        let high = title_premium(dec!(600_000), &bands);
        let expected_high =
            dec!(250_000) * dec!(0.00575) + dec!(300_000) * dec!(0.0045) + bands.above_band_flat;
        assert_eq!(high, expected_high);
    }

    #[test]
    fn concessions_clip_to_cap_with_warning() {
        let mut s = bare_scenario(vec![ClosingCostItem::fixed(
            "a",
            CostCategory::LenderFees,
            "Flat",
            dec!(40_000),
        )]);
        s.seller_concession_enabled = true;
        s.seller_concession = dec!(50_000); // 10% of price
        // 95% LTV conventional: cap 3% = 15,000
        let b = aggregate_costs(&s, dec!(475_000), dec!(95), &EngineConfig::default());
        assert_eq!(b.seller_concession_requested, dec!(50_000));
        assert_eq!(b.seller_concession_effective, dec!(15_000));
        assert!(b.seller_concession_effective <= dec!(15_000));
        assert_eq!(b.concession_percent_used, dec!(3));
        assert_eq!(b.max_concession_percent, dec!(3));
        assert!(b
            .warnings
            .iter()
            .any(|w| matches!(w, CalcWarning::ExcessConcessions { .. })));
        assert_eq!(b.net_total, dec!(25_000));
    }

    #[test]
    fn unused_credit_warns_and_floors_net_at_zero() {
        let mut s = bare_scenario(vec![ClosingCostItem::fixed(
            "a",
            CostCategory::LenderFees,
            "Flat",
            dec!(2_000),
        )]);
        s.lender_credit = dec!(3_000);
        let b = aggregate_costs(&s, dec!(400_000), dec!(80), &EngineConfig::default());
        assert_eq!(b.net_total, Decimal::ZERO);
        assert!(b
            .warnings
            .contains(&CalcWarning::UnusedCredits { amount: dec!(1_000) }));
    }

    #[test]
    fn percent_lender_credit_resolves_against_total_loan() {
        let mut s = bare_scenario(vec![ClosingCostItem::fixed(
            "a",
            CostCategory::LenderFees,
            "Flat",
            dec!(10_000),
        )]);
        s.lender_credit = dec!(1);
        s.lender_credit_kind = AmountKind::PercentOfLoan;
        let b = aggregate_costs(&s, dec!(400_000), dec!(80), &EngineConfig::default());
        assert_eq!(b.lender_credit_amount, dec!(4_000));
        assert_eq!(b.net_total, dec!(6_000));
    }
}
