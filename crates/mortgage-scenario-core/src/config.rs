//! Engine configuration tables.
//!
//! Every rate schedule the calculators consult lives here as an externally
//! supplied table with documented defaults, never as literals buried in
//! formulas. Callers may persist per-user overrides; the engine accepts any
//! override transparently.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::scenario::{LoanProgram, Occupancy};
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// FHA mortgage insurance
// ---------------------------------------------------------------------------

/// FHA MIP schedule. Defaults track current HUD guidance for 30-year terms:
/// 1.75% upfront (financed), 0.55%/yr above 95% LTV, 0.50%/yr at or below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhaMipConfig {
    pub upfront_rate: Percent,
    pub ltv_breakpoint: Percent,
    pub annual_factor_above: Percent,
    pub annual_factor_at_or_below: Percent,
}

impl Default for FhaMipConfig {
    fn default() -> Self {
        Self {
            upfront_rate: dec!(1.75),
            ltv_breakpoint: dec!(95),
            annual_factor_above: dec!(0.55),
            annual_factor_at_or_below: dec!(0.50),
        }
    }
}

// ---------------------------------------------------------------------------
// VA funding fee
// ---------------------------------------------------------------------------

/// One VA funding-fee tier: applies when the down payment percent is at
/// least `min_down_percent`. Tiers are consulted highest threshold first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaFundingTier {
    pub min_down_percent: Percent,
    pub fee_rate: Percent,
}

/// VA funding-fee schedule. Defaults are the first-use rates: 2.15% under
/// 5% down, 1.5% from 5%, 1.25% from 10%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaFundingConfig {
    pub tiers: Vec<VaFundingTier>,
}

impl Default for VaFundingConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                VaFundingTier {
                    min_down_percent: dec!(10),
                    fee_rate: dec!(1.25),
                },
                VaFundingTier {
                    min_down_percent: dec!(5),
                    fee_rate: dec!(1.5),
                },
                VaFundingTier {
                    min_down_percent: dec!(0),
                    fee_rate: dec!(2.15),
                },
            ],
        }
    }
}

impl VaFundingConfig {
    pub fn rate_for_down_percent(&self, down_percent: Percent) -> Percent {
        self.tiers
            .iter()
            .find(|t| down_percent >= t.min_down_percent)
            .map(|t| t.fee_rate)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Conventional PMI
// ---------------------------------------------------------------------------

/// One PMI tier: annual rate applied while LTV exceeds `ltv_above`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmiTier {
    pub ltv_above: Percent,
    pub annual_rate: Percent,
}

/// Conventional PMI schedule, monotone in LTV. No PMI at or below 80% LTV.
/// Default rates are representative borrower-paid monthly premiums for a
/// 740-score borrower; lenders substitute their own card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmiRateTable {
    /// Consulted highest `ltv_above` first; first matching tier wins.
    pub tiers: Vec<PmiTier>,
}

impl Default for PmiRateTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                PmiTier {
                    ltv_above: dec!(95),
                    annual_rate: dec!(0.58),
                },
                PmiTier {
                    ltv_above: dec!(90),
                    annual_rate: dec!(0.41),
                },
                PmiTier {
                    ltv_above: dec!(85),
                    annual_rate: dec!(0.28),
                },
                PmiTier {
                    ltv_above: dec!(80),
                    annual_rate: dec!(0.19),
                },
            ],
        }
    }
}

impl PmiRateTable {
    /// Annual PMI rate for an LTV; zero at or below the lowest tier bound.
    pub fn annual_rate_for_ltv(&self, ltv: Percent) -> Percent {
        self.tiers
            .iter()
            .find(|t| ltv > t.ltv_above)
            .map(|t| t.annual_rate)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Lender's title insurance
// ---------------------------------------------------------------------------

/// Banded lender's-title schedule: marginal rate per band, decreasing with
/// band, plus a flat add-on once the loan clears the top band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleInsuranceBands {
    pub band_one_limit: Money,
    pub band_two_limit: Money,
    /// Marginal rate on the first band, whole-scaled percent.
    pub band_one_rate: Percent,
    /// Marginal rate between the band limits.
    pub band_two_rate: Percent,
    /// Flat component added when the loan exceeds `band_two_limit`.
    pub above_band_flat: Money,
}

impl Default for TitleInsuranceBands {
    fn default() -> Self {
        Self {
            band_one_limit: dec!(250_000),
            band_two_limit: dec!(550_000),
            band_one_rate: dec!(0.575),
            band_two_rate: dec!(0.45),
            above_band_flat: dec!(1_100),
        }
    }
}

// ---------------------------------------------------------------------------
// Seller-concession caps
// ---------------------------------------------------------------------------

/// Maximum interested-party-contribution percentages. Conventional
/// owner-occupied caps scale down as LTV rises; FHA/VA are flat;
/// investment property takes a lower flat cap regardless of program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcessionCaps {
    pub conventional_high_ltv: Percent,
    pub conventional_mid_ltv: Percent,
    pub conventional_low_ltv: Percent,
    /// LTV above which the high-LTV cap applies.
    pub high_ltv_breakpoint: Percent,
    /// LTV above which the mid-LTV cap applies.
    pub mid_ltv_breakpoint: Percent,
    pub fha_cap: Percent,
    pub va_cap: Percent,
    pub investment_cap: Percent,
}

impl Default for ConcessionCaps {
    fn default() -> Self {
        Self {
            conventional_high_ltv: dec!(3),
            conventional_mid_ltv: dec!(6),
            conventional_low_ltv: dec!(9),
            high_ltv_breakpoint: dec!(90),
            mid_ltv_breakpoint: dec!(75),
            fha_cap: dec!(6),
            va_cap: dec!(4),
            investment_cap: dec!(2),
        }
    }
}

impl ConcessionCaps {
    pub fn max_percent(&self, program: LoanProgram, occupancy: Occupancy, ltv: Percent) -> Percent {
        if occupancy == Occupancy::Investment {
            return self.investment_cap;
        }
        match program {
            LoanProgram::Fha => self.fha_cap,
            LoanProgram::Va => self.va_cap,
            LoanProgram::Conventional | LoanProgram::Jumbo => {
                if ltv > self.high_ltv_breakpoint {
                    self.conventional_high_ltv
                } else if ltv > self.mid_ltv_breakpoint {
                    self.conventional_mid_ltv
                } else {
                    self.conventional_low_ltv
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DSCR and rental-income treatment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DscrConfig {
    /// Share of stated rent counted toward gross income (vacancy factor).
    pub vacancy_factor: Percent,
    /// Minimum passing debt-service-coverage ratio.
    pub pass_threshold: Decimal,
}

impl Default for DscrConfig {
    fn default() -> Self {
        Self {
            vacancy_factor: dec!(75),
            pass_threshold: dec!(1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Reference qualification limits (what-if breakdown)
// ---------------------------------------------------------------------------

/// Fixed reference DTI limits used by the parallel what-if breakdown,
/// independent of the scenario's selected program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLimits {
    pub conventional_front: Percent,
    pub conventional_back: Percent,
    pub fha_front: Percent,
    pub fha_back: Percent,
}

impl Default for ReferenceLimits {
    fn default() -> Self {
        Self {
            conventional_front: dec!(46.99),
            conventional_back: dec!(49.99),
            fha_front: dec!(46.99),
            fha_back: dec!(57.00),
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Everything the calculation pipeline consults besides the scenario itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fha_mip: FhaMipConfig,
    pub va_funding: VaFundingConfig,
    pub pmi: PmiRateTable,
    pub title_bands: TitleInsuranceBands,
    pub concession_caps: ConcessionCaps,
    pub dscr: DscrConfig,
    pub reference_limits: ReferenceLimits,
}
