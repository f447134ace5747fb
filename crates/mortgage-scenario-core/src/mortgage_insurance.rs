//! Mortgage-insurance resolver.
//!
//! One dispatch over the loan program per concern: upfront (financed)
//! premium and ongoing monthly cost. Total loan amount is always
//! base loan + financed premium.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::scenario::{LoanProgram, Scenario};
use crate::types::{pct, Money, Percent, HUNDRED, MONTHS_PER_YEAR};

/// Resolved mortgage-insurance figures for one scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiBreakdown {
    /// Upfront MIP (FHA) or funding fee (VA), financed into the loan.
    pub financed_upfront: Money,
    pub total_loan_amount: Money,
    pub monthly_mi: Money,
    /// Annual MI rate actually in effect, whole-scaled percent.
    pub annual_mi_rate: Percent,
}

/// LTV on the base (pre-premium) loan. Zero purchase price yields zero.
fn base_ltv(base_loan: Money, purchase_price: Money) -> Percent {
    if purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        base_loan / purchase_price * HUNDRED
    }
}

pub fn resolve_mortgage_insurance(scenario: &Scenario, config: &EngineConfig) -> MiBreakdown {
    let base_loan = scenario.base_loan_amount();
    let ltv = base_ltv(base_loan, scenario.purchase_price);

    match scenario.program {
        LoanProgram::Fha => {
            let upfront_rate = scenario
                .upfront_mi_rate
                .unwrap_or(config.fha_mip.upfront_rate);
            let financed_upfront = base_loan * pct(upfront_rate);
            let total_loan = base_loan + financed_upfront;

            // Annual factor picks on the base-loan LTV, two-tier breakpoint.
            let factor = if ltv > config.fha_mip.ltv_breakpoint {
                config.fha_mip.annual_factor_above
            } else {
                config.fha_mip.annual_factor_at_or_below
            };
            let monthly = total_loan * pct(factor) / MONTHS_PER_YEAR;

            MiBreakdown {
                financed_upfront,
                total_loan_amount: total_loan,
                monthly_mi: monthly,
                annual_mi_rate: factor,
            }
        }
        LoanProgram::Va => {
            let fee_rate = scenario
                .upfront_mi_rate
                .unwrap_or_else(|| {
                    config
                        .va_funding
                        .rate_for_down_percent(scenario.down_payment_percent)
                });
            let financed_upfront = base_loan * pct(fee_rate);
            // VA carries no monthly mortgage insurance.
            MiBreakdown {
                financed_upfront,
                total_loan_amount: base_loan + financed_upfront,
                monthly_mi: Decimal::ZERO,
                annual_mi_rate: Decimal::ZERO,
            }
        }
        LoanProgram::Conventional => {
            let (monthly, annual_rate) = match scenario.mi_override {
                Some(ovr) => (ovr.monthly_amount, ovr.annual_rate),
                None => {
                    let rate = config.pmi.annual_rate_for_ltv(ltv);
                    (base_loan * pct(rate) / MONTHS_PER_YEAR, rate)
                }
            };
            MiBreakdown {
                financed_upfront: Decimal::ZERO,
                total_loan_amount: base_loan,
                monthly_mi: monthly,
                annual_mi_rate: annual_rate,
            }
        }
        LoanProgram::Jumbo => MiBreakdown {
            financed_upfront: Decimal::ZERO,
            total_loan_amount: base_loan,
            monthly_mi: Decimal::ZERO,
            annual_mi_rate: Decimal::ZERO,
        },
    }
}
