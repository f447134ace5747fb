//! Level-payment amortization primitives.
//!
//! These assume sanitized numeric input (the engine clamps negatives at the
//! boundary) and never error: every degenerate case has a defined result.

use rust_decimal::Decimal;

use crate::types::{pct, Money, Percent, MONTHS_PER_YEAR};

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd
/// drift over long terms).
fn compound(rate: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Standard level monthly payment for a fully amortizing loan.
///
/// At a zero rate the formula degrades to straight-line principal
/// (`principal / term_months`) rather than dividing by zero.
pub fn monthly_payment(principal: Money, annual_rate: Percent, term_months: u32) -> Money {
    if principal.is_zero() || term_months == 0 {
        return Decimal::ZERO;
    }
    if annual_rate.is_zero() {
        return principal / Decimal::from(term_months);
    }

    let i = pct(annual_rate) / MONTHS_PER_YEAR;
    let growth = compound(i, term_months);
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return principal / Decimal::from(term_months);
    }
    principal * i * growth / denominator
}

/// Interest-only monthly payment: no principal component.
pub fn interest_only_payment(principal: Money, annual_rate: Percent) -> Money {
    principal * pct(annual_rate) / MONTHS_PER_YEAR
}

/// Payment at an alternate rate, holding principal and term. Used by the
/// buydown scheduler; negative effective rates clamp to zero.
pub fn payment_at_rate(principal: Money, annual_rate: Percent, term_months: u32) -> Money {
    monthly_payment(principal, annual_rate.max(Decimal::ZERO), term_months)
}
