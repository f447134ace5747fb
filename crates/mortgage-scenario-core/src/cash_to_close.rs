//! Cash-to-close resolution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::scenario::{Scenario, TransactionKind};
use crate::types::Money;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashToClose {
    /// Signed: negative means a refund owed to the borrower.
    pub amount: Money,
    /// Refunds are surfaced distinctly, not merely as a signed number.
    pub refund_due: bool,
    pub down_payment_required: Money,
    pub earnest_money: Money,
}

/// Net down payment, closing costs, assistance funding and earnest money
/// into the final figure. Refinances carry no down payment or earnest money.
pub fn resolve_cash_to_close(
    scenario: &Scenario,
    net_closing_costs: Money,
    assistance_funding: Money,
) -> CashToClose {
    let (down_payment, earnest, amount) = match scenario.transaction {
        TransactionKind::Purchase => {
            let down = scenario.down_payment_amount;
            let amount =
                down + net_closing_costs - assistance_funding - scenario.earnest_money;
            (down, scenario.earnest_money, amount)
        }
        TransactionKind::Refinance => (
            Decimal::ZERO,
            Decimal::ZERO,
            scenario.cash_out_or_payoff + net_closing_costs,
        ),
    };

    CashToClose {
        amount,
        refund_due: amount < Decimal::ZERO,
        down_payment_required: down_payment,
        earnest_money: earnest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn purchase_nets_all_sources() {
        let mut s = Scenario::purchase(dec!(500_000));
        s.set_down_payment_percent(dec!(5));
        s.earnest_money = dec!(5_000);

        let ctc = resolve_cash_to_close(&s, dec!(12_000), dec!(10_000));
        assert_eq!(ctc.down_payment_required, dec!(25_000));
        assert_eq!(ctc.amount, dec!(25_000) + dec!(12_000) - dec!(10_000) - dec!(5_000));
        assert!(!ctc.refund_due);
    }

    #[test]
    fn over_funded_purchase_is_a_refund() {
        let mut s = Scenario::purchase(dec!(300_000));
        s.set_down_payment_percent(dec!(3));
        s.earnest_money = dec!(6_000);

        let ctc = resolve_cash_to_close(&s, dec!(1_000), dec!(9_000));
        assert!(ctc.amount < Decimal::ZERO);
        assert!(ctc.refund_due);
    }

    #[test]
    fn refinance_ignores_down_payment_and_earnest() {
        let mut s = Scenario::purchase(dec!(500_000));
        s.transaction = TransactionKind::Refinance;
        s.cash_out_or_payoff = dec!(-20_000); // cash-out to borrower
        s.earnest_money = dec!(5_000);

        let ctc = resolve_cash_to_close(&s, dec!(8_000), Decimal::ZERO);
        assert_eq!(ctc.amount, dec!(-12_000));
        assert!(ctc.refund_due);
        assert_eq!(ctc.down_payment_required, Decimal::ZERO);
        assert_eq!(ctc.earnest_money, Decimal::ZERO);
    }
}
