use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use mortgage_scenario_core::amortization::{interest_only_payment, monthly_payment};
use mortgage_scenario_core::buydown::schedule_buydown;
use mortgage_scenario_core::scenario::{Buydown, BuydownKind};
use mortgage_scenario_core::types::round_cents;

#[derive(Args)]
pub struct PaymentArgs {
    /// Loan principal in dollars
    #[arg(long)]
    pub principal: Decimal,
    /// Annual interest rate, whole-scaled percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Decimal,
    /// Term in months
    #[arg(long, default_value_t = 360)]
    pub term: u32,
    /// Interest-only payment (no principal component)
    #[arg(long)]
    pub interest_only: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum BuydownKindArg {
    #[value(name = "2-1")]
    TwoOne,
    #[value(name = "1-0")]
    OneZero,
    #[value(name = "1-1")]
    OneOne,
    #[value(name = "3-2-1")]
    ThreeTwoOne,
}

impl From<BuydownKindArg> for BuydownKind {
    fn from(kind: BuydownKindArg) -> Self {
        match kind {
            BuydownKindArg::TwoOne => BuydownKind::TwoOne,
            BuydownKindArg::OneZero => BuydownKind::OneZero,
            BuydownKindArg::OneOne => BuydownKind::OneOne,
            BuydownKindArg::ThreeTwoOne => BuydownKind::ThreeTwoOne,
        }
    }
}

#[derive(Args)]
pub struct BuydownArgs {
    /// Loan principal in dollars
    #[arg(long)]
    pub principal: Decimal,
    /// Nominal annual rate, whole-scaled percent
    #[arg(long)]
    pub rate: Decimal,
    /// Term in months
    #[arg(long, default_value_t = 360)]
    pub term: u32,
    /// Buydown type
    #[arg(long, value_enum, default_value = "2-1")]
    pub kind: BuydownKindArg,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = if args.interest_only {
        interest_only_payment(args.principal, args.rate)
    } else {
        monthly_payment(args.principal, args.rate, args.term)
    };
    Ok(json!({
        "result": {
            "monthly_payment": round_cents(payment),
            "principal": args.principal,
            "rate": args.rate,
            "term_months": args.term,
            "interest_only": args.interest_only,
        }
    }))
}

pub fn run_buydown(args: BuydownArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let buydown = Buydown {
        active: true,
        kind: args.kind.into(),
    };
    let result = schedule_buydown(&buydown, args.principal, args.rate, args.term);
    Ok(json!({
        "result": {
            "full_payment": round_cents(monthly_payment(args.principal, args.rate, args.term)),
            "schedule": result.schedule,
            "total_cost": result.total_cost,
        }
    }))
}
