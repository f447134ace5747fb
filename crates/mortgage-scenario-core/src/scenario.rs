//! Scenario input model.
//!
//! A `Scenario` is borrowed by the engine for the duration of one
//! calculation; ownership stays with whatever orchestration layer persists
//! it. Amount/percent pairs (down payment, assistance loans) follow the
//! invariant-preserving setter pattern: one authoritative edit path per
//! mutation, the dependent field recomputed immediately.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{pct, Money, Percent, HUNDRED, MONTHS_PER_YEAR};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[default]
    Purchase,
    Refinance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanProgram {
    #[default]
    Conventional,
    Fha,
    Va,
    Jumbo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupancy {
    #[default]
    Primary,
    SecondHome,
    Investment,
}

/// Unit mode for amounts that may be entered as dollars or percent-of-loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountKind {
    #[default]
    FixedDollar,
    PercentOfLoan,
}

// ---------------------------------------------------------------------------
// Buydown configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuydownKind {
    #[default]
    TwoOne,
    OneZero,
    OneOne,
    ThreeTwoOne,
}

impl BuydownKind {
    /// Rate reductions per active year, in percentage points.
    pub fn reductions(&self) -> &'static [Decimal] {
        const TWO_ONE: [Decimal; 2] = [dec!(2), dec!(1)];
        const ONE_ZERO: [Decimal; 1] = [dec!(1)];
        const ONE_ONE: [Decimal; 2] = [dec!(1), dec!(1)];
        const THREE_TWO_ONE: [Decimal; 3] = [dec!(3), dec!(2), dec!(1)];

        match self {
            BuydownKind::TwoOne => &TWO_ONE,
            BuydownKind::OneZero => &ONE_ZERO,
            BuydownKind::OneOne => &ONE_ONE,
            BuydownKind::ThreeTwoOne => &THREE_TWO_ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buydown {
    pub active: bool,
    pub kind: BuydownKind,
}

// ---------------------------------------------------------------------------
// Manual mortgage-insurance override
// ---------------------------------------------------------------------------

/// Manual PMI override for conventional loans. Both representations are kept
/// mutually consistent against the current total loan amount: editing one
/// recomputes the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MiOverride {
    pub monthly_amount: Money,
    pub annual_rate: Percent,
}

impl MiOverride {
    pub fn from_monthly(monthly_amount: Money, total_loan: Money) -> Self {
        let annual_rate = if total_loan.is_zero() {
            Decimal::ZERO
        } else {
            monthly_amount * MONTHS_PER_YEAR / total_loan * HUNDRED
        };
        Self {
            monthly_amount,
            annual_rate,
        }
    }

    pub fn from_annual_rate(annual_rate: Percent, total_loan: Money) -> Self {
        Self {
            monthly_amount: total_loan * pct(annual_rate) / MONTHS_PER_YEAR,
            annual_rate,
        }
    }

    pub fn set_monthly(&mut self, monthly_amount: Money, total_loan: Money) {
        *self = Self::from_monthly(monthly_amount, total_loan);
    }

    pub fn set_annual_rate(&mut self, annual_rate: Percent, total_loan: Money) {
        *self = Self::from_annual_rate(annual_rate, total_loan);
    }
}

// ---------------------------------------------------------------------------
// Assistance (subordinate) loans
// ---------------------------------------------------------------------------

/// A subordinate assistance loan. Amount and percent are mutually derived
/// against the purchase price, mirroring the down-payment duality. A deferred
/// loan (silent second) carries no monthly payment but still funds
/// cash-to-close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistanceLoan {
    pub active: bool,
    pub amount: Money,
    pub percent: Percent,
    pub rate: Percent,
    pub term_months: u32,
    pub deferred: bool,
}

impl AssistanceLoan {
    pub fn set_amount(&mut self, amount: Money, purchase_price: Money) {
        self.amount = amount;
        self.percent = if purchase_price.is_zero() {
            Decimal::ZERO
        } else {
            amount / purchase_price * HUNDRED
        };
    }

    pub fn set_percent(&mut self, percent: Percent, purchase_price: Money) {
        self.percent = percent;
        self.amount = purchase_price * pct(percent);
    }
}

// ---------------------------------------------------------------------------
// Closing-cost line items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostCategory {
    #[default]
    LenderFees,
    ThirdPartyFees,
    TitleGovernment,
    EscrowsPrepaids,
    OtherFees,
}

/// How a time-scaled or schedule-priced item resolves to dollars. Items
/// without special pricing resolve from `amount` and `unit` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialPricing {
    /// Prepaid interest: (total loan × rate / 365) × days.
    PerDiemInterest { days: u32 },
    /// Reserve or prepay: (yearly base / 12) × months.
    Reserve { source: ReserveSource, months: u32 },
    /// Lender's title insurance, priced on the banded schedule.
    LendersTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReserveSource {
    PropertyTax,
    Insurance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingCostItem {
    pub id: String,
    pub category: CostCategory,
    pub name: String,
    /// Dollars when `unit` is FixedDollar, whole-scaled percent otherwise.
    pub amount: Decimal,
    pub unit: AmountKind,
    /// Whether the UI may flip this item between dollar and percent entry.
    pub toggleable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialPricing>,
    /// Excluded from totals entirely when the scenario has no monthly HOA.
    pub hoa_linked: bool,
}

impl ClosingCostItem {
    pub fn fixed(id: &str, category: CostCategory, name: &str, amount: Money) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            amount,
            unit: AmountKind::FixedDollar,
            toggleable: false,
            special: None,
            hoa_linked: false,
        }
    }

    pub fn percent_of_loan(id: &str, category: CostCategory, name: &str, percent: Percent) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            amount: percent,
            unit: AmountKind::PercentOfLoan,
            toggleable: true,
            special: None,
            hoa_linked: false,
        }
    }

    fn special(id: &str, category: CostCategory, name: &str, pricing: SpecialPricing) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            amount: Decimal::ZERO,
            unit: AmountKind::FixedDollar,
            toggleable: false,
            special: Some(pricing),
            hoa_linked: false,
        }
    }
}

/// Default purchase closing-cost template. Callers may replace or edit any
/// line; ids are stable so persisted overrides survive template changes.
pub fn default_purchase_costs() -> Vec<ClosingCostItem> {
    use CostCategory::*;
    use ReserveSource::*;

    let mut items = vec![
        ClosingCostItem::percent_of_loan("origination", LenderFees, "Origination fee", dec!(1)),
        ClosingCostItem::fixed("underwriting", LenderFees, "Underwriting fee", dec!(995)),
        ClosingCostItem::fixed("processing", LenderFees, "Processing fee", dec!(595)),
        ClosingCostItem::fixed("appraisal", ThirdPartyFees, "Appraisal", dec!(650)),
        ClosingCostItem::fixed("credit_report", ThirdPartyFees, "Credit report", dec!(75)),
        ClosingCostItem::fixed("flood_cert", ThirdPartyFees, "Flood certification", dec!(25)),
        ClosingCostItem::special(
            "lenders_title",
            TitleGovernment,
            "Lender's title insurance",
            SpecialPricing::LendersTitle,
        ),
        ClosingCostItem::fixed("settlement", TitleGovernment, "Settlement fee", dec!(595)),
        ClosingCostItem::fixed("recording", TitleGovernment, "Recording fees", dec!(250)),
        ClosingCostItem::special(
            "prepaid_interest",
            EscrowsPrepaids,
            "Prepaid interest",
            SpecialPricing::PerDiemInterest { days: 15 },
        ),
        ClosingCostItem::special(
            "insurance_prepay",
            EscrowsPrepaids,
            "Homeowner's insurance premium (12 mo)",
            SpecialPricing::Reserve {
                source: Insurance,
                months: 12,
            },
        ),
        ClosingCostItem::special(
            "tax_escrow",
            EscrowsPrepaids,
            "Property tax escrow",
            SpecialPricing::Reserve {
                source: PropertyTax,
                months: 3,
            },
        ),
        ClosingCostItem::special(
            "insurance_escrow",
            EscrowsPrepaids,
            "Insurance escrow",
            SpecialPricing::Reserve {
                source: Insurance,
                months: 2,
            },
        ),
    ];

    let mut hoa_transfer =
        ClosingCostItem::fixed("hoa_transfer", OtherFees, "HOA transfer fee", dec!(250));
    hoa_transfer.hoa_linked = true;
    items.push(hoa_transfer);

    items
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// One complete loan scenario. Immutable per calculation call; the engine
/// re-runs in full on every input change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Purchase price, or appraised value on a refinance.
    pub purchase_price: Money,
    pub transaction: TransactionKind,
    /// Refinance only: payoff shortfall (positive) or cash-out to the
    /// borrower (negative).
    pub cash_out_or_payoff: Money,

    pub down_payment_amount: Money,
    pub down_payment_percent: Percent,

    pub program: LoanProgram,
    pub interest_rate: Percent,
    pub term_months: u32,
    pub interest_only: bool,
    pub credit_score: u32,
    pub occupancy: Occupancy,
    /// 1–4 units.
    pub units: u8,

    pub yearly_property_tax: Money,
    pub yearly_insurance: Money,
    pub monthly_hoa: Money,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mi_override: Option<MiOverride>,
    /// Upfront MIP / funding-fee rate override; program default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upfront_mi_rate: Option<Percent>,

    pub earnest_money: Money,
    pub seller_concession_enabled: bool,
    pub seller_concession: Money,
    pub lender_credit: Decimal,
    pub lender_credit_kind: AmountKind,

    pub closing_costs: Vec<ClosingCostItem>,
    pub buydown: Buydown,
    pub assistance_first: AssistanceLoan,
    pub assistance_second: AssistanceLoan,

    pub monthly_income: Money,
    pub rental_income: Money,
    pub other_income: Money,
    pub monthly_debts: Money,
    pub dscr_loan: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            purchase_price: Decimal::ZERO,
            transaction: TransactionKind::Purchase,
            cash_out_or_payoff: Decimal::ZERO,
            down_payment_amount: Decimal::ZERO,
            down_payment_percent: Decimal::ZERO,
            program: LoanProgram::Conventional,
            interest_rate: Decimal::ZERO,
            term_months: 360,
            interest_only: false,
            credit_score: 0,
            occupancy: Occupancy::Primary,
            units: 1,
            yearly_property_tax: Decimal::ZERO,
            yearly_insurance: Decimal::ZERO,
            monthly_hoa: Decimal::ZERO,
            mi_override: None,
            upfront_mi_rate: None,
            earnest_money: Decimal::ZERO,
            seller_concession_enabled: false,
            seller_concession: Decimal::ZERO,
            lender_credit: Decimal::ZERO,
            lender_credit_kind: AmountKind::FixedDollar,
            closing_costs: default_purchase_costs(),
            buydown: Buydown::default(),
            assistance_first: AssistanceLoan::default(),
            assistance_second: AssistanceLoan::default(),
            monthly_income: Decimal::ZERO,
            rental_income: Decimal::ZERO,
            other_income: Decimal::ZERO,
            monthly_debts: Decimal::ZERO,
            dscr_loan: false,
        }
    }
}

impl Scenario {
    /// A purchase scenario at 20% down with the default cost template.
    pub fn purchase(purchase_price: Money) -> Self {
        let mut s = Self {
            purchase_price,
            ..Self::default()
        };
        s.set_down_payment_percent(dec!(20));
        s
    }

    /// Authoritative edit: down payment by dollar amount; percent recomputed.
    pub fn set_down_payment_amount(&mut self, amount: Money) {
        self.down_payment_amount = amount;
        self.down_payment_percent = if self.purchase_price.is_zero() {
            Decimal::ZERO
        } else {
            amount / self.purchase_price * HUNDRED
        };
    }

    /// Authoritative edit: down payment by percent; amount recomputed.
    pub fn set_down_payment_percent(&mut self, percent: Percent) {
        self.down_payment_percent = percent;
        self.down_payment_amount = self.purchase_price * pct(percent);
    }

    /// Price edits hold the percent and re-derive the dollar figures that
    /// hang off it (down payment, assistance loans).
    pub fn set_purchase_price(&mut self, price: Money) {
        self.purchase_price = price;
        self.down_payment_amount = price * pct(self.down_payment_percent);
        let first_pct = self.assistance_first.percent;
        self.assistance_first.set_percent(first_pct, price);
        let second_pct = self.assistance_second.percent;
        self.assistance_second.set_percent(second_pct, price);
    }

    pub fn base_loan_amount(&self) -> Money {
        (self.purchase_price - self.down_payment_amount).max(Decimal::ZERO)
    }

    /// Gross monthly rent claimed for the subject property.
    pub fn gross_rental_income(&self) -> Money {
        self.rental_income
    }
}
