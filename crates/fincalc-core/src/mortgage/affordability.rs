//! Home affordability: the highest price whose mortgage payment fits under the
//! front-end (housing-to-income) and back-end (debt-to-income) ceilings.
//!
//! The search budgets principal & interest only. Property tax scales with the
//! price being searched for, so it is reconciled in the PITI breakdown after
//! the price is found rather than subtracted up front.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::sanitize::{self, lenient_decimal, Sanitize};
use crate::time_value::{level_payment, pct_to_rate, periodic_rate, round_money};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Years};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The binary search stops once the price interval is this narrow.
pub const SEARCH_TOLERANCE: Money = dec!(1000);

pub const DEFAULT_PRICE_CEILING: Money = dec!(5_000_000);
pub const DEFAULT_FRONT_END_RATIO: Percent = dec!(28);
pub const DEFAULT_BACK_END_RATIO: Percent = dec!(36);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityInput {
    /// Gross annual household income
    #[serde(deserialize_with = "lenient_decimal")]
    pub annual_income: Money,
    /// Existing monthly debt payments (cards, auto, student loans)
    #[serde(deserialize_with = "lenient_decimal")]
    pub monthly_debts: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub down_payment: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub annual_rate_pct: Percent,
    #[serde(deserialize_with = "lenient_decimal")]
    pub term_years: Years,
    /// Annual property tax as a percent of the home price
    #[serde(deserialize_with = "lenient_decimal")]
    pub property_tax_rate_pct: Percent,
    #[serde(deserialize_with = "lenient_decimal")]
    pub annual_insurance: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub monthly_hoa: Money,
    /// Mortgage-to-income ceiling
    #[serde(deserialize_with = "lenient_decimal")]
    pub front_end_ratio_pct: Percent,
    /// Debt-to-income ceiling
    #[serde(deserialize_with = "lenient_decimal")]
    pub back_end_ratio_pct: Percent,
    /// Upper bound of the price search
    #[serde(deserialize_with = "lenient_decimal")]
    pub price_ceiling: Money,
}

impl Default for AffordabilityInput {
    fn default() -> Self {
        Self {
            annual_income: Decimal::ZERO,
            monthly_debts: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            annual_rate_pct: Decimal::ZERO,
            term_years: Decimal::from(30),
            property_tax_rate_pct: Decimal::ZERO,
            annual_insurance: Decimal::ZERO,
            monthly_hoa: Decimal::ZERO,
            front_end_ratio_pct: DEFAULT_FRONT_END_RATIO,
            back_end_ratio_pct: DEFAULT_BACK_END_RATIO,
            price_ceiling: DEFAULT_PRICE_CEILING,
        }
    }
}

impl Sanitize for AffordabilityInput {
    fn sanitize(self) -> Self {
        let ceiling = sanitize::non_negative(self.price_ceiling);
        Self {
            annual_income: sanitize::non_negative(self.annual_income),
            monthly_debts: sanitize::non_negative(self.monthly_debts),
            down_payment: sanitize::non_negative(self.down_payment),
            annual_rate_pct: sanitize::percent(self.annual_rate_pct),
            term_years: sanitize::years(self.term_years),
            property_tax_rate_pct: sanitize::percent(self.property_tax_rate_pct),
            annual_insurance: sanitize::non_negative(self.annual_insurance),
            monthly_hoa: sanitize::non_negative(self.monthly_hoa),
            front_end_ratio_pct: sanitize::percent(self.front_end_ratio_pct),
            back_end_ratio_pct: sanitize::percent(self.back_end_ratio_pct),
            price_ceiling: if ceiling.is_zero() {
                DEFAULT_PRICE_CEILING
            } else {
                ceiling
            },
        }
    }
}

/// Which ratio limits the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConstraint {
    FrontEnd,
    BackEnd,
}

/// Monthly principal, interest, taxes, insurance and HOA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitiBreakdown {
    pub principal_and_interest: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub hoa: Money,
    pub total_monthly_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub max_home_price: Money,
    pub loan_amount: Money,
    pub gross_monthly_income: Money,
    pub allowed_monthly_payment: Money,
    pub binding_constraint: BindingConstraint,
    /// Payment room left for principal & interest after insurance and HOA
    pub principal_and_interest_budget: Money,
    pub piti: PitiBreakdown,
    /// Housing payment as a percent of gross monthly income
    pub front_end_ratio_pct: Percent,
    /// Housing plus existing debts as a percent of gross monthly income
    pub back_end_ratio_pct: Percent,
    /// True when adding property tax lifts PITI over the allowed payment
    pub exceeds_allowed_after_tax: bool,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Highest home price whose P&I payment fits the binding ratio ceiling.
/// Never negative; zero when nothing positive fits.
pub fn max_affordable_price(input: &AffordabilityInput) -> Money {
    let input = input.clone().sanitize();
    let (allowed, _) = allowed_payment(&input);
    search_price(&input, pi_budget(&input, allowed))
}

/// Monthly PITI for a given price.
pub fn piti_breakdown(price: Money, input: &AffordabilityInput) -> PitiBreakdown {
    let input = input.clone().sanitize();
    breakdown(price, &input)
}

/// Full affordability analysis: search, breakdown and ratio diagnostics.
pub fn analyze_affordability(input: &AffordabilityInput) -> ComputationOutput<AffordabilityOutput> {
    let start = Instant::now();
    let input = input.clone().sanitize();
    let mut warnings: Vec<String> = Vec::new();

    let gross_monthly = input.annual_income / dec!(12);
    let (allowed, binding) = allowed_payment(&input);
    let budget = pi_budget(&input, allowed);
    let price = search_price(&input, budget);
    let piti = breakdown(price, &input);

    if price.is_zero() {
        warnings.push("Income and debts leave no room for a mortgage payment".into());
    } else if price >= input.price_ceiling {
        warnings.push(format!(
            "Search reached the price ceiling of {}; the true maximum may be higher",
            input.price_ceiling
        ));
    }

    let exceeds_allowed_after_tax = !price.is_zero() && piti.total_monthly_payment > allowed;
    if exceeds_allowed_after_tax {
        warnings.push(format!(
            "Property tax of {} raises the payment to {}, above the allowed {}",
            piti.property_tax,
            piti.total_monthly_payment,
            round_money(allowed)
        ));
    }

    let (front_ratio, back_ratio) = if gross_monthly > Decimal::ZERO {
        (
            (piti.total_monthly_payment / gross_monthly * dec!(100)).round_dp(2),
            ((piti.total_monthly_payment + input.monthly_debts) / gross_monthly * dec!(100))
                .round_dp(2),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let output = AffordabilityOutput {
        max_home_price: price,
        loan_amount: (price - input.down_payment).max(Decimal::ZERO),
        gross_monthly_income: round_money(gross_monthly),
        allowed_monthly_payment: round_money(allowed.max(Decimal::ZERO)),
        binding_constraint: binding,
        principal_and_interest_budget: round_money(budget.max(Decimal::ZERO)),
        piti,
        front_end_ratio_pct: front_ratio,
        back_end_ratio_pct: back_ratio,
        exceeds_allowed_after_tax,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Home affordability: binary search on P&I under front/back-end ratio ceilings",
        &serde_json::json!({
            "annual_income": input.annual_income.to_string(),
            "front_end_ratio_pct": input.front_end_ratio_pct.to_string(),
            "back_end_ratio_pct": input.back_end_ratio_pct.to_string(),
            "search_tolerance": SEARCH_TOLERANCE.to_string(),
            "price_ceiling": input.price_ceiling.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The smaller of the two ratio ceilings, and which one it was.
fn allowed_payment(input: &AffordabilityInput) -> (Money, BindingConstraint) {
    let gross_monthly = input.annual_income / dec!(12);
    let front = gross_monthly * pct_to_rate(input.front_end_ratio_pct);
    let back = gross_monthly * pct_to_rate(input.back_end_ratio_pct) - input.monthly_debts;
    if front <= back {
        (front, BindingConstraint::FrontEnd)
    } else {
        (back, BindingConstraint::BackEnd)
    }
}

/// Room for principal & interest: allowed payment less the price-independent costs.
fn pi_budget(input: &AffordabilityInput, allowed: Money) -> Money {
    allowed - input.annual_insurance / dec!(12) - input.monthly_hoa
}

fn loan_periods(input: &AffordabilityInput) -> u32 {
    sanitize::to_u32((input.term_years * dec!(12)).round())
}

fn principal_and_interest(price: Money, input: &AffordabilityInput) -> Money {
    let loan = (price - input.down_payment).max(Decimal::ZERO);
    level_payment(loan, periodic_rate(input.annual_rate_pct, 12), loan_periods(input))
}

fn search_price(input: &AffordabilityInput, budget: Money) -> Money {
    if budget <= Decimal::ZERO || loan_periods(input) == 0 {
        return Decimal::ZERO;
    }
    let fits = |price: Money| principal_and_interest(price, input) <= budget;

    let mut lo = Decimal::ZERO;
    let mut hi = input.price_ceiling;
    if fits(hi) {
        return round_money(hi);
    }

    let mut iterations = 0u32;
    while hi - lo > SEARCH_TOLERANCE {
        let mid = (lo + hi) / dec!(2);
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }
    debug!("affordability search settled at {lo} after {iterations} halvings");
    round_money(lo)
}

fn breakdown(price: Money, input: &AffordabilityInput) -> PitiBreakdown {
    let pi = round_money(principal_and_interest(price, input));
    let tax = round_money(price * pct_to_rate(input.property_tax_rate_pct) / dec!(12));
    let insurance = round_money(input.annual_insurance / dec!(12));
    let hoa = round_money(input.monthly_hoa);
    PitiBreakdown {
        principal_and_interest: pi,
        property_tax: tax,
        insurance,
        hoa,
        total_monthly_payment: pi + tax + insurance + hoa,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
