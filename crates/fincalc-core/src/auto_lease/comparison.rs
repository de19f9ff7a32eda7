//! Lease-vs-buy total cost of ownership.
//!
//! Builds month-by-month cumulative cost series for both options over the
//! same ownership horizon, picks the cheaper one from the final totals and
//! finds the first month where buying has caught up with leasing.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::buy::{buy_cost_series, buy_summary, BuySummary, BuyTerms};
use super::depreciation::{build_curve, DepreciationCurve};
use super::lease::{lease_cost_series, lease_payment, LeasePaymentBreakdown, LeaseTerms};
use crate::sanitize::{lenient_u32, Sanitize, MAX_YEARS};
use crate::time_value::round_money;
use crate::types::{with_metadata, ComputationOutput, Money};

/// Final totals closer than this are a tie.
pub const TIE_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipScenario {
    #[serde(deserialize_with = "lenient_u32")]
    pub ownership_years: u32,
}

impl Default for OwnershipScenario {
    fn default() -> Self {
        Self { ownership_years: 6 }
    }
}

impl OwnershipScenario {
    pub fn months(&self) -> u32 {
        self.ownership_years.min(MAX_YEARS) * 12
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseVsBuyInput {
    pub scenario: OwnershipScenario,
    pub lease: LeaseTerms,
    pub buy: BuyTerms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cheaper {
    Buy,
    Lease,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub cheaper: Cheaper,
    /// Absolute gap between the final totals; zero on a tie
    pub difference: Money,
    /// First month where cumulative buy cost is at or below lease cost
    pub break_even_month: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseVsBuyOutput {
    pub ownership_months: u32,
    pub lease_payment: LeasePaymentBreakdown,
    pub buy_summary: BuySummary,
    pub depreciation_curve: DepreciationCurve,
    pub lease_cumulative: Vec<Money>,
    pub buy_cumulative: Vec<Money>,
    pub lease_total: Money,
    pub buy_total: Money,
    pub comparison: ComparisonResult,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

pub fn compare_lease_vs_buy(input: &LeaseVsBuyInput) -> ComputationOutput<LeaseVsBuyOutput> {
    let start = Instant::now();
    let lease = input.lease.clone().sanitize();
    let buy = input.buy.clone().sanitize();
    let months = input.scenario.months();
    let mut warnings: Vec<String> = Vec::new();

    let curve = build_curve(buy.price, months, &buy.depreciation);
    let payment = lease_payment(&lease);
    let summary = buy_summary(&buy, &curve);

    let lease_cumulative = lease_cost_series(&lease, &payment, months);
    let buy_cumulative = buy_cost_series(&buy, &summary, months);

    let lease_total = lease_cumulative.last().copied().unwrap_or(Decimal::ZERO);
    let buy_total = buy_cumulative.last().copied().unwrap_or(Decimal::ZERO);
    let (cheaper, difference) = classify(lease_total, buy_total);
    let break_even = break_even_month(&buy_cumulative, &lease_cumulative);

    if months == 0 {
        warnings.push("Ownership horizon is zero months; nothing to compare".into());
    }
    if months > 0 && months % lease.term_months != 0 {
        warnings.push(format!(
            "Horizon of {} months ends mid-lease; the final partial term carries no mileage charge",
            months
        ));
    }
    if buy.loan_term_months > months && months > 0 {
        warnings.push(format!(
            "Loan runs {} months past the horizon; the remaining balance is not counted",
            buy.loan_term_months - months
        ));
    }

    debug!(
        "lease-vs-buy over {} months: lease {}, buy {}, {:?}",
        months, lease_total, buy_total, cheaper
    );

    let output = LeaseVsBuyOutput {
        ownership_months: months,
        lease_payment: payment,
        buy_summary: summary,
        depreciation_curve: curve,
        lease_cumulative,
        buy_cumulative,
        lease_total,
        buy_total,
        comparison: ComparisonResult {
            cheaper,
            difference,
            break_even_month: break_even,
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Lease vs buy: cumulative total cost of ownership with depreciation and break-even",
        &serde_json::json!({
            "ownership_months": months,
            "lease_term_months": lease.term_months,
            "advanced_lease_math": lease.advanced.is_some(),
            "loan_term_months": buy.loan_term_months,
            "resale_source": if buy.resale_override_pct.is_some() { "override" } else { "depreciation_curve" },
            "tie_epsilon": TIE_EPSILON.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

/// Winner from final totals, with a dead-band of [`TIE_EPSILON`].
pub fn classify(lease_total: Money, buy_total: Money) -> (Cheaper, Money) {
    let gap = buy_total - lease_total;
    if gap.abs() <= TIE_EPSILON {
        (Cheaper::Tie, Decimal::ZERO)
    } else if gap < Decimal::ZERO {
        (Cheaper::Buy, round_money(gap.abs()))
    } else {
        (Cheaper::Lease, round_money(gap))
    }
}

/// First month (≥ 1) where cumulative buy cost is at or below lease cost.
pub fn break_even_month(buy: &[Money], lease: &[Money]) -> Option<u32> {
    buy.iter()
        .zip(lease.iter())
        .enumerate()
        .skip(1)
        .find(|(_, (b, l))| b <= l)
        .map(|(m, _)| m as u32)
}
