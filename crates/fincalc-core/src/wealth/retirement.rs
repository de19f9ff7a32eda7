use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::sanitize::{self, lenient_decimal, lenient_u32, Sanitize};
use crate::time_value::{compound_factor, pct_to_rate, round_money};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};

/// Ages above this are clamped.
pub const MAX_AGE: u32 = 120;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for the accumulation projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementInput {
    #[serde(deserialize_with = "lenient_u32")]
    pub current_age: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub retirement_age: u32,
    #[serde(deserialize_with = "lenient_decimal")]
    pub current_savings: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub monthly_contribution: Money,
    /// Expected annual return, effective (5 = 5%)
    #[serde(deserialize_with = "lenient_decimal")]
    pub annual_return_pct: Percent,
    #[serde(deserialize_with = "lenient_decimal")]
    pub inflation_pct: Percent,
    /// Share of the final balance drawn each year in retirement
    #[serde(deserialize_with = "lenient_decimal")]
    pub withdrawal_pct: Percent,
}

impl Default for RetirementInput {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 65,
            current_savings: Decimal::ZERO,
            monthly_contribution: Decimal::ZERO,
            annual_return_pct: dec!(7),
            inflation_pct: dec!(3),
            withdrawal_pct: dec!(4),
        }
    }
}

impl Sanitize for RetirementInput {
    fn sanitize(self) -> Self {
        Self {
            current_age: self.current_age.min(MAX_AGE),
            retirement_age: self.retirement_age.min(MAX_AGE),
            current_savings: sanitize::non_negative(self.current_savings),
            monthly_contribution: sanitize::non_negative(self.monthly_contribution),
            annual_return_pct: sanitize::percent(self.annual_return_pct),
            inflation_pct: sanitize::percent(self.inflation_pct),
            withdrawal_pct: sanitize::percent(self.withdrawal_pct),
        }
    }
}

/// Balance at the end of one year of saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementYear {
    pub year: u32,
    pub age: u32,
    pub nominal_balance: Money,
    /// Nominal balance in today's money
    pub real_balance: Money,
    /// Starting savings plus monthly contributions to date
    pub total_contributions: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeWithdrawal {
    pub annual: Money,
    pub monthly: Money,
    pub annual_real: Money,
    pub monthly_real: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementOutput {
    pub years_to_retirement: u32,
    pub months_to_retirement: u32,
    pub monthly_return_rate: Rate,
    pub monthly_inflation_rate: Rate,
    pub nominal_balance_at_retirement: Money,
    pub real_balance_at_retirement: Money,
    pub total_contributions: Money,
    pub investment_gains: Money,
    pub withdrawal: SafeWithdrawal,
    pub year_by_year: Vec<RetirementYear>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project savings month by month up to retirement.
///
/// Contributions land at the end of each month after that month's growth.
/// The real balance deflates the nominal one by compounded monthly inflation.
pub fn project_retirement(input: &RetirementInput) -> ComputationOutput<RetirementOutput> {
    let start = Instant::now();
    let input = input.clone().sanitize();
    let mut warnings: Vec<String> = Vec::new();

    let years = input.retirement_age.saturating_sub(input.current_age);
    let months = years * 12;
    if years == 0 {
        warnings.push(format!(
            "Retirement age {} is not after current age {}; no accumulation projected",
            input.retirement_age, input.current_age
        ));
    }

    let rm = monthly_equivalent(pct_to_rate(input.annual_return_pct));
    let mi = monthly_equivalent(pct_to_rate(input.inflation_pct));

    let mut balance = input.current_savings;
    let mut deflator = Decimal::ONE;
    let mut contributed = input.current_savings;
    let mut year_by_year: Vec<RetirementYear> = Vec::with_capacity(years as usize);

    for month in 1..=months {
        balance = balance
            .saturating_mul(Decimal::ONE + rm)
            .saturating_add(input.monthly_contribution);
        deflator = deflator.saturating_mul(Decimal::ONE + mi);
        contributed = contributed.saturating_add(input.monthly_contribution);

        if month % 12 == 0 {
            let year = month / 12;
            year_by_year.push(RetirementYear {
                year,
                age: input.current_age + year,
                nominal_balance: round_money(balance),
                real_balance: round_money(balance / deflator),
                total_contributions: round_money(contributed),
            });
        }
    }

    if balance == Decimal::MAX {
        warnings.push("Projected balance exceeds the representable range; figures are saturated".into());
    }

    let real = balance / deflator;
    let withdrawal_rate = pct_to_rate(input.withdrawal_pct);
    let annual = balance.saturating_mul(withdrawal_rate);
    let annual_real = real.saturating_mul(withdrawal_rate);

    debug!(
        "retirement projection: {} months, nominal {}, real {}",
        months, balance, real
    );

    let output = RetirementOutput {
        years_to_retirement: years,
        months_to_retirement: months,
        monthly_return_rate: rm.round_dp(10),
        monthly_inflation_rate: mi.round_dp(10),
        nominal_balance_at_retirement: round_money(balance),
        real_balance_at_retirement: round_money(real),
        total_contributions: round_money(contributed),
        investment_gains: round_money(balance - contributed),
        withdrawal: SafeWithdrawal {
            annual: round_money(annual),
            monthly: round_money(annual / dec!(12)),
            annual_real: round_money(annual_real),
            monthly_real: round_money(annual_real / dec!(12)),
        },
        year_by_year,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Retirement accumulation: monthly compounding with end-of-month contributions, deflated by compounded inflation",
        &serde_json::json!({
            "annual_return_pct": input.annual_return_pct.to_string(),
            "inflation_pct": input.inflation_pct.to_string(),
            "withdrawal_pct": input.withdrawal_pct.to_string(),
            "contribution_timing": "end_of_month",
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monthly rate equivalent to an effective annual rate: `(1 + r)^(1/12) - 1`.
fn monthly_equivalent(annual: Rate) -> Rate {
    if annual.is_zero() {
        return Decimal::ZERO;
    }
    compound_factor(annual, Decimal::ONE / dec!(12)) - Decimal::ONE
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
