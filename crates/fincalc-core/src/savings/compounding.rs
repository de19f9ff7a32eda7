//! Compound interest projection with periodic contributions.
//!
//! The entered rate is a nominal rate quoted per `RateUnit`, rescaled to a
//! nominal annual rate and compounded `m` times a year. Contributions made
//! `f` times a year earn the equivalent per-contribution rate
//! `(1 + j/m)^(m/f) - 1`, so compounding and contribution frequencies can
//! differ freely.

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::sanitize::{self, lenient_decimal, lenient_u32, Sanitize, MAX_YEARS};
use crate::time_value::{
    annuity_factor, compound_factor, doubling_time, effective_annual_yield, pct_to_rate,
    round_money,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate, Years};

/// Monthly schedules stop after this many rows.
pub const MAX_MONTHLY_STEPS: u32 = 600;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Period the entered rate is quoted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    #[default]
    Annual,
    Monthly,
    Weekly,
}

impl RateUnit {
    fn annual_multiplier(self) -> Decimal {
        match self {
            RateUnit::Annual => Decimal::ONE,
            RateUnit::Monthly => dec!(12),
            RateUnit::Weekly => dec!(52),
        }
    }
}

/// Events per year, used for both compounding and contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingFrequency {
    Annually,
    SemiAnnually,
    Quarterly,
    #[default]
    Monthly,
    Biweekly,
    Weekly,
    Daily,
}

impl CompoundingFrequency {
    pub fn per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Annually => 1,
            CompoundingFrequency::SemiAnnually => 2,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Biweekly => 26,
            CompoundingFrequency::Weekly => 52,
            CompoundingFrequency::Daily => 365,
        }
    }
}

/// Contributions at the start (annuity-due) or end (ordinary) of each period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionTiming {
    Begin,
    #[default]
    End,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleGranularity {
    #[default]
    Yearly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompoundingInput {
    #[serde(deserialize_with = "lenient_decimal")]
    pub principal: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub rate_pct: Percent,
    pub rate_unit: RateUnit,
    pub compounding: CompoundingFrequency,
    #[serde(deserialize_with = "lenient_u32")]
    pub years: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub months: u32,
    #[serde(deserialize_with = "lenient_decimal")]
    pub contribution: Money,
    pub contribution_frequency: CompoundingFrequency,
    pub timing: ContributionTiming,
    pub granularity: ScheduleGranularity,
}

impl Default for CompoundingInput {
    fn default() -> Self {
        Self {
            principal: Decimal::ZERO,
            rate_pct: Decimal::ZERO,
            rate_unit: RateUnit::Annual,
            compounding: CompoundingFrequency::Monthly,
            years: 10,
            months: 0,
            contribution: Decimal::ZERO,
            contribution_frequency: CompoundingFrequency::Monthly,
            timing: ContributionTiming::End,
            granularity: ScheduleGranularity::Yearly,
        }
    }
}

impl Sanitize for CompoundingInput {
    fn sanitize(self) -> Self {
        Self {
            principal: sanitize::non_negative(self.principal),
            rate_pct: sanitize::percent(self.rate_pct),
            years: self.years.min(MAX_YEARS),
            months: self.months.min(MAX_YEARS * 12),
            contribution: sanitize::non_negative(self.contribution),
            ..self
        }
    }
}

/// One step of the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Year or month number (1-indexed)
    pub period: u32,
    pub contribution: Money,
    pub interest: Money,
    pub balance: Money,
    /// Opening principal plus contributions to date
    pub cumulative_contribution: Money,
    pub cumulative_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundingOutput {
    pub future_value: Money,
    pub total_contributions: Money,
    pub total_interest: Money,
    pub nominal_annual_rate: Rate,
    pub effective_annual_yield: Rate,
    /// `None` when the balance never doubles (rate ≤ 0)
    pub time_to_double_years: Option<Years>,
    pub duration_years: Years,
    pub granularity: ScheduleGranularity,
    /// True when the monthly schedule was cut at [`MAX_MONTHLY_STEPS`]
    pub capped: bool,
    pub requested_steps: u32,
    pub generated_steps: u32,
    pub schedule: Vec<ScheduleRow>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn project_compounding(input: &CompoundingInput) -> ComputationOutput<CompoundingOutput> {
    let start = Instant::now();
    let input = input.clone().sanitize();
    let mut warnings: Vec<String> = Vec::new();

    let nominal = pct_to_rate(input.rate_pct) * input.rate_unit.annual_multiplier();
    let m = input.compounding.per_year();
    let f = input.contribution_frequency.per_year();
    let i = nominal / Decimal::from(m);
    let ic = contribution_rate(i, m, f);
    let total_months = input.years * 12 + input.months;
    let t = Decimal::from(total_months) / dec!(12);
    let due = match input.timing {
        ContributionTiming::Begin => Decimal::ONE + ic,
        ContributionTiming::End => Decimal::ONE,
    };

    let contributions = Decimal::from(f * total_months) / dec!(12);
    let lump = input
        .principal
        .saturating_mul(compound_factor(i, Decimal::from(m * total_months) / dec!(12)));
    let annuity = contribution_value(input.contribution, ic, contributions, due);
    let future_value = lump.saturating_add(annuity);
    let total_contributions = input
        .principal
        .saturating_add(input.contribution.saturating_mul(contributions));

    if future_value == Decimal::MAX {
        warn!("future value saturated for {} years at {}", t, nominal);
        warnings.push("Future value exceeds the representable range; figures are saturated".into());
    }

    let (schedule, requested_steps, capped) = build_schedule(&input, i, ic, due);
    if capped {
        warnings.push(format!(
            "Monthly schedule limited to {} of {} months; totals cover the full horizon",
            MAX_MONTHLY_STEPS, requested_steps
        ));
    }
    debug!(
        "compounding projection: {} steps requested, {} generated",
        requested_steps,
        schedule.len()
    );

    let output = CompoundingOutput {
        future_value: round_money(future_value),
        total_contributions: round_money(total_contributions),
        total_interest: round_money(future_value - total_contributions),
        nominal_annual_rate: nominal,
        effective_annual_yield: effective_annual_yield(nominal, m).round_dp(8),
        time_to_double_years: doubling_time(nominal, m).map(|y| y.round_dp(4)),
        duration_years: t.round_dp(4),
        granularity: input.granularity,
        capped,
        requested_steps,
        generated_steps: schedule.len() as u32,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Compound interest: lump sum plus contribution annuity at the equivalent contribution-period rate",
        &serde_json::json!({
            "rate_pct": input.rate_pct.to_string(),
            "rate_unit": input.rate_unit,
            "compounding_per_year": m,
            "contributions_per_year": f,
            "timing": input.timing,
            "granularity": input.granularity,
        }),
        warnings,
        elapsed,
        output,
    )
}

/// Per-contribution-period rate: `(1 + i)^(m/f) - 1`.
fn contribution_rate(i: Rate, m: u32, f: u32) -> Rate {
    if i.is_zero() || f == 0 {
        return Decimal::ZERO;
    }
    compound_factor(i, Decimal::from(m) / Decimal::from(f)) - Decimal::ONE
}

/// Future value of `count` contributions of `amount` at `ic` per contribution period.
fn contribution_value(amount: Money, ic: Rate, count: Decimal, due: Decimal) -> Money {
    if amount.is_zero() || count.is_zero() {
        return Decimal::ZERO;
    }
    amount
        .saturating_mul(annuity_factor(ic, count))
        .saturating_mul(due)
}

/// Step-by-step balances. Each step grows the opening balance and adds that
/// step's contributions through the same annuity factor as the closed form,
/// so the last balance reconciles with the future value.
fn build_schedule(
    input: &CompoundingInput,
    i: Rate,
    ic: Rate,
    due: Decimal,
) -> (Vec<ScheduleRow>, u32, bool) {
    let total_months = input.years * 12 + input.months;
    let (step_months, requested) = match input.granularity {
        ScheduleGranularity::Yearly => (12, total_months.div_ceil(12)),
        ScheduleGranularity::Monthly => (1, total_months),
    };
    let generated = match input.granularity {
        ScheduleGranularity::Yearly => requested,
        ScheduleGranularity::Monthly => requested.min(MAX_MONTHLY_STEPS),
    };

    let m = input.compounding.per_year();
    let f = input.contribution_frequency.per_year();
    let mut rows: Vec<ScheduleRow> = Vec::with_capacity(generated as usize);
    let mut balance = input.principal;
    let mut deposited = input.principal;
    let mut earned = Decimal::ZERO;

    for k in 1..=generated {
        let length = step_months.min(total_months - (k - 1) * step_months);
        let growth = compound_factor(i, Decimal::from(m * length) / dec!(12));
        let count = Decimal::from(f * length) / dec!(12);
        let contribution = input.contribution.saturating_mul(count);

        let added = contribution_value(input.contribution, ic, count, due);
        let next = balance.saturating_mul(growth).saturating_add(added);
        let interest = next - balance - contribution;

        balance = next;
        deposited = deposited.saturating_add(contribution);
        earned = earned.saturating_add(interest);

        rows.push(ScheduleRow {
            period: k,
            contribution: round_money(contribution),
            interest: round_money(interest),
            balance: round_money(balance),
            cumulative_contribution: round_money(deposited),
            cumulative_interest: round_money(earned),
        });
    }

    (rows, requested, generated < requested)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
