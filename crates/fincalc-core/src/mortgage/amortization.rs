//! Fixed-rate loan amortization with extra payments.
//!
//! Builds a fully materialized payment schedule at monthly, biweekly or weekly
//! frequency. Every currency figure is rounded to cents per period so the
//! schedule reproduces statement-level figures, and the final scheduled period
//! absorbs the rounding residual so the balance lands exactly on zero. A loan
//! whose payment cannot retire it runs on to the iteration cap and is reported
//! as [`ScheduleStatus::Capped`].

use chrono::{Months, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::sanitize::{self, lenient_decimal, lenient_opt_date, Sanitize};
use crate::time_value::{level_payment, periodic_rate, round_money};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate, Years};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Periods allowed past the scheduled term before the loop gives up.
pub const ITERATION_MARGIN: u32 = 12_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often a payment is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Biweekly,
    Weekly,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Weekly => 52,
        }
    }

    /// Date of the payment `offset` periods after `first`.
    fn payment_date(self, first: NaiveDate, offset: u32) -> Option<NaiveDate> {
        match self {
            PaymentFrequency::Monthly => first.checked_add_months(Months::new(offset)),
            PaymentFrequency::Biweekly => {
                first.checked_add_days(chrono::Days::new(u64::from(offset) * 14))
            }
            PaymentFrequency::Weekly => {
                first.checked_add_days(chrono::Days::new(u64::from(offset) * 7))
            }
        }
    }
}

/// Loan parameters as entered on the mortgage and payoff calculators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmortizationInput {
    #[serde(deserialize_with = "lenient_decimal")]
    pub principal: Money,
    /// Annual percentage rate, e.g. 6.5 for 6.5%
    #[serde(deserialize_with = "lenient_decimal")]
    pub annual_rate_pct: Percent,
    #[serde(deserialize_with = "lenient_decimal")]
    pub term_years: Years,
    /// Additional principal paid every period
    #[serde(deserialize_with = "lenient_decimal")]
    pub extra_per_period: Money,
    pub frequency: PaymentFrequency,
    /// Date of the first payment; stamps each period when present
    #[serde(deserialize_with = "lenient_opt_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for AmortizationInput {
    fn default() -> Self {
        Self {
            principal: Decimal::ZERO,
            annual_rate_pct: Decimal::ZERO,
            term_years: Decimal::from(30),
            extra_per_period: Decimal::ZERO,
            frequency: PaymentFrequency::Monthly,
            start_date: None,
        }
    }
}

impl Sanitize for AmortizationInput {
    fn sanitize(self) -> Self {
        Self {
            principal: round_money(sanitize::non_negative(self.principal)),
            annual_rate_pct: sanitize::percent(self.annual_rate_pct),
            term_years: sanitize::years(self.term_years),
            extra_per_period: round_money(sanitize::non_negative(self.extra_per_period)),
            ..self
        }
    }
}

/// One row of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    /// Period number (1-indexed)
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub extra_paid: Money,
    pub ending_balance: Money,
    pub total_payment: Money,
}

/// Whether the schedule reached a zero balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleStatus {
    Converged,
    /// The iteration cap stopped the schedule; rows are partial.
    Capped {
        iteration_cap: u32,
        remaining_balance: Money,
    },
}

/// Aggregates over the whole schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationTotals {
    pub total_interest: Money,
    pub total_payments: Money,
    pub total_extra: Money,
    pub periods: u32,
    pub years_to_payoff: Years,
    pub months_to_payoff: u32,
}

/// Output of [`amortize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    /// Scheduled payment before extra principal
    pub scheduled_payment: Money,
    pub periodic_rate: Rate,
    pub periods_per_year: u32,
    pub scheduled_periods: u32,
    pub status: ScheduleStatus,
    pub totals: AmortizationTotals,
    pub schedule: Vec<AmortizationPeriod>,
}

impl AmortizationOutput {
    pub fn is_converged(&self) -> bool {
        matches!(self.status, ScheduleStatus::Converged)
    }

    /// Reject a capped schedule for callers that cannot display partial data.
    pub fn require_converged(&self) -> FinCalcResult<()> {
        match &self.status {
            ScheduleStatus::Converged => Ok(()),
            ScheduleStatus::Capped {
                iteration_cap,
                remaining_balance,
            } => Err(FinCalcError::ConvergenceFailure {
                function: "amortize".into(),
                iterations: *iteration_cap,
                remaining: *remaining_balance,
            }),
        }
    }
}

/// Calendar-year (or loan-year) roll-up of a schedule, for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub extra_paid: Money,
    pub ending_balance: Money,
}

/// Baseline vs accelerated payoff, as shown on the loan payoff calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffComparison {
    pub scheduled_payment: Money,
    pub accelerated_payment: Money,
    pub baseline: AmortizationTotals,
    pub accelerated: AmortizationTotals,
    pub interest_saved: Money,
    pub periods_saved: u32,
    pub months_saved: u32,
    pub accelerated_status: ScheduleStatus,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Build the full amortization schedule for a fixed-rate loan.
pub fn amortize(input: &AmortizationInput) -> ComputationOutput<AmortizationOutput> {
    let start = Instant::now();
    let input = input.clone().sanitize();
    let mut warnings: Vec<String> = Vec::new();

    let output = build_schedule(&input);

    if output.schedule.is_empty() {
        warnings.push("Principal or term is zero; nothing to amortize".into());
    }
    if let ScheduleStatus::Capped {
        iteration_cap,
        remaining_balance,
    } = &output.status
    {
        warnings.push(format!(
            "Schedule stopped at the {iteration_cap}-period safety cap with {remaining_balance} outstanding; rows are partial"
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Fixed-rate amortization with per-period cent rounding",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_years": input.term_years.to_string(),
            "extra_per_period": input.extra_per_period.to_string(),
            "frequency": input.frequency,
        }),
        warnings,
        elapsed,
        output,
    )
}

/// Compare the schedule without extra payments against the accelerated one.
pub fn compare_payoff(input: &AmortizationInput) -> ComputationOutput<PayoffComparison> {
    let start = Instant::now();
    let input = input.clone().sanitize();
    let mut warnings: Vec<String> = Vec::new();

    let baseline_input = AmortizationInput {
        extra_per_period: Decimal::ZERO,
        ..input.clone()
    };
    let baseline = build_schedule(&baseline_input);
    let accelerated = build_schedule(&input);

    if !accelerated.is_converged() || !baseline.is_converged() {
        warnings.push("A schedule hit the iteration safety cap; savings are understated".into());
    }

    let periods_saved = baseline
        .totals
        .periods
        .saturating_sub(accelerated.totals.periods);
    let months_saved = baseline
        .totals
        .months_to_payoff
        .saturating_sub(accelerated.totals.months_to_payoff);

    let comparison = PayoffComparison {
        scheduled_payment: baseline.scheduled_payment,
        accelerated_payment: if baseline.scheduled_payment.is_zero() {
            Decimal::ZERO
        } else {
            baseline.scheduled_payment + input.extra_per_period
        },
        interest_saved: baseline.totals.total_interest - accelerated.totals.total_interest,
        periods_saved,
        months_saved,
        accelerated_status: accelerated.status.clone(),
        baseline: baseline.totals,
        accelerated: accelerated.totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Loan payoff: baseline vs extra-payment amortization",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_years": input.term_years.to_string(),
            "extra_per_period": input.extra_per_period.to_string(),
        }),
        warnings,
        elapsed,
        comparison,
    )
}

/// Roll a schedule up into loan years.
pub fn yearly_summary(schedule: &[AmortizationPeriod], periods_per_year: u32) -> Vec<AmortizationYear> {
    let per_year = periods_per_year.max(1);
    let mut years: Vec<AmortizationYear> = Vec::new();

    for period in schedule {
        let year = (period.index - 1) / per_year + 1;
        match years.last_mut() {
            Some(current) if current.year == year => {
                current.principal_paid += period.principal_paid;
                current.interest_paid += period.interest_paid;
                current.extra_paid += period.extra_paid;
                current.ending_balance = period.ending_balance;
            }
            _ => years.push(AmortizationYear {
                year,
                principal_paid: period.principal_paid,
                interest_paid: period.interest_paid,
                extra_paid: period.extra_paid,
                ending_balance: period.ending_balance,
            }),
        }
    }
    years
}

/// Schedule builder on already-sanitized input.
pub(crate) fn build_schedule(input: &AmortizationInput) -> AmortizationOutput {
    let per_year = input.frequency.periods_per_year();
    let n = scheduled_periods(input.term_years, per_year);
    run_schedule(input, n, n.saturating_add(ITERATION_MARGIN))
}

fn scheduled_periods(term_years: Years, per_year: u32) -> u32 {
    sanitize::to_u32((term_years * Decimal::from(per_year)).round())
}

fn run_schedule(input: &AmortizationInput, n: u32, iteration_cap: u32) -> AmortizationOutput {
    let per_year = input.frequency.periods_per_year();
    let rate = periodic_rate(input.annual_rate_pct, per_year);

    if input.principal <= Decimal::ZERO || n == 0 {
        return AmortizationOutput {
            scheduled_payment: Decimal::ZERO,
            periodic_rate: rate,
            periods_per_year: per_year,
            scheduled_periods: n,
            status: ScheduleStatus::Converged,
            totals: totals(&[], per_year),
            schedule: Vec::new(),
        };
    }

    let payment = round_money(level_payment(input.principal, rate, n));
    let mut balance = input.principal;
    let mut schedule: Vec<AmortizationPeriod> = Vec::with_capacity(n as usize);

    for index in 1..=iteration_cap {
        let interest = round_money(balance * rate);
        let mut principal = (payment - interest).max(Decimal::ZERO);
        // An overshooting payment retires the balance exactly. From the last
        // scheduled period on, a rounding residual of at most one payment is
        // swept too; anything larger carries forward toward the cap.
        if principal >= balance || (index >= n && balance - principal <= payment) {
            principal = balance;
        }
        let extra = input.extra_per_period.min(balance - principal);
        balance = (balance - principal - extra).max(Decimal::ZERO);

        schedule.push(AmortizationPeriod {
            index,
            payment_date: input
                .start_date
                .and_then(|first| input.frequency.payment_date(first, index - 1)),
            principal_paid: principal,
            interest_paid: interest,
            extra_paid: extra,
            ending_balance: balance,
            total_payment: principal + interest + extra,
        });

        if balance.is_zero() {
            break;
        }
    }

    let status = if balance.is_zero() {
        ScheduleStatus::Converged
    } else {
        warn!(
            "amortization stopped at {} periods with {} outstanding",
            iteration_cap, balance
        );
        ScheduleStatus::Capped {
            iteration_cap,
            remaining_balance: balance,
        }
    };

    debug!(
        "amortized {} over {} scheduled periods in {} rows",
        input.principal,
        n,
        schedule.len()
    );

    AmortizationOutput {
        scheduled_payment: payment,
        periodic_rate: rate,
        periods_per_year: per_year,
        scheduled_periods: n,
        status,
        totals: totals(&schedule, per_year),
        schedule,
    }
}

fn totals(schedule: &[AmortizationPeriod], per_year: u32) -> AmortizationTotals {
    let periods = schedule.len() as u32;
    let per_year_dec = Decimal::from(per_year.max(1));
    let years = Decimal::from(periods) / per_year_dec;
    let months = (Decimal::from(periods) * Decimal::from(12) / per_year_dec).ceil();

    AmortizationTotals {
        total_interest: schedule.iter().map(|p| p.interest_paid).sum(),
        total_payments: schedule.iter().map(|p| p.total_payment).sum(),
        total_extra: schedule.iter().map(|p| p.extra_paid).sum(),
        periods,
        years_to_payoff: years.round_dp(2),
        months_to_payoff: sanitize::to_u32(months),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_input() -> AmortizationInput {
        AmortizationInput {
            principal: dec!(300_000),
            annual_rate_pct: dec!(6),
            term_years: dec!(30),
            extra_per_period: Decimal::ZERO,
            frequency: PaymentFrequency::Monthly,
            start_date: None,
        }
    }

    #[test]
    fn test_thirty_year_schedule_retires_principal() {
        let out = amortize(&default_input()).result;
        assert_eq!(out.scheduled_payment, dec!(1798.65));
        assert_eq!(out.schedule.len(), 360);
        assert!(out.is_converged());

        let principal_sum: Decimal = out.schedule.iter().map(|p| p.principal_paid).sum();
        assert_eq!(principal_sum, dec!(300_000));
        assert_eq!(out.schedule.last().unwrap().ending_balance, Decimal::ZERO);
        assert_eq!(out.totals.months_to_payoff, 360);
        assert_eq!(out.totals.years_to_payoff, dec!(30));
    }

    #[test]
    fn test_first_period_figures() {
        let out = amortize(&default_input()).result;
        let first = &out.schedule[0];
        assert_eq!(first.interest_paid, dec!(1500.00));
        assert_eq!(first.principal_paid, dec!(298.65));
        assert_eq!(first.ending_balance, dec!(299701.35));
        assert_eq!(first.total_payment, dec!(1798.65));
    }

    #[test]
    fn test_balances_never_increase() {
        let mut input = default_input();
        input.extra_per_period = dec!(250);
        let out = amortize(&input).result;
        let mut previous = input.principal;
        for row in &out.schedule {
            assert!(row.ending_balance <= previous);
            assert!(row.ending_balance >= Decimal::ZERO);
            previous = row.ending_balance;
        }
    }

    #[test]
    fn test_extra_payment_shortens_loan() {
        let base = amortize(&default_input()).result;
        let mut input = default_input();
        input.extra_per_period = dec!(200);
        let fast = amortize(&input).result;

        assert!(fast.totals.periods < base.totals.periods);
        assert!(fast.totals.total_interest < base.totals.total_interest);
        assert_eq!(fast.schedule.last().unwrap().ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_final_extra_payment_does_not_overshoot() {
        let input = AmortizationInput {
            principal: dec!(1000),
            annual_rate_pct: Decimal::ZERO,
            term_years: dec!(1),
            extra_per_period: dec!(700),
            ..default_input()
        };
        let out = amortize(&input).result;
        // 83.33 scheduled + 700 extra, then 83.33 + 133.34 retires the rest
        assert_eq!(out.schedule.len(), 2);
        let last = &out.schedule[1];
        assert_eq!(last.extra_paid, dec!(133.34));
        assert_eq!(last.ending_balance, Decimal::ZERO);
        let paid: Decimal = out.schedule.iter().map(|p| p.principal_paid + p.extra_paid).sum();
        assert_eq!(paid, dec!(1000));
    }

    #[test]
    fn test_zero_rate_even_payments() {
        let input = AmortizationInput {
            principal: dec!(24_000),
            annual_rate_pct: Decimal::ZERO,
            term_years: dec!(2),
            ..default_input()
        };
        let out = amortize(&input).result;
        assert_eq!(out.scheduled_payment, dec!(1000));
        assert!(out.schedule.iter().all(|p| p.total_payment == dec!(1000)));
        assert_eq!(out.totals.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_biweekly_frequency() {
        let input = AmortizationInput {
            frequency: PaymentFrequency::Biweekly,
            ..default_input()
        };
        let out = amortize(&input).result;
        assert_eq!(out.periods_per_year, 26);
        assert_eq!(out.scheduled_periods, 780);
        assert_eq!(out.periodic_rate, dec!(0.06) / dec!(26));
        assert_eq!(out.totals.months_to_payoff, 360);
    }

    #[test]
    fn test_degenerate_inputs_give_empty_schedule() {
        for input in [
            AmortizationInput {
                principal: Decimal::ZERO,
                ..default_input()
            },
            AmortizationInput {
                principal: dec!(-5000),
                ..default_input()
            },
            AmortizationInput {
                term_years: Decimal::ZERO,
                ..default_input()
            },
        ] {
            let out = amortize(&input);
            assert!(out.result.schedule.is_empty());
            assert_eq!(out.result.totals.total_interest, Decimal::ZERO);
            assert!(out.result.is_converged());
            assert_eq!(out.warnings.len(), 1);
        }
    }

    #[test]
    fn test_cap_is_reported_not_silent() {
        let input = default_input();
        let out = run_schedule(&input, 360, 12);
        assert_eq!(out.schedule.len(), 12);
        match &out.status {
            ScheduleStatus::Capped {
                iteration_cap,
                remaining_balance,
            } => {
                assert_eq!(*iteration_cap, 12);
                assert!(*remaining_balance > Decimal::ZERO);
            }
            ScheduleStatus::Converged => panic!("expected capped status"),
        }
        assert!(matches!(
            out.require_converged(),
            Err(FinCalcError::ConvergenceFailure { iterations: 12, .. })
        ));
    }

    #[test]
    fn test_payment_dates() {
        let input = AmortizationInput {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..default_input()
        };
        let out = amortize(&input).result;
        assert_eq!(out.schedule[0].payment_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(out.schedule[1].payment_date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(out.schedule[12].payment_date, NaiveDate::from_ymd_opt(2025, 1, 31));

        let weekly = amortize(&AmortizationInput {
            frequency: PaymentFrequency::Weekly,
            ..input
        })
        .result;
        assert_eq!(weekly.schedule[1].payment_date, NaiveDate::from_ymd_opt(2024, 2, 7));
    }

    #[test]
    fn test_yearly_summary_rolls_up() {
        let out = amortize(&default_input()).result;
        let years = yearly_summary(&out.schedule, out.periods_per_year);
        assert_eq!(years.len(), 30);
        let interest: Decimal = years.iter().map(|y| y.interest_paid).sum();
        assert_eq!(interest, out.totals.total_interest);
        assert_eq!(years[0].ending_balance, out.schedule[11].ending_balance);
        assert_eq!(years[29].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_compare_payoff_reports_savings() {
        let mut input = default_input();
        input.extra_per_period = dec!(300);
        let cmp = compare_payoff(&input).result;
        assert_eq!(cmp.baseline.periods, 360);
        assert!(cmp.periods_saved > 0);
        assert!(cmp.interest_saved > Decimal::ZERO);
        assert_eq!(cmp.accelerated_payment, dec!(2098.65));
        assert_eq!(
            cmp.interest_saved,
            cmp.baseline.total_interest - cmp.accelerated.total_interest
        );
    }
}
