#![cfg(feature = "mortgage")]

use chrono::NaiveDate;
use fincalc_core::mortgage::affordability::{self, AffordabilityInput, BindingConstraint};
use fincalc_core::mortgage::amortization::{
    self, AmortizationInput, PaymentFrequency, ScheduleStatus,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Amortization
// ===========================================================================

fn sample_loan() -> AmortizationInput {
    AmortizationInput {
        principal: dec!(250_000),
        annual_rate_pct: dec!(6.5),
        term_years: dec!(30),
        ..AmortizationInput::default()
    }
}

#[test]
fn test_principal_paid_sums_to_principal() {
    for frequency in [
        PaymentFrequency::Monthly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Weekly,
    ] {
        let input = AmortizationInput {
            frequency,
            ..sample_loan()
        };
        let out = amortization::amortize(&input).result;
        let paid: Decimal = out.schedule.iter().map(|p| p.principal_paid).sum();
        assert_eq!(paid, dec!(250_000), "{:?}", frequency);
        assert_eq!(out.schedule.last().unwrap().ending_balance, Decimal::ZERO);
        assert_eq!(out.status, ScheduleStatus::Converged);
        assert_eq!(out.totals.periods, out.scheduled_periods);
    }
}

#[test]
fn test_more_extra_never_costs_more() {
    let mut last_interest = Decimal::MAX;
    let mut last_months = u32::MAX;
    for extra in [dec!(0), dec!(50), dec!(100), dec!(250), dec!(1_000), dec!(5_000)] {
        let input = AmortizationInput {
            extra_per_period: extra,
            ..sample_loan()
        };
        let totals = amortization::amortize(&input).result.totals;
        assert!(totals.total_interest <= last_interest, "extra {}", extra);
        assert!(totals.months_to_payoff <= last_months, "extra {}", extra);
        last_interest = totals.total_interest;
        last_months = totals.months_to_payoff;
    }
}

#[test]
fn test_zero_rate_level_principal() {
    let input = AmortizationInput {
        principal: dec!(12_000),
        annual_rate_pct: Decimal::ZERO,
        term_years: dec!(1),
        ..AmortizationInput::default()
    };
    let out = amortization::amortize(&input).result;
    assert_eq!(out.scheduled_payment, dec!(1_000));
    assert_eq!(out.totals.total_interest, Decimal::ZERO);
    assert!(out.schedule.iter().all(|p| p.total_payment == dec!(1_000)));
}

#[test]
fn test_empty_loan_is_not_an_error() {
    let input = AmortizationInput {
        principal: Decimal::ZERO,
        ..sample_loan()
    };
    let out = amortization::amortize(&input);
    assert!(out.result.schedule.is_empty());
    assert_eq!(out.result.totals.total_interest, Decimal::ZERO);
    assert!(out.result.require_converged().is_ok());
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_payoff_comparison_reports_savings() {
    let input = AmortizationInput {
        extra_per_period: dec!(200),
        ..sample_loan()
    };
    let cmp = amortization::compare_payoff(&input).result;
    assert_eq!(cmp.baseline.periods, 360);
    assert!(cmp.accelerated.periods < 360);
    assert!(cmp.interest_saved > Decimal::ZERO);
    assert_eq!(cmp.periods_saved, 360 - cmp.accelerated.periods);
    assert_eq!(cmp.accelerated_payment, cmp.scheduled_payment + dec!(200));
    assert_eq!(
        cmp.interest_saved,
        cmp.baseline.total_interest - cmp.accelerated.total_interest
    );
}

#[test]
fn test_yearly_summary_matches_schedule() {
    let out = amortization::amortize(&sample_loan()).result;
    let years = amortization::yearly_summary(&out.schedule, out.periods_per_year);
    assert_eq!(years.len(), 30);
    let principal: Decimal = years.iter().map(|y| y.principal_paid).sum();
    let interest: Decimal = years.iter().map(|y| y.interest_paid).sum();
    assert_eq!(principal, dec!(250_000));
    assert_eq!(interest, out.totals.total_interest);
    assert_eq!(years[29].ending_balance, Decimal::ZERO);
}

#[test]
fn test_payment_dates_follow_frequency() {
    let first = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    let monthly = amortization::amortize(&AmortizationInput {
        start_date: Some(first),
        ..sample_loan()
    })
    .result;
    assert_eq!(monthly.schedule[0].payment_date, Some(first));
    assert_eq!(
        monthly.schedule[1].payment_date,
        NaiveDate::from_ymd_opt(2025, 2, 28)
    );

    let biweekly = amortization::amortize(&AmortizationInput {
        start_date: Some(first),
        frequency: PaymentFrequency::Biweekly,
        ..sample_loan()
    })
    .result;
    assert_eq!(
        biweekly.schedule[1].payment_date,
        NaiveDate::from_ymd_opt(2025, 2, 14)
    );
}

#[test]
fn test_lenient_json_input() {
    let input: AmortizationInput = serde_json::from_value(serde_json::json!({
        "principal": "$250,000",
        "annual_rate_pct": "6.5%",
        "term_years": 30,
        "extra_per_period": null,
        "frequency": "monthly"
    }))
    .unwrap();
    let out = amortization::amortize(&input).result;
    let reference = amortization::amortize(&sample_loan()).result;
    assert_eq!(out.scheduled_payment, reference.scheduled_payment);
    assert_eq!(out.totals, reference.totals);
}

#[test]
fn test_blank_start_date_is_ignored() {
    let input: AmortizationInput = serde_json::from_value(serde_json::json!({
        "principal": "250000",
        "annual_rate_pct": 6.5,
        "term_years": "30",
        "start_date": ""
    }))
    .unwrap();
    assert_eq!(input.start_date, None);
    let out = amortization::amortize(&input).result;
    assert!(out.schedule.iter().all(|p| p.payment_date.is_none()));
    assert_eq!(out.totals, amortization::amortize(&sample_loan()).result.totals);

    let dated: AmortizationInput =
        serde_json::from_value(serde_json::json!({ "start_date": "2025-01-31" })).unwrap();
    assert_eq!(dated.start_date, NaiveDate::from_ymd_opt(2025, 1, 31));
}

#[test]
fn test_payment_below_interest_hits_iteration_cap() {
    // At 100% APR over 100 years the level payment only covers interest.
    let input = AmortizationInput {
        principal: dec!(1_000),
        annual_rate_pct: dec!(100),
        term_years: dec!(100),
        ..sample_loan()
    };
    let out = amortization::amortize(&input);
    let result = &out.result;
    assert_eq!(result.scheduled_payment, dec!(83.33));
    assert_eq!(result.scheduled_periods, 1_200);
    assert_eq!(
        result.status,
        ScheduleStatus::Capped {
            iteration_cap: 1_200 + amortization::ITERATION_MARGIN,
            remaining_balance: dec!(1_000),
        }
    );
    assert_eq!(result.schedule.len(), 13_200);
    assert!(result
        .schedule
        .iter()
        .all(|p| p.total_payment <= result.scheduled_payment));
    assert!(out.warnings.iter().any(|w| w.contains("safety cap")));
    assert!(result.require_converged().is_err());
}

// ===========================================================================
// Affordability
// ===========================================================================

fn sample_household() -> AffordabilityInput {
    AffordabilityInput {
        annual_income: dec!(120_000),
        monthly_debts: dec!(500),
        down_payment: dec!(60_000),
        annual_rate_pct: dec!(6.5),
        property_tax_rate_pct: dec!(1.1),
        annual_insurance: dec!(1_800),
        monthly_hoa: dec!(0),
        ..AffordabilityInput::default()
    }
}

#[test]
fn test_higher_income_never_lowers_price() {
    let mut last = Decimal::ZERO;
    for income in [40_000, 60_000, 90_000, 120_000, 200_000, 350_000] {
        let input = AffordabilityInput {
            annual_income: Decimal::from(income),
            ..sample_household()
        };
        let price = affordability::max_affordable_price(&input);
        assert!(price >= last, "income {} gave {} < {}", income, price, last);
        last = price;
    }
}

#[test]
fn test_analysis_reconciles_with_search() {
    let input = sample_household();
    let out = affordability::analyze_affordability(&input).result;
    assert_eq!(out.max_home_price, affordability::max_affordable_price(&input));
    assert_eq!(out.loan_amount, out.max_home_price - dec!(60_000));
    assert_eq!(out.gross_monthly_income, dec!(10_000));
    // front 2,800 vs back 3,600 - 500 = 3,100
    assert_eq!(out.binding_constraint, BindingConstraint::FrontEnd);
    assert_eq!(out.allowed_monthly_payment, dec!(2_800));
    assert_eq!(out.principal_and_interest_budget, dec!(2_650));
    assert!(out.piti.principal_and_interest <= dec!(2_650));
    assert_eq!(
        out.piti.total_monthly_payment,
        out.piti.principal_and_interest + out.piti.property_tax + out.piti.insurance + out.piti.hoa
    );
    assert!(out.exceeds_allowed_after_tax);
}

#[test]
fn test_debts_can_bind() {
    let input = AffordabilityInput {
        monthly_debts: dec!(1_500),
        ..sample_household()
    };
    let out = affordability::analyze_affordability(&input).result;
    assert_eq!(out.binding_constraint, BindingConstraint::BackEnd);
    assert_eq!(out.allowed_monthly_payment, dec!(2_100));
}

#[test]
fn test_no_income_affords_nothing() {
    let input = AffordabilityInput {
        annual_income: Decimal::ZERO,
        ..sample_household()
    };
    let out = affordability::analyze_affordability(&input);
    assert_eq!(out.result.max_home_price, Decimal::ZERO);
    assert!(!out.warnings.is_empty());
}
