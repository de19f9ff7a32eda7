#![cfg(feature = "savings")]

use fincalc_core::savings::compounding::{
    project_compounding, CompoundingFrequency, CompoundingInput, ContributionTiming,
    ScheduleGranularity,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn lump_sum(rate_pct: Decimal, compounding: CompoundingFrequency, years: u32) -> CompoundingInput {
    CompoundingInput {
        principal: dec!(10_000),
        rate_pct,
        compounding,
        years,
        ..CompoundingInput::default()
    }
}

#[test]
fn test_lump_sum_monthly_six_percent() {
    let out = project_compounding(&lump_sum(dec!(6), CompoundingFrequency::Monthly, 10));
    assert_eq!(out.result.future_value, dec!(18193.97));
    assert_eq!(out.result.total_interest, dec!(8193.97));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_annual_seven_percent_doubles_near_ten_years() {
    let out = project_compounding(&lump_sum(dec!(7), CompoundingFrequency::Annually, 1)).result;
    let years = out.time_to_double_years.unwrap();
    assert!(years > dec!(10.23) && years < dec!(10.25), "got {}", years);
}

#[test]
fn test_more_frequent_compounding_never_earns_less() {
    let mut last = Decimal::ZERO;
    for freq in [
        CompoundingFrequency::Annually,
        CompoundingFrequency::SemiAnnually,
        CompoundingFrequency::Quarterly,
        CompoundingFrequency::Monthly,
        CompoundingFrequency::Weekly,
        CompoundingFrequency::Daily,
    ] {
        let fv = project_compounding(&lump_sum(dec!(5), freq, 20)).result.future_value;
        assert!(fv >= last, "{:?}: {} < {}", freq, fv, last);
        last = fv;
    }
}

#[test]
fn test_monthly_schedule_tracks_every_month() {
    let input = CompoundingInput {
        contribution: dec!(250),
        granularity: ScheduleGranularity::Monthly,
        timing: ContributionTiming::Begin,
        years: 3,
        months: 4,
        ..lump_sum(dec!(4.5), CompoundingFrequency::Monthly, 0)
    };
    let out = project_compounding(&input).result;
    assert_eq!(out.requested_steps, 40);
    assert_eq!(out.schedule.len(), 40);
    assert!(!out.capped);
    let last = out.schedule.last().unwrap();
    assert!((last.balance - out.future_value).abs() <= dec!(0.02));
    assert_eq!(last.cumulative_contribution, dec!(10_000) + dec!(250) * dec!(40));
    for pair in out.schedule.windows(2) {
        assert!(pair[1].balance > pair[0].balance);
    }
}

#[test]
fn test_lenient_input_from_json() {
    let input: CompoundingInput = serde_json::from_value(serde_json::json!({
        "principal": "10,000",
        "rate_pct": "6%",
        "compounding": "monthly",
        "years": "10",
        "contribution": "",
    }))
    .unwrap();
    let out = project_compounding(&input).result;
    assert_eq!(out.future_value, dec!(18193.97));
}
