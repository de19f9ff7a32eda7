#![cfg(feature = "auto_lease")]

use fincalc_core::auto_lease::buy::BuyTerms;
use fincalc_core::auto_lease::comparison::{
    self, Cheaper, LeaseVsBuyInput, OwnershipScenario,
};
use fincalc_core::auto_lease::depreciation::{build_curve, DepreciationMode};
use fincalc_core::auto_lease::lease::{
    lease_payment, AdvancedLease, LeaseTaxMode, LeaseTerms, ResidualValue,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_lease() -> LeaseTerms {
    LeaseTerms {
        monthly_payment: dec!(399),
        term_months: 36,
        down_payment: dec!(2_000),
        fees: dec!(650),
        acquisition_fee: dec!(695),
        disposition_fee: dec!(395),
        allowed_miles_per_year: 10_000,
        expected_miles_per_year: 13_000,
        over_mile_fee: dec!(0.25),
        advanced: None,
    }
}

fn sample_buy() -> BuyTerms {
    BuyTerms {
        price: dec!(34_000),
        down_payment: dec!(4_000),
        doc_fee: dec!(500),
        sales_tax_pct: dec!(6.25),
        loan_rate_pct: dec!(6.9),
        loan_term_months: 60,
        maintenance_delta_annual: dec!(400),
        insurance_delta_annual: dec!(200),
        resale_override_pct: None,
        depreciation: DepreciationMode::default(),
    }
}

fn sample_comparison() -> LeaseVsBuyInput {
    LeaseVsBuyInput {
        scenario: OwnershipScenario { ownership_years: 6 },
        lease: sample_lease(),
        buy: sample_buy(),
    }
}

// ===========================================================================
// Lease-vs-buy comparison
// ===========================================================================

#[test]
fn test_break_even_is_first_crossing() {
    let out = comparison::compare_lease_vs_buy(&sample_comparison()).result;
    let expected = (1..out.buy_cumulative.len())
        .find(|&m| out.buy_cumulative[m] <= out.lease_cumulative[m])
        .map(|m| m as u32);
    assert_eq!(out.comparison.break_even_month, expected);
}

#[test]
fn test_winner_matches_totals() {
    let out = comparison::compare_lease_vs_buy(&sample_comparison()).result;
    assert_eq!(out.lease_total, *out.lease_cumulative.last().unwrap());
    assert_eq!(out.buy_total, *out.buy_cumulative.last().unwrap());
    let expected = if out.buy_total < out.lease_total {
        Cheaper::Buy
    } else {
        Cheaper::Lease
    };
    assert_eq!(out.comparison.cheaper, expected);
    assert_eq!(
        out.comparison.difference,
        (out.buy_total - out.lease_total).abs()
    );
}

#[test]
fn test_lease_totals_for_two_full_terms() {
    let out = comparison::compare_lease_vs_buy(&sample_comparison()).result;
    // two terms: upfront and mileage twice, disposition once
    let upfront = dec!(2_000) + dec!(650) + dec!(695);
    let mileage = dec!(3_000) / dec!(12) * dec!(36) * dec!(0.25);
    let expected = dec!(399) * dec!(72) + upfront * dec!(2) + mileage * dec!(2) + dec!(395);
    assert_eq!(out.lease_total, expected);
}

#[test]
fn test_identical_totals_are_a_tie() {
    let input = LeaseVsBuyInput {
        scenario: OwnershipScenario { ownership_years: 2 },
        lease: LeaseTerms {
            monthly_payment: dec!(250),
            term_months: 24,
            ..LeaseTerms::default()
        },
        buy: BuyTerms {
            price: dec!(6_000),
            down_payment: dec!(6_000),
            resale_override_pct: Some(Decimal::ZERO),
            ..BuyTerms::default()
        },
    };
    let out = comparison::compare_lease_vs_buy(&input).result;
    assert_eq!(out.comparison.cheaper, Cheaper::Tie);
    assert_eq!(out.comparison.difference, Decimal::ZERO);
}

#[test]
fn test_mid_lease_horizon_warns() {
    let input = LeaseVsBuyInput {
        scenario: OwnershipScenario { ownership_years: 4 },
        ..sample_comparison()
    };
    let out = comparison::compare_lease_vs_buy(&input);
    assert!(out.warnings.iter().any(|w| w.contains("mid-lease")));
}

// ===========================================================================
// Lease payment math
// ===========================================================================

fn advanced_lease(tax_mode: LeaseTaxMode) -> LeaseTerms {
    LeaseTerms {
        advanced: Some(AdvancedLease {
            gross_cap_cost: dec!(35_000),
            cap_cost_reduction: dec!(2_000),
            residual: ResidualValue::Percent { value: dec!(55) },
            money_factor: dec!(0.0025),
            tax_rate_pct: dec!(7),
            tax_mode,
        }),
        ..sample_lease()
    }
}

#[test]
fn test_advanced_payment_on_payment_tax() {
    let p = lease_payment(&advanced_lease(LeaseTaxMode::OnPayment));
    assert_eq!(p.adjusted_cap_cost, dec!(33_000));
    assert_eq!(p.residual_value, dec!(19_250));
    assert_eq!(p.depreciation_fee, dec!(381.94));
    assert_eq!(p.finance_fee, dec!(130.63));
    assert_eq!(p.monthly_tax, dec!(35.88));
    assert_eq!(p.monthly_payment, dec!(548.45));
    assert_eq!(p.upfront_tax, Decimal::ZERO);
    assert_eq!(p.equivalent_apr_pct, dec!(6));
}

#[test]
fn test_advanced_payment_on_price_tax() {
    let p = lease_payment(&advanced_lease(LeaseTaxMode::OnPrice));
    assert_eq!(p.monthly_tax, Decimal::ZERO);
    assert_eq!(p.monthly_payment, dec!(512.57));
    assert_eq!(p.upfront_tax, dec!(2_310));
}

#[test]
fn test_quoted_payment_without_advanced_math() {
    let p = lease_payment(&sample_lease());
    assert_eq!(p.monthly_payment, dec!(399));
    assert_eq!(p.equivalent_apr_pct, Decimal::ZERO);
}

// ===========================================================================
// Depreciation
// ===========================================================================

#[test]
fn test_curves_non_negative_and_non_increasing() {
    let modes = vec![
        DepreciationMode::default(),
        DepreciationMode::Simple { final_pct: dec!(0) },
        DepreciationMode::Simple { final_pct: dec!(60) },
        DepreciationMode::Schedule {
            yearly_drops_pct: vec![dec!(35), dec!(100)],
        },
        DepreciationMode::Schedule {
            yearly_drops_pct: vec![],
        },
    ];
    for mode in &modes {
        for months in [0, 1, 13, 72, 240] {
            let curve = build_curve(dec!(42_500), months, mode);
            assert_eq!(curve.values.len(), months as usize + 1);
            assert!(curve.values.iter().all(|v| *v >= Decimal::ZERO));
            assert!(curve.values.windows(2).all(|w| w[1] <= w[0]), "{:?}", mode);
        }
    }
}

#[test]
fn test_depreciation_mode_from_json() {
    let mode: DepreciationMode = serde_json::from_value(serde_json::json!({
        "mode": "schedule",
        "yearly_drops_pct": "20, 15, 10"
    }))
    .unwrap();
    assert_eq!(
        mode,
        DepreciationMode::Schedule {
            yearly_drops_pct: vec![dec!(20), dec!(15), dec!(10)],
        }
    );
}

#[test]
fn test_variant_fields_default_when_missing() {
    let simple: DepreciationMode =
        serde_json::from_value(serde_json::json!({ "mode": "simple" })).unwrap();
    assert_eq!(simple, DepreciationMode::Simple { final_pct: Decimal::ZERO });

    let schedule: DepreciationMode =
        serde_json::from_value(serde_json::json!({ "mode": "schedule" })).unwrap();
    assert_eq!(
        schedule,
        DepreciationMode::Schedule {
            yearly_drops_pct: Vec::new(),
        }
    );
    let flat = build_curve(dec!(30_000), 24, &schedule);
    assert!(flat.values.iter().all(|v| *v == dec!(30_000)));

    let residual: ResidualValue =
        serde_json::from_value(serde_json::json!({ "kind": "percent" })).unwrap();
    assert_eq!(residual, ResidualValue::Percent { value: Decimal::ZERO });

    let residual: ResidualValue = serde_json::from_value(serde_json::json!({
        "kind": "amount",
        "value": "$20,300"
    }))
    .unwrap();
    assert_eq!(residual, ResidualValue::Amount { value: dec!(20_300) });
}
