use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::sanitize::{self, lenient_decimal, lenient_u32, Sanitize};
use crate::time_value::{pct_to_rate, round_money};
use crate::types::{Money, Percent, Rate};

/// Money factor to APR conversion constant (MF x 2400 = APR %).
const MONEY_FACTOR_TO_APR: Decimal = dec!(2400);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Residual value at lease end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResidualValue {
    /// Percent of the gross capitalized cost
    Percent {
        #[serde(default, deserialize_with = "lenient_decimal")]
        value: Percent,
    },
    /// Absolute amount
    Amount {
        #[serde(default, deserialize_with = "lenient_decimal")]
        value: Money,
    },
}

/// Where sales tax lands on a lease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseTaxMode {
    /// Monthly payment grossed up by the tax rate
    #[default]
    OnPayment,
    /// Tax on the adjusted cap cost, paid upfront each term
    OnPrice,
}

/// Inputs for deriving the monthly payment from cap cost, residual and money factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedLease {
    #[serde(deserialize_with = "lenient_decimal")]
    pub gross_cap_cost: Money,
    /// Rebates, trade-in equity and cash applied to the cap cost
    #[serde(deserialize_with = "lenient_decimal")]
    pub cap_cost_reduction: Money,
    pub residual: ResidualValue,
    #[serde(deserialize_with = "lenient_decimal")]
    pub money_factor: Rate,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_rate_pct: Percent,
    pub tax_mode: LeaseTaxMode,
}

impl Default for AdvancedLease {
    fn default() -> Self {
        Self {
            gross_cap_cost: Decimal::ZERO,
            cap_cost_reduction: Decimal::ZERO,
            residual: ResidualValue::Percent { value: dec!(55) },
            money_factor: dec!(0.0025),
            tax_rate_pct: Decimal::ZERO,
            tax_mode: LeaseTaxMode::OnPayment,
        }
    }
}

/// Lease side of a lease-vs-buy comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseTerms {
    /// Quoted monthly payment, used when `advanced` is absent
    #[serde(deserialize_with = "lenient_decimal")]
    pub monthly_payment: Money,
    #[serde(deserialize_with = "lenient_u32")]
    pub term_months: u32,
    #[serde(deserialize_with = "lenient_decimal")]
    pub down_payment: Money,
    /// Registration, doc and other upfront fees
    #[serde(deserialize_with = "lenient_decimal")]
    pub fees: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub acquisition_fee: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub disposition_fee: Money,
    #[serde(deserialize_with = "lenient_u32")]
    pub allowed_miles_per_year: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub expected_miles_per_year: u32,
    #[serde(deserialize_with = "lenient_decimal")]
    pub over_mile_fee: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedLease>,
}

impl Default for LeaseTerms {
    fn default() -> Self {
        Self {
            monthly_payment: Decimal::ZERO,
            term_months: 36,
            down_payment: Decimal::ZERO,
            fees: Decimal::ZERO,
            acquisition_fee: Decimal::ZERO,
            disposition_fee: Decimal::ZERO,
            allowed_miles_per_year: 12_000,
            expected_miles_per_year: 12_000,
            over_mile_fee: dec!(0.25),
            advanced: None,
        }
    }
}

impl Sanitize for LeaseTerms {
    fn sanitize(self) -> Self {
        Self {
            monthly_payment: sanitize::non_negative(self.monthly_payment),
            term_months: self.term_months.max(1),
            down_payment: sanitize::non_negative(self.down_payment),
            fees: sanitize::non_negative(self.fees),
            acquisition_fee: sanitize::non_negative(self.acquisition_fee),
            disposition_fee: sanitize::non_negative(self.disposition_fee),
            over_mile_fee: sanitize::non_negative(self.over_mile_fee),
            advanced: self.advanced.map(|adv| AdvancedLease {
                gross_cap_cost: sanitize::non_negative(adv.gross_cap_cost),
                cap_cost_reduction: sanitize::non_negative(adv.cap_cost_reduction),
                residual: match adv.residual {
                    ResidualValue::Percent { value } => ResidualValue::Percent {
                        value: sanitize::percent(value),
                    },
                    ResidualValue::Amount { value } => ResidualValue::Amount {
                        value: sanitize::non_negative(value),
                    },
                },
                money_factor: sanitize::non_negative(adv.money_factor).min(Decimal::ONE),
                tax_rate_pct: sanitize::percent(adv.tax_rate_pct),
                tax_mode: adv.tax_mode,
            }),
            ..self
        }
    }
}

/// How the monthly lease payment is built up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeasePaymentBreakdown {
    pub adjusted_cap_cost: Money,
    pub residual_value: Money,
    pub depreciation_fee: Money,
    pub finance_fee: Money,
    /// Tax included in each monthly payment (on-payment mode)
    pub monthly_tax: Money,
    pub monthly_payment: Money,
    /// Tax due at signing of each term (on-price mode)
    pub upfront_tax: Money,
    /// Money factor restated as an APR percentage
    pub equivalent_apr_pct: Percent,
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

/// Monthly payment for sanitized lease terms.
///
/// With advanced math: depreciation fee `(adjusted_cap - residual) / term`
/// plus finance fee `(adjusted_cap + residual) * money_factor`.
pub fn lease_payment(terms: &LeaseTerms) -> LeasePaymentBreakdown {
    let Some(adv) = &terms.advanced else {
        return LeasePaymentBreakdown {
            adjusted_cap_cost: Decimal::ZERO,
            residual_value: Decimal::ZERO,
            depreciation_fee: Decimal::ZERO,
            finance_fee: Decimal::ZERO,
            monthly_tax: Decimal::ZERO,
            monthly_payment: round_money(terms.monthly_payment),
            upfront_tax: Decimal::ZERO,
            equivalent_apr_pct: Decimal::ZERO,
        };
    };

    let term = Decimal::from(terms.term_months.max(1));
    let adjusted_cap = (adv.gross_cap_cost - adv.cap_cost_reduction).max(Decimal::ZERO);
    let residual = match adv.residual {
        ResidualValue::Percent { value } => adv.gross_cap_cost * pct_to_rate(value),
        ResidualValue::Amount { value } => value,
    };

    let depreciation_fee = ((adjusted_cap - residual) / term).max(Decimal::ZERO);
    let finance_fee = (adjusted_cap + residual) * adv.money_factor;
    let base = depreciation_fee + finance_fee;
    let tax_rate = pct_to_rate(adv.tax_rate_pct);

    let (monthly_tax, upfront_tax) = match adv.tax_mode {
        LeaseTaxMode::OnPayment => (base * tax_rate, Decimal::ZERO),
        LeaseTaxMode::OnPrice => (Decimal::ZERO, adjusted_cap * tax_rate),
    };

    LeasePaymentBreakdown {
        adjusted_cap_cost: round_money(adjusted_cap),
        residual_value: round_money(residual),
        depreciation_fee: round_money(depreciation_fee),
        finance_fee: round_money(finance_fee),
        monthly_tax: round_money(monthly_tax),
        monthly_payment: round_money(base + monthly_tax),
        upfront_tax: round_money(upfront_tax),
        equivalent_apr_pct: (adv.money_factor * MONEY_FACTOR_TO_APR).round_dp(3),
    }
}

/// Over-mileage charge for one full term, prorated from the annual overage.
pub fn term_mileage_charge(terms: &LeaseTerms) -> Money {
    let overage = terms
        .expected_miles_per_year
        .saturating_sub(terms.allowed_miles_per_year);
    round_money(
        Decimal::from(overage) / dec!(12) * Decimal::from(terms.term_months) * terms.over_mile_fee,
    )
}

/// Cumulative cost of leasing, index 0 = signing day (zero), one entry per month.
///
/// Each term start adds down payment, fees, acquisition fee and upfront tax;
/// each term that ends inside the horizon adds its mileage charge; the
/// disposition fee lands on the final month only.
pub fn lease_cost_series(terms: &LeaseTerms, payment: &LeasePaymentBreakdown, months: u32) -> Vec<Money> {
    let term = terms.term_months.max(1);
    let upfront = terms.down_payment + terms.fees + terms.acquisition_fee + payment.upfront_tax;
    let mileage = term_mileage_charge(terms);

    let mut series: Vec<Money> = Vec::with_capacity(months as usize + 1);
    let mut total = Decimal::ZERO;
    series.push(total);

    for m in 1..=months {
        let month_in_term = (m - 1) % term;
        if month_in_term == 0 {
            total += upfront;
        }
        total += payment.monthly_payment;
        if month_in_term == term - 1 {
            total += mileage;
        }
        if m == months {
            total += terms.disposition_fee;
        }
        series.push(total);
    }
    series
}
