use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::depreciation::{DepreciationCurve, DepreciationMode};
use crate::sanitize::{self, lenient_decimal, lenient_opt_decimal, lenient_u32, Sanitize};
use crate::time_value::{level_payment, pct_to_rate, periodic_rate, round_money};
use crate::types::{Money, Percent};

/// Buy side of a lease-vs-buy comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuyTerms {
    #[serde(deserialize_with = "lenient_decimal")]
    pub price: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub down_payment: Money,
    /// Documentation and registration fees
    #[serde(deserialize_with = "lenient_decimal")]
    pub doc_fee: Money,
    #[serde(deserialize_with = "lenient_decimal")]
    pub sales_tax_pct: Percent,
    #[serde(deserialize_with = "lenient_decimal")]
    pub loan_rate_pct: Percent,
    #[serde(deserialize_with = "lenient_u32")]
    pub loan_term_months: u32,
    /// Extra yearly maintenance compared with leasing
    #[serde(deserialize_with = "lenient_decimal")]
    pub maintenance_delta_annual: Money,
    /// Extra yearly insurance compared with leasing
    #[serde(deserialize_with = "lenient_decimal")]
    pub insurance_delta_annual: Money,
    /// Resale value as a percent of price; overrides the depreciation curve
    #[serde(deserialize_with = "lenient_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub resale_override_pct: Option<Percent>,
    pub depreciation: DepreciationMode,
}

impl Default for BuyTerms {
    fn default() -> Self {
        Self {
            price: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            doc_fee: Decimal::ZERO,
            sales_tax_pct: Decimal::ZERO,
            loan_rate_pct: Decimal::ZERO,
            loan_term_months: 60,
            maintenance_delta_annual: Decimal::ZERO,
            insurance_delta_annual: Decimal::ZERO,
            resale_override_pct: None,
            depreciation: DepreciationMode::default(),
        }
    }
}

impl Sanitize for BuyTerms {
    fn sanitize(self) -> Self {
        Self {
            price: sanitize::non_negative(self.price),
            down_payment: sanitize::non_negative(self.down_payment),
            doc_fee: sanitize::non_negative(self.doc_fee),
            sales_tax_pct: sanitize::percent(self.sales_tax_pct),
            loan_rate_pct: sanitize::percent(self.loan_rate_pct),
            maintenance_delta_annual: sanitize::non_negative(self.maintenance_delta_annual),
            insurance_delta_annual: sanitize::non_negative(self.insurance_delta_annual),
            resale_override_pct: self.resale_override_pct.map(sanitize::percent),
            ..self
        }
    }
}

/// Derived figures for the buy side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuySummary {
    pub financed_amount: Money,
    pub monthly_loan_payment: Money,
    pub sales_tax: Money,
    /// Down payment, doc fee and sales tax paid in month 1
    pub upfront_cost: Money,
    pub monthly_ownership_delta: Money,
    pub resale_value: Money,
}

/// Summarize sanitized buy terms against a depreciation curve.
pub fn buy_summary(terms: &BuyTerms, curve: &DepreciationCurve) -> BuySummary {
    let financed = (terms.price - terms.down_payment).max(Decimal::ZERO);
    let payment = if terms.loan_term_months == 0 {
        Decimal::ZERO
    } else {
        level_payment(financed, periodic_rate(terms.loan_rate_pct, 12), terms.loan_term_months)
    };
    let sales_tax = round_money(terms.price * pct_to_rate(terms.sales_tax_pct));
    let resale = match terms.resale_override_pct {
        Some(pct) => terms.price * pct_to_rate(pct),
        None => curve.ending_value(),
    };

    BuySummary {
        financed_amount: round_money(financed),
        monthly_loan_payment: round_money(payment),
        sales_tax,
        upfront_cost: round_money(terms.down_payment + terms.doc_fee) + sales_tax,
        monthly_ownership_delta: round_money(
            (terms.maintenance_delta_annual + terms.insurance_delta_annual) / dec!(12),
        ),
        resale_value: round_money(resale),
    }
}

/// Cumulative cost of buying, index 0 = purchase day (zero), one entry per month.
///
/// Upfront costs land in month 1, loan payments run for the financed term
/// only, and resale value is credited on the final month only.
pub fn buy_cost_series(terms: &BuyTerms, summary: &BuySummary, months: u32) -> Vec<Money> {
    let mut series: Vec<Money> = Vec::with_capacity(months as usize + 1);
    let mut total = Decimal::ZERO;
    series.push(total);

    for m in 1..=months {
        if m == 1 {
            total += summary.upfront_cost;
        }
        if m <= terms.loan_term_months {
            total += summary.monthly_loan_payment;
        }
        total += summary.monthly_ownership_delta;
        if m == months {
            total -= summary.resale_value;
        }
        series.push(total);
    }
    series
}
