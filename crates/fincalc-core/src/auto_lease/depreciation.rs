use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::sanitize::{self, lenient_decimal, lenient_decimal_vec};
use crate::time_value::{pct_to_rate, round_money};
use crate::types::{Money, Percent};

/// How a vehicle loses value over the ownership horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DepreciationMode {
    /// Straight line from the price down to `final_pct` of it at the last month.
    Simple {
        #[serde(default, deserialize_with = "lenient_decimal")]
        final_pct: Percent,
    },
    /// Percentage drop per year of ownership (year 1 first). Years beyond the
    /// list repeat its last entry.
    Schedule {
        #[serde(default, deserialize_with = "lenient_decimal_vec")]
        yearly_drops_pct: Vec<Percent>,
    },
}

impl Default for DepreciationMode {
    fn default() -> Self {
        DepreciationMode::Schedule {
            yearly_drops_pct: vec![dec!(20), dec!(15), dec!(13), dec!(12), dec!(10)],
        }
    }
}

/// Month-indexed book values; index 0 is the purchase price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationCurve {
    pub values: Vec<Money>,
}

impl DepreciationCurve {
    pub fn ending_value(&self) -> Money {
        self.values.last().copied().unwrap_or(Decimal::ZERO)
    }

    pub fn value_at(&self, month: usize) -> Option<Money> {
        self.values.get(month).copied()
    }
}

/// Build the book-value curve for `months` months of ownership.
///
/// `Schedule` mode spreads each year's drop as `drop/12` applied
/// multiplicatively every month of that year. Values never rise and never
/// go below zero.
pub fn build_curve(price: Money, months: u32, mode: &DepreciationMode) -> DepreciationCurve {
    let price = sanitize::non_negative(price);
    let mut values: Vec<Money> = Vec::with_capacity(months as usize + 1);
    values.push(round_money(price));

    match mode {
        DepreciationMode::Simple { final_pct } => {
            let total_loss = Decimal::ONE - pct_to_rate(sanitize::percent(*final_pct));
            let horizon = Decimal::from(months.max(1));
            for m in 1..=months {
                let remaining = Decimal::ONE - total_loss * Decimal::from(m) / horizon;
                values.push(round_money(price * remaining).max(Decimal::ZERO));
            }
        }
        DepreciationMode::Schedule { yearly_drops_pct } => {
            let mut value = price;
            for m in 1..=months {
                let year = ((m - 1) / 12) as usize;
                let drop = yearly_drops_pct
                    .get(year)
                    .or_else(|| yearly_drops_pct.last())
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let monthly_factor = Decimal::ONE - pct_to_rate(sanitize::percent(drop)) / dec!(12);
                value *= monthly_factor;
                values.push(round_money(value).max(Decimal::ZERO));
            }
        }
    }

    DepreciationCurve { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_non_increasing(curve: &DepreciationCurve) {
        for pair in curve.values.windows(2) {
            assert!(pair[1] <= pair[0], "{} rose to {}", pair[0], pair[1]);
        }
        assert!(curve.values.iter().all(|v| *v >= Decimal::ZERO));
    }

    #[test]
    fn test_simple_mode_hits_final_percent() {
        let curve = build_curve(dec!(40_000), 60, &DepreciationMode::Simple { final_pct: dec!(45) });
        assert_eq!(curve.values.len(), 61);
        assert_eq!(curve.values[0], dec!(40_000));
        assert_eq!(curve.ending_value(), dec!(18_000));
        assert_eq!(curve.value_at(30), Some(dec!(29_000)));
        assert_non_increasing(&curve);
    }

    #[test]
    fn test_schedule_mode_linearized_monthly() {
        let mode = DepreciationMode::Schedule {
            yearly_drops_pct: vec![dec!(12)],
        };
        let curve = build_curve(dec!(10_000), 2, &mode);
        // 1% per month, applied multiplicatively
        assert_eq!(curve.values, vec![dec!(10_000), dec!(9_900), dec!(9_801)]);
    }

    #[test]
    fn test_schedule_mode_repeats_last_drop() {
        let mode = DepreciationMode::Schedule {
            yearly_drops_pct: vec![dec!(24), dec!(12)],
        };
        let curve = build_curve(dec!(30_000), 48, &mode);
        let year3 = curve.values[25] / curve.values[24];
        let year4 = curve.values[37] / curve.values[36];
        assert!((year3 - dec!(0.99)).abs() < dec!(0.0001));
        assert!((year4 - dec!(0.99)).abs() < dec!(0.0001));
        assert_non_increasing(&curve);
    }

    #[test]
    fn test_floor_and_clamp() {
        let steep = DepreciationMode::Schedule {
            yearly_drops_pct: vec![dec!(250)],
        };
        let curve = build_curve(dec!(20_000), 120, &steep);
        assert_non_increasing(&curve);

        let rising = DepreciationMode::Simple { final_pct: dec!(130) };
        let curve = build_curve(dec!(20_000), 12, &rising);
        assert!(curve.values.iter().all(|v| *v == dec!(20_000)));

        let curve = build_curve(dec!(-5), 12, &DepreciationMode::default());
        assert!(curve.values.iter().all(|v| v.is_zero()));
    }

    #[test]
    fn test_zero_months() {
        let curve = build_curve(dec!(25_000), 0, &DepreciationMode::default());
        assert_eq!(curve.values, vec![dec!(25_000)]);
        assert_eq!(curve.ending_value(), dec!(25_000));
    }
}
