//! Mortgage rate lookup seam.
//!
//! Live rates come from an external service owned by the page layer. The
//! engine only defines the provider trait and a static table used whenever
//! the lookup fails.

use log::warn;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Percent;
use crate::FinCalcResult;

/// Average mortgage rates for one state, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageRates {
    pub state: String,
    pub thirty_year_fixed: Percent,
    pub fifteen_year_fixed: Percent,
    pub five_one_arm: Percent,
    /// True when the figures came from the static table.
    pub fallback: bool,
}

/// Source of current mortgage rates.
pub trait RateProvider {
    fn current_rates(&self, state: &str) -> FinCalcResult<MortgageRates>;
}

/// National averages used when no live source is reachable.
#[derive(Debug, Clone, Default)]
pub struct StaticRates;

impl StaticRates {
    pub fn for_state(state: &str) -> MortgageRates {
        MortgageRates {
            state: state.to_uppercase(),
            thirty_year_fixed: dec!(6.85),
            fifteen_year_fixed: dec!(6.10),
            five_one_arm: dec!(6.45),
            fallback: true,
        }
    }
}

impl RateProvider for StaticRates {
    fn current_rates(&self, state: &str) -> FinCalcResult<MortgageRates> {
        Ok(Self::for_state(state))
    }
}

/// Query `provider`, falling back to [`StaticRates`] on any failure.
pub fn rates_or_fallback(provider: &dyn RateProvider, state: &str) -> MortgageRates {
    match provider.current_rates(state) {
        Ok(rates) => rates,
        Err(e) => {
            warn!("rate lookup failed, using static defaults: {e}");
            StaticRates::for_state(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FinCalcError;

    struct Offline;

    impl RateProvider for Offline {
        fn current_rates(&self, state: &str) -> FinCalcResult<MortgageRates> {
            Err(FinCalcError::RateLookup {
                state: state.into(),
                reason: "connection refused".into(),
            })
        }
    }

    struct Fixed;

    impl RateProvider for Fixed {
        fn current_rates(&self, state: &str) -> FinCalcResult<MortgageRates> {
            Ok(MortgageRates {
                state: state.into(),
                thirty_year_fixed: dec!(7.01),
                fifteen_year_fixed: dec!(6.2),
                five_one_arm: dec!(6.6),
                fallback: false,
            })
        }
    }

    #[test]
    fn test_fallback_on_error() {
        let rates = rates_or_fallback(&Offline, "ca");
        assert!(rates.fallback);
        assert_eq!(rates.state, "CA");
        assert_eq!(rates.thirty_year_fixed, dec!(6.85));
    }

    #[test]
    fn test_live_rates_pass_through() {
        let rates = rates_or_fallback(&Fixed, "TX");
        assert!(!rates.fallback);
        assert_eq!(rates.thirty_year_fixed, dec!(7.01));
    }
}
