use clap::Args;
use serde_json::Value;

use fincalc_core::rates::{rates_or_fallback, StaticRates};

/// Arguments for the mortgage rate lookup
#[derive(Args)]
pub struct RatesArgs {
    /// Two-letter state code
    #[arg(long, default_value = "US")]
    pub state: String,
}

pub fn run_rates(args: RatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rates = rates_or_fallback(&StaticRates, &args.state);
    Ok(serde_json::to_value(rates)?)
}
