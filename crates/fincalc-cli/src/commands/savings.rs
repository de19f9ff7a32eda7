use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::savings::compounding::{self, CompoundingInput};

use crate::input;

/// Arguments for compound interest projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CompoundArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Starting balance
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Period the rate is quoted for: annual, monthly or weekly
    #[arg(long)]
    pub rate_unit: Option<String>,

    /// Compounding frequency (annually, semi_annually, quarterly, monthly, biweekly, weekly, daily)
    #[arg(long)]
    pub compounding: Option<String>,

    /// Whole years to project
    #[arg(long)]
    pub years: Option<u32>,

    /// Additional months to project
    #[arg(long)]
    pub months: Option<u32>,

    /// Amount added each contribution period
    #[arg(long)]
    pub contribution: Option<Decimal>,

    /// Contribution frequency (same choices as --compounding)
    #[arg(long)]
    pub contribution_frequency: Option<String>,

    /// Contribution timing: begin or end of period
    #[arg(long)]
    pub timing: Option<String>,

    /// Schedule rows: yearly or monthly
    #[arg(long)]
    pub granularity: Option<String>,
}

pub fn run_compound(args: CompoundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compound_input: CompoundingInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            let defaults = CompoundingInput::default();
            CompoundingInput {
                principal: args.principal.unwrap_or(defaults.principal),
                rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
                rate_unit: choice("rate-unit", &args.rate_unit, defaults.rate_unit)?,
                compounding: choice("compounding", &args.compounding, defaults.compounding)?,
                years: args.years.unwrap_or(defaults.years),
                months: args.months.unwrap_or(defaults.months),
                contribution: args.contribution.unwrap_or(defaults.contribution),
                contribution_frequency: choice(
                    "contribution-frequency",
                    &args.contribution_frequency,
                    defaults.contribution_frequency,
                )?,
                timing: choice("timing", &args.timing, defaults.timing)?,
                granularity: choice("granularity", &args.granularity, defaults.granularity)?,
            }
        }
    };
    let result = compounding::project_compounding(&compound_input);
    Ok(serde_json::to_value(result)?)
}

fn choice<T: serde::de::DeserializeOwned>(
    flag: &str,
    raw: &Option<String>,
    default: T,
) -> Result<T, Box<dyn std::error::Error>> {
    match raw.as_deref() {
        Some(raw) => input::parse_choice(flag, raw),
        None => Ok(default),
    }
}
