use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::wealth::retirement::{self, RetirementInput};

use crate::input;

/// Arguments for retirement projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RetireArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current age
    #[arg(long)]
    pub age: Option<u32>,

    /// Planned retirement age
    #[arg(long)]
    pub retire_at: Option<u32>,

    /// Savings today
    #[arg(long)]
    pub savings: Option<Decimal>,

    /// Monthly contribution
    #[arg(long)]
    pub monthly: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long = "return")]
    pub annual_return: Option<Decimal>,

    /// Expected inflation in percent
    #[arg(long)]
    pub inflation: Option<Decimal>,

    /// Safe withdrawal rate in percent
    #[arg(long)]
    pub withdrawal: Option<Decimal>,
}

pub fn run_retire(args: RetireArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ret_input: RetirementInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            let defaults = RetirementInput::default();
            RetirementInput {
                current_age: args.age.ok_or("--age is required (or provide --input)")?,
                retirement_age: args.retire_at.unwrap_or(defaults.retirement_age),
                current_savings: args.savings.unwrap_or(defaults.current_savings),
                monthly_contribution: args.monthly.unwrap_or(defaults.monthly_contribution),
                annual_return_pct: args.annual_return.unwrap_or(defaults.annual_return_pct),
                inflation_pct: args.inflation.unwrap_or(defaults.inflation_pct),
                withdrawal_pct: args.withdrawal.unwrap_or(defaults.withdrawal_pct),
            }
        }
    };
    let result = retirement::project_retirement(&ret_input);
    Ok(serde_json::to_value(result)?)
}
