use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::auto_lease::buy::BuyTerms;
use fincalc_core::auto_lease::comparison::{self, LeaseVsBuyInput, OwnershipScenario};
use fincalc_core::auto_lease::depreciation::DepreciationMode;
use fincalc_core::auto_lease::lease::LeaseTerms;

use crate::input;

/// Arguments for lease-vs-buy. Advanced lease math and depreciation
/// schedules are only available through `--input`.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LeaseVsBuyArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Years of ownership to compare over
    #[arg(long)]
    pub years: Option<u32>,

    /// Quoted monthly lease payment
    #[arg(long)]
    pub lease_payment: Option<Decimal>,

    /// Lease term in months
    #[arg(long)]
    pub lease_term: Option<u32>,

    /// Due at signing, per lease
    #[arg(long)]
    pub lease_down: Option<Decimal>,

    /// Miles allowed per year
    #[arg(long)]
    pub allowed_miles: Option<u32>,

    /// Miles expected per year
    #[arg(long)]
    pub expected_miles: Option<u32>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment on the purchase
    #[arg(long)]
    pub down: Option<Decimal>,

    /// Sales tax in percent
    #[arg(long)]
    pub sales_tax: Option<Decimal>,

    /// Auto loan rate in percent
    #[arg(long)]
    pub loan_rate: Option<Decimal>,

    /// Auto loan term in months
    #[arg(long)]
    pub loan_term: Option<u32>,

    /// Value left at the end of ownership, percent of price (straight line)
    #[arg(long)]
    pub final_value_pct: Option<Decimal>,
}

pub fn run_lease_vs_buy(args: LeaseVsBuyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lvb_input: LeaseVsBuyInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => from_flags(&args)?,
    };
    let result = comparison::compare_lease_vs_buy(&lvb_input);
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &LeaseVsBuyArgs) -> Result<LeaseVsBuyInput, Box<dyn std::error::Error>> {
    let scenario = OwnershipScenario::default();
    let lease = LeaseTerms::default();
    let buy = BuyTerms::default();

    Ok(LeaseVsBuyInput {
        scenario: OwnershipScenario {
            ownership_years: args.years.unwrap_or(scenario.ownership_years),
        },
        lease: LeaseTerms {
            monthly_payment: args
                .lease_payment
                .ok_or("--lease-payment is required (or provide --input)")?,
            term_months: args.lease_term.unwrap_or(lease.term_months),
            down_payment: args.lease_down.unwrap_or(lease.down_payment),
            allowed_miles_per_year: args.allowed_miles.unwrap_or(lease.allowed_miles_per_year),
            expected_miles_per_year: args.expected_miles.unwrap_or(lease.expected_miles_per_year),
            ..lease
        },
        buy: BuyTerms {
            price: args.price.ok_or("--price is required (or provide --input)")?,
            down_payment: args.down.unwrap_or(buy.down_payment),
            sales_tax_pct: args.sales_tax.unwrap_or(buy.sales_tax_pct),
            loan_rate_pct: args.loan_rate.unwrap_or(buy.loan_rate_pct),
            loan_term_months: args.loan_term.unwrap_or(buy.loan_term_months),
            depreciation: match args.final_value_pct {
                Some(final_pct) => DepreciationMode::Simple { final_pct },
                None => buy.depreciation.clone(),
            },
            ..buy
        },
    })
}
