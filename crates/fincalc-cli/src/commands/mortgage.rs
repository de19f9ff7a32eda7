use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::mortgage::affordability::{self, AffordabilityInput};
use fincalc_core::mortgage::amortization::{self, AmortizationInput};

use crate::input;

/// Loan parameters shared by `amortize` and `payoff`
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Extra principal paid every period
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Payment frequency: monthly, biweekly or weekly
    #[arg(long)]
    pub frequency: Option<String>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Fail instead of returning a partial schedule
    #[arg(long)]
    pub strict: bool,

    /// Add a loan-year roll-up of the schedule
    #[arg(long)]
    pub yearly: bool,
}

/// Arguments for the payoff comparison
#[derive(Args)]
pub struct PayoffArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for home affordability
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AffordArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross annual household income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly debt payments
    #[arg(long)]
    pub debts: Option<Decimal>,

    /// Down payment
    #[arg(long)]
    pub down: Option<Decimal>,

    /// Mortgage rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Mortgage term in years
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Annual property tax in percent of price
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Annual homeowners insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Front-end (housing) ratio in percent
    #[arg(long)]
    pub front_ratio: Option<Decimal>,

    /// Back-end (total debt) ratio in percent
    #[arg(long)]
    pub back_ratio: Option<Decimal>,

    /// Upper bound of the price search
    #[arg(long)]
    pub ceiling: Option<Decimal>,
}

fn loan_input(args: &LoanArgs) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    if let Some(loaded) = input::load(args.input.as_deref())? {
        return Ok(loaded);
    }
    let defaults = AmortizationInput::default();
    Ok(AmortizationInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
        term_years: args.years.unwrap_or(defaults.term_years),
        extra_per_period: args.extra.unwrap_or(defaults.extra_per_period),
        frequency: match args.frequency.as_deref() {
            Some(raw) => input::parse_choice("frequency", raw)?,
            None => defaults.frequency,
        },
        start_date: args.start_date,
    })
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args.loan)?;
    let result = amortization::amortize(&loan);
    if args.strict {
        result.result.require_converged()?;
    }

    let yearly = args
        .yearly
        .then(|| amortization::yearly_summary(&result.result.schedule, result.result.periods_per_year));
    let mut value = serde_json::to_value(result)?;
    if let (Some(years), Some(Value::Object(body))) = (yearly, value.get_mut("result")) {
        body.insert("yearly".into(), serde_json::to_value(years)?);
    }
    Ok(value)
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args.loan)?;
    let result = amortization::compare_payoff(&loan);
    Ok(serde_json::to_value(result)?)
}

pub fn run_afford(args: AffordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            let defaults = AffordabilityInput::default();
            AffordabilityInput {
                annual_income: args
                    .income
                    .ok_or("--income is required (or provide --input)")?,
                monthly_debts: args.debts.unwrap_or(defaults.monthly_debts),
                down_payment: args.down.unwrap_or(defaults.down_payment),
                annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
                term_years: args.years.unwrap_or(defaults.term_years),
                property_tax_rate_pct: args.tax_rate.unwrap_or(defaults.property_tax_rate_pct),
                annual_insurance: args.insurance.unwrap_or(defaults.annual_insurance),
                monthly_hoa: args.hoa.unwrap_or(defaults.monthly_hoa),
                front_end_ratio_pct: args.front_ratio.unwrap_or(defaults.front_end_ratio_pct),
                back_end_ratio_pct: args.back_ratio.unwrap_or(defaults.back_end_ratio_pct),
                price_ceiling: args.ceiling.unwrap_or(defaults.price_ceiling),
            }
        }
    };
    let result = affordability::analyze_affordability(&afford_input);
    Ok(serde_json::to_value(result)?)
}
