mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::process;

use commands::auto_lease::LeaseVsBuyArgs;
use commands::mortgage::{AffordArgs, AmortizeArgs, PayoffArgs};
use commands::rates::RatesArgs;
use commands::savings::CompoundArgs;
use commands::wealth::RetireArgs;

/// Consumer financial calculators with decimal precision
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Consumer financial calculators with decimal precision",
    long_about = "A CLI for household finance calculations with decimal precision. \
                  Supports mortgage amortization and payoff, home affordability, \
                  lease-vs-buy comparison, compound interest and retirement projections."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a loan amortization schedule
    Amortize(AmortizeArgs),
    /// Compare payoff with and without extra payments
    Payoff(PayoffArgs),
    /// Find the highest affordable home price
    Afford(AffordArgs),
    /// Compare the total cost of leasing and buying a car
    LeaseVsBuy(LeaseVsBuyArgs),
    /// Project compound growth with contributions
    Compound(CompoundArgs),
    /// Project retirement savings in nominal and real terms
    Retire(RetireArgs),
    /// Show average mortgage rates for a state
    Rates(RatesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("{}: logger setup failed: {}", "warning".yellow(), e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::mortgage::run_amortize(args),
        Commands::Payoff(args) => commands::mortgage::run_payoff(args),
        Commands::Afford(args) => commands::mortgage::run_afford(args),
        Commands::LeaseVsBuy(args) => commands::auto_lease::run_lease_vs_buy(args),
        Commands::Compound(args) => commands::savings::run_compound(args),
        Commands::Retire(args) => commands::wealth::run_retire(args),
        Commands::Rates(args) => commands::rates::run_rates(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
