mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::holdings::{EvaluateArgs, SwapScreenArgs};
use commands::recovery::{
    CompoundingArgs, FixedCouponArgs, RecoveryFileArgs, SimpleRecoveryArgs,
};

/// Private credit holdings evaluation and discount-recovery simulation
#[derive(Parser)]
#[command(
    name = "cdesk",
    version,
    about = "Private credit holdings evaluation and discount-recovery simulation",
    long_about = "A CLI for evaluating a private credit book (Debêntures, CRAs, CRIs) \
                  exported from custody, with decimal precision. Computes annualized \
                  returns, sell/reallocate suggestions, filtered summaries, and how long \
                  a discounted sale takes to recover in a higher-yielding replacement."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML file with desk defaults
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug detail to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a holdings export: metrics, suggestions, filters and summary
    Evaluate(EvaluateArgs),
    /// Discount recovery with a simple annualized gain
    RecoverySimple(SimpleRecoveryArgs),
    /// Discount recovery with monthly compounding and periodic coupons
    RecoveryCompounding(CompoundingArgs),
    /// Discount recovery paid down by a fixed coupon amount
    RecoveryFixedCoupon(FixedCouponArgs),
    /// Run any recovery model from a JSON document
    Recovery(RecoveryFileArgs),
    /// Screen discounted holdings against a replacement asset
    SwapScreen(SwapScreenArgs),
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

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let desk = match config::load_config(cli.config.as_deref()) {
        Ok(desk) => desk,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::holdings::run_evaluate(args, &desk),
        Commands::RecoverySimple(args) => commands::recovery::run_simple(args, &desk),
        Commands::RecoveryCompounding(args) => commands::recovery::run_compounding(args, &desk),
        Commands::RecoveryFixedCoupon(args) => commands::recovery::run_fixed_coupon(args, &desk),
        Commands::Recovery(args) => commands::recovery::run_from_file(args, &desk),
        Commands::SwapScreen(args) => commands::holdings::run_swap_screen(args, &desk),
        Commands::Version => {
            println!("cdesk {}", env!("CARGO_PKG_VERSION"));
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
