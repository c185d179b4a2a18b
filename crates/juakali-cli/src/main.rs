mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

use commands::credit::CreditLimitArgs;
use commands::dashboard::DashboardArgs;
use commands::lifecycle::{ApplyEventArgs, OpenLoanArgs, RecordPaymentArgs};
use commands::loan::{LoanTermsArgs, ScheduleArgs};

/// JuaKali Lend credit calculations
#[derive(Parser)]
#[command(
    name = "jkl",
    version,
    about = "JuaKali Lend stock-credit calculations",
    long_about = "Prices daily-interest stock loans, evaluates credit limits, applies loan \
                  lifecycle events and builds borrower dashboards, all with decimal precision. \
                  Every command accepts flags, a JSON/YAML --input file, or JSON on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr (RUST_LOG is honoured otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a daily-interest loan (total, daily payment, interest)
    LoanTerms(LoanTermsArgs),
    /// List the daily installments for a loan
    RepaymentSchedule(ScheduleArgs),
    /// Evaluate a borrower's credit limit and available credit
    CreditLimit(CreditLimitArgs),
    /// Open a pending loan from an application
    OpenLoan(OpenLoanArgs),
    /// Apply a lifecycle event (disburse, reject, payment, mark_default) to a loan
    ApplyEvent(ApplyEventArgs),
    /// Record a repayment against a loan
    RecordPayment(RecordPaymentArgs),
    /// Summarise a borrower's loans and payments
    Dashboard(DashboardArgs),
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("{}: tracing init failed: {}", "warning".yellow().bold(), e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::LoanTerms(args) => commands::loan::run_loan_terms(args),
        Commands::RepaymentSchedule(args) => commands::loan::run_schedule(args),
        Commands::CreditLimit(args) => commands::credit::run_credit_limit(args),
        Commands::OpenLoan(args) => commands::lifecycle::run_open_loan(args),
        Commands::ApplyEvent(args) => commands::lifecycle::run_apply_event(args),
        Commands::RecordPayment(args) => commands::lifecycle::run_record_payment(args),
        Commands::Dashboard(args) => commands::dashboard::run_dashboard(args),
        Commands::Version => {
            println!("jkl {}", env!("CARGO_PKG_VERSION"));
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
