use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use juakali_core::terms::calculator::{self, LoanTermsInput};
use juakali_core::terms::schedule::{self, ScheduleInput};

use super::load_input;

/// Arguments for pricing a loan
#[derive(Args)]
pub struct LoanTermsArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Daily interest rate as a fraction (0.05 = 5% per day)
    #[arg(long, alias = "rate")]
    pub daily_rate: Option<Decimal>,

    /// Term in days
    #[arg(long, alias = "days")]
    pub term_days: Option<u32>,
}

/// Arguments for the daily repayment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Daily interest rate as a fraction (0.05 = 5% per day)
    #[arg(long, alias = "rate")]
    pub daily_rate: Option<Decimal>,

    /// Term in days
    #[arg(long, alias = "days")]
    pub term_days: Option<u32>,

    /// Disbursement date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub disbursement_date: Option<NaiveDate>,
}

pub fn run_loan_terms(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms_input: LoanTermsInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LoanTermsInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            daily_rate: args
                .daily_rate
                .ok_or("--daily-rate is required (or provide --input)")?,
            term_days: args
                .term_days
                .ok_or("--term-days is required (or provide --input)")?,
        },
    };

    let result = calculator::calculate_loan_terms(&terms_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            daily_rate: args
                .daily_rate
                .ok_or("--daily-rate is required (or provide --input)")?,
            term_days: args
                .term_days
                .ok_or("--term-days is required (or provide --input)")?,
            disbursement_date: args
                .disbursement_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        },
    };

    let result = schedule::build_repayment_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
