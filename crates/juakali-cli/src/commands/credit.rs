use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use juakali_core::credit::limit::{self, CreditLimitInput, CreditPolicy};

use super::load_input;
use crate::input;

/// Arguments for credit limit evaluation
#[derive(Args)]
pub struct CreditLimitArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Credit score
    #[arg(long, alias = "score")]
    pub credit_score: Option<i32>,

    /// Balance currently owed across the borrower's loans
    #[arg(long, default_value = "0")]
    pub outstanding: Decimal,

    /// Path to a JSON/YAML credit policy (score bounds, per-point limit, cap)
    #[arg(long)]
    pub policy: Option<String>,
}

pub fn run_credit_limit(args: CreditLimitArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut limit_input: CreditLimitInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => CreditLimitInput {
            credit_score: args
                .credit_score
                .ok_or("--credit-score is required (or provide --input)")?,
            outstanding_amount: args.outstanding,
            policy: CreditPolicy::default(),
        },
    };
    if let Some(ref path) = args.policy {
        limit_input.policy = input::file::read_structured(path)?;
    }

    let result = limit::evaluate_credit_limit(&limit_input)?;
    Ok(serde_json::to_value(result)?)
}
