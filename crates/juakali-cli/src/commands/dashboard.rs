use clap::Args;
use serde_json::Value;

use juakali_core::dashboard::summary::{self, DashboardInput};

use super::load_input;
use crate::input;

/// Arguments for the borrower dashboard
#[derive(Args)]
pub struct DashboardArgs {
    /// Path to JSON/YAML input file: profile, loans, payments, optional policy
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON/YAML credit policy (overrides the one in the input)
    #[arg(long)]
    pub policy: Option<String>,
}

pub fn run_dashboard(args: DashboardArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut dashboard_input: DashboardInput = load_input(args.input.as_deref())?
        .ok_or("dashboard needs --input or JSON on stdin (profile, loans, payments)")?;
    if let Some(ref path) = args.policy {
        dashboard_input.policy = input::file::read_structured(path)?;
    }

    let result = summary::build_dashboard(&dashboard_input)?;
    Ok(serde_json::to_value(result)?)
}
