use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use juakali_core::lifecycle::{
    self, Loan, LoanApplication, LoanEvent, Payment, PaymentInput, PaymentMethod, TransitionInput,
};

use super::load_input;
use crate::input;

/// Arguments for opening a loan
#[derive(Args)]
pub struct OpenLoanArgs {
    /// Path to JSON/YAML loan application (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub loan_id: Option<String>,

    #[arg(long)]
    pub borrower_id: Option<String>,

    #[arg(long)]
    pub lender_id: Option<String>,

    #[arg(long)]
    pub supplier_id: Option<String>,

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EventKind {
    Disburse,
    Reject,
    MarkDefault,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    MobileMoney,
    BankTransfer,
    Wallet,
}

impl From<MethodArg> for PaymentMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::MobileMoney => PaymentMethod::MobileMoney,
            MethodArg::BankTransfer => PaymentMethod::BankTransfer,
            MethodArg::Wallet => PaymentMethod::Wallet,
        }
    }
}

/// Arguments for applying a lifecycle event
#[derive(Args)]
pub struct ApplyEventArgs {
    /// Path to JSON/YAML file holding {"loan": ..., "event": ...}
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a loan snapshot (used with --event)
    #[arg(long)]
    pub loan: Option<String>,

    /// Event to apply to the --loan snapshot
    #[arg(long, value_enum)]
    pub event: Option<EventKind>,

    /// Effective date for disburse / mark-default (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub on: Option<NaiveDate>,

    /// Rejection reason
    #[arg(long)]
    pub reason: Option<String>,

    /// Write the updated loan back to the --loan file
    #[arg(long, requires = "loan")]
    pub save: bool,
}

/// Arguments for recording a repayment
#[derive(Args)]
pub struct RecordPaymentArgs {
    /// Path to JSON/YAML file holding {"loan": ..., "payment": ...}
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a loan snapshot (used with --amount)
    #[arg(long)]
    pub loan: Option<String>,

    /// Amount received
    #[arg(long)]
    pub amount: Option<Decimal>,

    #[arg(long, value_enum, default_value = "mobile-money")]
    pub method: MethodArg,

    /// Payment id; defaults to one derived from the loan version
    #[arg(long)]
    pub payment_id: Option<String>,

    /// Gateway receipt (M-Pesa code, bank reference)
    #[arg(long)]
    pub reference: Option<String>,

    /// Write the updated loan back to the --loan file
    #[arg(long, requires = "loan")]
    pub save: bool,
}

pub fn run_open_loan(args: OpenLoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let app: LoanApplication = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LoanApplication {
            loan_id: args
                .loan_id
                .ok_or("--loan-id is required (or provide --input)")?,
            borrower_id: args
                .borrower_id
                .ok_or("--borrower-id is required (or provide --input)")?,
            lender_id: args.lender_id,
            supplier_id: args.supplier_id,
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

    let result = lifecycle::open_loan(&app)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_apply_event(args: ApplyEventArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let transition_input: TransitionInput = match args.loan {
        Some(ref path) => {
            let loan: Loan = input::file::read_structured(path)?;
            let on = args.on.unwrap_or_else(today);
            let event = match args.event.ok_or("--event is required with --loan")? {
                EventKind::Disburse => LoanEvent::Disburse { on },
                EventKind::Reject => LoanEvent::Reject {
                    reason: args.reason.clone(),
                },
                EventKind::MarkDefault => LoanEvent::MarkDefault { as_of: on },
            };
            TransitionInput { loan, event }
        }
        None => load_input(args.input.as_deref())?
            .ok_or("apply-event needs --input, JSON on stdin, or --loan with --event")?,
    };

    let result = lifecycle::transition_loan(&transition_input)?;
    if let (true, Some(path)) = (args.save, args.loan.as_deref()) {
        input::file::write_json(path, &result.result.loan)?;
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_record_payment(args: RecordPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment_input: PaymentInput = match args.loan {
        Some(ref path) => {
            let loan: Loan = input::file::read_structured(path)?;
            let payment = Payment {
                payment_id: args
                    .payment_id
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}", loan.loan_id, loan.version + 1)),
                loan_id: loan.loan_id.clone(),
                amount: args.amount.ok_or("--amount is required with --loan")?,
                method: args.method.into(),
                paid_at: Utc::now(),
                reference: args.reference.clone(),
            };
            PaymentInput { loan, payment }
        }
        None => load_input(args.input.as_deref())?
            .ok_or("record-payment needs --input, JSON on stdin, or --loan with --amount")?,
    };

    let result = lifecycle::apply_payment(&payment_input)?;
    if let (true, Some(path)) = (args.save, args.loan.as_deref()) {
        input::file::write_json(path, &result.result.loan)?;
    }
    Ok(serde_json::to_value(result)?)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
