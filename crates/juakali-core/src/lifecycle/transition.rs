use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::loan::{Loan, LoanApplication, TransitionRecord};
use super::payment::Payment;
use super::status::LoanEvent;
use crate::{types::*, LendResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionInput {
    pub loan: Loan,
    pub event: LoanEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub loan: Loan,
    pub payment: Payment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionOutput {
    pub loan: Loan,
    pub transition: TransitionRecord,
}

/// Open a `pending` loan from an application.
pub fn open_loan(app: &LoanApplication) -> LendResult<ComputationOutput<Loan>> {
    let start = Instant::now();
    let loan = Loan::from_application(app)?;
    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "status": "pending until disbursed",
        "rounding": format!("{MONEY_DP} dp, half-up"),
    });
    Ok(with_metadata(
        "Loan application priced with simple daily interest",
        &assumptions,
        Vec::new(),
        elapsed,
        loan,
    ))
}

/// Apply an event to a loan snapshot and return the updated snapshot.
pub fn transition_loan(input: &TransitionInput) -> LendResult<ComputationOutput<TransitionOutput>> {
    let start = Instant::now();
    let mut loan = input.loan.clone();
    let transition = loan.apply(&input.event)?;

    let mut warnings = Vec::new();
    if transition.to.is_terminal() {
        warnings.push(format!(
            "Loan {} is now {}; no further events will be accepted.",
            loan.loan_id, transition.to
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "persistence": "caller must store the loan with a version check against the input version",
        "input_version": input.loan.version,
    });
    Ok(with_metadata(
        "Loan lifecycle state machine",
        &assumptions,
        warnings,
        elapsed,
        TransitionOutput { loan, transition },
    ))
}

/// Record a repayment against a loan snapshot.
pub fn apply_payment(input: &PaymentInput) -> LendResult<ComputationOutput<TransitionOutput>> {
    transition_loan(&TransitionInput {
        loan: input.loan.clone(),
        event: LoanEvent::Payment(input.payment.clone()),
    })
}
