//! JSON-in, JSON-out entry points for the Node backends. Every handler that
//! prices a loan, moves one through its lifecycle or renders a dashboard
//! calls through here instead of re-deriving the formulas.

use napi::Result as NapiResult;
use napi_derive::napi;

use juakali_core::credit::limit::{evaluate_credit_limit, CreditLimitInput};
use juakali_core::dashboard::summary::{build_dashboard, DashboardInput};
use juakali_core::lifecycle::{self, LoanApplication, PaymentInput, TransitionInput};
use juakali_core::terms::calculator::{calculate_loan_terms, LoanTermsInput};
use juakali_core::terms::schedule::{build_repayment_schedule, ScheduleInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_terms(input_json: String) -> NapiResult<String> {
    let input: LoanTermsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculate_loan_terms(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn repayment_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = build_repayment_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Credit
// ---------------------------------------------------------------------------

#[napi]
pub fn credit_limit(input_json: String) -> NapiResult<String> {
    let input: CreditLimitInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = evaluate_credit_limit(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[napi]
pub fn open_loan(input_json: String) -> NapiResult<String> {
    let input: LoanApplication = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lifecycle::open_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn apply_loan_event(input_json: String) -> NapiResult<String> {
    let input: TransitionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lifecycle::transition_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn record_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lifecycle::apply_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[napi]
pub fn dashboard_summary(input_json: String) -> NapiResult<String> {
    let input: DashboardInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = build_dashboard(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
