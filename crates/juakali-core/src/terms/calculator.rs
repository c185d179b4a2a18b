use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{types::*, LendError, LendResult};

/// Daily rates above this are almost always a data-entry mistake (10%/day).
const HIGH_DAILY_RATE: Rate = dec!(0.10);

/// Stock-financing loans are short-term; anything past a year is flagged.
const LONG_TERM_DAYS: u32 = 365;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTermsInput {
    pub principal: Money,
    /// Fraction of principal charged per day, applied linearly (0.05 = 5%/day).
    pub daily_rate: Rate,
    pub term_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTermsOutput {
    pub principal: Money,
    pub daily_rate: Rate,
    pub term_days: u32,
    /// principal * (1 + daily_rate * term_days), unrounded.
    pub total_amount: Money,
    /// total_amount / term_days, unrounded.
    pub daily_payment: Money,
    pub total_interest: Money,
    /// The same figures rounded to the minor unit, as stored on a loan record.
    pub rounded: RoundedTerms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundedTerms {
    pub total_amount: Money,
    pub daily_payment: Money,
    pub total_interest: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a simple daily-interest loan and wrap the result in the standard
/// computation envelope.
pub fn calculate_loan_terms(
    input: &LoanTermsInput,
) -> LendResult<ComputationOutput<LoanTermsOutput>> {
    let start = Instant::now();
    let output = compute_terms(input)?;

    let mut warnings: Vec<String> = Vec::new();
    if input.daily_rate > HIGH_DAILY_RATE {
        warnings.push(format!(
            "Daily rate of {} exceeds {} per day; check the rate is a fraction, not a percentage.",
            input.daily_rate, HIGH_DAILY_RATE
        ));
    }
    if input.term_days > LONG_TERM_DAYS {
        warnings.push(format!(
            "Term of {} days is longer than {} days.",
            input.term_days, LONG_TERM_DAYS
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "interest": "linear on principal, not compounded",
        "rounding": format!("{MONEY_DP} dp, half-up, applied to the rounded block only"),
    });

    Ok(with_metadata(
        "Simple daily interest (principal x (1 + rate x days))",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Validated terms arithmetic without the envelope. The lifecycle uses this
/// directly when a loan record is opened.
pub fn compute_terms(input: &LoanTermsInput) -> LendResult<LoanTermsOutput> {
    validate_input(input)?;

    let days = Decimal::from(input.term_days);
    let total_amount = input
        .daily_rate
        .checked_mul(days)
        .and_then(|interest| interest.checked_add(Decimal::ONE))
        .and_then(|factor| input.principal.checked_mul(factor))
        .ok_or_else(|| LendError::InvalidLoanTerms {
            field: "principal".into(),
            reason: format!(
                "Total repayable on {} at {} per day over {} days overflows.",
                input.principal, input.daily_rate, input.term_days
            ),
        })?;
    let daily_payment = total_amount / days;
    let total_interest = total_amount - input.principal;

    Ok(LoanTermsOutput {
        principal: input.principal,
        daily_rate: input.daily_rate,
        term_days: input.term_days,
        total_amount,
        daily_payment,
        total_interest,
        rounded: RoundedTerms {
            total_amount: round_money(total_amount),
            daily_payment: round_money(daily_payment),
            total_interest: round_money(total_interest),
        },
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &LoanTermsInput) -> LendResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(LendError::InvalidLoanTerms {
            field: "principal".into(),
            reason: "Principal must be positive.".into(),
        });
    }
    if input.daily_rate < Decimal::ZERO || input.daily_rate >= Decimal::ONE {
        return Err(LendError::InvalidLoanTerms {
            field: "daily_rate".into(),
            reason: "Daily rate must be at least 0 and below 1 (a fraction, not a percentage)."
                .into(),
        });
    }
    if input.term_days == 0 {
        return Err(LendError::InvalidLoanTerms {
            field: "term_days".into(),
            reason: "Term must be at least one day.".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
