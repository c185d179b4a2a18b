use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::calculator::{compute_terms, LoanTermsInput};
use crate::{types::*, LendError, LendResult};

/// Longest term a schedule is listed for (ten years of daily installments).
pub const MAX_SCHEDULE_DAYS: u32 = 3_650;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    pub daily_rate: Rate,
    pub term_days: u32,
    pub disbursement_date: NaiveDate,
}

/// One daily installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub day: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    pub installments: Vec<Installment>,
    /// Sum of installments; equals the rounded total amount exactly.
    pub total_scheduled: Money,
    pub final_due_date: NaiveDate,
    /// Final installment minus the regular daily payment.
    pub rounding_adjustment: Money,
}

/// Lay out the daily installments for a loan disbursed on
/// `disbursement_date`. The last installment absorbs any rounding residue.
pub fn build_repayment_schedule(
    input: &ScheduleInput,
) -> LendResult<ComputationOutput<RepaymentSchedule>> {
    let start = Instant::now();

    if input.term_days > MAX_SCHEDULE_DAYS {
        return Err(LendError::InvalidLoanTerms {
            field: "term_days".into(),
            reason: format!(
                "Schedules are listed for at most {MAX_SCHEDULE_DAYS} days, got {}.",
                input.term_days
            ),
        });
    }
    let final_due_date = add_days(input.disbursement_date, input.term_days)?;

    let terms = compute_terms(&LoanTermsInput {
        principal: input.principal,
        daily_rate: input.daily_rate,
        term_days: input.term_days,
    })?;
    let total = terms.rounded.total_amount;
    let daily = terms.rounded.daily_payment;

    let mut installments = Vec::new();
    let mut remaining = total;
    for day in 1..=input.term_days {
        let amount = if day == input.term_days {
            remaining
        } else {
            daily.min(remaining)
        };
        remaining -= amount;
        installments.push(Installment {
            day,
            due_date: add_days(input.disbursement_date, day)?,
            amount,
            remaining_balance: remaining,
        });
    }

    let final_amount = installments.last().map(|i| i.amount).unwrap_or(Decimal::ZERO);

    let mut warnings = Vec::new();
    let rounding_adjustment = final_amount - daily;
    if !rounding_adjustment.is_zero() {
        warnings.push(format!(
            "Final installment adjusted by {rounding_adjustment} to absorb rounding."
        ));
    }

    let schedule = RepaymentSchedule {
        total_scheduled: installments.iter().map(|i| i.amount).sum(),
        installments,
        final_due_date,
        rounding_adjustment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "daily_payment": daily.to_string(),
        "total_amount": total.to_string(),
        "first_due": "one day after disbursement",
    });

    Ok(with_metadata(
        "Level daily installments with final-day rounding true-up",
        &assumptions,
        warnings,
        elapsed,
        schedule,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_sums_to_rounded_total() {
        let input = ScheduleInput {
            principal: dec!(50_000),
            daily_rate: dec!(0.05),
            term_days: 30,
            disbursement_date: date(2024, 3, 1),
        };
        let out = build_repayment_schedule(&input).unwrap();
        let s = &out.result;
        assert_eq!(s.installments.len(), 30);
        assert_eq!(s.total_scheduled, dec!(125_000));
        // 29 * 4166.67 = 120_833.43; last = 4_166.57
        assert_eq!(s.installments[0].amount, dec!(4166.67));
        assert_eq!(s.installments[29].amount, dec!(4166.57));
        assert_eq!(s.rounding_adjustment, dec!(-0.10));
        assert_eq!(s.installments[29].remaining_balance, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_due_dates_follow_disbursement() {
        let input = ScheduleInput {
            principal: dec!(3_000),
            daily_rate: dec!(0.01),
            term_days: 3,
            disbursement_date: date(2024, 2, 28),
        };
        let s = build_repayment_schedule(&input).unwrap().result;
        let dates: Vec<NaiveDate> = s.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 2)]);
        assert_eq!(s.final_due_date, date(2024, 3, 2));
        // 3000 * 1.03 = 3090, split evenly
        assert!(s.installments.iter().all(|i| i.amount == dec!(1030)));
    }

    #[test]
    fn test_tiny_loan_never_goes_negative() {
        // 0.05 over 10 days rounds each day up to 0.01
        let input = ScheduleInput {
            principal: dec!(0.05),
            daily_rate: Decimal::ZERO,
            term_days: 10,
            disbursement_date: date(2024, 1, 1),
        };
        let s = build_repayment_schedule(&input).unwrap().result;
        assert_eq!(s.total_scheduled, dec!(0.05));
        assert!(s.installments.iter().all(|i| i.amount >= Decimal::ZERO));
        assert!(s
            .installments
            .iter()
            .all(|i| i.remaining_balance >= Decimal::ZERO));
    }

    #[test]
    fn test_term_beyond_listing_limit_rejected() {
        let input = ScheduleInput {
            principal: dec!(1_000),
            daily_rate: dec!(0.01),
            term_days: 200_000_000,
            disbursement_date: date(2024, 1, 1),
        };
        match build_repayment_schedule(&input) {
            Err(LendError::InvalidLoanTerms { field, .. }) => assert_eq!(field, "term_days"),
            other => panic!("expected InvalidLoanTerms, got {other:?}"),
        }
    }

    #[test]
    fn test_longest_listed_schedule() {
        let input = ScheduleInput {
            principal: dec!(36_500),
            daily_rate: Decimal::ZERO,
            term_days: MAX_SCHEDULE_DAYS,
            disbursement_date: date(2024, 1, 1),
        };
        let s = build_repayment_schedule(&input).unwrap().result;
        assert_eq!(s.installments.len(), 3_650);
        assert_eq!(s.total_scheduled, dec!(36_500));
        assert!(s.installments.iter().all(|i| i.amount == dec!(10)));
    }

    #[test]
    fn test_invalid_terms_propagate() {
        let input = ScheduleInput {
            principal: dec!(100),
            daily_rate: dec!(0.01),
            term_days: 0,
            disbursement_date: date(2024, 1, 1),
        };
        assert!(build_repayment_schedule(&input).is_err());
    }
}
