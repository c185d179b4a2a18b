use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::lifecycle::{Loan, LoanStatus, Payment};
use crate::{types::*, LendError, LendResult};

/// Totals over one borrower's loans and payments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_loans: u32,
    pub pending_loans: u32,
    pub active_loans: u32,
    pub completed_loans: u32,
    pub defaulted_loans: u32,
    pub total_principal: Money,
    /// Every recorded payment, whatever the loan's state.
    pub total_repaid: Money,
    /// Active totals minus payments against active loans, floored at zero.
    pub outstanding_amount: Money,
    pub credit_limit: Money,
    /// outstanding / credit_limit; zero when there is no limit.
    pub credit_utilization: Rate,
    /// Share of active totals already repaid.
    pub repayment_progress: Rate,
    /// Daily installments still to come across active loans.
    pub pending_payments: u32,
}

/// Fold loans and payments into summary figures. Pure; empty input gives an
/// all-zero summary. Totals beyond the range of `Decimal` are reported as
/// `InvalidInput` naming the sum that overflowed.
pub fn aggregate_loans(
    loans: &[Loan],
    payments: &[Payment],
    credit_limit: Money,
) -> LendResult<PortfolioSummary> {
    let mut summary = PortfolioSummary {
        credit_limit,
        ..PortfolioSummary::default()
    };

    let mut paid_by_loan: HashMap<&str, Money> = HashMap::new();
    for p in payments {
        summary.total_repaid = add_to(summary.total_repaid, p.amount, "total_repaid")?;
        let paid = paid_by_loan.entry(p.loan_id.as_str()).or_insert(Decimal::ZERO);
        *paid = add_to(*paid, p.amount, "total_repaid")?;
    }

    let mut active_ids: HashSet<&str> = HashSet::new();
    let mut active_total = Decimal::ZERO;
    for loan in loans {
        summary.total_loans += 1;
        summary.total_principal =
            add_to(summary.total_principal, loan.principal, "total_principal")?;
        match loan.status {
            LoanStatus::Pending => summary.pending_loans += 1,
            LoanStatus::Active => {
                summary.active_loans += 1;
                active_total = add_to(active_total, loan.total_amount, "outstanding_amount")?;
                active_ids.insert(loan.loan_id.as_str());

                let paid = paid_by_loan
                    .get(loan.loan_id.as_str())
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let left = remaining_installments(loan, paid)?;
                summary.pending_payments = summary.pending_payments.saturating_add(left);
            }
            LoanStatus::Completed => summary.completed_loans += 1,
            LoanStatus::Defaulted => summary.defaulted_loans += 1,
            LoanStatus::Cancelled => {}
        }
    }

    let paid_on_active = active_ids
        .iter()
        .filter_map(|id| paid_by_loan.get(id))
        .try_fold(Decimal::ZERO, |acc, paid| add_to(acc, *paid, "repayment_progress"))?;

    let raw_outstanding = active_total
        .checked_sub(paid_on_active)
        .ok_or_else(|| overflow("outstanding_amount"))?;
    if raw_outstanding < Decimal::ZERO {
        warn!(
            %active_total,
            %paid_on_active,
            "payments exceed active loan totals; outstanding floored at zero"
        );
    }
    summary.outstanding_amount = raw_outstanding.max(Decimal::ZERO);

    summary.credit_utilization = if credit_limit > Decimal::ZERO {
        summary
            .outstanding_amount
            .checked_div(credit_limit)
            .ok_or_else(|| overflow("credit_utilization"))?
    } else {
        Decimal::ZERO
    };
    summary.repayment_progress = if active_total > Decimal::ZERO {
        paid_on_active
            .checked_div(active_total)
            .ok_or_else(|| overflow("repayment_progress"))?
            .min(Decimal::ONE)
    } else {
        Decimal::ZERO
    };

    Ok(summary)
}

fn add_to(total: Money, amount: Money, field: &str) -> LendResult<Money> {
    total.checked_add(amount).ok_or_else(|| overflow(field))
}

fn overflow(field: &str) -> LendError {
    LendError::InvalidInput {
        field: field.into(),
        reason: "Sum over the supplied loans and payments overflows.".into(),
    }
}

fn remaining_installments(loan: &Loan, paid: Money) -> LendResult<u32> {
    let remaining = loan
        .total_amount
        .checked_sub(paid)
        .ok_or_else(|| overflow("pending_payments"))?;
    if remaining <= Decimal::ZERO || loan.daily_payment <= Decimal::ZERO {
        return Ok(0);
    }
    // An unrepresentable quotient is past the term.
    let count = remaining
        .checked_div(loan.daily_payment)
        .and_then(|days| days.ceil().to_u32())
        .map_or(loan.term_days, |n| n.min(loan.term_days));
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{LoanApplication, LoanEvent, PaymentMethod};
    use chrono::{DateTime, NaiveDate};
    use rust_decimal_macros::dec;

    fn loan(id: &str, principal: Decimal, status: LoanStatus) -> Loan {
        let mut loan = Loan::from_application(&LoanApplication {
            loan_id: id.into(),
            borrower_id: "retailer-1".into(),
            lender_id: None,
            supplier_id: None,
            principal,
            daily_rate: dec!(0.01),
            term_days: 10,
        })
        .unwrap();
        if status != LoanStatus::Pending {
            loan.apply(&LoanEvent::Disburse {
                on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .unwrap();
        }
        loan.status = status;
        loan
    }

    fn payment(loan_id: &str, amount: Decimal) -> Payment {
        Payment {
            payment_id: format!("{loan_id}-{amount}"),
            loan_id: loan_id.into(),
            amount,
            method: PaymentMethod::MobileMoney,
            paid_at: DateTime::from_timestamp(1_704_200_000, 0).unwrap(),
            reference: None,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let s = aggregate_loans(&[], &[], Decimal::ZERO).unwrap();
        assert_eq!(s, PortfolioSummary::default());
        assert_eq!(s.credit_utilization, Decimal::ZERO);
    }

    #[test]
    fn test_installments_left() {
        // 1000 * 1.1 = 1100 over 10 days = 110/day; 330 paid leaves 7 days
        let l = loan("a", dec!(1_000), LoanStatus::Active);
        let s = aggregate_loans(&[l], &[payment("a", dec!(330))], dec!(10_000)).unwrap();
        assert_eq!(s.pending_payments, 7);
        // A partial day still counts as one installment.
        let l = loan("a", dec!(1_000), LoanStatus::Active);
        let s = aggregate_loans(&[l], &[payment("a", dec!(300))], dec!(10_000)).unwrap();
        assert_eq!(s.pending_payments, 8);
    }

    #[test]
    fn test_payment_sum_overflow_is_an_error() {
        let payments = [payment("a", Decimal::MAX), payment("b", Decimal::MAX)];
        match aggregate_loans(&[], &payments, dec!(10_000)) {
            Err(LendError::InvalidInput { field, .. }) => assert_eq!(field, "total_repaid"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_principal_sum_overflow_is_an_error() {
        let mut a = loan("a", dec!(1_000), LoanStatus::Pending);
        let mut b = loan("b", dec!(1_000), LoanStatus::Pending);
        a.principal = Decimal::MAX;
        b.principal = Decimal::MAX;
        match aggregate_loans(&[a, b], &[], dec!(10_000)) {
            Err(LendError::InvalidInput { field, .. }) => assert_eq!(field, "total_principal"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_active_total_overflow_is_an_error() {
        let mut a = loan("a", dec!(1_000), LoanStatus::Active);
        let mut b = loan("b", dec!(1_000), LoanStatus::Active);
        a.total_amount = Decimal::MAX;
        b.total_amount = Decimal::MAX;
        match aggregate_loans(&[a, b], &[], dec!(10_000)) {
            Err(LendError::InvalidInput { field, .. }) => assert_eq!(field, "outstanding_amount"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_overpaid_data_floors_outstanding() {
        let l = loan("a", dec!(1_000), LoanStatus::Active);
        let s = aggregate_loans(&[l], &[payment("a", dec!(5_000))], dec!(10_000)).unwrap();
        assert_eq!(s.outstanding_amount, Decimal::ZERO);
        assert_eq!(s.repayment_progress, Decimal::ONE);
        assert_eq!(s.pending_payments, 0);
    }
}
