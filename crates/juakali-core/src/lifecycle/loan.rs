use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::payment::Payment;
use super::status::{ensure_allowed, LoanEvent, LoanStatus};
use crate::terms::calculator::{compute_terms, LoanTermsInput};
use crate::{types::*, LendError, LendResult};

/// A borrower's request for stock credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    pub loan_id: String,
    pub borrower_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    pub principal: Money,
    pub daily_rate: Rate,
    pub term_days: u32,
}

/// The persisted loan record. Money fields are already rounded to the minor
/// unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: String,
    pub borrower_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    pub principal: Money,
    pub daily_rate: Rate,
    pub term_days: u32,
    pub total_amount: Money,
    pub daily_payment: Money,
    pub outstanding_balance: Money,
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbursement_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Bumped on every applied event; used for optimistic concurrency.
    #[serde(default)]
    pub version: u64,
}

/// What a single applied event did to a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub loan_id: String,
    pub event: String,
    pub from: LoanStatus,
    pub to: LoanStatus,
    pub balance_before: Money,
    pub balance_after: Money,
    pub version: u64,
}

impl Loan {
    /// Price the application and open a `pending` loan.
    pub fn from_application(app: &LoanApplication) -> LendResult<Self> {
        if app.loan_id.trim().is_empty() {
            return Err(LendError::InvalidInput {
                field: "loan_id".into(),
                reason: "Loan id cannot be empty.".into(),
            });
        }
        let terms = compute_terms(&LoanTermsInput {
            principal: app.principal,
            daily_rate: app.daily_rate,
            term_days: app.term_days,
        })?;

        Ok(Loan {
            loan_id: app.loan_id.clone(),
            borrower_id: app.borrower_id.clone(),
            lender_id: app.lender_id.clone(),
            supplier_id: app.supplier_id.clone(),
            principal: app.principal,
            daily_rate: app.daily_rate,
            term_days: app.term_days,
            total_amount: terms.rounded.total_amount,
            daily_payment: terms.rounded.daily_payment,
            outstanding_balance: terms.rounded.total_amount,
            status: LoanStatus::Pending,
            disbursement_date: None,
            due_date: None,
            version: 0,
        })
    }

    pub fn total_interest(&self) -> Money {
        self.total_amount - self.principal
    }

    pub fn amount_repaid(&self) -> Money {
        self.total_amount - self.outstanding_balance
    }

    /// Active, past its due date, and still owing.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status == LoanStatus::Active
            && self.outstanding_balance > Decimal::ZERO
            && self.due_date.is_some_and(|due| as_of > due)
    }

    /// Apply `event`. Everything is validated before anything is written, so
    /// on error the loan is exactly as it was.
    pub fn apply(&mut self, event: &LoanEvent) -> LendResult<TransitionRecord> {
        let from = self.status;
        let balance_before = self.outstanding_balance;

        // A settled loan owes nothing, so any further payment overpays it.
        if let (LoanStatus::Completed, LoanEvent::Payment(payment)) = (from, event) {
            payment.validate()?;
            return Err(LendError::Overpayment {
                amount: payment.amount,
                outstanding: Decimal::ZERO,
            });
        }
        ensure_allowed(from, event)?;

        let balance_after_payment = match event {
            LoanEvent::Payment(payment) => Some(self.check_payment(payment)?),
            _ => None,
        };

        match event {
            LoanEvent::Disburse { on } => {
                let due = add_days(*on, self.term_days)?;
                self.disbursement_date = Some(*on);
                self.due_date = Some(due);
                self.outstanding_balance = self.total_amount;
                self.status = LoanStatus::Active;
            }
            LoanEvent::Reject { .. } => {
                self.status = LoanStatus::Cancelled;
            }
            LoanEvent::Payment(_) => {
                let remaining = balance_after_payment.unwrap_or(balance_before);
                self.outstanding_balance = remaining;
                if remaining <= Decimal::ZERO {
                    self.status = LoanStatus::Completed;
                }
            }
            LoanEvent::MarkDefault { as_of } => {
                if !self.is_overdue(*as_of) {
                    return Err(LendError::InvalidTransition {
                        from: format!("{from} and not past due on {as_of}"),
                        event: event.name().to_string(),
                    });
                }
                self.status = LoanStatus::Defaulted;
            }
        }

        self.version += 1;
        debug!(
            loan_id = %self.loan_id,
            event = event.name(),
            %from,
            to = %self.status,
            balance = %self.outstanding_balance,
            version = self.version,
            "loan transition applied"
        );

        Ok(TransitionRecord {
            loan_id: self.loan_id.clone(),
            event: event.name().to_string(),
            from,
            to: self.status,
            balance_before,
            balance_after: self.outstanding_balance,
            version: self.version,
        })
    }

    pub fn record_payment(&mut self, payment: &Payment) -> LendResult<TransitionRecord> {
        self.apply(&LoanEvent::Payment(payment.clone()))
    }

    /// Default the loan if it is past due with a balance. Returns whether
    /// it transitioned.
    pub fn check_overdue(&mut self, as_of: NaiveDate) -> LendResult<bool> {
        if !self.is_overdue(as_of) {
            return Ok(false);
        }
        self.apply(&LoanEvent::MarkDefault { as_of })?;
        Ok(true)
    }

    /// Balance left after `payment`, or why it cannot be taken.
    fn check_payment(&self, payment: &Payment) -> LendResult<Money> {
        payment.validate()?;
        if payment.loan_id != self.loan_id {
            return Err(LendError::InvalidInput {
                field: "loan_id".into(),
                reason: format!(
                    "Payment {} is for loan {}, not {}.",
                    payment.payment_id, payment.loan_id, self.loan_id
                ),
            });
        }
        if payment.amount > self.outstanding_balance {
            return Err(LendError::Overpayment {
                amount: payment.amount,
                outstanding: self.outstanding_balance,
            });
        }
        Ok(self.outstanding_balance - payment.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::payment::PaymentMethod;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn application() -> LoanApplication {
        LoanApplication {
            loan_id: "loan-1".into(),
            borrower_id: "retailer-1".into(),
            lender_id: Some("lender-1".into()),
            supplier_id: Some("supplier-1".into()),
            principal: dec!(50_000),
            daily_rate: dec!(0.05),
            term_days: 30,
        }
    }

    fn active_loan() -> Loan {
        let mut loan = Loan::from_application(&application()).unwrap();
        loan.apply(&LoanEvent::Disburse {
            on: date(2024, 5, 1),
        })
        .unwrap();
        loan
    }

    fn payment(id: &str, amount: Decimal) -> Payment {
        Payment {
            payment_id: id.into(),
            loan_id: "loan-1".into(),
            amount,
            method: PaymentMethod::Wallet,
            paid_at: DateTime::<Utc>::from_timestamp(1_714_600_000, 0).unwrap(),
            reference: None,
        }
    }

    #[test]
    fn test_application_opens_pending_loan() {
        let loan = Loan::from_application(&application()).unwrap();
        assert_eq!(loan.status, LoanStatus::Pending);
        assert_eq!(loan.total_amount, dec!(125_000));
        assert_eq!(loan.daily_payment, dec!(4166.67));
        assert_eq!(loan.total_interest(), dec!(75_000));
        assert_eq!(loan.version, 0);
    }

    #[test]
    fn test_disburse_sets_dates() {
        let loan = active_loan();
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.disbursement_date, Some(date(2024, 5, 1)));
        assert_eq!(loan.due_date, Some(date(2024, 5, 31)));
        assert_eq!(loan.outstanding_balance, dec!(125_000));
        assert_eq!(loan.version, 1);
    }

    #[test]
    fn test_partial_payment_stays_active() {
        let mut loan = active_loan();
        let record = loan.record_payment(&payment("p1", dec!(4166.67))).unwrap();
        assert_eq!(record.to, LoanStatus::Active);
        assert_eq!(loan.outstanding_balance, dec!(120_833.33));
        assert_eq!(loan.amount_repaid(), dec!(4166.67));
    }

    #[test]
    fn test_mismatched_loan_id_rejected() {
        let mut loan = active_loan();
        let mut p = payment("p1", dec!(100));
        p.loan_id = "loan-2".into();
        assert!(matches!(
            loan.record_payment(&p),
            Err(LendError::InvalidInput { .. })
        ));
        assert_eq!(loan.outstanding_balance, dec!(125_000));
    }

    #[test]
    fn test_payment_against_pending_loan_is_invalid_transition() {
        let mut loan = Loan::from_application(&application()).unwrap();
        assert!(matches!(
            loan.record_payment(&payment("p1", dec!(100))),
            Err(LendError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_large_payment_against_pending_loan_is_invalid_transition() {
        let mut loan = Loan::from_application(&application()).unwrap();
        let before = loan.clone();
        assert!(matches!(
            loan.record_payment(&payment("p1", dec!(500_000))),
            Err(LendError::InvalidTransition { .. })
        ));
        assert_eq!(loan, before);
    }

    #[test]
    fn test_payment_against_cancelled_loan_is_invalid_transition() {
        let mut loan = Loan::from_application(&application()).unwrap();
        loan.apply(&LoanEvent::Reject { reason: None }).unwrap();
        let cancelled = loan.clone();
        match loan.record_payment(&payment("p1", dec!(500_000))) {
            Err(LendError::InvalidTransition { from, event }) => {
                assert_eq!(from, "cancelled");
                assert_eq!(event, "record a payment against");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(loan, cancelled);
    }

    #[test]
    fn test_non_positive_payment_on_settled_loan_is_invalid_input() {
        let mut loan = active_loan();
        loan.record_payment(&payment("p1", dec!(125_000))).unwrap();
        assert!(matches!(
            loan.record_payment(&payment("p2", Decimal::ZERO)),
            Err(LendError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_default_before_due_date_rejected() {
        let mut loan = active_loan();
        let before = loan.clone();
        assert!(loan
            .apply(&LoanEvent::MarkDefault {
                as_of: date(2024, 5, 31)
            })
            .is_err());
        assert_eq!(loan, before);
    }

    #[test]
    fn test_check_overdue() {
        let mut loan = active_loan();
        assert!(!loan.check_overdue(date(2024, 5, 20)).unwrap());
        assert!(loan.check_overdue(date(2024, 6, 1)).unwrap());
        assert_eq!(loan.status, LoanStatus::Defaulted);
        // Already terminal: nothing more to do.
        assert!(!loan.check_overdue(date(2024, 7, 1)).unwrap());
    }

    #[test]
    fn test_empty_loan_id_rejected() {
        let mut app = application();
        app.loan_id = " ".into();
        assert!(Loan::from_application(&app).is_err());
    }
}
