use tracing::debug;

use super::repository::LoanRepository;
use crate::lifecycle::{Loan, LoanApplication, LoanEvent, Payment, TransitionRecord};
use crate::LendResult;

/// Load-apply-commit over a [`LoanRepository`].
pub struct LoanLedger<R: LoanRepository> {
    repo: R,
}

impl<R: LoanRepository> LoanLedger<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Price an application and store it as a `pending` loan.
    pub fn open_loan(&self, app: &LoanApplication) -> LendResult<Loan> {
        let loan = Loan::from_application(app)?;
        self.repo.insert(loan.clone())?;
        debug!(loan_id = %loan.loan_id, total = %loan.total_amount, "loan opened");
        Ok(loan)
    }

    /// Apply `event` to the stored loan. Fails with a retryable
    /// `Persistence` error if another writer got there first.
    pub fn apply_event(&self, loan_id: &str, event: &LoanEvent) -> LendResult<(Loan, TransitionRecord)> {
        let mut loan = self.repo.fetch(loan_id)?;
        let expected_version = loan.version;
        let record = loan.apply(event)?;

        let payment = match event {
            LoanEvent::Payment(p) => Some(p),
            _ => None,
        };
        self.repo.commit(&loan, expected_version, payment)?;
        debug!(
            loan_id,
            version = loan.version,
            status = %loan.status,
            "loan committed"
        );
        Ok((loan, record))
    }

    pub fn post_payment(&self, payment: &Payment) -> LendResult<TransitionRecord> {
        let (_, record) =
            self.apply_event(&payment.loan_id, &LoanEvent::Payment(payment.clone()))?;
        Ok(record)
    }
}
