use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::lifecycle::{Loan, Payment};
use crate::{LendError, LendResult};

/// Storage for loans and their payments.
///
/// `commit` must be atomic: the loan update and the optional payment land
/// together or not at all, and only if the stored version still equals
/// `expected_version`.
pub trait LoanRepository: Send + Sync {
    fn fetch(&self, loan_id: &str) -> LendResult<Loan>;

    fn insert(&self, loan: Loan) -> LendResult<()>;

    fn commit(&self, loan: &Loan, expected_version: u64, payment: Option<&Payment>)
        -> LendResult<()>;

    fn payments_for(&self, loan_id: &str) -> LendResult<Vec<Payment>>;
}

#[derive(Default)]
struct Tables {
    loans: HashMap<String, Loan>,
    payments: HashMap<String, Vec<Payment>>,
    payment_ids: HashSet<String>,
}

/// Mutex-guarded repository for tests, the CLI and single-process use.
#[derive(Default)]
pub struct InMemoryLoanRepository {
    tables: Mutex<Tables>,
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loans(&self) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self.tables.lock().loans.values().cloned().collect();
        loans.sort_by(|a, b| a.loan_id.cmp(&b.loan_id));
        loans
    }

    pub fn all_payments(&self) -> Vec<Payment> {
        let tables = self.tables.lock();
        let mut payments: Vec<Payment> = tables.payments.values().flatten().cloned().collect();
        payments.sort_by(|a, b| a.paid_at.cmp(&b.paid_at));
        payments
    }
}

impl LoanRepository for InMemoryLoanRepository {
    fn fetch(&self, loan_id: &str) -> LendResult<Loan> {
        self.tables
            .lock()
            .loans
            .get(loan_id)
            .cloned()
            .ok_or_else(|| LendError::Persistence(format!("loan {loan_id} not found")))
    }

    fn insert(&self, loan: Loan) -> LendResult<()> {
        let mut tables = self.tables.lock();
        if tables.loans.contains_key(&loan.loan_id) {
            return Err(LendError::InvalidInput {
                field: "loan_id".into(),
                reason: format!("Loan {} already exists.", loan.loan_id),
            });
        }
        tables.loans.insert(loan.loan_id.clone(), loan);
        Ok(())
    }

    fn commit(
        &self,
        loan: &Loan,
        expected_version: u64,
        payment: Option<&Payment>,
    ) -> LendResult<()> {
        let mut tables = self.tables.lock();

        let stored_version = tables
            .loans
            .get(&loan.loan_id)
            .map(|l| l.version)
            .ok_or_else(|| LendError::Persistence(format!("loan {} not found", loan.loan_id)))?;
        if stored_version != expected_version {
            return Err(LendError::Persistence(format!(
                "version conflict on loan {}: expected {}, found {}",
                loan.loan_id, expected_version, stored_version
            )));
        }
        if let Some(p) = payment {
            if tables.payment_ids.contains(&p.payment_id) {
                return Err(LendError::InvalidInput {
                    field: "payment_id".into(),
                    reason: format!("Payment {} is already recorded.", p.payment_id),
                });
            }
        }

        tables.loans.insert(loan.loan_id.clone(), loan.clone());
        if let Some(p) = payment {
            tables.payment_ids.insert(p.payment_id.clone());
            tables
                .payments
                .entry(p.loan_id.clone())
                .or_default()
                .push(p.clone());
        }
        Ok(())
    }

    fn payments_for(&self, loan_id: &str) -> LendResult<Vec<Payment>> {
        Ok(self
            .tables
            .lock()
            .payments
            .get(loan_id)
            .cloned()
            .unwrap_or_default())
    }
}
