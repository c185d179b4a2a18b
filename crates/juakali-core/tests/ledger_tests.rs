use chrono::{DateTime, NaiveDate};
use juakali_core::ledger::{InMemoryLoanRepository, LoanLedger, LoanRepository};
use juakali_core::lifecycle::{LoanApplication, LoanEvent, LoanStatus, Payment, PaymentMethod};
use juakali_core::LendError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

fn ledger_with_active_loan() -> LoanLedger<InMemoryLoanRepository> {
    let ledger = LoanLedger::new(InMemoryLoanRepository::new());
    ledger
        .open_loan(&LoanApplication {
            loan_id: "L1".into(),
            borrower_id: "retailer-8".into(),
            lender_id: None,
            supplier_id: None,
            principal: dec!(10_000),
            daily_rate: dec!(0.01),
            term_days: 20,
        })
        .unwrap();
    ledger
        .apply_event(
            "L1",
            &LoanEvent::Disburse {
                on: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            },
        )
        .unwrap();
    ledger
}

fn payment(id: &str, amount: Decimal) -> Payment {
    Payment {
        payment_id: id.into(),
        loan_id: "L1".into(),
        amount,
        method: PaymentMethod::MobileMoney,
        paid_at: DateTime::from_timestamp(1_725_200_000, 0).unwrap(),
        reference: None,
    }
}

#[test]
fn test_open_and_disburse() {
    let ledger = ledger_with_active_loan();
    let loan = ledger.repository().fetch("L1").unwrap();
    // 10k * 1.2
    assert_eq!(loan.total_amount, dec!(12_000));
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.version, 1);
}

#[test]
fn test_post_payment_persists_loan_and_payment() {
    let ledger = ledger_with_active_loan();
    let record = ledger.post_payment(&payment("p1", dec!(600))).unwrap();
    assert_eq!(record.balance_after, dec!(11_400));

    let repo = ledger.repository();
    assert_eq!(repo.fetch("L1").unwrap().outstanding_balance, dec!(11_400));
    assert_eq!(repo.payments_for("L1").unwrap().len(), 1);
}

#[test]
fn test_rejected_payment_is_not_stored() {
    let ledger = ledger_with_active_loan();
    assert!(matches!(
        ledger.post_payment(&payment("p1", dec!(12_000.01))),
        Err(LendError::Overpayment { .. })
    ));
    let repo = ledger.repository();
    assert!(repo.payments_for("L1").unwrap().is_empty());
    assert_eq!(repo.fetch("L1").unwrap().version, 1);
}

#[test]
fn test_duplicate_payment_id_rejected() {
    let ledger = ledger_with_active_loan();
    ledger.post_payment(&payment("p1", dec!(100))).unwrap();
    let err = ledger.post_payment(&payment("p1", dec!(100))).unwrap_err();
    assert!(matches!(err, LendError::InvalidInput { .. }));
    assert_eq!(
        ledger.repository().fetch("L1").unwrap().outstanding_balance,
        dec!(11_900)
    );
}

#[test]
fn test_stale_write_is_retryable_conflict() {
    let ledger = ledger_with_active_loan();
    let repo = ledger.repository();

    let mut stale = repo.fetch("L1").unwrap();
    let expected = stale.version;
    ledger.post_payment(&payment("p1", dec!(1_000))).unwrap();

    stale.record_payment(&payment("p2", dec!(1_000))).unwrap();
    let err = repo
        .commit(&stale, expected, Some(&payment("p2", dec!(1_000))))
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(repo.fetch("L1").unwrap().outstanding_balance, dec!(11_000));
}

#[test]
fn test_missing_loan_is_persistence_error() {
    let ledger = LoanLedger::new(InMemoryLoanRepository::new());
    let err = ledger
        .apply_event("nope", &LoanEvent::Reject { reason: None })
        .unwrap_err();
    assert!(matches!(err, LendError::Persistence(_)));
}

#[test]
fn test_concurrent_payments_serialise() {
    let ledger = Arc::new(ledger_with_active_loan());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for n in 0..5 {
                    let p = payment(&format!("w{worker}-{n}"), dec!(300));
                    loop {
                        match ledger.post_payment(&p) {
                            Ok(_) => break,
                            Err(e) if e.is_retryable() => continue,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let repo = ledger.repository();
    let loan = repo.fetch("L1").unwrap();
    // 40 payments of 300 settle the 12k exactly
    assert_eq!(loan.outstanding_balance, Decimal::ZERO);
    assert_eq!(loan.status, LoanStatus::Completed);
    assert_eq!(repo.payments_for("L1").unwrap().len(), 40);
    assert_eq!(repo.all_payments().len(), 40);
    // disburse + 40 payments
    assert_eq!(loan.version, 41);
}
