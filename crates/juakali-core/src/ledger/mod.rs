//! Persistence boundary for loans. Every write goes through an optimistic
//! version check so concurrent payments against one loan serialise.

pub mod repository;
pub mod service;

pub use repository::{InMemoryLoanRepository, LoanRepository};
pub use service::LoanLedger;
