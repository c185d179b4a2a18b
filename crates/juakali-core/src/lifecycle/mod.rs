//! Loan lifecycle: `pending -> active -> completed | defaulted`, or
//! `pending -> cancelled`. Terminal loans accept no further events.

pub mod loan;
pub mod payment;
pub mod status;
pub mod transition;

pub use loan::{Loan, LoanApplication, TransitionRecord};
pub use payment::{Payment, PaymentMethod};
pub use status::{ensure_allowed, LoanEvent, LoanStatus};
pub use transition::{
    apply_payment, open_loan, transition_loan, PaymentInput, TransitionInput, TransitionOutput,
};
