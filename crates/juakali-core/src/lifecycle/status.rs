use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::payment::Payment;
use crate::{LendError, LendResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Pending,
    Active,
    Completed,
    Defaulted,
    Cancelled,
}

impl LoanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LoanStatus::Completed | LoanStatus::Defaulted | LoanStatus::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Active => "active",
            LoanStatus::Completed => "completed",
            LoanStatus::Defaulted => "defaulted",
            LoanStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happens to a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanEvent {
    /// Lender approved and funds went out.
    Disburse { on: NaiveDate },
    /// Application turned down before disbursement.
    Reject {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Payment(Payment),
    /// Due date has passed with a balance left.
    MarkDefault { as_of: NaiveDate },
}

impl LoanEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LoanEvent::Disburse { .. } => "disburse",
            LoanEvent::Reject { .. } => "reject",
            LoanEvent::Payment(_) => "record a payment against",
            LoanEvent::MarkDefault { .. } => "default",
        }
    }
}

/// The transition table. Says whether `event` may be applied to a loan in
/// `from`; balance and date conditions are checked by the loan itself.
pub fn ensure_allowed(from: LoanStatus, event: &LoanEvent) -> LendResult<()> {
    let allowed = matches!(
        (from, event),
        (LoanStatus::Pending, LoanEvent::Disburse { .. })
            | (LoanStatus::Pending, LoanEvent::Reject { .. })
            | (LoanStatus::Active, LoanEvent::Payment(_))
            | (LoanStatus::Active, LoanEvent::MarkDefault { .. })
    );
    if allowed {
        Ok(())
    } else {
        Err(LendError::InvalidTransition {
            from: from.to_string(),
            event: event.name().to_string(),
        })
    }
}
