use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{types::*, LendError, LendResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney,
    BankTransfer,
    Wallet,
}

/// A repayment received from a gateway webhook or entered by staff.
/// Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: String,
    pub loan_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
    /// Gateway receipt number (M-Pesa code, bank reference).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Payment {
    pub fn validate(&self) -> LendResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(LendError::InvalidInput {
                field: "amount".into(),
                reason: "Payment amount must be positive.".into(),
            });
        }
        if self.payment_id.trim().is_empty() {
            return Err(LendError::InvalidInput {
                field: "payment_id".into(),
                reason: "Payment id cannot be empty.".into(),
            });
        }
        Ok(())
    }
}
