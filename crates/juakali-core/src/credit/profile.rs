use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::limit::{compute_credit_limit, CreditPolicy};
use crate::{types::*, LendResult};

/// A borrower's credit standing as held by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub user_id: String,
    pub credit_score: i32,
    #[serde(default)]
    pub loyalty_points: u32,
    /// Derived; recompute with [`CreditProfile::refresh`] after any loan change.
    #[serde(default)]
    pub available_credit: Money,
}

impl CreditProfile {
    pub fn new(user_id: impl Into<String>, credit_score: i32) -> Self {
        Self {
            user_id: user_id.into(),
            credit_score,
            loyalty_points: 0,
            available_credit: Decimal::ZERO,
        }
    }

    /// Recompute available credit against the borrower's current outstanding
    /// balance. The score itself is left alone.
    pub fn refresh(&mut self, policy: &CreditPolicy, outstanding: Money) -> LendResult<Money> {
        let evaluated = compute_credit_limit(policy, self.credit_score, outstanding)?;
        self.available_credit = evaluated.available_credit;
        Ok(self.available_credit)
    }
}
