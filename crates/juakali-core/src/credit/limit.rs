use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{types::*, LendError, LendResult};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Credit-limit policy. Every field may be omitted from JSON/YAML and falls
/// back to the platform defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditPolicy {
    pub min_score: i32,
    pub max_score: i32,
    /// Limit granted per score point.
    pub limit_per_point: Money,
    /// Hard ceiling on any single borrower's limit.
    pub limit_cap: Money,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            min_score: 300,
            max_score: 850,
            limit_per_point: dec!(100),
            limit_cap: dec!(100_000),
        }
    }
}

impl CreditPolicy {
    pub fn validate(&self) -> LendResult<()> {
        if self.min_score > self.max_score {
            return Err(LendError::InvalidInput {
                field: "policy.min_score".into(),
                reason: format!(
                    "min_score {} is above max_score {}.",
                    self.min_score, self.max_score
                ),
            });
        }
        if self.limit_per_point < Decimal::ZERO {
            return Err(LendError::InvalidInput {
                field: "policy.limit_per_point".into(),
                reason: "Limit per point cannot be negative.".into(),
            });
        }
        if self.limit_cap < Decimal::ZERO {
            return Err(LendError::InvalidInput {
                field: "policy.limit_cap".into(),
                reason: "Limit cap cannot be negative.".into(),
            });
        }
        Ok(())
    }

    pub fn check_score(&self, score: i32) -> LendResult<()> {
        if score < self.min_score || score > self.max_score {
            return Err(LendError::InvalidScore {
                score,
                min: self.min_score,
                max: self.max_score,
            });
        }
        Ok(())
    }

    /// min(score * limit_per_point, limit_cap)
    pub fn credit_limit(&self, score: i32) -> LendResult<Money> {
        Ok(self.uncapped_limit(score)?.min(self.limit_cap))
    }

    fn uncapped_limit(&self, score: i32) -> LendResult<Money> {
        self.check_score(score)?;
        Decimal::from(score)
            .checked_mul(self.limit_per_point)
            .ok_or_else(|| LendError::InvalidInput {
                field: "policy.limit_per_point".into(),
                reason: format!(
                    "Score {score} times {} per point overflows.",
                    self.limit_per_point
                ),
            })
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditLimitInput {
    pub credit_score: i32,
    pub outstanding_amount: Money,
    #[serde(default)]
    pub policy: CreditPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLimitOutput {
    pub credit_score: i32,
    pub credit_limit: Money,
    pub outstanding_amount: Money,
    /// credit_limit - outstanding_amount, floored at zero.
    pub available_credit: Money,
    /// outstanding / limit; zero when the limit is zero.
    pub utilization: Rate,
    /// True when the cap, not the score, set the limit.
    pub capped: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn evaluate_credit_limit(
    input: &CreditLimitInput,
) -> LendResult<ComputationOutput<CreditLimitOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = compute_credit_limit(&input.policy, input.credit_score, input.outstanding_amount)?;
    if input.outstanding_amount > output.credit_limit {
        warnings.push(format!(
            "Outstanding {} exceeds the credit limit of {}; available credit floored at zero.",
            input.outstanding_amount, output.credit_limit
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "score_range": format!("{}..={}", input.policy.min_score, input.policy.max_score),
        "limit_per_point": input.policy.limit_per_point.to_string(),
        "limit_cap": input.policy.limit_cap.to_string(),
    });

    Ok(with_metadata(
        "Score-linear credit limit with hard cap",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Envelope-free evaluation shared with the profile and dashboard.
pub fn compute_credit_limit(
    policy: &CreditPolicy,
    credit_score: i32,
    outstanding_amount: Money,
) -> LendResult<CreditLimitOutput> {
    policy.validate()?;
    if outstanding_amount < Decimal::ZERO {
        return Err(LendError::InvalidInput {
            field: "outstanding_amount".into(),
            reason: "Outstanding amount cannot be negative.".into(),
        });
    }

    let uncapped = policy.uncapped_limit(credit_score)?;
    let credit_limit = uncapped.min(policy.limit_cap);
    // Overflow here means a deeply negative difference.
    let available_credit = credit_limit
        .checked_sub(outstanding_amount)
        .map_or(Decimal::ZERO, |left| left.max(Decimal::ZERO));
    let utilization = if credit_limit.is_zero() {
        Decimal::ZERO
    } else {
        outstanding_amount
            .checked_div(credit_limit)
            .ok_or_else(|| LendError::InvalidInput {
                field: "outstanding_amount".into(),
                reason: format!(
                    "Utilization of {outstanding_amount} against a limit of {credit_limit} overflows."
                ),
            })?
    };

    Ok(CreditLimitOutput {
        credit_score,
        credit_limit,
        outstanding_amount,
        available_credit,
        utilization,
        capped: uncapped > policy.limit_cap,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
