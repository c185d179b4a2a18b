use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{LendError, LendResult};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5% per day). Never as percentages.
pub type Rate = Decimal;

/// Minor-unit precision for persisted money (cents / KES cents).
pub const MONEY_DP: u32 = 2;

/// Round a money value to the currency's minor unit, half-up.
///
/// Intermediate arithmetic stays unrounded; call this only when a value is
/// about to be stored on a record.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// `date + days`, failing instead of panicking past the calendar's end.
pub fn add_days(date: NaiveDate, days: u32) -> LendResult<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| LendError::DateError(format!("{date} + {days} days is out of range")))
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(4166.666666)), dec!(4166.67));
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(125000)), dec!(125000));
    }

    #[test]
    fn test_add_days() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        assert_eq!(
            add_days(d, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
        assert!(matches!(
            add_days(NaiveDate::MAX, 1),
            Err(LendError::DateError(_))
        ));
    }

    #[test]
    fn test_envelope_carries_version_and_precision() {
        let out = with_metadata("test", &serde_json::json!({}), vec![], 7, 42u32);
        assert_eq!(out.result, 42);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.metadata.computation_time_us, 7);
    }
}
