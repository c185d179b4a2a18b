pub mod error;
pub mod types;

#[cfg(feature = "terms")]
pub mod terms;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "lifecycle")]
pub mod lifecycle;

#[cfg(feature = "dashboard")]
pub mod dashboard;

#[cfg(feature = "ledger")]
pub mod ledger;

pub use error::LendError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendResult<T> = Result<T, LendError>;
