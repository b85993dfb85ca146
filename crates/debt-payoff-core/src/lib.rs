pub mod error;
pub mod types;

#[cfg(feature = "payoff")]
pub mod payoff;

#[cfg(feature = "report")]
pub mod report;

pub use error::DebtPayoffError;
pub use types::*;

/// Standard result type for all debt-payoff operations
pub type DebtPayoffResult<T> = Result<T, DebtPayoffError>;
