pub mod calendar;
pub mod display;
pub mod error;
pub mod types;

#[cfg(feature = "holdings")]
pub mod holdings;

#[cfg(feature = "recovery")]
pub mod recovery;

#[cfg(feature = "recovery")]
pub mod config;

pub use error::CreditDeskError;
pub use types::*;

/// Standard result type for all credit-desk operations
pub type CreditDeskResult<T> = Result<T, CreditDeskError>;
