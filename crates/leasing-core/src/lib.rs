pub mod brackets;
pub mod config;
pub mod error;
pub mod leaser;
pub mod pricing;
pub mod types;

#[cfg(feature = "commission")]
pub mod commission;

#[cfg(feature = "offers")]
pub mod offers;

pub use config::{CalculatorConfig, RangePolicy};
pub use error::LeasingError;
pub use types::*;

/// Standard result type for all leasing operations
pub type LeasingResult<T> = Result<T, LeasingError>;
