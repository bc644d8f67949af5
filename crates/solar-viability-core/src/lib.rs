pub mod allocation;
pub mod cashflow;
pub mod energy;
pub mod error;
pub mod metrics;
pub mod tariff;
pub mod time_value;
pub mod types;
pub mod viability;

pub use error::ViabilityError;
pub use types::*;

/// Standard result type for all viability-engine operations
pub type ViabilityResult<T> = Result<T, ViabilityError>;
