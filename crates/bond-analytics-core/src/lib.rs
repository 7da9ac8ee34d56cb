pub mod calculator;
pub mod error;
pub mod pricing;
pub mod schedule;
pub mod solver;
pub mod types;

pub use error::BondAnalyticsError;
pub use types::*;

/// Standard result type for all bond-analytics operations
pub type BondResult<T> = Result<T, BondAnalyticsError>;
