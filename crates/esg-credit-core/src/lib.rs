pub mod config;
pub mod dataset;
pub mod error;
pub mod math;
pub mod model;
pub mod scenario;
pub mod types;

pub use error::EsgCreditError;
pub use types::*;

/// Standard result type for all esg-credit operations
pub type EsgCreditResult<T> = Result<T, EsgCreditError>;
