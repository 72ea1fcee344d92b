pub mod sample;
pub mod validation;

pub use sample::dax_sample_portfolio;
pub use validation::{validate_portfolio, ValidationReport};
