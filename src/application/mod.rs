pub mod error;
pub mod ports;
pub mod services;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use error::QaError;
pub use services::*;
pub use use_cases::*;
