pub mod config;
pub mod error;
pub mod generation;
pub mod naming;
pub mod portrait;
pub mod session;
pub mod transcript;

// Re-export common error type
pub use error::{ConfidantError, ErrorKind, Result};
