//! Marinetext Core
//!
//! Core types and error handling shared across Marinetext components.
//!
//! This crate provides:
//! - The closed set of model choices offered by the dashboard
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::ModelChoice;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::ModelChoice;
}
