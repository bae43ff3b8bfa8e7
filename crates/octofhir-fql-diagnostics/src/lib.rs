//! FQL diagnostics and error handling
//!
//! This crate provides the error handling infrastructure for the FQL implementation,
//! including the error taxonomy, source locations, and span tracking.

mod error;
mod span;

pub use error::*;
pub use span::*;

/// Result type for FQL operations
pub type Result<T> = std::result::Result<T, FqlError>;
