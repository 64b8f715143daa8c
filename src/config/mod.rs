//! Manager configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, limits, retryable status codes)
//! - The [`ManagerConfig`] struct

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::ManagerConfig;
