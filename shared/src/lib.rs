//! Shared types for the storefront transactional core
//!
//! Common types used across crates: entity models, the unified error
//! taxonomy, and monetary rounding helpers.

pub mod error;
pub mod models;
pub mod money;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use serde::{Deserialize, Serialize};
