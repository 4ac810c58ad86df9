//! Core types and constants shared across henu crates.
//!
//! This crate provides:
//! - Default configuration values
//! - Error type constants for metrics/logging
//! - Database URL scheme detection
//! - The [`Clock`] time source
//! - Common project metadata

pub mod clock;
pub mod database;
pub mod defaults;
pub mod errors;

pub use clock::{Clock, ManualClock, SystemClock};
pub use database::DatabaseType;
pub use defaults::*;
pub use errors::*;

/// Project name.
pub const PROJECT_NAME: &str = "henu-rs";
/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
