//! Shared components - common types, errors, and utilities

pub mod clock;
pub mod config;
pub mod errors;
pub mod types;
pub mod utils;
