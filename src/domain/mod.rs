//! Domain layer - core business logic and entities

pub mod accounts;
pub mod execution;
pub mod farm;
pub mod pool;
pub mod registry;
