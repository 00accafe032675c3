//! runeswap - Rune token swaps, liquidity pools and yield farms
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::DefiService;
pub use domain::farm::Farm;
pub use domain::pool::{Pool, PoolKey};
pub use domain::registry::Registry;
pub use shared::types::Amount;
