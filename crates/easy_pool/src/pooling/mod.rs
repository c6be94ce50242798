//! Pooling core
//!
//! [`SubPool`] manages the idle queue of one blueprint; [`PoolManager`]
//! routes spawns and despawns to sub-pools by name.

pub mod error;
pub mod manager;
pub mod params;
pub mod stats;
pub mod strategy;
pub mod sub_pool;

pub use error::PoolError;
pub use manager::{PoolManager, PoolScope};
pub use params::SpawnParams;
pub use stats::PoolStats;
pub use strategy::PoolingStrategy;
pub use sub_pool::{DespawnOutcome, SubPool, GROW_LIMIT_FACTOR, GROW_STEP};

/// Capacity used when none is given
pub const DEFAULT_CAPACITY: usize = 25;

/// Name of every manager's implicit empty sub-pool
pub const EMPTY_POOL_NAME: &str = "Empty";
