//! Sub-pool statistics

use super::PoolingStrategy;
use std::fmt;

/// Snapshot of one sub-pool's sizes and lifetime counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Pool name
    pub name: String,
    /// Strategy flags
    pub strategy: PoolingStrategy,
    /// Current capacity
    pub capacity: usize,
    /// Capacity the pool was created with
    pub min_capacity: usize,
    /// Entities waiting in the idle queue
    pub idle: usize,
    /// Entities handed out and not yet despawned
    pub active: usize,
    /// Entities constructed from the template
    pub created: u64,
    /// Entities destroyed by the pool
    pub destroyed: u64,
    /// Spawn calls served
    pub spawned: u64,
    /// Despawns accepted
    pub despawned: u64,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} idle (min {}), {} active, {} created, {} destroyed, {} spawned, {} despawned",
            self.name,
            self.idle,
            self.capacity,
            self.min_capacity,
            self.active,
            self.created,
            self.destroyed,
            self.spawned,
            self.despawned
        )
    }
}
