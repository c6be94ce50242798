//! In-code startup pool definitions

use crate::entity::Entity;
use crate::pooling::PoolingStrategy;

/// A sub-pool to register when a pool manager starts
#[derive(Debug)]
pub struct BlueprintPoolDefinition {
    /// Name the blueprint is registered under
    pub pool_name: String,

    /// Template entity the sub-pool clones from
    pub template: Entity,

    /// Growth and pre-fill behavior
    pub strategy: PoolingStrategy,

    /// Initial capacity of the sub-pool
    pub initial_size: usize,
}

impl BlueprintPoolDefinition {
    /// Definition with the default strategy and capacity
    pub fn new(pool_name: impl Into<String>, template: Entity) -> Self {
        Self {
            pool_name: pool_name.into(),
            template,
            strategy: PoolingStrategy::DEFAULT,
            initial_size: crate::pooling::DEFAULT_CAPACITY,
        }
    }

    /// Override the strategy
    pub fn with_strategy(mut self, strategy: PoolingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Override the initial capacity
    pub fn with_initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = initial_size;
        self
    }
}
