//! # Easy Pool
//!
//! Engine-agnostic object pooling keyed by blueprint name.
//!
//! ## Features
//!
//! - **Blueprints**: Plain-data snapshots of a template entity, used to reset
//!   reused instances
//! - **Decorators**: Pluggable spawn-time and despawn-time reconfiguration
//! - **Strategies**: Pre-filled and self-resizing sub-pools
//! - **Spawn Policies**: Randomized positions and velocities from uniform,
//!   Gaussian or Perlin-noise sources
//! - **Delayed Despawn**: Fire-and-forget timers that never hold a pool lock
//!
//! ## Quick Start
//!
//! ```rust
//! use easy_pool::prelude::*;
//!
//! let global = PoolManager::new(PoolScope::Global);
//! let asteroid = Entity::new("Asteroid").with_aspect(Body2D::default());
//! global
//!     .register("Asteroid", &asteroid, PoolingStrategy::GROW, 10)
//!     .unwrap();
//!
//! let policy = SpawnPolicyBuilder::explosion_2d(Vec2::new(0.0, 0.0), 5.0, 2.0);
//! let params = SpawnParams::new().with_policy(&policy);
//!
//! let rocks: Vec<_> = global.spawn_many("Asteroid", 3, &params);
//! for rock in rocks.iter().flatten() {
//!     global.despawn(rock, None);
//! }
//! assert_eq!(global.stats("Asteroid").unwrap().idle, 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod blueprint;
pub mod config;
pub mod decorator;
pub mod entity;
pub mod foundation;
pub mod policy;
pub mod pooling;

#[cfg(test)]
mod tests;

/// Common imports for pool users
pub mod prelude {
    pub use crate::{
        blueprint::{AspectSchema, BlueprintPoolDefinition, EntityBlueprint, FieldDescriptor, FieldKind, FieldValue},
        config::{Config, PoolSettings, StartupPool, TemplateLibrary},
        decorator::{DecorationError, Decorator, FnDecorator, FnUnDecorator, FullUnDecorator, UnDecorator},
        entity::{Aspect, AspectError, Body2D, Body3D, Entity, EntityHandle, EntityId, Poolable},
        foundation::math::{Quat, Transform, Vec2, Vec3},
        policy::{GaussianRandom, PerlinNoiseRandom, Plane, Randomizer, SpawnPolicy, SpawnPolicyBuilder, UniformRandom},
        pooling::{PoolError, PoolManager, PoolScope, PoolStats, PoolingStrategy, SpawnParams},
    };
}
