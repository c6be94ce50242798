//! Entities, aspects and pooling lifecycle hooks
//!
//! Provides the entity side of the pooling contract: entity handles,
//! attachable aspects with declared field schemas, and the [`Poolable`]
//! lifecycle hooks.

pub mod aspect;
pub mod body;
#[allow(clippy::module_inception)]
pub mod entity;

pub use aspect::{Aspect, AspectAny, AspectError, Poolable};
pub use body::{Body2D, Body3D};
pub use entity::{Entity, EntityHandle, EntityId};
