//! Spawn parameters

use crate::decorator::Decorator;
use crate::foundation::math::{Quat, Vec3};
use crate::policy::SpawnPolicy;
use std::fmt;

/// Parameters for spawning an entity
///
/// Defaults to the origin, identity rotation, the sub-pool's own blueprint
/// as decorator, and no spawn policy.
#[derive(Clone, Copy)]
pub struct SpawnParams<'a> {
    /// Initial position
    pub position: Vec3,
    /// Initial rotation
    pub rotation: Quat,
    /// Decorator overriding the sub-pool's blueprint
    pub decorator: Option<&'a dyn Decorator>,
    /// Position and velocity randomization applied after decoration
    pub policy: Option<&'a SpawnPolicy>,
}

impl<'a> SpawnParams<'a> {
    /// Default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn at `position`
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Spawn with `rotation`
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Decorate with `decorator` instead of the blueprint
    pub fn with_decorator(mut self, decorator: &'a dyn Decorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    /// Apply `policy` after decoration
    pub fn with_policy(mut self, policy: &'a SpawnPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

impl Default for SpawnParams<'_> {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            decorator: None,
            policy: None,
        }
    }
}

impl fmt::Debug for SpawnParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnParams")
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("decorator", &self.decorator.is_some())
            .field("policy", &self.policy.is_some())
            .finish()
    }
}
