//! Spawn policies
//!
//! A spawn policy picks a position and an initial velocity for an entity
//! right after it leaves its sub-pool. Policies are immutable once built;
//! only the randomizer's internal state advances between samples.

use super::random::{Randomizer, UniformRandom};
use super::shapes::{Box3, Plane};
use crate::entity::{Body2D, Body3D, Entity};
use crate::foundation::math::{constants::TAU, normalize_or_zero, Vec2, Vec3};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Region positions are sampled from
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnArea {
    /// Disc segments in 2D, a solid ball in 3D
    Round {
        /// Maximum distance from the center
        radius: f32,
        /// Angular ranges in radians; 2D only
        limits: Vec<(f32, f32)>,
    },
    /// Axis-aligned rectangle in 2D (x/y of the box) or box in 3D
    Box(Box3),
}

/// Direction of the initial velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heading {
    /// A fixed direction, used as given
    Fixed(Vec3),
    /// Normalized offset of the spawn position from the center
    AwayFromCenter,
}

/// Position and velocity randomization rule
pub struct SpawnPolicy {
    randomizer: Mutex<Box<dyn Randomizer>>,
    is_2d: bool,
    plane: Plane,
    area: SpawnArea,
    center: Vec3,
    speed: f32,
    heading: Heading,
}

impl SpawnPolicy {
    /// Start building a policy with a uniform randomizer
    pub fn builder() -> SpawnPolicyBuilder {
        SpawnPolicyBuilder::new()
    }

    /// Whether positions and velocities are confined to a plane
    pub fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// Plane used in 2D mode
    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Sampling region
    pub fn area(&self) -> &SpawnArea {
        &self.area
    }

    /// Offset added to every sampled position
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Draw a position and the matching velocity
    ///
    /// Consumes fresh samples on every call.
    pub fn sample(&self) -> (Vec3, Vec3) {
        let mut randomizer = self.randomizer.lock().unwrap_or_else(PoisonError::into_inner);
        let position = self.sample_position(randomizer.as_mut());
        let velocity = self.velocity_at(position);
        (position, velocity)
    }

    /// Place `entity` and set its body velocity, if it has a body
    ///
    /// In 2D a [`Body2D`] receives plane coordinates; without one, a
    /// [`Body3D`] receives the flattened 3D velocity.
    pub fn apply(&self, entity: &mut Entity) {
        let (position, velocity) = self.sample();
        entity.transform.position = position;

        if self.is_2d {
            if let Some(body) = entity.aspect_mut::<Body2D>() {
                body.velocity = self.plane.project(velocity);
            } else if let Some(body) = entity.aspect_mut::<Body3D>() {
                body.velocity = self.plane.flatten(velocity);
            }
        } else if let Some(body) = entity.aspect_mut::<Body3D>() {
            body.velocity = velocity;
        }
    }

    fn sample_position(&self, randomizer: &mut dyn Randomizer) -> Vec3 {
        let offset = match &self.area {
            SpawnArea::Round { radius, limits } if self.is_2d => {
                let (min, max) = pick_limit(randomizer, limits);
                let theta = randomizer.sample_range(min, max);
                let distance = randomizer.sample_range(0.0, *radius);
                self.plane.embed(theta.cos(), theta.sin()) * distance
            }
            SpawnArea::Round { radius, .. } => {
                let direction = normalize_or_zero(randomizer.sample_vector3());
                let distance = randomizer.sample_range(0.0, *radius);
                direction * distance
            }
            SpawnArea::Box(bounds) if self.is_2d => {
                let max = bounds.max();
                let a = randomizer.sample_range(bounds.position.x, max.x);
                let b = randomizer.sample_range(bounds.position.y, max.y);
                self.plane.embed(a, b)
            }
            SpawnArea::Box(bounds) => {
                let max = bounds.max();
                Vec3::new(
                    randomizer.sample_range(bounds.position.x, max.x),
                    randomizer.sample_range(bounds.position.y, max.y),
                    randomizer.sample_range(bounds.position.z, max.z),
                )
            }
        };

        offset + self.center
    }

    fn velocity_at(&self, position: Vec3) -> Vec3 {
        let direction = match self.heading {
            Heading::Fixed(direction) => direction,
            Heading::AwayFromCenter => normalize_or_zero(position - self.center),
        };

        let direction = if self.is_2d {
            self.plane.flatten(direction)
        } else {
            direction
        };

        direction * self.speed
    }
}

fn pick_limit(randomizer: &mut dyn Randomizer, limits: &[(f32, f32)]) -> (f32, f32) {
    match limits {
        [] => (0.0, TAU),
        [only] => *only,
        _ => {
            let index = randomizer.sample_range(0.0, limits.len() as f32) as usize;
            limits[index.min(limits.len() - 1)]
        }
    }
}

impl fmt::Debug for SpawnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnPolicy")
            .field("is_2d", &self.is_2d)
            .field("plane", &self.plane)
            .field("area", &self.area)
            .field("center", &self.center)
            .field("speed", &self.speed)
            .field("heading", &self.heading)
            .finish()
    }
}

/// Fluent builder for [`SpawnPolicy`]
///
/// # Example
///
/// ```rust
/// use easy_pool::foundation::math::Vec3;
/// use easy_pool::policy::{GaussianRandom, Plane, SpawnPolicyBuilder};
///
/// let policy = SpawnPolicyBuilder::with_randomizer(GaussianRandom::new(10))
///     .center(Vec3::new(0.0, 5.0, 0.0))
///     .spawn_in_circle_on(3.0, Plane::XZ)
///     .velocity_away(2.0)
///     .build();
///
/// let (position, _velocity) = policy.sample();
/// assert_eq!(position.y, 5.0);
/// ```
pub struct SpawnPolicyBuilder {
    randomizer: Box<dyn Randomizer>,
    is_2d: bool,
    plane: Plane,
    area: SpawnArea,
    center: Vec3,
    speed: f32,
    heading: Heading,
}

impl SpawnPolicyBuilder {
    /// Builder with an entropy-seeded uniform randomizer
    pub fn new() -> Self {
        Self::with_randomizer(UniformRandom::from_entropy())
    }

    /// Builder sampling from `randomizer`
    pub fn with_randomizer(randomizer: impl Randomizer + 'static) -> Self {
        Self {
            randomizer: Box::new(randomizer),
            is_2d: false,
            plane: Plane::XY,
            area: SpawnArea::Box(Box3::default()),
            center: Vec3::zeros(),
            speed: 0.0,
            heading: Heading::Fixed(Vec3::zeros()),
        }
    }

    /// Confine the policy to the current plane
    pub fn is_2d(mut self) -> Self {
        self.is_2d = true;
        self
    }

    /// Confine the policy to `plane`
    pub fn is_2d_in(mut self, plane: Plane) -> Self {
        self.is_2d = true;
        self.plane = plane;
        self
    }

    /// Sample in full 3D
    pub fn is_3d(mut self) -> Self {
        self.is_2d = false;
        self
    }

    /// Offset added to every position
    pub fn center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    /// Full disc of `radius` in the current plane
    pub fn spawn_in_circle(mut self, radius: f32) -> Self {
        self.is_2d = true;
        self.area = SpawnArea::Round {
            radius,
            limits: vec![(0.0, TAU)],
        };
        self
    }

    /// Full disc of `radius` in `plane`
    pub fn spawn_in_circle_on(self, radius: f32, plane: Plane) -> Self {
        self.spawn_in_circle_limited(radius, plane, vec![(0.0, TAU)])
    }

    /// Disc segments of `radius` in `plane`
    ///
    /// Each sample picks one of `limits`, then an angle (radians) inside it.
    pub fn spawn_in_circle_limited(mut self, radius: f32, plane: Plane, limits: Vec<(f32, f32)>) -> Self {
        self.is_2d = true;
        self.plane = plane;
        self.area = SpawnArea::Round { radius, limits };
        self
    }

    /// Solid ball of `radius`
    pub fn spawn_in_sphere(mut self, radius: f32) -> Self {
        self.is_2d = false;
        self.area = SpawnArea::Round {
            radius,
            limits: Vec::new(),
        };
        self
    }

    /// Square spanning `[-half, half]` in the current plane
    pub fn spawn_in_square(self, half: Vec2) -> Self {
        self.spawn_in_rect(-half, half * 2.0)
    }

    /// Square spanning `[-half, half]` in `plane`
    pub fn spawn_in_square_on(mut self, half: Vec2, plane: Plane) -> Self {
        self.plane = plane;
        self.spawn_in_square(half)
    }

    /// Rectangle with minimum corner `min` and extent `size` in plane coordinates
    pub fn spawn_in_rect(mut self, min: Vec2, size: Vec2) -> Self {
        self.is_2d = true;
        self.area = SpawnArea::Box(Box3::new(
            Vec3::new(min.x, min.y, 0.0),
            Vec3::new(size.x, size.y, 0.0),
        ));
        self
    }

    /// Box spanning `[-half, half]`
    pub fn spawn_in_box(self, half: Vec3) -> Self {
        self.spawn_in_bounds(Box3::from_half_extents(half))
    }

    /// Arbitrary box
    pub fn spawn_in_bounds(mut self, bounds: Box3) -> Self {
        self.is_2d = false;
        self.area = SpawnArea::Box(bounds);
        self
    }

    /// Fixed direction scaled by `speed`
    pub fn velocity(mut self, direction: Vec3, speed: f32) -> Self {
        self.heading = Heading::Fixed(direction);
        self.speed = speed;
        self
    }

    /// Move away from the center at `speed`
    pub fn velocity_away(mut self, speed: f32) -> Self {
        self.heading = Heading::AwayFromCenter;
        self.speed = speed;
        self
    }

    /// Finish the policy
    pub fn build(self) -> SpawnPolicy {
        SpawnPolicy {
            randomizer: Mutex::new(self.randomizer),
            is_2d: self.is_2d,
            plane: self.plane,
            area: self.area,
            center: self.center,
            speed: self.speed,
            heading: self.heading,
        }
    }

    /// Particles bursting out of a disc in the XY plane
    pub fn explosion_2d(center: Vec2, radius: f32, speed: f32) -> SpawnPolicy {
        Self::new()
            .center(Vec3::new(center.x, center.y, 0.0))
            .spawn_in_circle(radius)
            .velocity_away(speed)
            .build()
    }

    /// Particles bursting out of a ball
    pub fn explosion_3d(center: Vec3, radius: f32, speed: f32) -> SpawnPolicy {
        Self::new()
            .center(center)
            .spawn_in_sphere(radius)
            .velocity_away(speed)
            .build()
    }
}

impl Default for SpawnPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
