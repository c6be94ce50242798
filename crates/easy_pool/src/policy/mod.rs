//! Spawn policies and randomizers

pub mod random;
pub mod shapes;
pub mod spawn_policy;

pub use random::{GaussianRandom, PerlinNoiseRandom, Randomizer, UniformRandom, SAMPLE_MAX};
pub use shapes::{Box3, Plane};
pub use spawn_policy::{Heading, SpawnArea, SpawnPolicy, SpawnPolicyBuilder};
