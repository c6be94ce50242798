//! Pooling errors

use crate::blueprint::BlueprintError;
use thiserror::Error;

/// Registry and construction errors
///
/// Spawn and despawn never produce these; they report absence through
/// `Option` and the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// A blueprint with this name is already registered
    #[error("Blueprint '{0}' is already registered")]
    DuplicateBlueprint(String),

    /// Blueprint names must not be empty
    #[error("Blueprint name must not be empty")]
    EmptyName,

    /// Capacity must be at least one
    #[error("Pool '{name}' has invalid capacity {capacity}")]
    InvalidCapacity {
        /// Pool name
        name: String,
        /// Rejected capacity
        capacity: usize,
    },

    /// No blueprint with this name is registered
    #[error("Blueprint '{0}' is not registered")]
    UnknownBlueprint(String),

    /// A startup pool refers to a template the host did not supply
    #[error("Pool '{pool}' refers to unknown template '{template}'")]
    UnknownTemplate {
        /// Pool name
        pool: String,
        /// Missing template name
        template: String,
    },

    /// The template could not be captured as a blueprint
    #[error("Failed to capture blueprint for pool '{name}': {source}")]
    Blueprint {
        /// Pool name
        name: String,
        /// Capture failure
        #[source]
        source: BlueprintError,
    },
}
