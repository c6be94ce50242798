//! Aspect contract
//!
//! An aspect is a behavior attached to an entity. Aspects declare their
//! snapshot-able fields through an [`AspectSchema`] so blueprints can capture
//! and reassert defaults without runtime reflection.

use crate::blueprint::{AspectSchema, FieldKind, FieldValue};
use std::any::{Any, TypeId};
use thiserror::Error;

/// Errors raised while reading or writing aspect fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AspectError {
    /// The aspect does not declare a field with this name
    #[error("Aspect '{aspect}' has no field '{field}'")]
    UnknownField {
        /// Aspect type name
        aspect: &'static str,
        /// Requested field
        field: String,
    },

    /// The value's kind does not match the declared kind of the field
    #[error("Aspect '{aspect}' field '{field}' expects {expected}, got {found}")]
    KindMismatch {
        /// Aspect type name
        aspect: &'static str,
        /// Field being written
        field: String,
        /// Declared kind
        expected: FieldKind,
        /// Kind of the supplied value
        found: FieldKind,
    },
}

/// Pooling lifecycle notifications
///
/// All hooks default to doing nothing. They run synchronously on the thread
/// that called spawn or despawn, while the owning sub-pool is locked, so they
/// must not block and must not call back into the same sub-pool.
pub trait Poolable {
    /// First construction from the template only
    fn on_create(&mut self) {}

    /// Every activation
    fn on_spawn(&mut self) {}

    /// Every deactivation, before un-decoration
    fn on_despawn(&mut self) {}

    /// Permanent removal
    fn on_destroy(&mut self) {}
}

/// Object-safe plumbing every [`Aspect`] gets for free
///
/// Implemented for all `Aspect + Clone` types; never implement it by hand.
pub trait AspectAny {
    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Type id of the concrete aspect type
    fn aspect_type_id(&self) -> TypeId;

    /// Independent deep copy, used when cloning a template entity
    fn clone_box(&self) -> Box<dyn Aspect>;
}

impl<T: Aspect + Clone> AspectAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn aspect_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn clone_box(&self) -> Box<dyn Aspect> {
        Box::new(self.clone())
    }
}

/// A behavior attached to an entity
///
/// # Example
///
/// ```rust
/// use easy_pool::blueprint::{AspectSchema, FieldDescriptor, FieldKind, FieldValue};
/// use easy_pool::entity::{Aspect, AspectError, Poolable};
///
/// #[derive(Clone)]
/// struct Health {
///     current: f32,
/// }
///
/// static HEALTH_SCHEMA: AspectSchema =
///     AspectSchema::new("Health", &[FieldDescriptor::new("current", FieldKind::Float)]);
///
/// impl Aspect for Health {
///     fn schema(&self) -> &'static AspectSchema {
///         &HEALTH_SCHEMA
///     }
///
///     fn get_field(&self, name: &str) -> Option<FieldValue> {
///         match name {
///             "current" => Some(self.current.into()),
///             _ => None,
///         }
///     }
///
///     fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), AspectError> {
///         match name {
///             "current" => self.current = value.extract("Health", name)?,
///             _ => {
///                 return Err(AspectError::UnknownField {
///                     aspect: "Health",
///                     field: name.to_string(),
///                 })
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Aspect: AspectAny + Send + Sync + 'static {
    /// Declared snapshot-able fields of this aspect type
    fn schema(&self) -> &'static AspectSchema;

    /// Current value of a declared field
    fn get_field(&self, name: &str) -> Option<FieldValue>;

    /// Overwrite a declared field
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), AspectError>;

    /// Lifecycle hooks, if this aspect wants pooling notifications
    fn as_poolable(&mut self) -> Option<&mut dyn Poolable> {
        None
    }

    /// Name of the aspect type, taken from its schema
    fn type_name(&self) -> &'static str {
        self.schema().type_name
    }
}
