//! Blueprints
//!
//! A blueprint is an immutable snapshot of a template entity's plain-data
//! fields, taken once when its sub-pool is created.

pub mod definition;
pub mod entity_blueprint;
pub mod field;

pub use definition::BlueprintPoolDefinition;
pub use entity_blueprint::{AspectBlueprint, EntityBlueprint};
pub use field::{AspectSchema, FieldDescriptor, FieldKind, FieldValue, PlainData};

use thiserror::Error;

/// Errors raised while capturing a blueprint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlueprintError {
    /// A declared field could not be read from the aspect
    #[error("Field '{field}' of aspect '{aspect}' is declared but unreadable")]
    UnreadableField {
        /// Aspect type name
        aspect: &'static str,
        /// Declared field
        field: &'static str,
    },

    /// A field's current value does not match its declared kind
    #[error("Field '{field}' of aspect '{aspect}' is declared as {expected} but holds {found}")]
    KindMismatch {
        /// Aspect type name
        aspect: &'static str,
        /// Declared field
        field: &'static str,
        /// Declared kind
        expected: FieldKind,
        /// Kind actually read
        found: FieldKind,
    },
}
