//! Decorators and un-decorators
//!
//! A decorator adds or configures aspects when an entity leaves its
//! sub-pool; an un-decorator strips them again before the entity goes back
//! to the idle queue.

use crate::entity::{AspectError, Entity};
use thiserror::Error;

/// Failure raised by a decorator or un-decorator
#[derive(Debug, Error)]
pub enum DecorationError {
    /// One aspect could not be configured
    #[error("Entity '{entity}', aspect '{aspect}': {source}")]
    Aspect {
        /// Name of the entity being decorated
        entity: String,
        /// Aspect type name
        aspect: &'static str,
        /// Underlying field error
        #[source]
        source: AspectError,
    },

    /// Several aspects failed; the others were still processed
    #[error("{} aspect(s) failed: {}", .0.len(), summarize(.0))]
    Several(Vec<DecorationError>),

    /// Free-form failure from a custom decorator
    #[error("{0}")]
    Custom(String),
}

impl DecorationError {
    /// Fold per-aspect failures into a single result
    pub fn collect(mut failures: Vec<DecorationError>) -> Result<(), DecorationError> {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(DecorationError::Several(failures)),
        }
    }
}

fn summarize(failures: &[DecorationError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Adds or configures aspects on a spawned entity
pub trait Decorator: Send + Sync {
    /// Only run on first construction from the template, never on reuse
    fn is_create_only(&self) -> bool {
        false
    }

    /// Decorate the entity
    ///
    /// Implementations should keep going after a per-aspect failure and
    /// report every failure at the end.
    fn decorate(&self, entity: &mut Entity) -> Result<(), DecorationError>;
}

/// Removes aspects from an entity returning to its sub-pool
pub trait UnDecorator: Send + Sync {
    /// Strip the entity
    fn undecorate(&self, entity: &mut Entity) -> Result<(), DecorationError>;
}

/// Strips every aspect, leaving only the transform
///
/// Always used for entities of the empty sub-pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullUnDecorator;

impl UnDecorator for FullUnDecorator {
    fn undecorate(&self, entity: &mut Entity) -> Result<(), DecorationError> {
        entity.strip_aspects();
        Ok(())
    }
}

/// Decorator backed by a closure
pub struct FnDecorator<F> {
    decorate: F,
    create_only: bool,
}

impl<F> FnDecorator<F>
where
    F: Fn(&mut Entity) -> Result<(), DecorationError> + Send + Sync,
{
    /// Decorator that runs on every spawn
    pub fn new(decorate: F) -> Self {
        Self {
            decorate,
            create_only: false,
        }
    }

    /// Decorator that runs only when an entity is first constructed
    pub fn create_only(decorate: F) -> Self {
        Self {
            decorate,
            create_only: true,
        }
    }
}

impl<F> Decorator for FnDecorator<F>
where
    F: Fn(&mut Entity) -> Result<(), DecorationError> + Send + Sync,
{
    fn is_create_only(&self) -> bool {
        self.create_only
    }

    fn decorate(&self, entity: &mut Entity) -> Result<(), DecorationError> {
        (self.decorate)(entity)
    }
}

/// Un-decorator backed by a closure
pub struct FnUnDecorator<F>(pub F);

impl<F> UnDecorator for FnUnDecorator<F>
where
    F: Fn(&mut Entity) -> Result<(), DecorationError> + Send + Sync,
{
    fn undecorate(&self, entity: &mut Entity) -> Result<(), DecorationError> {
        (self.0)(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Body2D, Body3D};
    use crate::foundation::math::Vec3;

    #[test]
    fn test_full_undecorator_keeps_transform() {
        let mut entity = Entity::new("Empty")
            .at(Vec3::new(1.0, 2.0, 3.0))
            .with_aspect(Body2D::default())
            .with_aspect(Body3D::default());

        FullUnDecorator.undecorate(&mut entity).unwrap();

        assert_eq!(entity.aspect_count(), 0);
        assert_eq!(entity.transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_fn_decorator_flags() {
        let every = FnDecorator::new(|e: &mut Entity| {
            e.add_aspect(Body3D::default());
            Ok(())
        });
        let once = FnDecorator::create_only(|_: &mut Entity| Ok(()));

        assert!(!every.is_create_only());
        assert!(once.is_create_only());

        let mut entity = Entity::new("a");
        every.decorate(&mut entity).unwrap();
        assert!(entity.has_aspect::<Body3D>());
    }

    #[test]
    fn test_collect_failures() {
        assert!(DecorationError::collect(Vec::new()).is_ok());

        let single = DecorationError::collect(vec![DecorationError::Custom("a".into())]);
        assert!(matches!(single, Err(DecorationError::Custom(_))));

        let several = DecorationError::collect(vec![
            DecorationError::Custom("a".into()),
            DecorationError::Custom("b".into()),
        ])
        .unwrap_err();
        assert_eq!(several.to_string(), "2 aspect(s) failed: a; b");
    }
}
