//! Blueprint capture and reassertion

use super::{BlueprintError, FieldValue};
use crate::decorator::{DecorationError, Decorator};
use crate::entity::{Aspect, AspectError, Entity};
use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Captured defaults of one aspect
pub struct AspectBlueprint {
    type_name: &'static str,
    type_id: TypeId,
    defaults: Vec<(&'static str, FieldValue)>,
    prototype: Box<dyn Aspect>,
}

impl AspectBlueprint {
    /// Snapshot every declared field of `aspect`
    ///
    /// Fields are visited in schema order: the aspect's own fields first,
    /// then those inherited through the schema's parent chain.
    pub fn capture(aspect: &dyn Aspect) -> Result<Self, BlueprintError> {
        let schema = aspect.schema();
        let mut defaults = Vec::new();

        for field in schema.all_fields() {
            let value = aspect
                .get_field(field.name)
                .ok_or(BlueprintError::UnreadableField {
                    aspect: schema.type_name,
                    field: field.name,
                })?;

            if value.kind() != field.kind {
                return Err(BlueprintError::KindMismatch {
                    aspect: schema.type_name,
                    field: field.name,
                    expected: field.kind,
                    found: value.kind(),
                });
            }

            defaults.push((field.name, value));
        }

        Ok(Self {
            type_name: schema.type_name,
            type_id: aspect.aspect_type_id(),
            defaults,
            prototype: aspect.clone_box(),
        })
    }

    /// Name of the captured aspect type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type id of the captured aspect type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Captured defaults in capture order
    pub fn defaults(&self) -> &[(&'static str, FieldValue)] {
        &self.defaults
    }

    /// Captured default of a single field
    pub fn default_of(&self, field: &str) -> Option<&FieldValue> {
        self.defaults
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Re-add the aspect if it is missing, then write back every default
    ///
    /// The first failing field aborts the remaining fields of this aspect.
    pub fn apply(&self, entity: &mut Entity) -> Result<(), AspectError> {
        if !entity.has_aspect_type(self.type_id) {
            entity.add_boxed_aspect(self.prototype.clone_box());
        }

        let Some(aspect) = entity.aspect_by_type_mut(self.type_id) else {
            return Ok(());
        };

        for (name, value) in &self.defaults {
            aspect.set_field(name, value.clone())?;
        }
        Ok(())
    }
}

impl fmt::Debug for AspectBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectBlueprint")
            .field("type_name", &self.type_name)
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Immutable snapshot of a template entity
///
/// Used as the default decorator of its sub-pool: decorating re-adds any
/// aspect that was stripped and resets every captured field.
#[derive(Debug)]
pub struct EntityBlueprint {
    name: String,
    signature: u64,
    aspects: Vec<AspectBlueprint>,
}

impl EntityBlueprint {
    /// Snapshot every aspect attached to `entity`
    ///
    /// Any aspect that cannot be captured aborts the whole blueprint.
    pub fn capture(name: impl Into<String>, entity: &Entity) -> Result<Self, BlueprintError> {
        let aspects = entity
            .aspects()
            .map(AspectBlueprint::capture)
            .collect::<Result<Vec<_>, _>>()?;

        let signature = aspects.iter().fold(42_u64, |acc, aspect| {
            let mut hasher = DefaultHasher::new();
            aspect.type_name.hash(&mut hasher);
            acc ^ hasher.finish()
        });

        Ok(Self {
            name: name.into(),
            signature,
            aspects,
        })
    }

    /// Blueprint of an entity without aspects
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: 42,
            aspects: Vec::new(),
        }
    }

    /// Name of the blueprint, equal to its sub-pool's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Order-independent identifier of the captured aspect set
    pub fn signature(&self) -> u64 {
        self.signature
    }

    /// Captured aspects in attachment order
    pub fn aspects(&self) -> &[AspectBlueprint] {
        &self.aspects
    }

    /// Captured blueprint of one aspect type
    pub fn aspect<A: Aspect>(&self) -> Option<&AspectBlueprint> {
        self.aspects.iter().find(|a| a.type_id == TypeId::of::<A>())
    }
}

impl Decorator for EntityBlueprint {
    fn decorate(&self, entity: &mut Entity) -> Result<(), DecorationError> {
        let mut failures = Vec::new();

        for aspect in &self.aspects {
            if let Err(source) = aspect.apply(entity) {
                failures.push(DecorationError::Aspect {
                    entity: entity.name.clone(),
                    aspect: aspect.type_name,
                    source,
                });
            }
        }

        DecorationError::collect(failures)
    }
}
