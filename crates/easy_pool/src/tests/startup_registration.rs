//! Registration from settings, definitions and failing templates

use crate::blueprint::{AspectSchema, BlueprintPoolDefinition, FieldDescriptor, FieldKind, FieldValue};
use crate::config::{PoolSettings, StartupPool, TemplateLibrary};
use crate::entity::{Aspect, AspectError, Body2D, Body3D, Entity};
use crate::foundation::logging;
use crate::pooling::{PoolError, PoolManager, PoolScope, PoolingStrategy, SpawnParams};

/// Declares a field it cannot read
#[derive(Clone)]
struct Opaque;

static OPAQUE_SCHEMA: AspectSchema =
    AspectSchema::new("Opaque", &[FieldDescriptor::new("handle", FieldKind::UInt)]);

impl Aspect for Opaque {
    fn schema(&self) -> &'static AspectSchema {
        &OPAQUE_SCHEMA
    }

    fn get_field(&self, _name: &str) -> Option<FieldValue> {
        None
    }

    fn set_field(&mut self, name: &str, _value: FieldValue) -> Result<(), AspectError> {
        Err(AspectError::UnknownField {
            aspect: "Opaque",
            field: name.to_string(),
        })
    }
}

fn templates() -> TemplateLibrary {
    TemplateLibrary::new()
        .with("rock", Entity::new("Rock").with_aspect(Body3D::default()))
        .with("spark", Entity::new("Spark").with_aspect(Body2D::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_registers_startup_pools() {
        logging::init_for_tests();
        let mut rocks = StartupPool::new("Rock", "rock");
        rocks.strategy = Some(PoolingStrategy::FILL);
        rocks.initial_size = Some(6);

        let settings = PoolSettings {
            default_capacity: 8,
            default_strategy: PoolingStrategy::FILL,
            startup: vec![rocks, StartupPool::new("Spark", "spark")],
        };

        let pools = PoolManager::from_settings(PoolScope::Scene, &settings, &templates());

        assert_eq!(pools.blueprint_names(), vec!["Rock".to_string(), "Spark".to_string()]);
        assert_eq!(pools.stats("Rock").unwrap().idle, 6);
        assert_eq!(pools.stats("Spark").unwrap().idle, 8);
        assert_eq!(pools.empty_stats().capacity, 8);
    }

    #[test]
    fn test_unknown_template_is_skipped() {
        logging::init_for_tests();
        let settings = PoolSettings {
            startup: vec![StartupPool::new("Ghost", "ghost"), StartupPool::new("Rock", "rock")],
            ..Default::default()
        };

        let pools = PoolManager::new(PoolScope::Scene);
        assert_eq!(pools.register_startup(&settings, &templates()), 1);
        assert!(!pools.has_blueprint("Ghost"));
        assert!(pools.has_blueprint("Rock"));
    }

    #[test]
    fn test_duplicate_startup_pool_keeps_first() {
        logging::init_for_tests();
        let mut second = StartupPool::new("Rock", "spark");
        second.initial_size = Some(3);
        let settings = PoolSettings {
            startup: vec![StartupPool::new("Rock", "rock"), second],
            ..Default::default()
        };

        let pools = PoolManager::new(PoolScope::Scene);
        assert_eq!(pools.register_startup(&settings, &templates()), 1);

        let rock = pools.spawn("Rock", &SpawnParams::new()).unwrap();
        assert!(rock.lock().has_aspect::<Body3D>());
        assert_eq!(pools.stats("Rock").unwrap().capacity, 25);
    }

    #[test]
    fn test_blueprint_failure_aborts_registration() {
        logging::init_for_tests();
        let pools = PoolManager::new(PoolScope::Scene);
        let template = Entity::new("Broken").with_aspect(Opaque);

        let err = pools
            .register("Broken", &template, PoolingStrategy::FILL, 5)
            .unwrap_err();
        assert!(matches!(err, PoolError::Blueprint { .. }));
        assert!(!pools.has_blueprint("Broken"));
        assert!(pools.spawn("Broken", &SpawnParams::new()).is_none());

        // The name is free again
        pools
            .register("Broken", &Entity::new("Fixed"), PoolingStrategy::DEFAULT, 5)
            .unwrap();
        assert!(pools.has_blueprint("Broken"));
    }

    #[test]
    fn test_definitions_register_in_order() {
        logging::init_for_tests();
        let pools = PoolManager::new(PoolScope::Global);
        let definitions = [
            BlueprintPoolDefinition::new("Rock", Entity::new("Rock")).with_initial_size(2),
            BlueprintPoolDefinition::new("Rock", Entity::new("Other")),
            BlueprintPoolDefinition::new("Spark", Entity::new("Spark")).with_strategy(PoolingStrategy::FILL),
        ];

        let results: Vec<_> = definitions.iter().map(|d| pools.register_definition(d)).collect();

        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(PoolError::DuplicateBlueprint("Rock".to_string())));
        assert!(results[2].is_ok());
        assert_eq!(pools.stats("Spark").unwrap().idle, 25);
    }
}
