//! Demo-specific aspects

use easy_pool::prelude::*;
use rand::Rng;

/// Fields shared by everything the black hole can swallow
static CELESTIAL_SCHEMA: AspectSchema = AspectSchema::new(
    "CelestialBody",
    &[FieldDescriptor::new("explode_distance", FieldKind::Float)],
);

static ASTEROID_SCHEMA: AspectSchema = AspectSchema::new(
    "Asteroid",
    &[
        FieldDescriptor::new("scale", FieldKind::Float),
        FieldDescriptor::new("exploded", FieldKind::Bool),
    ],
)
.extends(&CELESTIAL_SCHEMA);

static TIME_TO_LIVE_SCHEMA: AspectSchema =
    AspectSchema::new("TimeToLive", &[FieldDescriptor::new("seconds", FieldKind::Float)]);

/// Rock drifting towards the black hole
#[derive(Debug, Clone)]
pub struct Asteroid {
    /// Distance to the black hole at which the asteroid breaks apart
    pub explode_distance: f32,

    /// Uniform scale, rerolled on every spawn
    pub scale: f32,

    /// Set once the explosion was triggered
    pub exploded: bool,
}

impl Default for Asteroid {
    fn default() -> Self {
        Self {
            explode_distance: 1.0,
            scale: 0.015,
            exploded: false,
        }
    }
}

impl Aspect for Asteroid {
    fn schema(&self) -> &'static AspectSchema {
        &ASTEROID_SCHEMA
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "explode_distance" => Some(self.explode_distance.into()),
            "scale" => Some(self.scale.into()),
            "exploded" => Some(self.exploded.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), AspectError> {
        match name {
            "explode_distance" => self.explode_distance = value.extract("Asteroid", name)?,
            "scale" => self.scale = value.extract("Asteroid", name)?,
            "exploded" => self.exploded = value.extract("Asteroid", name)?,
            _ => {
                return Err(AspectError::UnknownField {
                    aspect: "Asteroid",
                    field: name.to_string(),
                })
            }
        }
        Ok(())
    }

    fn as_poolable(&mut self) -> Option<&mut dyn Poolable> {
        Some(self)
    }
}

impl Poolable for Asteroid {
    fn on_spawn(&mut self) {
        self.scale = rand::thread_rng().gen_range(0.01..0.02);
    }
}

/// Remaining lifetime of an explosion particle
#[derive(Debug, Clone)]
pub struct TimeToLive {
    /// Seconds left before the particle is despawned
    pub seconds: f32,
}

impl Default for TimeToLive {
    fn default() -> Self {
        Self { seconds: 5.0 }
    }
}

impl TimeToLive {
    /// Count down by `dt`, returning true once expired
    pub fn tick(&mut self, dt: f32) -> bool {
        self.seconds -= dt;
        self.seconds <= 0.0
    }
}

impl Aspect for TimeToLive {
    fn schema(&self) -> &'static AspectSchema {
        &TIME_TO_LIVE_SCHEMA
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "seconds" => Some(self.seconds.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), AspectError> {
        match name {
            "seconds" => self.seconds = value.extract("TimeToLive", name)?,
            _ => {
                return Err(AspectError::UnknownField {
                    aspect: "TimeToLive",
                    field: name.to_string(),
                })
            }
        }
        Ok(())
    }

    fn as_poolable(&mut self) -> Option<&mut dyn Poolable> {
        Some(self)
    }
}

impl Poolable for TimeToLive {
    fn on_spawn(&mut self) {
        self.seconds = rand::thread_rng().gen_range(4.0..5.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asteroid_schema_includes_base_fields() {
        let fields: Vec<_> = Asteroid::default()
            .schema()
            .all_fields()
            .iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(fields, vec!["scale", "exploded", "explode_distance"]);
    }

    #[test]
    fn test_blueprint_resets_exploded_flag() {
        let template = Entity::new("Asteroid").with_aspect(Asteroid::default());
        let blueprint = EntityBlueprint::capture("Asteroid", &template).unwrap();

        let mut rock = template.instantiate();
        rock.aspect_mut::<Asteroid>().unwrap().exploded = true;
        blueprint.decorate(&mut rock).unwrap();

        assert!(!rock.aspect::<Asteroid>().unwrap().exploded);
    }

    #[test]
    fn test_spawn_rerolls_lifetime() {
        let mut ttl = TimeToLive::default();
        ttl.on_spawn();
        assert!((4.0..5.0).contains(&ttl.seconds));
    }

    #[test]
    fn test_tick_expires() {
        let mut ttl = TimeToLive { seconds: 0.1 };
        assert!(!ttl.tick(0.05));
        assert!(ttl.tick(0.05));
    }
}
