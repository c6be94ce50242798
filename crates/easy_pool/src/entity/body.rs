//! Physics body aspects
//!
//! Spawn policies write their initial velocity into one of these when the
//! entity carries it: [`Body2D`] for planar motion, [`Body3D`] otherwise.

use super::aspect::{Aspect, AspectError};
use crate::blueprint::{AspectSchema, FieldDescriptor, FieldKind, FieldValue};
use crate::foundation::math::{Vec2, Vec3};

static BODY_2D_SCHEMA: AspectSchema = AspectSchema::new(
    "Body2D",
    &[
        FieldDescriptor::new("velocity", FieldKind::Vec2),
        FieldDescriptor::new("angular_velocity", FieldKind::Float),
        FieldDescriptor::new("mass", FieldKind::Float),
    ],
);

static BODY_3D_SCHEMA: AspectSchema = AspectSchema::new(
    "Body3D",
    &[
        FieldDescriptor::new("velocity", FieldKind::Vec3),
        FieldDescriptor::new("angular_velocity", FieldKind::Vec3),
        FieldDescriptor::new("mass", FieldKind::Float),
    ],
);

/// Rigid body constrained to a plane
#[derive(Debug, Clone, PartialEq)]
pub struct Body2D {
    /// Linear velocity in plane coordinates
    pub velocity: Vec2,
    /// Angular velocity in radians per second
    pub angular_velocity: f32,
    /// Mass in kilograms
    pub mass: f32,
}

impl Default for Body2D {
    fn default() -> Self {
        Self {
            velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            mass: 1.0,
        }
    }
}

impl Body2D {
    /// Create a body with initial velocity
    pub fn with_velocity(velocity: Vec2) -> Self {
        Self {
            velocity,
            ..Default::default()
        }
    }
}

impl Aspect for Body2D {
    fn schema(&self) -> &'static AspectSchema {
        &BODY_2D_SCHEMA
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "velocity" => Some(self.velocity.into()),
            "angular_velocity" => Some(self.angular_velocity.into()),
            "mass" => Some(self.mass.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), AspectError> {
        match name {
            "velocity" => self.velocity = value.extract("Body2D", name)?,
            "angular_velocity" => self.angular_velocity = value.extract("Body2D", name)?,
            "mass" => self.mass = value.extract("Body2D", name)?,
            _ => {
                return Err(AspectError::UnknownField {
                    aspect: "Body2D",
                    field: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Free rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct Body3D {
    /// Linear velocity in units per second
    pub velocity: Vec3,
    /// Angular velocity in radians per second
    pub angular_velocity: Vec3,
    /// Mass in kilograms
    pub mass: f32,
}

impl Default for Body3D {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            mass: 1.0,
        }
    }
}

impl Body3D {
    /// Create a body with initial velocity
    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Default::default()
        }
    }
}

impl Aspect for Body3D {
    fn schema(&self) -> &'static AspectSchema {
        &BODY_3D_SCHEMA
    }

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "velocity" => Some(self.velocity.into()),
            "angular_velocity" => Some(self.angular_velocity.into()),
            "mass" => Some(self.mass.into()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), AspectError> {
        match name {
            "velocity" => self.velocity = value.extract("Body3D", name)?,
            "angular_velocity" => self.angular_velocity = value.extract("Body3D", name)?,
            "mass" => self.mass = value.extract("Body3D", name)?,
            _ => {
                return Err(AspectError::UnknownField {
                    aspect: "Body3D",
                    field: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_fields_round_trip_through_schema() {
        let mut body = Body3D::default();
        for field in body.schema().all_fields() {
            let value = body.get_field(field.name).unwrap();
            assert_eq!(value.kind(), field.kind);
            body.set_field(field.name, value).unwrap();
        }
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut body = Body2D::default();
        let err = body.set_field("spin", FieldValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, AspectError::UnknownField { aspect: "Body2D", .. }));
    }

    #[test]
    fn test_set_wrong_kind_fails() {
        let mut body = Body2D::default();
        let err = body.set_field("velocity", FieldValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, AspectError::KindMismatch { expected: FieldKind::Vec2, .. }));
        assert_eq!(body.velocity, Vec2::zeros());
    }
}
