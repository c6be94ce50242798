//! Plain-data field values and per-aspect field schemas
//!
//! Blueprints only ever capture plain data: numbers, booleans, characters,
//! strings and small value vectors. Nested object references have no
//! [`FieldKind`] and so cannot be declared in an [`AspectSchema`].

use crate::entity::AspectError;
use crate::foundation::math::{Color, Quat, Vec2, Vec3, Vec4};
use std::collections::HashSet;
use std::fmt;

/// Kind of a plain-data field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Boolean flag
    Bool,
    /// Signed integer of any width
    Int,
    /// Unsigned integer of any width
    UInt,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Single character
    Char,
    /// Owned string
    Text,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// 4D vector
    Vec4,
    /// Rotation quaternion
    Quat,
    /// RGBA color
    Color,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A captured plain-data value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Single character
    Char(char),
    /// Owned string
    Text(String),
    /// 2D vector
    Vec2(Vec2),
    /// 3D vector
    Vec3(Vec3),
    /// 4D vector
    Vec4(Vec4),
    /// Rotation quaternion
    Quat(Quat),
    /// RGBA color
    Color(Color),
}

impl FieldValue {
    /// Kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Int(_) => FieldKind::Int,
            Self::UInt(_) => FieldKind::UInt,
            Self::Float(_) => FieldKind::Float,
            Self::Double(_) => FieldKind::Double,
            Self::Char(_) => FieldKind::Char,
            Self::Text(_) => FieldKind::Text,
            Self::Vec2(_) => FieldKind::Vec2,
            Self::Vec3(_) => FieldKind::Vec3,
            Self::Vec4(_) => FieldKind::Vec4,
            Self::Quat(_) => FieldKind::Quat,
            Self::Color(_) => FieldKind::Color,
        }
    }

    /// Read the value as `T`, if the kind matches and the value fits
    pub fn get<T: PlainData>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Read the value as `T` on behalf of an aspect setter
    ///
    /// Produces an [`AspectError::KindMismatch`] naming the aspect and field
    /// when the value cannot be represented as `T`.
    pub fn extract<T: PlainData>(&self, aspect: &'static str, field: &str) -> Result<T, AspectError> {
        T::from_value(self).ok_or_else(|| AspectError::KindMismatch {
            aspect,
            field: field.to_string(),
            expected: T::KIND,
            found: self.kind(),
        })
    }
}

/// Rust types that map onto a [`FieldKind`]
pub trait PlainData: Sized {
    /// The kind values of this type are stored as
    const KIND: FieldKind;

    /// Wrap the value
    fn into_value(self) -> FieldValue;

    /// Unwrap a value of the matching kind
    fn from_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! plain_data {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl PlainData for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(self)
            }

            fn from_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(value)
            }
        }
    };
}

plain_data!(bool, Bool, Bool);
plain_data!(i64, Int, Int);
plain_data!(u64, UInt, UInt);
plain_data!(f32, Float, Float);
plain_data!(f64, Double, Double);
plain_data!(char, Char, Char);
plain_data!(String, Text, Text);
plain_data!(Vec2, Vec2, Vec2);
plain_data!(Vec3, Vec3, Vec3);
plain_data!(Vec4, Vec4, Vec4);
plain_data!(Quat, Quat, Quat);
plain_data!(Color, Color, Color);

macro_rules! narrow_int {
    ($ty:ty, $kind:ident, $variant:ident, $wide:ty) => {
        impl PlainData for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(<$wide>::from(self))
            }

            fn from_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                }
            }
        }

        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(<$wide>::from(value))
            }
        }
    };
}

narrow_int!(i8, Int, Int, i64);
narrow_int!(i16, Int, Int, i64);
narrow_int!(i32, Int, Int, i64);
narrow_int!(u8, UInt, UInt, u64);
narrow_int!(u16, UInt, UInt, u64);
narrow_int!(u32, UInt, UInt, u64);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// A single declared field of an aspect type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field identifier
    pub name: &'static str,
    /// Declared kind
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Declare a field
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Registration-time schema of an aspect type
///
/// `parent` chains to the schema of the type this aspect builds on; capture
/// collects the aspect's own fields first and then walks up the chain.
#[derive(Debug)]
pub struct AspectSchema {
    /// Name of the aspect type
    pub type_name: &'static str,
    /// Fields declared directly on this type
    pub fields: &'static [FieldDescriptor],
    /// Schema of the base type, if any
    pub parent: Option<&'static AspectSchema>,
}

impl AspectSchema {
    /// Schema without a base type
    pub const fn new(type_name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self {
            type_name,
            fields,
            parent: None,
        }
    }

    /// Chain this schema onto a base type's schema
    pub const fn extends(mut self, parent: &'static AspectSchema) -> Self {
        self.parent = Some(parent);
        self
    }

    /// All snapshot-able fields, own fields first, then each ancestor's
    ///
    /// A field name declared again further up the chain is shadowed by the
    /// most derived declaration.
    pub fn all_fields(&'static self) -> Vec<&'static FieldDescriptor> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut current = Some(self);

        while let Some(schema) = current {
            for field in schema.fields {
                if seen.insert(field.name) {
                    result.push(field);
                }
            }
            current = schema.parent;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BASE: AspectSchema = AspectSchema::new(
        "Base",
        &[
            FieldDescriptor::new("health", FieldKind::Float),
            FieldDescriptor::new("label", FieldKind::Text),
        ],
    );

    static DERIVED: AspectSchema = AspectSchema::new(
        "Derived",
        &[
            FieldDescriptor::new("speed", FieldKind::Float),
            FieldDescriptor::new("label", FieldKind::Text),
        ],
    )
    .extends(&BASE);

    #[test]
    fn test_schema_walks_parent_chain() {
        let names: Vec<_> = DERIVED.all_fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["speed", "label", "health"]);
    }

    #[test]
    fn test_narrow_integers_round_through_wide_storage() {
        let value = FieldValue::from(42_i32);
        assert_eq!(value.kind(), FieldKind::Int);
        assert_eq!(value.get::<i32>(), Some(42));
        assert_eq!(value.get::<i64>(), Some(42));
        assert_eq!(FieldValue::Int(i64::MAX).get::<i32>(), None);
    }

    #[test]
    fn test_extract_reports_kind_mismatch() {
        let value = FieldValue::Bool(true);
        let err = value.extract::<f32>("Mover", "speed").unwrap_err();
        assert_eq!(
            err,
            AspectError::KindMismatch {
                aspect: "Mover",
                field: "speed".to_string(),
                expected: FieldKind::Float,
                found: FieldKind::Bool,
            }
        );
    }
}
