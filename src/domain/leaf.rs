// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leaf values and per-type coercion.
//!
//! A leaf is a field the flattener does not descend into: a scalar or a
//! sequence. [`LeafField`] extracts a leaf's value and coerces stored text
//! back into the field's declared type.

use crate::domain::config_key::ConfigKey;
use crate::domain::config_value::ConfigValue;
use crate::domain::errors::{ConfigError, Result};
use crate::domain::record::{ConfigField, Field, FieldKind, FieldMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// The value of one leaf field, as extracted by the flattener.
#[derive(Clone, Debug, PartialEq)]
pub enum LeafValue {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A single precision float.
    F32(f32),
    /// A double precision float.
    F64(f64),
    /// Text.
    Text(String),
    /// An ordered sequence, held as a JSON array.
    Sequence(serde_json::Value),
}

impl LeafValue {
    /// Returns the field kind this value came from.
    pub fn kind(&self) -> FieldKind {
        match self {
            LeafValue::Sequence(_) => FieldKind::Sequence,
            _ => FieldKind::Scalar,
        }
    }
}

/// A field holding a scalar or sequence value.
pub trait LeafField {
    /// Returns the current value of the field.
    ///
    /// `key` is the field's flat key, used for error reporting.
    fn to_leaf(&self, key: &ConfigKey) -> Result<LeafValue>;

    /// Replaces the field's value with `value` coerced to the field's type.
    ///
    /// On error the field is left unchanged.
    fn assign_text(&mut self, key: &ConfigKey, value: &ConfigValue) -> Result<()>;
}

macro_rules! scalar_leaf {
    ($($ty:ty => |$v:ident| $to_leaf:expr;)*) => {
        $(
            impl LeafField for $ty {
                fn to_leaf(&self, _key: &ConfigKey) -> Result<LeafValue> {
                    let $v = *self;
                    Ok($to_leaf)
                }

                fn assign_text(&mut self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
                    *self = value.parse::<$ty>(key.as_str())?;
                    Ok(())
                }
            }

            impl ConfigField for $ty {
                const KIND: FieldKind = FieldKind::Scalar;

                fn as_field(&self) -> Field<'_> {
                    Field::Leaf(self)
                }

                fn as_field_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::Leaf(self)
                }
            }
        )*
    };
}

scalar_leaf! {
    i8 => |v| LeafValue::Int(i64::from(v));
    i16 => |v| LeafValue::Int(i64::from(v));
    i32 => |v| LeafValue::Int(i64::from(v));
    i64 => |v| LeafValue::Int(v);
    isize => |v| LeafValue::Int(v as i64);
    u8 => |v| LeafValue::UInt(u64::from(v));
    u16 => |v| LeafValue::UInt(u64::from(v));
    u32 => |v| LeafValue::UInt(u64::from(v));
    u64 => |v| LeafValue::UInt(v);
    usize => |v| LeafValue::UInt(v as u64);
    f32 => |v| LeafValue::F32(v);
    f64 => |v| LeafValue::F64(v);
}

impl LeafField for bool {
    fn to_leaf(&self, _key: &ConfigKey) -> Result<LeafValue> {
        Ok(LeafValue::Bool(*self))
    }

    fn assign_text(&mut self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        *self = value.as_bool(key.as_str())?;
        Ok(())
    }
}

impl ConfigField for bool {
    const KIND: FieldKind = FieldKind::Scalar;

    fn as_field(&self) -> Field<'_> {
        Field::Leaf(self)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Leaf(self)
    }
}

impl LeafField for String {
    fn to_leaf(&self, _key: &ConfigKey) -> Result<LeafValue> {
        Ok(LeafValue::Text(self.clone()))
    }

    fn assign_text(&mut self, _key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        self.clear();
        self.push_str(value.as_str());
        Ok(())
    }
}

impl ConfigField for String {
    const KIND: FieldKind = FieldKind::Scalar;

    fn as_field(&self) -> Field<'_> {
        Field::Leaf(self)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Leaf(self)
    }
}

// JSON has no non-finite floats and serde_json writes them as null, so the
// encoded array must decode back to the element type.
fn sequence_to_leaf<T>(items: &[T], key: &ConfigKey) -> Result<LeafValue>
where
    T: Serialize + DeserializeOwned,
{
    let to_error = |e| ConfigError::SerializationError {
        key: key.to_string(),
        source: e,
    };
    let value = serde_json::to_value(items).map_err(to_error)?;
    serde_json::from_value::<Vec<T>>(value.clone()).map_err(to_error)?;
    Ok(LeafValue::Sequence(value))
}

impl<T> LeafField for Vec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_leaf(&self, key: &ConfigKey) -> Result<LeafValue> {
        sequence_to_leaf(self, key)
    }

    fn assign_text(&mut self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        *self = value.decode_json(key.as_str())?;
        Ok(())
    }
}

impl<T> ConfigField for Vec<T>
where
    T: Serialize + DeserializeOwned,
{
    const KIND: FieldKind = FieldKind::Sequence;

    fn as_field(&self) -> Field<'_> {
        Field::Leaf(self)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Leaf(self)
    }
}

/// A stored sequence had the wrong number of elements for a fixed-size array.
#[derive(Debug, Error)]
#[error("expected {expected} elements, found {found}")]
pub struct LengthMismatch {
    /// The array length
    pub expected: usize,
    /// The stored sequence length
    pub found: usize,
}

impl<T, const N: usize> LeafField for [T; N]
where
    T: Serialize + DeserializeOwned,
{
    fn to_leaf(&self, key: &ConfigKey) -> Result<LeafValue> {
        sequence_to_leaf(self.as_slice(), key)
    }

    fn assign_text(&mut self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        let items: Vec<T> = value.decode_json(key.as_str())?;
        let found = items.len();
        *self = items.try_into().map_err(|_| ConfigError::TypeCoercion {
            key: key.to_string(),
            target_type: std::any::type_name::<[T; N]>().to_string(),
            source: Box::new(LengthMismatch { expected: N, found }),
        })?;
        Ok(())
    }
}

impl<T, const N: usize> ConfigField for [T; N]
where
    T: Serialize + DeserializeOwned,
{
    const KIND: FieldKind = FieldKind::Sequence;

    fn as_field(&self) -> Field<'_> {
        Field::Leaf(self)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Leaf(self)
    }
}
