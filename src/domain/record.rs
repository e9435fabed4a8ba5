// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record descriptors.
//!
//! A configuration record exposes its schema as a list of [`ConfigNode`]
//! descriptors plus typed access to each child by canonical key segment. The
//! flattener and the struct assigner walk records only through
//! [`ConfigRecord`], so neither needs runtime type inspection.
//!
//! Structs get their implementation from [`config_record!`](crate::config_record);
//! `BTreeMap<String, V>` is a record whose children are its entries.

use crate::domain::config_key::canonical_segment;
use crate::domain::leaf::LeafField;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// How a field participates in flattening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single value stored as its text form.
    Scalar,
    /// An ordered collection stored as one JSON-encoded value.
    Sequence,
    /// A record whose fields are flattened below the field's key.
    NestedRecord,
}

/// Descriptor of one named field of a record.
///
/// The name is the canonical key segment, derived once when the schema is
/// first built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    kind: FieldKind,
    declared_type: &'static str,
}

impl ConfigNode {
    /// Creates a descriptor, applying the key naming rule to `declared` and `alias`.
    ///
    /// ```
    /// use optmap::domain::record::{ConfigNode, FieldKind};
    ///
    /// let node = ConfigNode::new("DarkColor", Some("dark_color,omitempty"), FieldKind::Scalar, "String");
    /// assert_eq!(node.name(), "dark_color");
    /// ```
    pub fn new(
        declared: &str,
        alias: Option<&str>,
        kind: FieldKind,
        declared_type: &'static str,
    ) -> Self {
        Self {
            name: canonical_segment(declared, alias).to_string(),
            kind,
            declared_type,
        }
    }

    /// The canonical key segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The Rust type name of the field.
    pub fn declared_type(&self) -> &'static str {
        self.declared_type
    }
}

/// Read access to one child of a record.
pub enum Field<'a> {
    /// A scalar or sequence value.
    Leaf(&'a dyn LeafField),
    /// A nested record.
    Record(&'a dyn ConfigRecord),
}

/// Write access to one child of a record.
pub enum FieldMut<'a> {
    /// A scalar or sequence value.
    Leaf(&'a mut dyn LeafField),
    /// A nested record.
    Record(&'a mut dyn ConfigRecord),
}

/// A configuration record: a tree of named fields.
pub trait ConfigRecord {
    /// Descriptors of the record's children, in declaration order.
    fn nodes(&self) -> Cow<'_, [ConfigNode]>;

    /// Looks up a child by canonical key segment.
    fn field(&self, name: &str) -> Option<Field<'_>>;

    /// Looks up a child by canonical key segment for mutation.
    ///
    /// Keyed collections create a default entry for an unknown name; structs
    /// return `None`.
    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>>;

    /// Drops a child created by [`field_mut`](ConfigRecord::field_mut).
    ///
    /// Keyed collections remove the entry. Struct fields cannot be removed, so
    /// the default does nothing.
    fn remove_field(&mut self, _name: &str) {}
}

/// A type that can sit in a record field.
///
/// Implemented for the supported leaf types, for keyed collections, and for
/// every struct declared with [`config_record!`](crate::config_record).
pub trait ConfigField {
    /// The kind reported in the field's [`ConfigNode`].
    const KIND: FieldKind;

    /// Borrows the value as a record child.
    fn as_field(&self) -> Field<'_>;

    /// Mutably borrows the value as a record child.
    fn as_field_mut(&mut self) -> FieldMut<'_>;
}

impl<V> ConfigRecord for BTreeMap<String, V>
where
    V: ConfigField + Default,
{
    fn nodes(&self) -> Cow<'_, [ConfigNode]> {
        Cow::Owned(
            self.keys()
                .map(|key| ConfigNode::new(key, None, V::KIND, std::any::type_name::<V>()))
                .collect(),
        )
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        self.get(name).map(ConfigField::as_field)
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        Some(self.entry(name.to_string()).or_default().as_field_mut())
    }

    fn remove_field(&mut self, name: &str) {
        self.remove(name);
    }
}

impl<V> ConfigField for BTreeMap<String, V>
where
    V: ConfigField + Default,
{
    const KIND: FieldKind = FieldKind::NestedRecord;

    fn as_field(&self) -> Field<'_> {
        Field::Record(self)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Record(self)
    }
}

/// Declares a struct and derives its [`ConfigRecord`] descriptors.
///
/// Each field may carry an alias after `as`; the key naming rule turns it into
/// the field's canonical key segment (`"dark_color,omitempty"` becomes
/// `dark_color`). Every field type must implement [`ConfigField`].
///
/// # Examples
///
/// ```
/// use optmap::config_record;
/// use optmap::domain::record::ConfigRecord;
///
/// config_record! {
///     #[derive(Debug, Default)]
///     pub struct Theme {
///         pub color: String,
///         pub dark_color: String as "dark_color,omitempty",
///         pub contrast: u8 as "Contrast",
///     }
/// }
///
/// let theme = Theme::default();
/// let names: Vec<String> = theme.nodes().iter().map(|n| n.name().to_string()).collect();
/// assert_eq!(names, vec!["color", "dark_color", "Contrast"]);
/// ```
#[macro_export]
macro_rules! config_record {
    (@alias) => {
        ::std::option::Option::None
    };
    (@alias $alias:literal) => {
        ::std::option::Option::Some($alias)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(as $alias:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::domain::record::ConfigRecord for $name {
            fn nodes(&self) -> ::std::borrow::Cow<'_, [$crate::domain::record::ConfigNode]> {
                static NODES: $crate::__private::Lazy<
                    ::std::vec::Vec<$crate::domain::record::ConfigNode>,
                > = $crate::__private::Lazy::new(|| {
                    ::std::vec![
                        $(
                            $crate::domain::record::ConfigNode::new(
                                ::std::stringify!($field),
                                $crate::config_record!(@alias $($alias)?),
                                <$ty as $crate::domain::record::ConfigField>::KIND,
                                ::std::any::type_name::<$ty>(),
                            ),
                        )*
                    ]
                });
                ::std::borrow::Cow::Borrowed(NODES.as_slice())
            }

            fn field(
                &self,
                name: &str,
            ) -> ::std::option::Option<$crate::domain::record::Field<'_>> {
                $(
                    if $crate::domain::config_key::canonical_segment(
                        ::std::stringify!($field),
                        $crate::config_record!(@alias $($alias)?),
                    ) == name
                    {
                        return ::std::option::Option::Some(
                            $crate::domain::record::ConfigField::as_field(&self.$field),
                        );
                    }
                )*
                ::std::option::Option::None
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::std::option::Option<$crate::domain::record::FieldMut<'_>> {
                $(
                    if $crate::domain::config_key::canonical_segment(
                        ::std::stringify!($field),
                        $crate::config_record!(@alias $($alias)?),
                    ) == name
                    {
                        return ::std::option::Option::Some(
                            $crate::domain::record::ConfigField::as_field_mut(&mut self.$field),
                        );
                    }
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::domain::record::ConfigField for $name {
            const KIND: $crate::domain::record::FieldKind =
                $crate::domain::record::FieldKind::NestedRecord;

            fn as_field(&self) -> $crate::domain::record::Field<'_> {
                $crate::domain::record::Field::Record(self)
            }

            fn as_field_mut(&mut self) -> $crate::domain::record::FieldMut<'_> {
                $crate::domain::record::FieldMut::Record(self)
            }
        }
    };
}
