// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the core mapping types and logic.
//!
//! This module is independent of any store. It defines the flat key and value
//! types, the record descriptors that replace runtime reflection, and the
//! four pure stages of the mapping pipeline:
//!
//! - [`flatten`](flatten::flatten): record to dot-keyed leaves
//! - [`encode_all`](flatten::encode_all): leaves to storable text
//! - [`reconstruct`](nested::reconstruct): flat text entries to a nested tree
//! - [`assign`](assign::assign): nested tree merged into a live record

pub mod assign;
pub mod config_key;
pub mod config_value;
pub mod errors;
pub mod flatten;
pub mod leaf;
pub mod nested;
pub mod record;

// Re-export commonly used types
pub use assign::{assign, AssignReport, SkippedField};
pub use config_key::{canonical_segment, ConfigKey};
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use flatten::{encode, encode_all, flatten, flatten_prefixed, EncodedMap, FlatMap};
pub use leaf::{LeafField, LeafValue};
pub use nested::{reconstruct, NestedNode, NestedTree};
pub use record::{ConfigField, ConfigNode, ConfigRecord, Field, FieldKind, FieldMut};
