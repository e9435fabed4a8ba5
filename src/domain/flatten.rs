// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattening records into dot-keyed leaves, and encoding leaves as text.
//!
//! ```
//! use optmap::config_record;
//! use optmap::domain::config_key::ConfigKey;
//! use optmap::domain::flatten::{encode_all, flatten};
//!
//! config_record! {
//!     #[derive(Default)]
//!     pub struct Inner { pub x: i32 as "X" }
//! }
//! config_record! {
//!     #[derive(Default)]
//!     pub struct Outer { pub inner: Inner as "Inner", pub tags: Vec<String> }
//! }
//!
//! let outer = Outer { inner: Inner { x: 1 }, tags: vec!["a".into(), "b".into()] };
//! let encoded = encode_all(flatten(&outer).unwrap()).unwrap();
//!
//! assert_eq!(encoded.len(), 2);
//! assert_eq!(encoded[&ConfigKey::from("Inner.X")].as_str(), "1");
//! assert_eq!(encoded[&ConfigKey::from("tags")].as_str(), r#"["a","b"]"#);
//! ```

use crate::domain::config_key::{validate_segment, ConfigKey};
use crate::domain::config_value::ConfigValue;
use crate::domain::errors::{ConfigError, Result};
use crate::domain::leaf::LeafValue;
use crate::domain::record::{ConfigRecord, Field};
use std::collections::{BTreeMap, HashSet};

/// Flattened leaves keyed by their full dot-joined path.
pub type FlatMap = BTreeMap<ConfigKey, LeafValue>;

/// Encoded options keyed by their full dot-joined path.
pub type EncodedMap = BTreeMap<ConfigKey, ConfigValue>;

/// Flattens a record into one entry per leaf field.
///
/// Nested records are walked recursively and their entries re-keyed as
/// `parent.child`; sequences are leaves and are not descended into.
///
/// Fails with `InvalidKey` if a canonical segment is empty or contains `.`, and
/// with `SchemaError` if two siblings share a canonical segment.
pub fn flatten(record: &dyn ConfigRecord) -> Result<FlatMap> {
    flatten_prefixed(record, &ConfigKey::from(""))
}

/// Flattens a record with every key re-rooted under `prefix`.
pub fn flatten_prefixed(record: &dyn ConfigRecord, prefix: &ConfigKey) -> Result<FlatMap> {
    let mut result = FlatMap::new();
    flatten_into(record, prefix, &mut result)?;
    Ok(result)
}

fn flatten_into(record: &dyn ConfigRecord, prefix: &ConfigKey, result: &mut FlatMap) -> Result<()> {
    let nodes = record.nodes();
    let mut seen = HashSet::with_capacity(nodes.len());

    for node in nodes.iter() {
        let key = prefix.child(node.name());
        validate_segment(node.name()).map_err(|e| match e {
            ConfigError::InvalidKey { reason, .. } => ConfigError::InvalidKey {
                key: key.to_string(),
                reason,
            },
            other => other,
        })?;
        if !seen.insert(node.name()) {
            return Err(ConfigError::SchemaError {
                key: key.to_string(),
                message: "duplicate canonical key".to_string(),
            });
        }

        match record.field(node.name()) {
            Some(Field::Record(child)) => flatten_into(child, &key, result)?,
            Some(Field::Leaf(leaf)) => {
                let value = leaf.to_leaf(&key)?;
                result.insert(key, value);
            }
            None => {
                return Err(ConfigError::SchemaError {
                    key: key.to_string(),
                    message: "descriptor has no matching field".to_string(),
                })
            }
        }
    }

    Ok(())
}

/// Encodes one leaf as storable text.
///
/// Sequences become JSON arrays; scalars use Rust's locale-independent
/// `Display` form, which parses back to the same value.
pub fn encode(key: &ConfigKey, leaf: &LeafValue) -> Result<ConfigValue> {
    let text = match leaf {
        LeafValue::Bool(b) => b.to_string(),
        LeafValue::Int(n) => n.to_string(),
        LeafValue::UInt(n) => n.to_string(),
        LeafValue::F32(n) => n.to_string(),
        LeafValue::F64(n) => n.to_string(),
        LeafValue::Text(s) => s.clone(),
        LeafValue::Sequence(items) => {
            serde_json::to_string(items).map_err(|e| ConfigError::SerializationError {
                key: key.to_string(),
                source: e,
            })?
        }
    };
    Ok(ConfigValue::new(text))
}

/// Encodes every leaf of a flattened record, stopping at the first failure.
pub fn encode_all(flat: FlatMap) -> Result<EncodedMap> {
    flat.into_iter()
        .map(|(key, leaf)| {
            let value = encode(&key, &leaf)?;
            Ok((key, value))
        })
        .collect()
}
