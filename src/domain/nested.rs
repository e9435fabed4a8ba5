// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rebuilding nested option trees from flat dot-keyed entries.

use crate::domain::config_key::ConfigKey;
use crate::domain::config_value::ConfigValue;
use crate::domain::errors::{ConfigError, Result};
use crate::domain::flatten::EncodedMap;
use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

/// One node of a [`NestedTree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NestedNode {
    /// A stored option value.
    Value(ConfigValue),
    /// Options nested below this segment.
    Branch(NestedTree),
}

/// Options nested by key segment.
///
/// # Examples
///
/// ```
/// use optmap::domain::nested::{reconstruct, NestedNode};
///
/// let tree = reconstruct([("apps.bash.title", "Bash"), ("apps.bash.active", "true")]).unwrap();
/// let Some(NestedNode::Branch(apps)) = tree.get("apps") else { panic!() };
/// let Some(NestedNode::Branch(bash)) = apps.get("bash") else { panic!() };
/// assert_eq!(bash.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NestedTree(BTreeMap<String, NestedNode>);

impl NestedTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node directly below `segment`.
    pub fn get(&self, segment: &str) -> Option<&NestedNode> {
        self.0.get(segment)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over direct children in segment order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, NestedNode> {
        self.0.iter()
    }

    /// Places `value` at the path named by `key`, creating branches on the way.
    ///
    /// A path that already holds a value cannot become a branch and a branch
    /// cannot be replaced by a value; both fail with `StructuralConflict`.
    /// Re-inserting an existing leaf replaces its value.
    pub fn insert(&mut self, key: &ConfigKey, value: ConfigValue) -> Result<()> {
        let segments: Vec<&str> = key.segments().collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidKey {
                key: key.to_string(),
                reason: "key has an empty segment".to_string(),
            });
        }
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(ConfigError::InvalidKey {
                key: key.to_string(),
                reason: "key is empty".to_string(),
            });
        };

        let mut node = self;
        let mut path = ConfigKey::from("");
        for segment in parents {
            path = path.child(segment);
            node = match node
                .0
                .entry((*segment).to_string())
                .or_insert_with(|| NestedNode::Branch(NestedTree::new()))
            {
                NestedNode::Branch(tree) => tree,
                NestedNode::Value(_) => {
                    return Err(ConfigError::StructuralConflict {
                        key: key.to_string(),
                        path: path.into_string(),
                        existing: "value",
                    })
                }
            };
        }

        match node.0.entry((*leaf).to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(NestedNode::Value(value));
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                NestedNode::Value(existing) => *existing = value,
                NestedNode::Branch(_) => {
                    return Err(ConfigError::StructuralConflict {
                        key: key.to_string(),
                        path: key.to_string(),
                        existing: "branch",
                    })
                }
            },
        }
        Ok(())
    }

    /// Joins the tree back into flat dot-keyed entries.
    pub fn to_flat(&self) -> EncodedMap {
        let mut result = EncodedMap::new();
        self.collect_flat(&ConfigKey::from(""), &mut result);
        result
    }

    fn collect_flat(&self, prefix: &ConfigKey, result: &mut EncodedMap) {
        for (segment, node) in &self.0 {
            let key = prefix.child(segment);
            match node {
                NestedNode::Value(value) => {
                    result.insert(key, value.clone());
                }
                NestedNode::Branch(tree) => tree.collect_flat(&key, result),
            }
        }
    }
}

impl<'a> IntoIterator for &'a NestedTree {
    type Item = (&'a String, &'a NestedNode);
    type IntoIter = btree_map::Iter<'a, String, NestedNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Builds a nested tree from flat entries by splitting each key on `.`.
///
/// Entries are processed in key order, so the result (or the reported
/// conflict) depends only on the set of entries. A key repeated in the input
/// keeps its last value.
pub fn reconstruct<I, K, V>(entries: I) -> Result<NestedTree>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<ConfigKey>,
    V: Into<ConfigValue>,
{
    let sorted: EncodedMap = entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    let mut tree = NestedTree::new();
    for (key, value) in sorted {
        tree.insert(&key, value)?;
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_at<'a>(tree: &'a NestedTree, path: &str) -> Option<&'a ConfigValue> {
        let mut node = tree;
        let segments: Vec<&str> = path.split('.').collect();
        let (leaf, parents) = segments.split_last()?;
        for segment in parents {
            match node.get(segment)? {
                NestedNode::Branch(tree) => node = tree,
                NestedNode::Value(_) => return None,
            }
        }
        match node.get(leaf)? {
            NestedNode::Value(v) => Some(v),
            NestedNode::Branch(_) => None,
        }
    }

    #[test]
    fn test_reconstruct_single_level() {
        let tree = reconstruct([("B", "3")]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(value_at(&tree, "B").unwrap().as_str(), "3");
    }

    #[test]
    fn test_reconstruct_shares_branches() {
        let tree = reconstruct([
            ("apps.bash.title", "Bash"),
            ("apps.bash.active", "true"),
            ("apps.python.title", "Python"),
        ])
        .unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(value_at(&tree, "apps.bash.title").unwrap().as_str(), "Bash");
        assert_eq!(value_at(&tree, "apps.bash.active").unwrap().as_str(), "true");
        assert_eq!(value_at(&tree, "apps.python.title").unwrap().as_str(), "Python");
    }

    #[test]
    fn test_reconstruct_leaf_then_branch_conflict() {
        let err = reconstruct([("apps.x", "1"), ("apps.x.y", "2")]).unwrap_err();
        match err {
            ConfigError::StructuralConflict { key, path, existing } => {
                assert_eq!(key, "apps.x.y");
                assert_eq!(path, "apps.x");
                assert_eq!(existing, "value");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reconstruct_conflict_is_order_independent() {
        let forward = reconstruct([("apps.x", "1"), ("apps.x.y", "2")]).unwrap_err();
        let backward = reconstruct([("apps.x.y", "2"), ("apps.x", "1")]).unwrap_err();
        assert_eq!(forward.to_string(), backward.to_string());
    }

    #[test]
    fn test_insert_branch_then_leaf_conflict() {
        let mut tree = NestedTree::new();
        tree.insert(&ConfigKey::from("apps.x.y"), ConfigValue::from("2"))
            .unwrap();
        let err = tree
            .insert(&ConfigKey::from("apps.x"), ConfigValue::from("1"))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::StructuralConflict { existing: "branch", .. }
        ));
    }

    #[test]
    fn test_reconstruct_rejects_empty_segments() {
        assert!(matches!(
            reconstruct([("apps..x", "1")]),
            Err(ConfigError::InvalidKey { .. })
        ));
        assert!(matches!(
            reconstruct([("", "1")]),
            Err(ConfigError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_reconstruct_empty_input() {
        let entries: Vec<(String, String)> = Vec::new();
        assert!(reconstruct(entries).unwrap().is_empty());
    }

    #[test]
    fn test_to_flat_rejoins_keys() {
        let mut flat = EncodedMap::new();
        flat.insert(ConfigKey::from("a.b.c"), ConfigValue::from("1"));
        flat.insert(ConfigKey::from("a.d"), ConfigValue::from("2"));
        flat.insert(ConfigKey::from("e"), ConfigValue::from("3"));

        let tree = reconstruct(flat.clone()).unwrap();
        assert_eq!(tree.to_flat(), flat);
    }
}
