// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merging a nested option tree into a live record.
//!
//! Only fields whose canonical key appears in the tree are touched; everything
//! else keeps its current value. Keys that match no field are ignored so that
//! options written by other schema versions do not break loading.
//!
//! Assignment is best-effort: a value that cannot be coerced to its field's
//! type is skipped, the field keeps its old value, and the remaining fields
//! are still applied. A keyed collection only gains a new entry when at least
//! one value below it was applied. Every skip is recorded in the returned [`AssignReport`]
//! together with its error. Callers that want all-or-nothing behaviour call
//! [`AssignReport::into_result`] on a scratch copy before committing it.

use crate::domain::config_key::ConfigKey;
use crate::domain::errors::{ConfigError, Result};
use crate::domain::nested::{NestedNode, NestedTree};
use crate::domain::record::{ConfigRecord, FieldMut};

/// A field left unchanged because its value could not be applied.
#[derive(Debug)]
pub struct SkippedField {
    /// The flat key of the field
    pub key: ConfigKey,
    /// Why the value was not applied
    pub error: ConfigError,
}

/// Outcome of one [`assign`] call.
#[derive(Debug, Default)]
pub struct AssignReport {
    applied: Vec<ConfigKey>,
    skipped: Vec<SkippedField>,
}

impl AssignReport {
    /// Flat keys whose values were applied.
    pub fn applied(&self) -> &[ConfigKey] {
        &self.applied
    }

    /// Fields that were left unchanged.
    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    /// Returns `true` if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Converts the report into the applied keys, or the first skip's error.
    pub fn into_result(self) -> Result<Vec<ConfigKey>> {
        match self.skipped.into_iter().next() {
            Some(skipped) => Err(skipped.error),
            None => Ok(self.applied),
        }
    }
}

/// Merges `tree` into `target`.
///
/// # Examples
///
/// ```
/// use optmap::config_record;
/// use optmap::domain::assign::assign;
/// use optmap::domain::nested::reconstruct;
///
/// config_record! {
///     #[derive(Debug, Default)]
///     pub struct Pair { pub a: i32 as "A", pub b: i32 as "B" }
/// }
///
/// let mut pair = Pair { a: 1, b: 2 };
/// let report = assign(&reconstruct([("B", "3")]).unwrap(), &mut pair);
///
/// assert!(report.is_clean());
/// assert_eq!((pair.a, pair.b), (1, 3));
/// ```
pub fn assign(tree: &NestedTree, target: &mut dyn ConfigRecord) -> AssignReport {
    let mut report = AssignReport::default();
    assign_into(tree, target, &ConfigKey::from(""), &mut report);

    tracing::debug!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "Assigned options to live configuration"
    );
    report
}

fn assign_into(
    tree: &NestedTree,
    target: &mut dyn ConfigRecord,
    prefix: &ConfigKey,
    report: &mut AssignReport,
) {
    for (segment, node) in tree {
        let key = prefix.child(segment);
        let existed = target.field(segment).is_some();
        let applied_before = report.applied.len();
        let Some(field) = target.field_mut(segment) else {
            tracing::trace!("Ignoring unknown option key '{}'", key);
            continue;
        };

        match (node, field) {
            (NestedNode::Branch(subtree), FieldMut::Record(record)) => {
                assign_into(subtree, record, &key, report);
            }
            (NestedNode::Value(value), FieldMut::Leaf(leaf)) => {
                match leaf.assign_text(&key, value) {
                    Ok(()) => report.applied.push(key.clone()),
                    Err(error) => skip(report, key.clone(), error),
                }
            }
            (NestedNode::Branch(_), FieldMut::Leaf(_)) => {
                let error = ConfigError::SchemaError {
                    key: key.to_string(),
                    message: "nested options given for a value field".to_string(),
                };
                skip(report, key.clone(), error);
            }
            (NestedNode::Value(_), FieldMut::Record(_)) => {
                let error = ConfigError::SchemaError {
                    key: key.to_string(),
                    message: "a single value given for a nested record".to_string(),
                };
                skip(report, key.clone(), error);
            }
        }

        if !existed && report.applied.len() == applied_before {
            tracing::trace!("Discarding empty entry '{}'", key);
            target.remove_field(segment);
        }
    }
}

fn skip(report: &mut AssignReport, key: ConfigKey, error: ConfigError) {
    tracing::warn!("Skipping option '{}': {}", key, error);
    report.skipped.push(SkippedField { key, error });
}
