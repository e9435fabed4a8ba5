// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat option keys and the key naming rule.
//!
//! A flat key is a `.`-joined path of canonical segments, root to leaf. Each
//! segment is the stable external name of one field, derived from the field's
//! declared name and optional alias by [`canonical_segment`].

use crate::domain::errors::{ConfigError, Result};
use std::fmt;

/// Separator between segments of a flat key.
pub const KEY_SEPARATOR: char = '.';

/// Alias value that means "no alias, use the declared name".
pub const OMIT_MARKER: &str = "-";

/// Derives the canonical key segment of a field.
///
/// The alias wins when it is present, non-empty and not the omit marker `-`.
/// Trailing option modifiers (`"name,omitempty"`) are dropped, and an alias
/// that is only modifiers (`",omitempty"`) falls back to the declared name.
///
/// # Examples
///
/// ```
/// use optmap::domain::config_key::canonical_segment;
///
/// assert_eq!(canonical_segment("DarkColor", Some("dark_color,omitempty")), "dark_color");
/// assert_eq!(canonical_segment("Title", None), "Title");
/// assert_eq!(canonical_segment("Title", Some("-")), "Title");
/// ```
pub fn canonical_segment<'a>(declared: &'a str, alias: Option<&'a str>) -> &'a str {
    match alias {
        Some(alias) if !alias.is_empty() && alias != OMIT_MARKER => {
            let name = alias.split(',').next().unwrap_or_default();
            if name.is_empty() {
                declared
            } else {
                name
            }
        }
        _ => declared,
    }
}

/// Checks that `segment` can be joined into a flat key without ambiguity.
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(ConfigError::InvalidKey {
            key: segment.to_string(),
            reason: "key segment is empty".to_string(),
        });
    }
    if segment.contains(KEY_SEPARATOR) {
        return Err(ConfigError::InvalidKey {
            key: segment.to_string(),
            reason: format!("key segment contains '{}'", KEY_SEPARATOR),
        });
    }
    Ok(())
}

/// A type-safe wrapper for flat option keys.
///
/// # Examples
///
/// ```
/// use optmap::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("apps").child("bash").child("title");
/// assert_eq!(key.as_str(), "apps.bash.title");
/// assert_eq!(key.segments().collect::<Vec<_>>(), vec!["apps", "bash", "title"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns a new key with `segment` appended below this one.
    ///
    /// Appending to an empty key yields just the segment.
    pub fn child(&self, segment: &str) -> ConfigKey {
        if self.0.is_empty() {
            ConfigKey(segment.to_string())
        } else {
            ConfigKey(format!("{}{}{}", self.0, KEY_SEPARATOR, segment))
        }
    }

    /// Returns this key re-rooted under `parent`.
    pub fn prefixed(&self, parent: &ConfigKey) -> ConfigKey {
        parent.child(&self.0)
    }

    /// Iterates over the segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// Returns `true` if this key equals `prefix` or lies below it.
    ///
    /// Matching is segment-aware: `apps.x` covers `apps.x.title` but not
    /// `apps.xy`.
    ///
    /// ```
    /// use optmap::domain::config_key::ConfigKey;
    ///
    /// let prefix = ConfigKey::from("apps.x");
    /// assert!(ConfigKey::from("apps.x.title").starts_with(&prefix));
    /// assert!(!ConfigKey::from("apps.xy").starts_with(&prefix));
    /// ```
    pub fn starts_with(&self, prefix: &ConfigKey) -> bool {
        match self.0.strip_prefix(prefix.as_str()) {
            Some("") => true,
            Some(rest) => prefix.0.is_empty() || rest.starts_with(KEY_SEPARATOR),
            None => false,
        }
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_canonical_segment_alias_with_modifiers() {
        assert_eq!(
            canonical_segment("DarkColor", Some("dark_color,omitempty")),
            "dark_color"
        );
    }

    #[test]
    fn test_canonical_segment_plain_alias() {
        assert_eq!(canonical_segment("Title", Some("title")), "title");
    }

    #[test]
    fn test_canonical_segment_missing_or_empty_alias() {
        assert_eq!(canonical_segment("Title", None), "Title");
        assert_eq!(canonical_segment("Title", Some("")), "Title");
    }

    #[test]
    fn test_canonical_segment_omit_marker() {
        assert_eq!(canonical_segment("Title", Some("-")), "Title");
    }

    #[test]
    fn test_canonical_segment_modifiers_only() {
        assert_eq!(canonical_segment("Title", Some(",omitempty")), "Title");
    }

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("title").is_ok());
        assert!(matches!(
            validate_segment(""),
            Err(ConfigError::InvalidKey { .. })
        ));
        assert!(matches!(
            validate_segment("a.b"),
            Err(ConfigError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_config_key_child() {
        let key = ConfigKey::from("apps").child("bash");
        assert_eq!(key.as_str(), "apps.bash");
    }

    #[test]
    fn test_config_key_child_of_empty() {
        let key = ConfigKey::from("").child("apps");
        assert_eq!(key.as_str(), "apps");
    }

    #[test]
    fn test_config_key_prefixed() {
        let key = ConfigKey::from("inner.x").prefixed(&ConfigKey::from("outer"));
        assert_eq!(key.as_str(), "outer.inner.x");
    }

    #[test]
    fn test_config_key_segments() {
        let key = ConfigKey::from("database.connection.host");
        let segments: Vec<&str> = key.segments().collect();
        assert_eq!(segments, vec!["database", "connection", "host"]);
    }

    #[test]
    fn test_config_key_starts_with() {
        let prefix = ConfigKey::from("apps.x");
        assert!(ConfigKey::from("apps.x").starts_with(&prefix));
        assert!(ConfigKey::from("apps.x.title").starts_with(&prefix));
        assert!(!ConfigKey::from("apps.xy").starts_with(&prefix));
        assert!(!ConfigKey::from("apps").starts_with(&prefix));
        assert!(ConfigKey::from("apps").starts_with(&ConfigKey::from("")));
    }

    #[test]
    fn test_config_key_display() {
        let key = ConfigKey::from("test.key");
        assert_eq!(format!("{}", key), "test.key");
    }

    #[test]
    fn test_config_key_ordering() {
        let mut keys = vec![ConfigKey::from("b"), ConfigKey::from("a.z"), ConfigKey::from("a")];
        keys.sort();
        assert_eq!(keys[0].as_str(), "a");
        assert_eq!(keys[2].as_str(), "b");
    }

    #[test]
    fn test_config_key_hash() {
        let mut map = HashMap::new();
        map.insert(ConfigKey::from("test.key"), "value1");

        assert_eq!(map.get(&ConfigKey::from("test.key")), Some(&"value1"));
        assert_eq!(map.get(&ConfigKey::from("other.key")), None);
    }

    #[test]
    fn test_string_from_config_key() {
        let key = ConfigKey::from("test.key");
        let s: String = key.into();
        assert_eq!(s, "test.key");
    }
}
