// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored option values.
//!
//! Option stores only hold text. `ConfigValue` is that text, with the typed
//! conversions the struct assigner needs to coerce it back into a field.

use crate::domain::errors::{ConfigError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The text form of one option.
///
/// # Examples
///
/// ```
/// use optmap::domain::config_value::ConfigValue;
///
/// let value = ConfigValue::new("42".to_string());
/// assert_eq!(value.as_str(), "42");
/// assert_eq!(value.parse::<u16>("apps.bash.priority").unwrap(), 42);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValue(String);

impl ConfigValue {
    /// Creates a new `ConfigValue` from a `String`.
    pub fn new(value: String) -> Self {
        ConfigValue(value)
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the value into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Converts the value to a boolean.
    ///
    /// Recognizes the following values (case-insensitive):
    /// - `true`: "true", "yes", "1", "on"
    /// - `false`: "false", "no", "0", "off"
    ///
    /// # Examples
    ///
    /// ```
    /// use optmap::domain::config_value::ConfigValue;
    ///
    /// assert!(ConfigValue::from("true").as_bool("apps.bash.active").unwrap());
    /// assert!(!ConfigValue::from("off").as_bool("apps.bash.active").unwrap());
    /// ```
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match self.0.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => self
                .0
                .parse::<bool>()
                .map_err(|e| ConfigError::from_parse_bool_error(key.to_string(), e)),
        }
    }

    /// Parses the value into any type that implements `FromStr`.
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.0
            .parse::<T>()
            .map_err(|e| ConfigError::TypeCoercion {
                key: key.to_string(),
                target_type: std::any::type_name::<T>().to_string(),
                source: Box::new(e),
            })
    }

    /// Decodes the value from its JSON text encoding.
    ///
    /// Sequences are stored this way by the composite encoder.
    ///
    /// ```
    /// use optmap::domain::config_value::ConfigValue;
    ///
    /// let value = ConfigValue::from(r#"["a","b"]"#);
    /// let args: Vec<String> = value.decode_json("apps.bash.args").unwrap();
    /// assert_eq!(args, vec!["a", "b"]);
    /// ```
    pub fn decode_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        serde_json::from_str(&self.0).map_err(|e| ConfigError::TypeCoercion {
            key: key.to_string(),
            target_type: std::any::type_name::<T>().to_string(),
            source: Box::new(e),
        })
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue(s.to_string())
    }
}

impl From<ConfigValue> for String {
    fn from(value: ConfigValue) -> Self {
        value.0
    }
}

impl AsRef<str> for ConfigValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
