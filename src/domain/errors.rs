// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the option mapping crate.
//!
//! Every stage of the flatten/encode/reconstruct/assign pipeline, and every
//! option store, reports failures through [`ConfigError`].

use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for option mapping operations.
///
/// # Examples
///
/// ```
/// use optmap::domain::errors::ConfigError;
///
/// fn find_app(id: &str) -> Result<(), ConfigError> {
///     Err(ConfigError::AppNotFound { id: id.to_string() })
/// }
///
/// assert!(find_app("ansible").is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The schema cannot be mapped (duplicate canonical keys, a branch where a
    /// leaf field lives, and similar shape mismatches).
    #[error("Schema error at '{key}': {message}")]
    SchemaError {
        /// The flat key (or key prefix) where the mismatch was found
        key: String,
        /// What went wrong
        message: String,
    },

    /// A composite leaf value could not be encoded to, or decoded from, text.
    #[error("Failed to serialize value for key '{key}': {source}")]
    SerializationError {
        /// The key of the value
        key: String,
        /// The underlying serializer error
        #[source]
        source: serde_json::Error,
    },

    /// A flat key needs a path to be both a leaf and a branch.
    #[error("Key '{key}' conflicts with existing {existing} at '{path}'")]
    StructuralConflict {
        /// The flat key being inserted
        key: String,
        /// The prefix path at which the conflict occurs
        path: String,
        /// What already occupies `path` ("value" or "branch")
        existing: &'static str,
    },

    /// A text value could not be converted to the declared field type.
    #[error("Failed to convert value for key '{key}' to type {target_type}: {source}")]
    TypeCoercion {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An option store call failed.
    #[error("Option store '{store_name}' error: {message}")]
    StoreError {
        /// The name of the store that failed
        store_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A delete matched no stored option.
    #[error("No options found under '{prefix}'")]
    OptionNotFound {
        /// The prefix that matched nothing
        prefix: String,
    },

    /// A multi-key write stopped part way. Options written before `key` stay
    /// persisted; nothing is rolled back.
    #[error("Failed to write option '{key}' ({} option(s) already persisted): {source}", .persisted.len())]
    PartialWrite {
        /// The store key whose write failed
        key: String,
        /// Store keys written successfully before the failure
        persisted: Vec<String>,
        /// The store failure
        #[source]
        source: Box<ConfigError>,
    },

    /// A key or key segment is malformed.
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey {
        /// The offending key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// The requested application is not configured.
    #[error("App not found: {id}")]
    AppNotFound {
        /// The application id
        id: String,
    },

    /// The live configuration lock was poisoned by a panicking writer.
    #[error("Live configuration state is poisoned")]
    StatePoisoned,

    /// An I/O error occurred while reading or writing a store file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a TypeCoercion error from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeCoercion {
            key,
            target_type: "boolean".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a StoreError for the named store.
    pub fn store<E>(store_name: &str, message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::StoreError {
            store_name: store_name.to_string(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Returns `true` for the "nothing matched" outcome of a delete.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::OptionNotFound { .. })
    }
}

/// A specialized Result type for option mapping operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
