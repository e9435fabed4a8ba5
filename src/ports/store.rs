// SPDX-License-Identifier: MIT OR Apache-2.0

//! Option store trait definition.
//!
//! This module defines the `OptionStore` trait, the port through which flat
//! options are persisted. Any text key-value backend (memory, a YAML file,
//! Redis, etcd, a database table) can sit behind it.

use crate::domain::{ConfigKey, ConfigValue, EncodedMap, Result};

/// A text key-value store for flat options.
///
/// Calls are synchronous and fail fast: a failed call is reported
/// immediately and never retried by this crate. Stores give no cross-key
/// atomicity; callers writing several keys must expect earlier writes to stay
/// persisted when a later one fails.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so that one store can be shared by
/// concurrent request handlers.
///
/// # Examples
///
/// ```rust
/// use optmap::domain::{ConfigError, ConfigKey, ConfigValue, EncodedMap, Result};
/// use optmap::ports::OptionStore;
///
/// struct NullStore;
///
/// impl OptionStore for NullStore {
///     fn name(&self) -> &str {
///         "null"
///     }
///
///     fn set_option(&self, _key: &ConfigKey, _value: &ConfigValue) -> Result<()> {
///         Ok(())
///     }
///
///     fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
///         Err(ConfigError::OptionNotFound { prefix: prefix.to_string() })
///     }
///
///     fn get_options(&self, _prefix: &ConfigKey) -> Result<EncodedMap> {
///         Ok(EncodedMap::new())
///     }
/// }
///
/// let store = NullStore;
/// assert!(store.delete_options(&ConfigKey::from("apps.x")).unwrap_err().is_not_found());
/// ```
pub trait OptionStore: Send + Sync {
    /// Returns the name of this store, used in logs and errors.
    fn name(&self) -> &str;

    /// Writes one option, replacing any previous value.
    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()>;

    /// Deletes `prefix` itself and every option below it.
    ///
    /// Matching is segment-aware: deleting `apps.x` removes `apps.x` and
    /// `apps.x.title` but not `apps.xy`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - At least one option was deleted
    /// * `Err(ConfigError::OptionNotFound)` - Nothing matched; callers usually
    ///   treat this as success
    /// * `Err(ConfigError)` - The store call failed
    fn delete_options(&self, prefix: &ConfigKey) -> Result<()>;

    /// Returns every option at or below `prefix`.
    ///
    /// An empty prefix returns the whole store.
    fn get_options(&self, prefix: &ConfigKey) -> Result<EncodedMap>;
}

impl<S: OptionStore + ?Sized> OptionStore for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        (**self).set_option(key, value)
    }

    fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
        (**self).delete_options(prefix)
    }

    fn get_options(&self, prefix: &ConfigKey) -> Result<EncodedMap> {
        (**self).get_options(prefix)
    }
}

impl<S: OptionStore + ?Sized> OptionStore for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        (**self).set_option(key, value)
    }

    fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
        (**self).delete_options(prefix)
    }

    fn get_options(&self, prefix: &ConfigKey) -> Result<EncodedMap> {
        (**self).get_options(prefix)
    }
}
