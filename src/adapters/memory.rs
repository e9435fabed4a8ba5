// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory option store adapter.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, EncodedMap, Result};
use crate::ports::OptionStore;
use std::sync::RwLock;

/// Option store backed by a map in process memory.
///
/// Useful for tests and for processes that only need the live object to
/// survive within one run.
///
/// # Examples
///
/// ```rust
/// use optmap::adapters::MemoryOptionStore;
/// use optmap::domain::{ConfigKey, ConfigValue};
/// use optmap::ports::OptionStore;
///
/// let store = MemoryOptionStore::new();
/// store.set_option(&ConfigKey::from("apps.bash.active"), &ConfigValue::from("true")).unwrap();
///
/// let options = store.get_options(&ConfigKey::from("apps.bash")).unwrap();
/// assert_eq!(options.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: RwLock<EncodedMap>,
}

impl MemoryOptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `values`.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ConfigKey>,
        V: Into<ConfigValue>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored options.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no options.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> ConfigError {
        ConfigError::StoreError {
            store_name: "memory".to_string(),
            message: "store lock poisoned".to_string(),
            source: None,
        }
    }
}

impl OptionStore for MemoryOptionStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.insert(key.clone(), value.clone());
        tracing::debug!("Set option '{}' in memory store", key);
        Ok(())
    }

    fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        let before = values.len();
        values.retain(|key, _| !key.starts_with(prefix));
        let removed = before - values.len();

        if removed == 0 {
            return Err(ConfigError::OptionNotFound {
                prefix: prefix.to_string(),
            });
        }
        tracing::debug!("Deleted {} option(s) under '{}' from memory store", removed, prefix);
        Ok(())
    }

    fn get_options(&self, prefix: &ConfigKey) -> Result<EncodedMap> {
        let values = self.values.read().map_err(|_| Self::poisoned())?;
        Ok(values
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
