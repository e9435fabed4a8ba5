// SPDX-License-Identifier: MIT OR Apache-2.0

//! etcd option store adapter.
//!
//! Options are stored under `namespace + key`, keeping the dot-joined option
//! key as is (e.g. `myapp/apps.bash.title`).

use crate::adapters::runtime;
use crate::domain::{ConfigError, ConfigKey, ConfigValue, EncodedMap, Result};
use crate::ports::OptionStore;
use etcd_client::{Client, DeleteOptions, GetOptions, KeyValue};

/// Option store adapter for etcd.
///
/// Calls block the caller and are driven on a shared background runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use optmap::adapters::EtcdOptionStore;
/// use optmap::domain::ConfigKey;
/// use optmap::ports::OptionStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = EtcdOptionStore::connect(["localhost:2379"], "myapp/")?;
/// let apps = store.get_options(&ConfigKey::from("apps"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EtcdOptionStore {
    /// etcd client
    client: Client,
    /// Prefix put in front of every option key
    namespace: String,
}

impl std::fmt::Debug for EtcdOptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtcdOptionStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl EtcdOptionStore {
    /// Connects to the given endpoints.
    ///
    /// # Arguments
    ///
    /// * `endpoints` - List of etcd endpoints (e.g., `["localhost:2379"]`)
    /// * `namespace` - Key prefix for namespacing (e.g., `"myapp/"`); may be empty
    pub fn connect<I, S>(endpoints: I, namespace: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints: Vec<String> = endpoints
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let client = runtime::block_on("etcd", async move {
            Client::connect(&endpoints, None)
                .await
                .map_err(|e| ConfigError::store("etcd", format!("Failed to connect to etcd: {}", e), e))
        })?;

        tracing::debug!("Connected etcd option store with namespace '{}'", namespace);
        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    /// Returns the key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn etcd_key(&self, key: &ConfigKey) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Key prefix covering every option strictly below `prefix`.
    fn children_prefix(&self, prefix: &ConfigKey) -> String {
        if prefix.as_str().is_empty() {
            self.namespace.clone()
        } else {
            format!("{}{}.", self.namespace, prefix)
        }
    }
}

impl OptionStore for EtcdOptionStore {
    fn name(&self) -> &str {
        "etcd"
    }

    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        let mut client = self.client.clone();
        let etcd_key = self.etcd_key(key);
        let value = value.as_str().to_string();

        runtime::block_on("etcd", async move {
            client
                .put(etcd_key.as_str(), value, None)
                .await
                .map_err(|e| ConfigError::store("etcd", format!("Failed to put '{}': {}", etcd_key, e), e))?;
            Ok(())
        })?;

        tracing::debug!("Set option '{}' in etcd", key);
        Ok(())
    }

    fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
        let mut client = self.client.clone();
        let exact = (!prefix.as_str().is_empty()).then(|| self.etcd_key(prefix));
        let children = self.children_prefix(prefix);

        let deleted = runtime::block_on("etcd", async move {
            let mut deleted = 0;
            if let Some(exact) = exact {
                deleted += client
                    .delete(exact, None)
                    .await
                    .map_err(|e| ConfigError::store("etcd", format!("Failed to delete from etcd: {}", e), e))?
                    .deleted();
            }
            deleted += client
                .delete(children, Some(DeleteOptions::new().with_prefix()))
                .await
                .map_err(|e| ConfigError::store("etcd", format!("Failed to delete from etcd: {}", e), e))?
                .deleted();
            Ok(deleted)
        })?;

        if deleted == 0 {
            return Err(ConfigError::OptionNotFound {
                prefix: prefix.to_string(),
            });
        }
        tracing::debug!("Deleted {} option(s) under '{}' from etcd", deleted, prefix);
        Ok(())
    }

    fn get_options(&self, prefix: &ConfigKey) -> Result<EncodedMap> {
        let mut client = self.client.clone();
        let namespace = self.namespace.clone();
        let exact = (!prefix.as_str().is_empty()).then(|| self.etcd_key(prefix));
        let children = self.children_prefix(prefix);

        runtime::block_on("etcd", async move {
            let mut result = EncodedMap::new();
            if let Some(exact) = exact {
                let response = client
                    .get(exact, None)
                    .await
                    .map_err(|e| ConfigError::store("etcd", format!("Failed to fetch keys from etcd: {}", e), e))?;
                collect_kvs(response.kvs(), &namespace, &mut result);
            }
            let response = client
                .get(children, Some(GetOptions::new().with_prefix()))
                .await
                .map_err(|e| ConfigError::store("etcd", format!("Failed to fetch keys from etcd: {}", e), e))?;
            collect_kvs(response.kvs(), &namespace, &mut result);
            Ok(result)
        })
    }
}

/// Strips `namespace` from each key and adds the entries to `result`.
fn collect_kvs(kvs: &[KeyValue], namespace: &str, result: &mut EncodedMap) {
    for kv in kvs {
        let (Ok(key), Ok(value)) = (
            std::str::from_utf8(kv.key()),
            std::str::from_utf8(kv.value()),
        ) else {
            tracing::warn!("Skipping non UTF-8 etcd entry");
            continue;
        };
        if let Some(option_key) = key.strip_prefix(namespace) {
            result.insert(ConfigKey::from(option_key), ConfigValue::from(value));
        }
    }
}
