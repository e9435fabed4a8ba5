// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis option store adapter.
//!
//! Each option is kept as its own Redis string key, named by the store's
//! namespace followed by the flat option key (e.g. `optmap:apps.bash.title`).

use crate::adapters::runtime;
use crate::domain::{ConfigError, ConfigKey, ConfigValue, EncodedMap, Result};
use crate::ports::OptionStore;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

/// Option store adapter for Redis.
///
/// Calls block the caller; they are driven on a shared background runtime so
/// the store can be used from both sync and async code.
///
/// # Examples
///
/// ```rust,no_run
/// use optmap::adapters::RedisOptionStore;
/// use optmap::domain::{ConfigKey, ConfigValue};
/// use optmap::ports::OptionStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = RedisOptionStore::new("redis://localhost:6379", "myapp:")?;
/// store.set_option(&ConfigKey::from("apps.bash.active"), &ConfigValue::from("true"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RedisOptionStore {
    /// Redis client
    client: Client,
    /// Prefix put in front of every option key
    namespace: String,
}

impl RedisOptionStore {
    /// Validates namespace to prevent pattern injection into SCAN
    fn validate_namespace(namespace: &str) -> Result<()> {
        if namespace.contains(['*', '?', '[', ']', '\\']) {
            return Err(ConfigError::StoreError {
                store_name: "redis".to_string(),
                message: "Namespace contains invalid characters (* ? [ ] \\)".to_string(),
                source: None,
            });
        }
        Ok(())
    }

    /// Creates a store for the given connection URL and key namespace.
    ///
    /// The connection is checked once with `PING`.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., `"redis://localhost:6379"`)
    /// * `namespace` - Key prefix (e.g., `"myapp:"`); may be empty
    pub fn new(url: &str, namespace: &str) -> Result<Self> {
        Self::validate_namespace(namespace)?;

        let client = Client::open(url)
            .map_err(|e| ConfigError::store("redis", format!("Failed to create Redis client: {}", e), e))?;

        let store = Self {
            client,
            namespace: namespace.to_string(),
        };

        let client = store.client.clone();
        runtime::block_on("redis", async move {
            let mut conn = connect(&client).await?;
            redis::cmd("PING")
                .query_async::<_, String>(&mut conn)
                .await
                .map_err(|e| ConfigError::store("redis", format!("Failed to ping Redis: {}", e), e))?;
            Ok(())
        })?;

        tracing::debug!("Connected Redis option store with namespace '{}'", namespace);
        Ok(store)
    }

    /// Returns the key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn redis_key(&self, key: &ConfigKey) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// SCAN pattern matching every option strictly below `prefix`.
    fn children_pattern(&self, prefix: &ConfigKey) -> String {
        if prefix.as_str().is_empty() {
            format!("{}*", self.namespace)
        } else {
            format!("{}{}.*", self.namespace, escape_pattern(prefix.as_str()))
        }
    }
}

/// Escapes Redis glob characters so that `text` matches literally.
fn escape_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn connect(client: &Client) -> Result<MultiplexedConnection> {
    client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| ConfigError::store("redis", format!("Failed to connect to Redis: {}", e), e))
}

/// Collects every key matching `pattern` using SCAN instead of KEYS.
async fn scan_keys(conn: &mut MultiplexedConnection, pattern: &str) -> Result<Vec<String>> {
    let mut cursor: u64 = 0;
    let mut all_keys = Vec::new();

    loop {
        let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(100)
            .query_async(conn)
            .await
            .map_err(|e| ConfigError::store("redis", format!("Failed to scan keys from Redis: {}", e), e))?;

        all_keys.extend(keys);
        cursor = new_cursor;
        if cursor == 0 {
            break;
        }
    }

    Ok(all_keys)
}

impl OptionStore for RedisOptionStore {
    fn name(&self) -> &str {
        "redis"
    }

    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        let client = self.client.clone();
        let redis_key = self.redis_key(key);
        let value = value.as_str().to_string();

        runtime::block_on("redis", async move {
            let mut conn = connect(&client).await?;
            conn.set::<_, _, ()>(&redis_key, value)
                .await
                .map_err(|e| ConfigError::store("redis", format!("Failed to set '{}': {}", redis_key, e), e))
        })?;

        tracing::debug!("Set option '{}' in Redis", key);
        Ok(())
    }

    fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
        let client = self.client.clone();
        let exact = self.redis_key(prefix);
        let pattern = self.children_pattern(prefix);
        let include_exact = !prefix.as_str().is_empty();

        let deleted = runtime::block_on("redis", async move {
            let mut conn = connect(&client).await?;

            let mut keys = scan_keys(&mut conn, &pattern).await?;
            if include_exact {
                keys.push(exact);
            }
            if keys.is_empty() {
                return Ok(0);
            }

            let deleted: usize = conn
                .del(&keys)
                .await
                .map_err(|e| ConfigError::store("redis", format!("Failed to delete keys from Redis: {}", e), e))?;
            Ok(deleted)
        })?;

        if deleted == 0 {
            return Err(ConfigError::OptionNotFound {
                prefix: prefix.to_string(),
            });
        }
        tracing::debug!("Deleted {} option(s) under '{}' from Redis", deleted, prefix);
        Ok(())
    }

    fn get_options(&self, prefix: &ConfigKey) -> Result<EncodedMap> {
        let client = self.client.clone();
        let namespace = self.namespace.clone();
        let exact = self.redis_key(prefix);
        let pattern = self.children_pattern(prefix);
        let include_exact = !prefix.as_str().is_empty();

        runtime::block_on("redis", async move {
            let mut conn = connect(&client).await?;

            let mut keys = scan_keys(&mut conn, &pattern).await?;
            if include_exact {
                keys.push(exact);
            }

            let mut result = EncodedMap::new();
            for key in keys {
                let value: Option<String> = conn
                    .get(&key)
                    .await
                    .map_err(|e| ConfigError::store("redis", format!("Failed to fetch value from Redis: {}", e), e))?;

                // Keys removed between SCAN and GET come back as nil
                if let (Some(value), Some(option_key)) = (value, key.strip_prefix(namespace.as_str())) {
                    result.insert(ConfigKey::from(option_key), ConfigValue::new(value));
                }
            }
            Ok(result)
        })
    }
}
