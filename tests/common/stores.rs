// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock option stores for testing.

use optmap::adapters::MemoryOptionStore;
use optmap::domain::{ConfigError, ConfigKey, ConfigValue, EncodedMap, Result};
use optmap::ports::OptionStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A memory-backed store whose N-th `set_option` call fails.
///
/// Every attempted write is recorded, successful or not.
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryOptionStore,
    fail_on_write: usize,
    writes: AtomicUsize,
    attempted: Mutex<Vec<String>>,
}

impl FlakyStore {
    /// Creates a store that fails its `fail_on_write`-th write (1-based).
    pub fn failing_on(fail_on_write: usize) -> Self {
        Self {
            inner: MemoryOptionStore::new(),
            fail_on_write,
            writes: AtomicUsize::new(0),
            attempted: Mutex::new(Vec::new()),
        }
    }

    /// Keys passed to `set_option`, in call order.
    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    /// Everything that was actually stored.
    pub fn stored(&self) -> EncodedMap {
        self.inner.get_options(&ConfigKey::from("")).unwrap()
    }
}

impl OptionStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        self.attempted.lock().unwrap().push(key.to_string());

        if n == self.fail_on_write {
            return Err(ConfigError::StoreError {
                store_name: "flaky".to_string(),
                message: format!("injected failure on write {}", n),
                source: None,
            });
        }
        self.inner.set_option(key, value)
    }

    fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
        self.inner.delete_options(prefix)
    }

    fn get_options(&self, prefix: &ConfigKey) -> Result<EncodedMap> {
        self.inner.get_options(prefix)
    }
}
