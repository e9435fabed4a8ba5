// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file option store adapter.
//!
//! This module provides an option store that keeps flat options in a YAML file.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, EncodedMap, Result};
use crate::ports::OptionStore;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Maximum allowed file size for YAML option files (10MB)
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default file name used in the OS configuration directory.
const DEFAULT_FILE_NAME: &str = "options.yaml";

/// Option store adapter for a YAML file.
///
/// Options are written as a flat `key: value` mapping and the whole file is
/// rewritten on every change. Hand-edited files may also nest mappings; they
/// are read back as dot-joined keys, and YAML sequences are read as their
/// JSON text encoding.
///
/// # Examples
///
/// ```rust,no_run
/// use optmap::adapters::YamlFileStore;
/// use optmap::domain::{ConfigKey, ConfigValue};
/// use optmap::ports::OptionStore;
///
/// let store = YamlFileStore::open("/var/lib/myapp/options.yaml").unwrap();
/// store.set_option(&ConfigKey::from("apps.bash.active"), &ConfigValue::from("true")).unwrap();
/// ```
#[derive(Debug)]
pub struct YamlFileStore {
    /// Path to the YAML file
    file_path: PathBuf,
    /// Options currently held in the file
    values: RwLock<EncodedMap>,
}

impl YamlFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is treated as an empty store and created on the first
    /// write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let values = if file_path.exists() {
            Self::read_file(&file_path)?
        } else {
            EncodedMap::new()
        };

        tracing::debug!(
            "Opened YAML option store '{}' with {} option(s)",
            file_path.display(),
            values.len()
        );

        Ok(Self {
            file_path,
            values: RwLock::new(values),
        })
    }

    /// Opens `options.yaml` in the OS-appropriate configuration directory.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, DEFAULT_FILE_NAME)
    }

    /// Opens a custom file name in the OS-appropriate configuration directory.
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| ConfigError::StoreError {
                store_name: "yaml-file".to_string(),
                message: "Failed to determine project directories".to_string(),
                source: None,
            })?;

        Self::open(proj_dirs.config_dir().join(filename))
    }

    /// Returns the path to the option file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn file_label(path: &Path) -> &str {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unknown>")
    }

    fn read_file(path: &Path) -> Result<EncodedMap> {
        let metadata = fs::metadata(path).map_err(|e| {
            ConfigError::store(
                "yaml-file",
                format!("Failed to read file metadata: {}", Self::file_label(path)),
                e,
            )
        })?;

        if metadata.len() > MAX_YAML_FILE_SIZE {
            return Err(ConfigError::StoreError {
                store_name: "yaml-file".to_string(),
                message: format!(
                    "Option file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_YAML_FILE_SIZE
                ),
                source: None,
            });
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::store(
                "yaml-file",
                format!("Failed to read option file: {}", Self::file_label(path)),
                e,
            )
        })?;

        Self::parse(&content)
    }

    /// Parses YAML content into flat options.
    fn parse(content: &str) -> Result<EncodedMap> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::store("yaml-file", format!("Failed to parse YAML: {}", e), e))?;

        if !matches!(value, serde_yaml::Value::Mapping(_) | serde_yaml::Value::Null) {
            return Err(ConfigError::StoreError {
                store_name: "yaml-file".to_string(),
                message: "Option file must contain a mapping at the top level".to_string(),
                source: None,
            });
        }

        let mut result = EncodedMap::new();
        Self::flatten_yaml(&value, &ConfigKey::from(""), &mut result)?;
        Ok(result)
    }

    /// Flattens a YAML value into dot-keyed options.
    fn flatten_yaml(
        value: &serde_yaml::Value,
        prefix: &ConfigKey,
        result: &mut EncodedMap,
    ) -> Result<()> {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    let segment = match key {
                        serde_yaml::Value::String(s) => s.clone(),
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        _ => continue,
                    };
                    Self::flatten_yaml(val, &prefix.child(&segment), result)?;
                }
            }
            serde_yaml::Value::Sequence(_) => {
                let text = serde_json::to_string(value).map_err(|e| {
                    ConfigError::SerializationError {
                        key: prefix.to_string(),
                        source: e,
                    }
                })?;
                result.insert(prefix.clone(), ConfigValue::new(text));
            }
            serde_yaml::Value::String(s) => {
                result.insert(prefix.clone(), ConfigValue::from(s.as_str()));
            }
            serde_yaml::Value::Number(n) => {
                result.insert(prefix.clone(), ConfigValue::new(n.to_string()));
            }
            serde_yaml::Value::Bool(b) => {
                result.insert(prefix.clone(), ConfigValue::new(b.to_string()));
            }
            serde_yaml::Value::Null => {
                if !prefix.as_str().is_empty() {
                    result.insert(prefix.clone(), ConfigValue::new(String::new()));
                }
            }
            serde_yaml::Value::Tagged(tagged) => {
                Self::flatten_yaml(&tagged.value, prefix, result)?;
            }
        }
        Ok(())
    }

    /// Writes `values` to the file, creating parent directories as needed.
    fn write_file(&self, values: &EncodedMap) -> Result<()> {
        let flat: BTreeMap<&str, &str> = values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let content = serde_yaml::to_string(&flat).map_err(|e| {
            ConfigError::store("yaml-file", format!("Failed to serialize options: {}", e), e)
        })?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.file_path, content).map_err(|e| {
            ConfigError::store(
                "yaml-file",
                format!(
                    "Failed to write option file: {}",
                    Self::file_label(&self.file_path)
                ),
                e,
            )
        })
    }

    fn poisoned() -> ConfigError {
        ConfigError::StoreError {
            store_name: "yaml-file".to_string(),
            message: "store lock poisoned".to_string(),
            source: None,
        }
    }
}

impl OptionStore for YamlFileStore {
    fn name(&self) -> &str {
        "yaml-file"
    }

    fn set_option(&self, key: &ConfigKey, value: &ConfigValue) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;

        let mut updated = values.clone();
        updated.insert(key.clone(), value.clone());
        self.write_file(&updated)?;
        *values = updated;

        tracing::debug!("Set option '{}' in '{}'", key, self.file_path.display());
        Ok(())
    }

    fn delete_options(&self, prefix: &ConfigKey) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;

        let mut updated = values.clone();
        updated.retain(|key, _| !key.starts_with(prefix));
        if updated.len() == values.len() {
            return Err(ConfigError::OptionNotFound {
                prefix: prefix.to_string(),
            });
        }
        self.write_file(&updated)?;
        *values = updated;

        tracing::debug!("Deleted options under '{}' from '{}'", prefix, self.file_path.display());
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
