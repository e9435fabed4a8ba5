// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-application options kept in an option store under `apps.<id>.<key>`.
//!
//! [`AppOptionsService`] pairs a store with the live [`ServerConfig`] and keeps
//! the two in step: every option written to the store is merged into the live
//! object, and every app deleted from the store is dropped from it.

use crate::domain::{
    assign, encode_all, flatten_prefixed, reconstruct, ConfigError, ConfigKey, ConfigValue,
    EncodedMap, Result,
};
use crate::ports::OptionStore;
use crate::service::handle::ConfigHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root key under which application options are stored.
pub const APPS_PREFIX: &str = "apps";

/// Application ids that are always listed, configured or not.
pub const BUILTIN_APPS: [&str; 6] = ["ansible", "terraform", "tofu", "bash", "powershell", "python"];

crate::config_record! {
    /// Options of one application.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct App {
        /// Whether the app can be selected
        pub active: bool,
        /// Sort priority
        pub priority: i64,
        /// Display title
        pub title: String,
        /// Icon name
        pub icon: String,
        /// Color
        pub color: String,
        /// Color used by dark themes
        #[serde(skip_serializing_if = "String::is_empty")]
        pub dark_color: String as "dark_color,omitempty",
        /// Path to the executable
        pub path: String,
        /// Extra arguments passed to the executable
        pub args: Vec<String>,
    }
}

crate::config_record! {
    /// The live server configuration.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ServerConfig {
        /// Configured applications by id
        pub apps: BTreeMap<String, App>,
    }
}

/// The listing form of an application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    /// Application id
    pub id: String,
    /// Display title
    pub title: String,
    /// Icon name
    pub icon: String,
    /// Color
    pub color: String,
    /// Color used by dark themes
    pub dark_color: String,
    /// Whether the app can be selected
    pub active: bool,
}

impl AppSummary {
    fn new(id: &str, app: &App) -> Self {
        Self {
            id: id.to_string(),
            title: app.title.clone(),
            icon: app.icon.clone(),
            color: app.color.clone(),
            dark_color: app.dark_color.clone(),
            active: app.active,
        }
    }
}

/// Checks that `id` can be used as one key segment.
///
/// An id must be non-empty and contain neither `.` nor whitespace.
pub fn validate_app_id(id: &str) -> Result<()> {
    let reason = if id.is_empty() {
        "app id is empty"
    } else if id.contains('.') {
        "app id contains '.'"
    } else if id.chars().any(char::is_whitespace) {
        "app id contains whitespace"
    } else {
        return Ok(());
    };

    Err(ConfigError::InvalidKey {
        key: id.to_string(),
        reason: reason.to_string(),
    })
}

fn app_key(id: &str) -> ConfigKey {
    ConfigKey::from(APPS_PREFIX).child(id)
}

/// Reads and writes application options.
///
/// Store calls happen outside the live object's lock; only the final merge
/// takes it. Multi-option writes are not atomic in the store: see
/// [`set_app`](Self::set_app).
///
/// # Examples
///
/// ```rust
/// use optmap::adapters::MemoryOptionStore;
/// use optmap::service::{App, AppOptionsService};
///
/// # fn main() -> optmap::domain::Result<()> {
/// let service = AppOptionsService::load(MemoryOptionStore::new())?;
///
/// let app = App { active: true, title: "Bash".to_string(), ..App::default() };
/// service.set_app("bash", &app)?;
/// service.set_app_active("bash", false)?;
///
/// assert!(!service.get_app("bash")?.active);
/// assert_eq!(service.get_app("bash")?.title, "Bash");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AppOptionsService<S> {
    store: S,
    config: ConfigHandle<ServerConfig>,
}

impl<S: OptionStore> AppOptionsService<S> {
    /// Creates a service over an existing live object.
    pub fn new(store: S, config: ConfigHandle<ServerConfig>) -> Self {
        Self { store, config }
    }

    /// Builds the live object from defaults plus every option stored under
    /// `apps`.
    ///
    /// Stored values that no longer fit the schema are skipped and logged.
    pub fn load(store: S) -> Result<Self> {
        let stored = store.get_options(&ConfigKey::from(APPS_PREFIX))?;
        let count = stored.len();

        let mut config = ServerConfig::default();
        let report = assign(&reconstruct(stored)?, &mut config);

        tracing::info!(
            "Loaded {} app option(s) from store '{}' ({} skipped)",
            count,
            store.name(),
            report.skipped().len()
        );

        Ok(Self::new(store, ConfigHandle::new(config)))
    }

    /// Returns the live configuration handle.
    pub fn config(&self) -> &ConfigHandle<ServerConfig> {
        &self.config
    }

    /// Returns the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists the built-in apps overlaid with the configured ones, sorted by id.
    pub fn list_apps(&self) -> Result<Vec<AppSummary>> {
        let configured = self.config.read(|c| c.apps.clone())?;

        let mut apps: BTreeMap<String, App> = BUILTIN_APPS
            .iter()
            .map(|id| (id.to_string(), App::default()))
            .collect();
        apps.extend(configured);

        Ok(apps
            .iter()
            .map(|(id, app)| AppSummary::new(id, app))
            .collect())
    }

    /// Returns the options of a configured app.
    pub fn get_app(&self, id: &str) -> Result<App> {
        self.config
            .read(|c| c.apps.get(id).cloned())?
            .ok_or_else(|| ConfigError::AppNotFound { id: id.to_string() })
    }

    /// Writes every option of `app` and merges them into the live object.
    ///
    /// Options are written one key at a time in key order. If a write fails,
    /// the options written before it stay in the store and are merged into the
    /// live object, and the call fails with [`ConfigError::PartialWrite`]
    /// naming the failing key.
    pub fn set_app(&self, id: &str, app: &App) -> Result<()> {
        validate_app_id(id)?;
        let encoded = encode_all(flatten_prefixed(app, &app_key(id))?)?;

        let mut persisted = EncodedMap::new();
        let mut failure = None;
        for (key, value) in encoded {
            match self.store.set_option(&key, &value) {
                Ok(()) => {
                    persisted.insert(key, value);
                }
                Err(e) => {
                    failure = Some((key, e));
                    break;
                }
            }
        }

        let persisted_keys: Vec<String> = persisted.keys().map(ConfigKey::to_string).collect();
        if !persisted.is_empty() {
            let report = self.config.assign(&reconstruct(persisted)?)?;
            if !report.is_clean() {
                tracing::warn!(
                    "Stored app '{}' but {} option(s) did not apply to the live object",
                    id,
                    report.skipped().len()
                );
            }
            debug_assert!(report.is_clean(), "encoded options must assign cleanly");
        }

        if let Some((key, source)) = failure {
            tracing::warn!(
                "Writing app '{}' stopped at '{}' after {} option(s): {}",
                id,
                key,
                persisted_keys.len(),
                source
            );
            return Err(ConfigError::PartialWrite {
                key: key.into_string(),
                persisted: persisted_keys,
                source: Box::new(source),
            });
        }

        tracing::debug!("Stored {} option(s) for app '{}'", persisted_keys.len(), id);
        Ok(())
    }

    /// Sets whether an app is active.
    pub fn set_app_active(&self, id: &str, active: bool) -> Result<()> {
        self.set_app_option(id, "active", &active.to_string())
    }

    /// Writes one app option given as text.
    ///
    /// The value is checked against the field's type before it is written;
    /// unknown fields and values that do not coerce are rejected without
    /// touching the store.
    pub fn set_app_option(&self, id: &str, field: &str, text: &str) -> Result<()> {
        validate_app_id(id)?;
        let key = app_key(id).child(field);
        let value = ConfigValue::from(text);
        let tree = reconstruct([(key.clone(), value.clone())])?;

        let mut scratch = self.config.snapshot()?;
        let check = assign(&tree, &mut scratch);
        if check.is_clean() && check.applied().is_empty() {
            return Err(ConfigError::SchemaError {
                key: key.into_string(),
                message: format!("unknown app option '{}'", field),
            });
        }
        check.into_result()?;

        self.store.set_option(&key, &value)?;
        self.config.assign(&tree)?.into_result()?;

        tracing::debug!("Set app option '{}'", key);
        Ok(())
    }

    /// Deletes every option of an app and drops it from the live object.
    ///
    /// Deleting an app with no stored options is not an error.
    pub fn delete_app(&self, id: &str) -> Result<()> {
        validate_app_id(id)?;

        match self.store.delete_options(&app_key(id)) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("No stored options for app '{}'", id);
            }
            Err(e) => return Err(e),
        }

        self.config.update(|c| c.apps.remove(id))?;
        tracing::debug!("Deleted app '{}'", id);
        Ok(())
    }
}
