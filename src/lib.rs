// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bidirectional mapping between typed configuration records and flat,
//! dot-keyed option stores.
//!
//! A configuration record is flattened into independently addressable text
//! options (`apps.bash.title = "Bash"`), a subset of those options can be
//! written to or deleted from a key-value store, and a partial set of flat
//! options can be merged back into the live record without resetting the
//! fields it does not mention.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Keys, values, record descriptors and the pure mapping
//!   pipeline (flatten, encode, reconstruct, assign)
//! - **Ports**: The [`OptionStore`](ports::OptionStore) trait
//! - **Adapters**: Store implementations (memory, YAML file, Redis, etcd)
//! - **Service**: The lock-guarded live object and the application options
//!   operations
//!
//! # Feature Flags
//!
//! - `yaml`: Enable the YAML file store (default)
//! - `etcd`: Enable the etcd store
//! - `redis`: Enable the Redis store
//! - `remote`: Enable all remote stores (etcd + redis)
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use optmap::prelude::*;
//!
//! config_record! {
//!     #[derive(Clone, Debug, Default, PartialEq)]
//!     pub struct Server {
//!         pub port: u16 as "Port",
//!         pub hosts: Vec<String>,
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let server = Server { port: 8080, hosts: vec!["a".into(), "b".into()] };
//! let options = encode_all(flatten(&server)?)?;
//! assert_eq!(options[&ConfigKey::from("Port")].as_str(), "8080");
//!
//! let live = ConfigHandle::new(server);
//! live.assign(&reconstruct([("Port", "9090")])?)?.into_result()?;
//! assert_eq!(live.read(|s| s.port)?, 9090);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::config_record;
    pub use crate::domain::{
        assign, encode_all, flatten, reconstruct, AssignReport, ConfigError, ConfigKey,
        ConfigRecord, ConfigValue, NestedTree, Result,
    };
    pub use crate::ports::OptionStore;
    pub use crate::service::{AppOptionsService, ConfigHandle};

    pub use crate::adapters::MemoryOptionStore;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlFileStore;
}
