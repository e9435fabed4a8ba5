// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing option store implementations.
//!
//! This module contains concrete implementations of the [`OptionStore`]
//! trait defined in the ports layer. Each adapter persists flat options in a
//! specific backend.
//!
//! [`OptionStore`]: crate::ports::OptionStore

pub mod memory;

#[cfg(feature = "etcd")]
pub mod etcd;
#[cfg(feature = "redis")]
pub mod redis;
#[cfg(any(feature = "etcd", feature = "redis"))]
mod runtime;
#[cfg(feature = "yaml")]
pub mod yaml_file;

pub use memory::MemoryOptionStore;

// Re-export adapters based on feature flags
#[cfg(feature = "etcd")]
pub use etcd::EtcdOptionStore;
#[cfg(feature = "redis")]
pub use redis::RedisOptionStore;
#[cfg(feature = "yaml")]
pub use yaml_file::YamlFileStore;
