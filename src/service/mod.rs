// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer tying the mapping engine to a store and a live object.
//!
//! [`ConfigHandle`] serializes access to the live configuration object and
//! [`AppOptionsService`] implements the per-application option operations on
//! top of an [`OptionStore`](crate::ports::OptionStore).

pub mod apps;
pub mod handle;

// Re-export commonly used types
pub use apps::{
    validate_app_id, App, AppOptionsService, AppSummary, ServerConfig, APPS_PREFIX, BUILTIN_APPS,
};
pub use handle::ConfigHandle;
