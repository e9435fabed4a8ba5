// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking bridge for the async remote store clients.

use crate::domain::{ConfigError, Result};
use once_cell::sync::OnceCell;
use std::future::Future;
use tokio::runtime::{Handle, Runtime};

/// Runtime shared by every remote store; it lives for the whole process so
/// that dropping a store inside an async context never drops a runtime.
static STORE_RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn shared_runtime(store_name: &str) -> Result<&'static Runtime> {
    STORE_RUNTIME.get_or_try_init(|| {
        Runtime::new().map_err(|e| {
            ConfigError::store(store_name, "Failed to create tokio runtime", e)
        })
    })
}

/// Drives `future` to completion on the shared store runtime.
///
/// When the caller is already inside a tokio runtime the future is driven
/// from a scoped thread, since blocking on the caller's executor would panic.
pub(crate) fn block_on<F, T>(store_name: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send,
    T: Send,
{
    let runtime = shared_runtime(store_name)?;

    if Handle::try_current().is_ok() {
        std::thread::scope(|scope| {
            scope
                .spawn(|| runtime.block_on(future))
                .join()
                .map_err(|_| ConfigError::StoreError {
                    store_name: store_name.to_string(),
                    message: "Store worker thread panicked".to_string(),
                    source: None,
                })?
        })
    } else {
        runtime.block_on(future)
    }
}
