// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared handle to the live configuration object.
//!
//! Every read and write of the live object goes through [`ConfigHandle`]. An
//! [`assign`](ConfigHandle::assign) holds the write lock for the whole merge,
//! so readers never observe a partially applied tree and two merges never
//! interleave.

use crate::domain::{assign, AssignReport, ConfigError, ConfigRecord, NestedTree, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A cloneable, thread-safe handle to one live configuration object.
///
/// # Examples
///
/// ```rust
/// use optmap::config_record;
/// use optmap::domain::reconstruct;
/// use optmap::service::ConfigHandle;
///
/// config_record! {
///     #[derive(Clone, Debug, Default)]
///     pub struct Limits { pub max: u32, pub min: u32 }
/// }
///
/// # fn main() -> optmap::domain::Result<()> {
/// let handle = ConfigHandle::new(Limits { max: 10, min: 1 });
/// handle.assign(&reconstruct([("max", "20")])?)?;
///
/// assert_eq!(handle.read(|l| (l.max, l.min))?, (20, 1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigHandle<C> {
    inner: Arc<RwLock<C>>,
}

impl<C> Clone for ConfigHandle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Default> Default for ConfigHandle<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> ConfigHandle<C> {
    /// Wraps `config` as the live object.
    pub fn new(config: C) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, C>> {
        self.inner.read().map_err(|_| ConfigError::StatePoisoned)
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, C>> {
        self.inner.write().map_err(|_| ConfigError::StatePoisoned)
    }

    /// Runs `f` against the current value under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&C) -> R) -> Result<R> {
        let guard = self.read_guard()?;
        Ok(f(&guard))
    }

    /// Runs `f` with exclusive access to the live object.
    pub fn update<R>(&self, f: impl FnOnce(&mut C) -> R) -> Result<R> {
        let mut guard = self.write_guard()?;
        Ok(f(&mut guard))
    }
}

impl<C: Clone> ConfigHandle<C> {
    /// Returns a copy of the current value.
    pub fn snapshot(&self) -> Result<C> {
        self.read(C::clone)
    }
}

impl<C: ConfigRecord> ConfigHandle<C> {
    /// Merges `tree` into the live object as one atomic step.
    pub fn assign(&self, tree: &NestedTree) -> Result<AssignReport> {
        let mut guard = self.write_guard()?;
        Ok(assign(tree, &mut *guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reconstruct;
    use std::thread;

    crate::config_record! {
        #[derive(Clone, Debug, Default, PartialEq)]
        struct Counters {
            a: u64,
            b: u64,
        }
    }

    #[test]
    fn test_handle_assign_and_read() {
        let handle = ConfigHandle::new(Counters { a: 1, b: 2 });
        let report = handle.assign(&reconstruct([("b", "3")]).unwrap()).unwrap();

        assert!(report.is_clean());
        assert_eq!(handle.snapshot().unwrap(), Counters { a: 1, b: 3 });
    }

    #[test]
    fn test_handle_clones_share_state() {
        let handle = ConfigHandle::<Counters>::default();
        let other = handle.clone();
        other.update(|c| c.a = 7).unwrap();
        assert_eq!(handle.read(|c| c.a).unwrap(), 7);
    }

    #[test]
    fn test_handle_assign_is_atomic_for_readers() {
        let handle = ConfigHandle::<Counters>::default();

        let writers: Vec<_> = (1..=50u64)
            .map(|n| {
                let handle = handle.clone();
                thread::spawn(move || {
                    let text = n.to_string();
                    let tree = reconstruct([("a", text.as_str()), ("b", text.as_str())]).unwrap();
                    handle.assign(&tree).unwrap();
                })
            })
            .collect();

        let reader = {
            let handle = handle.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let (a, b) = handle.read(|c| (c.a, c.b)).unwrap();
                    assert_eq!(a, b);
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        let last = handle.snapshot().unwrap();
        assert_eq!(last.a, last.b);
    }

    #[test]
    fn test_handle_poisoned_lock() {
        let handle = ConfigHandle::<Counters>::default();
        let poisoner = handle.clone();
        let _ = thread::spawn(move || {
            let _ = poisoner.update(|c| {
                if c.a == 0 {
                    panic!("poison the lock");
                }
            });
        })
        .join();

        assert!(matches!(handle.snapshot(), Err(ConfigError::StatePoisoned)));
        assert!(matches!(
            handle.assign(&NestedTree::new()),
            Err(ConfigError::StatePoisoned)
        ));
    }
}
