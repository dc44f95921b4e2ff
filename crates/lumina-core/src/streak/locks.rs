//! Per-user single-writer locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Hands out one mutex per user id.
///
/// Lock entries are created on first use and kept for the lifetime of the
/// registry; the number of users in one process is small.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding `user_id`'s lock.
    ///
    /// A poisoned lock is recovered: the guarded data is `()` and the store
    /// writes it serializes are themselves guarded by the unresolved check.
    pub fn with_lock<T>(&self, user_id: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.entry(user_id);
        let _guard: MutexGuard<'_, ()> = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
