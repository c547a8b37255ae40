//! The "request in flight" flag shared by the editor and the chat session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while a chat request is outstanding.
///
/// Clones share the same flag.  The session holds it through an
/// [`ActivityGuard`]; the editor only reads it.
#[derive(Debug, Clone, Default)]
pub struct ActivityLock {
    busy: Arc<AtomicBool>,
}

impl ActivityLock {
    /// A lock that is not held.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while some guard is alive.
    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Hold the lock until the returned guard is dropped.
    ///
    /// Panics if the lock is already held.
    #[cfg(test)]
    pub(crate) fn acquire(&self) -> ActivityGuard {
        self.try_acquire().expect("activity lock already held")
    }

    /// Take the lock only if nobody holds it.
    pub fn try_acquire(&self) -> Option<ActivityGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActivityGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Releases its [`ActivityLock`] on drop, whatever path the holder exits by.
#[derive(Debug)]
pub struct ActivityGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
