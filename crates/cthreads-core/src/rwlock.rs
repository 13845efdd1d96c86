//! Read-write lock mode bookkeeping.
//!
//! SRW locks release shared and exclusive holds through different calls, and
//! the lock itself does not remember which one is outstanding. The tracker
//! records the acquired mode per lock instance so a mode-less `unlock` can
//! pick the right release call.
//!
//! Readers are counted rather than stored as a single flag: with two
//! concurrent readers, the first `unlock` must not make the second one look
//! like it holds nothing.

use core::sync::atomic::{AtomicUsize, Ordering};

const UNLOCKED: usize = 0;
const EXCLUSIVE: usize = usize::MAX;

/// Mode in which a read-write lock is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RwLockMode {
    None,
    /// Held by at least one reader.
    Shared,
    Exclusive,
}

impl RwLockMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shared => "shared",
            Self::Exclusive => "exclusive",
        }
    }
}

/// Per-instance mode record.
///
/// Call `record_*` after the native acquire succeeds and [`release`] before
/// the native release, so the record never claims less than is held.
///
/// [`release`]: ModeTracker::release
#[derive(Debug, Default)]
pub struct ModeTracker {
    state: AtomicUsize,
}

impl ModeTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicUsize::new(UNLOCKED),
        }
    }

    pub fn record_shared(&self) {
        self.state.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_exclusive(&self) {
        self.state.store(EXCLUSIVE, Ordering::Release);
    }

    /// Consumes one hold and returns its mode. An exclusive hold resets the
    /// record to `None`; a shared hold drops one reader. Returns
    /// `RwLockMode::None` if nothing was recorded.
    pub fn release(&self) -> RwLockMode {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (next, mode) = match current {
                UNLOCKED => return RwLockMode::None,
                EXCLUSIVE => (UNLOCKED, RwLockMode::Exclusive),
                readers => (readers - 1, RwLockMode::Shared),
            };
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return mode,
                Err(observed) => current = observed,
            }
        }
    }

    #[must_use]
    pub fn mode(&self) -> RwLockMode {
        match self.state.load(Ordering::Acquire) {
            UNLOCKED => RwLockMode::None,
            EXCLUSIVE => RwLockMode::Exclusive,
            _ => RwLockMode::Shared,
        }
    }

    /// Number of recorded readers (0 when unlocked or write-locked).
    #[must_use]
    pub fn readers(&self) -> usize {
        match self.state.load(Ordering::Acquire) {
            EXCLUSIVE => 0,
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_unlocked() {
        let tracker = ModeTracker::new();
        assert_eq!(tracker.mode(), RwLockMode::None);
        assert_eq!(tracker.release(), RwLockMode::None);
    }

    #[test]
    fn exclusive_resets_to_none() {
        let tracker = ModeTracker::new();
        tracker.record_exclusive();
        assert_eq!(tracker.mode(), RwLockMode::Exclusive);
        assert_eq!(tracker.readers(), 0);
        assert_eq!(tracker.release(), RwLockMode::Exclusive);
        assert_eq!(tracker.mode(), RwLockMode::None);
    }

    #[test]
    fn readers_release_one_at_a_time() {
        let tracker = ModeTracker::new();
        tracker.record_shared();
        tracker.record_shared();
        assert_eq!(tracker.readers(), 2);
        assert_eq!(tracker.release(), RwLockMode::Shared);
        assert_eq!(tracker.mode(), RwLockMode::Shared);
        assert_eq!(tracker.release(), RwLockMode::Shared);
        assert_eq!(tracker.mode(), RwLockMode::None);
    }

    #[test]
    fn concurrent_readers_balance_out() {
        let tracker = Arc::new(ModeTracker::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        tracker.record_shared();
                        assert_eq!(tracker.release(), RwLockMode::Shared);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(tracker.mode(), RwLockMode::None);
    }

    #[test]
    fn mode_names() {
        assert_eq!(RwLockMode::Shared.as_str(), "shared");
        assert_eq!(RwLockMode::Exclusive.as_str(), "exclusive");
    }
}
