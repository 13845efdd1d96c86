//! Counting semaphores.
//!
//! Not available on Apple targets, which lack unnamed POSIX semaphores.

use cthreads_core::Result;

use crate::sys::{RawSemaphore, imp};

pub use cthreads_core::SEM_VALUE_MAX;

pub struct Semaphore {
    inner: imp::Semaphore,
}

impl Semaphore {
    /// Creates a semaphore holding `initial` units; at most [`SEM_VALUE_MAX`].
    pub fn init(initial: u32) -> Result<Self> {
        Ok(Self {
            inner: imp::Semaphore::init(initial)?,
        })
    }

    /// Takes one unit, blocking while none are available.
    pub fn wait(&self) -> Result<()> {
        self.inner.wait()
    }

    /// Takes one unit or fails with `WouldBlock`.
    pub fn try_wait(&self) -> Result<()> {
        self.inner.try_wait()
    }

    /// Takes one unit or fails with `TimedOut` after `timeout_ms`.
    pub fn timed_wait(&self, timeout_ms: u64) -> Result<()> {
        self.inner.timed_wait(timeout_ms)
    }

    /// Returns one unit, waking a blocked waiter if there is one.
    pub fn post(&self) -> Result<()> {
        self.inner.post()
    }

    /// Snapshot of the count; `None` where the backend cannot report it.
    #[must_use]
    pub fn value(&self) -> Option<u32> {
        self.inner.value()
    }

    pub fn destroy(self) -> Result<()> {
        self.inner.destroy()
    }
}
