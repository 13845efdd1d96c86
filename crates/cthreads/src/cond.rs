//! Condition variables.
//!
//! A condition variable is bound to a mutex only for the duration of each
//! wait. Spurious wakeups happen: always re-check the predicate.

use cthreads_core::{CondAttr, Result};

use crate::mutex::{Mutex, MutexGuard};
use crate::sys::{RawCondvar, imp};

pub struct Condvar {
    inner: imp::Condvar,
}

impl Condvar {
    pub fn init(attr: Option<&CondAttr>) -> Result<Self> {
        let defaults = CondAttr::default();
        let inner = imp::Condvar::init(attr.unwrap_or(&defaults))?;
        Ok(Self { inner })
    }

    pub fn new() -> Result<Self> {
        Self::init(None)
    }

    /// Atomically releases `mutex` and sleeps; `mutex` is held again on return.
    ///
    /// # Safety
    ///
    /// The calling thread must own `mutex`.
    pub unsafe fn wait(&self, mutex: &Mutex) -> Result<()> {
        // SAFETY: forwarded from the caller.
        unsafe { self.inner.wait(mutex.raw()) }
    }

    /// As [`wait`](Self::wait), giving up with `TimedOut` after `timeout_ms`.
    ///
    /// # Safety
    ///
    /// The calling thread must own `mutex`.
    pub unsafe fn timed_wait(&self, mutex: &Mutex, timeout_ms: u64) -> Result<()> {
        // SAFETY: forwarded from the caller.
        unsafe { self.inner.timed_wait(mutex.raw(), timeout_ms) }
    }

    pub fn wait_guard(&self, guard: &MutexGuard<'_>) -> Result<()> {
        // SAFETY: the guard proves ownership.
        unsafe { self.wait(guard.mutex()) }
    }

    pub fn timed_wait_guard(&self, guard: &MutexGuard<'_>, timeout_ms: u64) -> Result<()> {
        // SAFETY: the guard proves ownership.
        unsafe { self.timed_wait(guard.mutex(), timeout_ms) }
    }

    /// Wakes at most one waiter.
    pub fn signal(&self) -> Result<()> {
        self.inner.signal()
    }

    pub fn broadcast(&self) -> Result<()> {
        self.inner.broadcast()
    }

    /// Releases the native object; no thread may still be waiting.
    pub fn destroy(self) -> Result<()> {
        self.inner.destroy()
    }
}
