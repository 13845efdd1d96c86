//! Mutual exclusion.
//!
//! The raw `lock`/`unlock` pair matches the native calls one to one. Code
//! that prefers scoped release uses [`Mutex::guard`].

use core::marker::PhantomData;

use cthreads_core::{MutexAttr, Result};

use crate::sys::{RawMutex, imp};

pub struct Mutex {
    inner: imp::Mutex,
}

impl Mutex {
    /// Creates a mutex. `None` gives a process-private normal mutex.
    pub fn init(attr: Option<&MutexAttr>) -> Result<Self> {
        let defaults = MutexAttr::default();
        let inner = imp::Mutex::init(attr.unwrap_or(&defaults))?;
        Ok(Self { inner })
    }

    pub fn new() -> Result<Self> {
        Self::init(None)
    }

    /// Blocks until the calling thread owns the mutex. Re-locking from the
    /// owner is only defined for recursive mutexes.
    pub fn lock(&self) -> Result<()> {
        self.inner.lock()
    }

    /// Acquires without blocking; `WouldBlock` if another thread holds it.
    pub fn try_lock(&self) -> Result<()> {
        self.inner.try_lock()
    }

    /// # Safety
    ///
    /// The calling thread must own the mutex.
    pub unsafe fn unlock(&self) -> Result<()> {
        // SAFETY: forwarded from the caller.
        unsafe { self.inner.unlock() }
    }

    /// Locks and returns a guard that unlocks on drop.
    pub fn guard(&self) -> Result<MutexGuard<'_>> {
        self.lock()?;
        Ok(MutexGuard::new(self))
    }

    pub fn try_guard(&self) -> Result<MutexGuard<'_>> {
        self.try_lock()?;
        Ok(MutexGuard::new(self))
    }

    /// Releases the native object. Fails with `DestroyFailed` if it is still
    /// locked; the memory is then leaked rather than freed.
    pub fn destroy(self) -> Result<()> {
        self.inner.destroy()
    }

    pub(crate) fn raw(&self) -> &imp::Mutex {
        &self.inner
    }
}

/// Proof that the current thread owns a [`Mutex`].
#[must_use = "the mutex unlocks as soon as the guard is dropped"]
pub struct MutexGuard<'a> {
    mutex: &'a Mutex,
    // Must be released by the thread that acquired it.
    _not_send: PhantomData<*const ()>,
}

impl<'a> MutexGuard<'a> {
    fn new(mutex: &'a Mutex) -> Self {
        Self {
            mutex,
            _not_send: PhantomData,
        }
    }

    pub(crate) fn mutex(&self) -> &'a Mutex {
        self.mutex
    }

    /// Unlocks now, reporting any failure instead of discarding it.
    pub fn unlock(self) -> Result<()> {
        let mutex = self.mutex;
        core::mem::forget(self);
        // SAFETY: the guard proves ownership.
        unsafe { mutex.unlock() }
    }
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard proves ownership.
        let _ = unsafe { self.mutex.unlock() };
    }
}
