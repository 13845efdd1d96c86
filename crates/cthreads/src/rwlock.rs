//! Shared/exclusive locks.

use core::marker::PhantomData;

use cthreads_core::Result;

use crate::sys::{RawRwLock, imp};

pub struct RwLock {
    inner: imp::RwLock,
}

impl RwLock {
    pub fn init() -> Result<Self> {
        Ok(Self {
            inner: imp::RwLock::init()?,
        })
    }

    /// Blocks while a writer holds the lock.
    pub fn read_lock(&self) -> Result<()> {
        self.inner.read_lock()
    }

    /// Blocks while any reader or writer holds the lock.
    pub fn write_lock(&self) -> Result<()> {
        self.inner.write_lock()
    }

    pub fn try_read_lock(&self) -> Result<()> {
        self.inner.try_read_lock()
    }

    pub fn try_write_lock(&self) -> Result<()> {
        self.inner.try_write_lock()
    }

    /// Releases one hold, in whichever mode it was taken.
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock.
    pub unsafe fn unlock(&self) -> Result<()> {
        // SAFETY: forwarded from the caller.
        unsafe { self.inner.unlock() }
    }

    pub fn read(&self) -> Result<RwLockGuard<'_>> {
        self.read_lock()?;
        Ok(RwLockGuard::new(self))
    }

    pub fn write(&self) -> Result<RwLockGuard<'_>> {
        self.write_lock()?;
        Ok(RwLockGuard::new(self))
    }

    /// Releases the native object. Fails with `DestroyFailed` while held.
    pub fn destroy(self) -> Result<()> {
        self.inner.destroy()
    }
}

/// One shared or exclusive hold, released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct RwLockGuard<'a> {
    lock: &'a RwLock,
    _not_send: PhantomData<*const ()>,
}

impl<'a> RwLockGuard<'a> {
    fn new(lock: &'a RwLock) -> Self {
        Self {
            lock,
            _not_send: PhantomData,
        }
    }

    pub fn unlock(self) -> Result<()> {
        let lock = self.lock;
        core::mem::forget(self);
        // SAFETY: the guard proves a hold.
        unsafe { lock.unlock() }
    }
}

impl Drop for RwLockGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard proves a hold.
        let _ = unsafe { self.lock.unlock() };
    }
}
