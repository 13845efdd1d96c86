//! `pthread_rwlock_unlock` knows which mode it releases, so no mode
//! bookkeeping is needed on this backend.

use core::mem::{self, ManuallyDrop};
use core::ptr;

use cthreads_core::{Result, ThreadError};

use super::check;
use crate::sys::{Pinned, RawRwLock};

pub(crate) struct RwLock {
    slot: Pinned<libc::pthread_rwlock_t>,
}

// SAFETY: pthread rwlocks are designed to be shared between threads, and the
// slot never moves.
unsafe impl Send for RwLock {}
// SAFETY: as above.
unsafe impl Sync for RwLock {}

impl RwLock {
    fn raw(&self) -> *mut libc::pthread_rwlock_t {
        self.slot.get()
    }

    /// glibc destroys held rwlocks without complaint, so holders are
    /// detected with a write probe first.
    fn destroy_native(&self) -> i32 {
        // SAFETY: the slot holds an initialized rwlock.
        unsafe {
            match libc::pthread_rwlock_trywrlock(self.raw()) {
                0 => {
                    libc::pthread_rwlock_unlock(self.raw());
                }
                // EDEADLK: the calling thread already holds it.
                libc::EBUSY | libc::EDEADLK => return libc::EBUSY,
                rc => return rc,
            }
            libc::pthread_rwlock_destroy(self.raw())
        }
    }

    fn try_result(rc: i32) -> Result<()> {
        match rc {
            0 => Ok(()),
            libc::EBUSY => Err(ThreadError::WouldBlock),
            rc => Err(ThreadError::LockFailed(rc)),
        }
    }
}

impl RawRwLock for RwLock {
    fn init() -> Result<Self> {
        // SAFETY: an all-zero `pthread_rwlock_t` is fine as the target of init.
        let slot = Pinned::new(unsafe { mem::zeroed::<libc::pthread_rwlock_t>() });
        // SAFETY: `slot` is writable and pinned.
        let rc = unsafe { libc::pthread_rwlock_init(slot.get(), ptr::null()) };
        if rc != 0 {
            // SAFETY: the native object was never initialized.
            unsafe { slot.free() };
            return Err(ThreadError::InitFailed(rc));
        }
        Ok(Self { slot })
    }

    fn read_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized rwlock.
        check(unsafe { libc::pthread_rwlock_rdlock(self.raw()) }, ThreadError::LockFailed)
    }

    fn write_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized rwlock.
        check(unsafe { libc::pthread_rwlock_wrlock(self.raw()) }, ThreadError::LockFailed)
    }

    fn try_read_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized rwlock.
        Self::try_result(unsafe { libc::pthread_rwlock_tryrdlock(self.raw()) })
    }

    fn try_write_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized rwlock.
        Self::try_result(unsafe { libc::pthread_rwlock_trywrlock(self.raw()) })
    }

    unsafe fn unlock(&self) -> Result<()> {
        // SAFETY: the caller holds the lock.
        check(unsafe { libc::pthread_rwlock_unlock(self.raw()) }, ThreadError::UnlockFailed)
    }

    fn destroy(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        let rc = this.destroy_native();
        if rc != 0 {
            return Err(ThreadError::DestroyFailed(rc));
        }
        // SAFETY: destroyed above; `this` is never used again.
        unsafe { ptr::read(&this.slot).free() };
        Ok(())
    }
}

impl Drop for RwLock {
    fn drop(&mut self) {
        if self.destroy_native() == 0 {
            // SAFETY: destroyed above; the slot is not touched again.
            unsafe { ptr::read(&self.slot).free() };
        }
    }
}
