//! SRW locks release shared and exclusive holds through different calls, so
//! every acquire is recorded in a [`ModeTracker`] and `unlock` replays it.

use core::mem::{self, ManuallyDrop};
use core::ptr;

use cthreads_core::{ModeTracker, Result, RwLockMode, ThreadError};

use super::ffi;
use crate::sys::{Pinned, RawRwLock};

pub(crate) struct RwLock {
    slot: Pinned<ffi::SRWLOCK>,
    mode: ModeTracker,
}

// SAFETY: SRW locks are designed for cross-thread use and never move.
unsafe impl Send for RwLock {}
// SAFETY: as above.
unsafe impl Sync for RwLock {}

impl RwLock {
    fn raw(&self) -> *mut ffi::SRWLOCK {
        self.slot.get()
    }

    fn destroy_native(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized SRW lock.
        unsafe {
            if ffi::TryAcquireSRWLockExclusive(self.raw()) == 0 {
                return Err(ThreadError::DestroyFailed(ffi::ERROR_BUSY));
            }
            ffi::ReleaseSRWLockExclusive(self.raw());
        }
        Ok(())
    }
}

impl RawRwLock for RwLock {
    fn init() -> Result<Self> {
        // SAFETY: all-zero is the documented static initializer.
        let slot = Pinned::new(unsafe { mem::zeroed::<ffi::SRWLOCK>() });
        // SAFETY: `slot` is writable and pinned.
        unsafe { ffi::InitializeSRWLock(slot.get()) };
        Ok(Self {
            slot,
            mode: ModeTracker::new(),
        })
    }

    fn read_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized SRW lock.
        unsafe { ffi::AcquireSRWLockShared(self.raw()) };
        self.mode.record_shared();
        Ok(())
    }

    fn write_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized SRW lock.
        unsafe { ffi::AcquireSRWLockExclusive(self.raw()) };
        self.mode.record_exclusive();
        Ok(())
    }

    fn try_read_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized SRW lock.
        if unsafe { ffi::TryAcquireSRWLockShared(self.raw()) } == 0 {
            return Err(ThreadError::WouldBlock);
        }
        self.mode.record_shared();
        Ok(())
    }

    fn try_write_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized SRW lock.
        if unsafe { ffi::TryAcquireSRWLockExclusive(self.raw()) } == 0 {
            return Err(ThreadError::WouldBlock);
        }
        self.mode.record_exclusive();
        Ok(())
    }

    unsafe fn unlock(&self) -> Result<()> {
        let mode = self.mode.release();
        // SAFETY: the caller holds the lock in the recorded mode.
        unsafe {
            match mode {
                RwLockMode::Shared => ffi::ReleaseSRWLockShared(self.raw()),
                RwLockMode::Exclusive => ffi::ReleaseSRWLockExclusive(self.raw()),
                RwLockMode::None => return Err(ThreadError::UnlockFailed(ffi::ERROR_NOT_LOCKED)),
            }
        }
        Ok(())
    }

    fn destroy(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        this.destroy_native()?;
        // SAFETY: checked idle above; `this` is never used again.
        unsafe { ptr::read(&this.slot).free() };
        Ok(())
    }
}

impl Drop for RwLock {
    fn drop(&mut self) {
        if self.destroy_native().is_ok() {
            // SAFETY: checked idle above; the slot is not touched again.
            unsafe { ptr::read(&self.slot).free() };
        }
    }
}
