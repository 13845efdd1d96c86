//! SRW locks for normal and error-checking mutexes, critical sections for
//! recursive ones. Neither can be process-shared; that knob is dropped.

use core::mem::{self, ManuallyDrop};
use core::ptr;

use cthreads_core::{MutexAttr, MutexKind, Result, ThreadError};

use super::{EINVAL, ffi};
use crate::sys::{Pinned, RawMutex};

pub(crate) enum Mutex {
    Srw(Pinned<ffi::SRWLOCK>),
    Cs(Pinned<ffi::CRITICAL_SECTION>),
}

// SAFETY: both native objects are designed for cross-thread use and never move.
unsafe impl Send for Mutex {}
// SAFETY: as above.
unsafe impl Sync for Mutex {}

impl Mutex {
    /// Releases the native object. SRW locks need no teardown, but a held
    /// lock of either kind is reported as busy.
    fn destroy_native(&self) -> Result<()> {
        match self {
            Self::Srw(slot) => {
                // SAFETY: the slot holds an initialized SRW lock.
                unsafe {
                    if ffi::TryAcquireSRWLockExclusive(slot.get()) == 0 {
                        return Err(ThreadError::DestroyFailed(ffi::ERROR_BUSY));
                    }
                    ffi::ReleaseSRWLockExclusive(slot.get());
                }
            }
            // SAFETY: the slot holds an initialized critical section. An owner
            // is recorded while any recursion level is held.
            Self::Cs(slot) => unsafe {
                let owner = ptr::read_volatile(&raw const (*slot.get()).owning_thread);
                if !owner.is_null() {
                    return Err(ThreadError::DestroyFailed(ffi::ERROR_BUSY));
                }
                ffi::DeleteCriticalSection(slot.get());
            },
        }
        Ok(())
    }

    /// # Safety
    /// No native call may reference the slot any more.
    unsafe fn free_slot(&self) {
        // SAFETY: forwarded from the caller; each slot is read out once.
        unsafe {
            match self {
                Self::Srw(slot) => ptr::read(slot).free(),
                Self::Cs(slot) => ptr::read(slot).free(),
            }
        }
    }
}

impl RawMutex for Mutex {
    fn init(attr: &MutexAttr) -> Result<Self> {
        attr.validate().map_err(|_| ThreadError::InitFailed(EINVAL))?;
        // SAFETY: all-zero is the documented static initializer for SRW locks
        // and an acceptable target for `InitializeCriticalSection`.
        let mutex = unsafe {
            match attr.kind {
                MutexKind::Recursive => {
                    let slot = Pinned::new(mem::zeroed::<ffi::CRITICAL_SECTION>());
                    ffi::InitializeCriticalSection(slot.get());
                    Self::Cs(slot)
                }
                MutexKind::Normal | MutexKind::ErrorCheck => {
                    let slot = Pinned::new(mem::zeroed::<ffi::SRWLOCK>());
                    ffi::InitializeSRWLock(slot.get());
                    Self::Srw(slot)
                }
            }
        };
        Ok(mutex)
    }

    fn lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized lock.
        unsafe {
            match self {
                Self::Srw(slot) => ffi::AcquireSRWLockExclusive(slot.get()),
                Self::Cs(slot) => ffi::EnterCriticalSection(slot.get()),
            }
        }
        Ok(())
    }

    fn try_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized lock.
        let acquired = unsafe {
            match self {
                Self::Srw(slot) => ffi::TryAcquireSRWLockExclusive(slot.get()) != 0,
                Self::Cs(slot) => ffi::TryEnterCriticalSection(slot.get()) != 0,
            }
        };
        if acquired { Ok(()) } else { Err(ThreadError::WouldBlock) }
    }

    unsafe fn unlock(&self) -> Result<()> {
        // SAFETY: the caller holds the lock.
        unsafe {
            match self {
                Self::Srw(slot) => ffi::ReleaseSRWLockExclusive(slot.get()),
                Self::Cs(slot) => ffi::LeaveCriticalSection(slot.get()),
            }
        }
        Ok(())
    }

    fn destroy(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        this.destroy_native()?;
        // SAFETY: torn down above; `this` is never used again.
        unsafe { this.free_slot() };
        Ok(())
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        if self.destroy_native().is_ok() {
            // SAFETY: torn down above; the slot is not touched again.
            unsafe { self.free_slot() };
        }
    }
}
