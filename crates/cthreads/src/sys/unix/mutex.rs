use core::mem::{self, ManuallyDrop, MaybeUninit};

use cthreads_core::{MutexAttr, MutexKind, PriorityProtocol, Result, ThreadError};

use super::{EINVAL, check, ffi};
use crate::sys::{Pinned, RawMutex};

pub(crate) struct Mutex {
    slot: Pinned<libc::pthread_mutex_t>,
}

// SAFETY: pthread mutexes are designed to be shared between threads, and
// the slot never moves.
unsafe impl Send for Mutex {}
// SAFETY: as above.
unsafe impl Sync for Mutex {}

/// Owns an initialized `pthread_mutexattr_t`.
struct NativeAttr(libc::pthread_mutexattr_t);

impl NativeAttr {
    fn new() -> Result<Self> {
        let mut raw = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
        // SAFETY: `raw` is a valid out-pointer.
        check(unsafe { libc::pthread_mutexattr_init(raw.as_mut_ptr()) }, ThreadError::InitFailed)?;
        // SAFETY: initialized by the successful call above.
        Ok(Self(unsafe { raw.assume_init() }))
    }

    fn apply(&mut self, attr: &MutexAttr) -> Result<()> {
        let raw: *mut libc::pthread_mutexattr_t = &mut self.0;
        let kind = match attr.kind {
            MutexKind::Normal => libc::PTHREAD_MUTEX_NORMAL,
            MutexKind::Recursive => libc::PTHREAD_MUTEX_RECURSIVE,
            MutexKind::ErrorCheck => libc::PTHREAD_MUTEX_ERRORCHECK,
        };
        // SAFETY: `raw` points to an initialized attribute object.
        check(unsafe { libc::pthread_mutexattr_settype(raw, kind) }, ThreadError::InitFailed)?;

        if attr.process_shared {
            // SAFETY: as above.
            let rc = unsafe { libc::pthread_mutexattr_setpshared(raw, libc::PTHREAD_PROCESS_SHARED) };
            check(rc, ThreadError::InitFailed)?;
        }

        // Best-effort knobs: a platform without PI/PP or robust support
        // still gets a working mutex.
        // SAFETY: as above.
        unsafe {
            let protocol = match attr.priority_protocol {
                PriorityProtocol::None => ffi::PTHREAD_PRIO_NONE,
                PriorityProtocol::Inherit => ffi::PTHREAD_PRIO_INHERIT,
                PriorityProtocol::Protect => ffi::PTHREAD_PRIO_PROTECT,
            };
            if attr.priority_protocol != PriorityProtocol::None
                && ffi::pthread_mutexattr_setprotocol(raw, protocol) == 0
            {
                if let Some(ceiling) = attr.priority_ceiling {
                    ffi::pthread_mutexattr_setprioceiling(raw, ceiling);
                }
            }
        }
        if attr.robust {
            set_robust(raw);
        }
        Ok(())
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn set_robust(raw: *mut libc::pthread_mutexattr_t) {
    // SAFETY: `raw` points to an initialized attribute object.
    unsafe { ffi::pthread_mutexattr_setrobust(raw, ffi::PTHREAD_MUTEX_ROBUST) };
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn set_robust(_raw: *mut libc::pthread_mutexattr_t) {}

impl Drop for NativeAttr {
    fn drop(&mut self) {
        // SAFETY: initialized in `new` and destroyed exactly once.
        unsafe { libc::pthread_mutexattr_destroy(&mut self.0) };
    }
}

impl Mutex {
    pub(crate) fn raw(&self) -> *mut libc::pthread_mutex_t {
        self.slot.get()
    }

    fn destroy_native(&self) -> i32 {
        // SAFETY: the slot holds an initialized mutex.
        unsafe { libc::pthread_mutex_destroy(self.raw()) }
    }

    /// Recovers a robust mutex whose previous owner died holding it.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn acquired(&self, rc: i32) -> i32 {
        if rc == libc::EOWNERDEAD {
            // SAFETY: the calling thread now owns the mutex.
            return unsafe { ffi::pthread_mutex_consistent(self.raw()) };
        }
        rc
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn acquired(&self, rc: i32) -> i32 {
        rc
    }
}

impl RawMutex for Mutex {
    fn init(attr: &MutexAttr) -> Result<Self> {
        attr.validate().map_err(|_| ThreadError::InitFailed(EINVAL))?;
        let mut native_attr = NativeAttr::new()?;
        native_attr.apply(attr)?;

        // SAFETY: an all-zero `pthread_mutex_t` is fine as the target of init.
        let slot = Pinned::new(unsafe { mem::zeroed::<libc::pthread_mutex_t>() });
        // SAFETY: `slot` is writable and pinned; the attribute is initialized.
        let rc = unsafe { libc::pthread_mutex_init(slot.get(), &native_attr.0) };
        if rc != 0 {
            // SAFETY: the native object was never initialized.
            unsafe { slot.free() };
            return Err(ThreadError::InitFailed(rc));
        }
        Ok(Self { slot })
    }

    fn lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized mutex.
        let rc = self.acquired(unsafe { libc::pthread_mutex_lock(self.raw()) });
        check(rc, ThreadError::LockFailed)
    }

    fn try_lock(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized mutex.
        match self.acquired(unsafe { libc::pthread_mutex_trylock(self.raw()) }) {
            0 => Ok(()),
            libc::EBUSY => Err(ThreadError::WouldBlock),
            rc => Err(ThreadError::LockFailed(rc)),
        }
    }

    unsafe fn unlock(&self) -> Result<()> {
        // SAFETY: the caller holds the lock.
        check(unsafe { libc::pthread_mutex_unlock(self.raw()) }, ThreadError::UnlockFailed)
    }

    fn destroy(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        let rc = this.destroy_native();
        if rc != 0 {
            // Still in use: leak the slot rather than free live memory.
            return Err(ThreadError::DestroyFailed(rc));
        }
        // SAFETY: destroyed above; `this` is never used again.
        unsafe { core::ptr::read(&this.slot).free() };
        Ok(())
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        if self.destroy_native() == 0 {
            // SAFETY: destroyed above; the slot is not touched again.
            unsafe { core::ptr::read(&self.slot).free() };
        }
    }
}
