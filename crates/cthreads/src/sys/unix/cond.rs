use core::mem::{self, ManuallyDrop, MaybeUninit};

use cthreads_core::{ClockSource, CondAttr, Result, ThreadError};

use super::{Mutex, check, deadline, ffi};
use crate::sys::{Pinned, RawCondvar};

pub(crate) struct Condvar {
    slot: Pinned<libc::pthread_cond_t>,
    /// Clock the native object was bound to; timed waits read the same one.
    clock: libc::clockid_t,
}

// SAFETY: pthread condition variables are designed to be shared between
// threads, and the slot never moves.
unsafe impl Send for Condvar {}
// SAFETY: as above.
unsafe impl Sync for Condvar {}

/// Binds `attr` to the requested clock where the platform supports it and
/// returns the clock actually in effect.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn bind_clock(attr: *mut libc::pthread_condattr_t, source: ClockSource) -> libc::clockid_t {
    if source == ClockSource::Monotonic {
        // SAFETY: `attr` points to an initialized attribute object.
        if unsafe { ffi::pthread_condattr_setclock(attr, libc::CLOCK_MONOTONIC) } == 0 {
            return libc::CLOCK_MONOTONIC;
        }
    }
    libc::CLOCK_REALTIME
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn bind_clock(_attr: *mut libc::pthread_condattr_t, _source: ClockSource) -> libc::clockid_t {
    libc::CLOCK_REALTIME
}

impl Condvar {
    fn raw(&self) -> *mut libc::pthread_cond_t {
        self.slot.get()
    }

    fn destroy_native(&self) -> i32 {
        // SAFETY: the slot holds an initialized condition variable.
        unsafe { libc::pthread_cond_destroy(self.raw()) }
    }
}

impl RawCondvar for Condvar {
    type Mutex = Mutex;

    fn init(attr: &CondAttr) -> Result<Self> {
        let mut native_attr = MaybeUninit::<libc::pthread_condattr_t>::uninit();
        // SAFETY: valid out-pointer.
        let rc = unsafe { libc::pthread_condattr_init(native_attr.as_mut_ptr()) };
        check(rc, ThreadError::InitFailed)?;
        let attr_ptr = native_attr.as_mut_ptr();

        let clock = bind_clock(attr_ptr, attr.clock_source);
        let mut rc = 0;
        if attr.process_shared {
            // SAFETY: `attr_ptr` is initialized.
            rc = unsafe { libc::pthread_condattr_setpshared(attr_ptr, libc::PTHREAD_PROCESS_SHARED) };
        }

        // SAFETY: an all-zero `pthread_cond_t` is fine as the target of init.
        let slot = Pinned::new(unsafe { mem::zeroed::<libc::pthread_cond_t>() });
        if rc == 0 {
            // SAFETY: `slot` is writable and pinned; the attribute is initialized.
            rc = unsafe { libc::pthread_cond_init(slot.get(), attr_ptr) };
        }
        // SAFETY: initialized above and no longer needed.
        unsafe { libc::pthread_condattr_destroy(attr_ptr) };

        if rc != 0 {
            // SAFETY: the native object was never initialized.
            unsafe { slot.free() };
            return Err(ThreadError::InitFailed(rc));
        }
        Ok(Self { slot, clock })
    }

    unsafe fn wait(&self, mutex: &Mutex) -> Result<()> {
        // SAFETY: the caller holds `mutex`; both objects are initialized.
        let rc = unsafe { ffi::pthread_cond_wait(self.raw(), mutex.raw()) };
        check(rc, ThreadError::WaitFailed)
    }

    unsafe fn timed_wait(&self, mutex: &Mutex, timeout_ms: u64) -> Result<()> {
        let at = deadline(self.clock, timeout_ms);
        // SAFETY: as in `wait`; `at` is normalized.
        match unsafe { ffi::pthread_cond_timedwait(self.raw(), mutex.raw(), &at) } {
            0 => Ok(()),
            libc::ETIMEDOUT => Err(ThreadError::TimedOut),
            rc => Err(ThreadError::WaitFailed(rc)),
        }
    }

    fn signal(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized condition variable.
        check(unsafe { libc::pthread_cond_signal(self.raw()) }, ThreadError::SignalFailed)
    }

    fn broadcast(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized condition variable.
        check(unsafe { libc::pthread_cond_broadcast(self.raw()) }, ThreadError::SignalFailed)
    }

    fn destroy(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        let rc = this.destroy_native();
        if rc != 0 {
            return Err(ThreadError::DestroyFailed(rc));
        }
        // SAFETY: destroyed above; `this` is never used again.
        unsafe { core::ptr::read(&this.slot).free() };
        Ok(())
    }
}

impl Drop for Condvar {
    fn drop(&mut self) {
        if self.destroy_native() == 0 {
            // SAFETY: destroyed above; the slot is not touched again.
            unsafe { core::ptr::read(&self.slot).free() };
        }
    }
}
