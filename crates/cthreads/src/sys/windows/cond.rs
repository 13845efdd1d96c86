use core::mem::{self, ManuallyDrop};
use core::ptr;

use cthreads_core::time::relative_timeout_ms;
use cthreads_core::{CondAttr, Result, ThreadError};

use super::{Mutex, ffi, last_error};
use crate::sys::{Pinned, RawCondvar};

/// Win32 condition variables always measure relative timeouts, so the
/// attribute record has nothing to bind.
pub(crate) struct Condvar {
    slot: Pinned<ffi::CONDITION_VARIABLE>,
}

// SAFETY: condition variables are designed for cross-thread use and never move.
unsafe impl Send for Condvar {}
// SAFETY: as above.
unsafe impl Sync for Condvar {}

impl Condvar {
    /// # Safety
    /// The calling thread must hold `mutex`.
    unsafe fn sleep(&self, mutex: &Mutex, ms: ffi::DWORD) -> Result<()> {
        // SAFETY: forwarded from the caller; both objects are initialized.
        let ok = unsafe {
            match mutex {
                Mutex::Srw(lock) => ffi::SleepConditionVariableSRW(self.slot.get(), lock.get(), ms, 0),
                Mutex::Cs(section) => ffi::SleepConditionVariableCS(self.slot.get(), section.get(), ms),
            }
        };
        if ok != 0 {
            return Ok(());
        }
        match last_error() {
            code if code as ffi::DWORD == ffi::ERROR_TIMEOUT => Err(ThreadError::TimedOut),
            code => Err(ThreadError::WaitFailed(code)),
        }
    }
}

impl RawCondvar for Condvar {
    type Mutex = Mutex;

    fn init(_attr: &CondAttr) -> Result<Self> {
        // SAFETY: all-zero is the documented static initializer.
        let slot = Pinned::new(unsafe { mem::zeroed::<ffi::CONDITION_VARIABLE>() });
        // SAFETY: `slot` is writable and pinned.
        unsafe { ffi::InitializeConditionVariable(slot.get()) };
        Ok(Self { slot })
    }

    unsafe fn wait(&self, mutex: &Mutex) -> Result<()> {
        // SAFETY: forwarded from the caller.
        unsafe { self.sleep(mutex, ffi::INFINITE) }
    }

    unsafe fn timed_wait(&self, mutex: &Mutex, timeout_ms: u64) -> Result<()> {
        // SAFETY: forwarded from the caller.
        unsafe { self.sleep(mutex, relative_timeout_ms(timeout_ms)) }
    }

    fn signal(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized condition variable.
        unsafe { ffi::WakeConditionVariable(self.slot.get()) };
        Ok(())
    }

    fn broadcast(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized condition variable.
        unsafe { ffi::WakeAllConditionVariable(self.slot.get()) };
        Ok(())
    }

    fn destroy(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        // SAFETY: no teardown call exists; the caller guarantees no waiters.
        unsafe { ptr::read(&this.slot).free() };
        Ok(())
    }
}

impl Drop for Condvar {
    fn drop(&mut self) {
        // SAFETY: `&mut self` rules out waiters; the slot is not touched again.
        unsafe { ptr::read(&self.slot).free() };
    }
}
