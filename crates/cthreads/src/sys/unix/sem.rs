//! Unnamed POSIX semaphores. Darwin only implements named ones, so this
//! module is not built there.

use core::mem::{self, ManuallyDrop};
use core::ptr;

use cthreads_core::{Result, ThreadError, validate_initial_count};

use super::{EINVAL, Errors, deadline, ffi};
use crate::sys::{Pinned, RawErrors, RawSemaphore};

pub(crate) struct Semaphore {
    slot: Pinned<libc::sem_t>,
}

// SAFETY: POSIX semaphores are designed to be shared between threads, and
// the slot never moves.
unsafe impl Send for Semaphore {}
// SAFETY: as above.
unsafe impl Sync for Semaphore {}

fn errno() -> i32 {
    Errors::last_error_code()
}

impl Semaphore {
    fn raw(&self) -> *mut libc::sem_t {
        self.slot.get()
    }

    fn destroy_native(&self) -> i32 {
        // SAFETY: the slot holds an initialized semaphore.
        if unsafe { libc::sem_destroy(self.raw()) } == 0 { 0 } else { errno() }
    }
}

impl RawSemaphore for Semaphore {
    fn init(initial: u32) -> Result<Self> {
        validate_initial_count(initial).map_err(|_| ThreadError::InitFailed(EINVAL))?;
        // SAFETY: an all-zero `sem_t` is fine as the target of init.
        let slot = Pinned::new(unsafe { mem::zeroed::<libc::sem_t>() });
        // SAFETY: `slot` is writable and pinned.
        if unsafe { libc::sem_init(slot.get(), 0, initial) } != 0 {
            let code = errno();
            // SAFETY: the native object was never initialized.
            unsafe { slot.free() };
            return Err(ThreadError::InitFailed(code));
        }
        Ok(Self { slot })
    }

    fn wait(&self) -> Result<()> {
        loop {
            // SAFETY: the slot holds an initialized semaphore.
            if unsafe { ffi::sem_wait(self.raw()) } == 0 {
                return Ok(());
            }
            match errno() {
                libc::EINTR => continue,
                code => return Err(ThreadError::WaitFailed(code)),
            }
        }
    }

    fn try_wait(&self) -> Result<()> {
        loop {
            // SAFETY: the slot holds an initialized semaphore.
            if unsafe { libc::sem_trywait(self.raw()) } == 0 {
                return Ok(());
            }
            match errno() {
                libc::EINTR => continue,
                libc::EAGAIN => return Err(ThreadError::WouldBlock),
                code => return Err(ThreadError::WaitFailed(code)),
            }
        }
    }

    fn timed_wait(&self, timeout_ms: u64) -> Result<()> {
        // `sem_timedwait` always measures against the realtime clock.
        let at = deadline(libc::CLOCK_REALTIME, timeout_ms);
        loop {
            // SAFETY: the slot holds an initialized semaphore; `at` is normalized.
            if unsafe { ffi::sem_timedwait(self.raw(), &at) } == 0 {
                return Ok(());
            }
            match errno() {
                libc::EINTR => continue,
                libc::ETIMEDOUT => return Err(ThreadError::TimedOut),
                code => return Err(ThreadError::WaitFailed(code)),
            }
        }
    }

    fn post(&self) -> Result<()> {
        // SAFETY: the slot holds an initialized semaphore.
        if unsafe { libc::sem_post(self.raw()) } == 0 {
            Ok(())
        } else {
            Err(ThreadError::SignalFailed(errno()))
        }
    }

    fn value(&self) -> Option<u32> {
        let mut value = 0;
        // SAFETY: the slot holds an initialized semaphore; `value` is a valid out-pointer.
        if unsafe { libc::sem_getvalue(self.raw(), &mut value) } != 0 {
            return None;
        }
        // Some platforms report waiters as a negative count.
        Some(u32::try_from(value).unwrap_or(0))
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

impl Drop for Semaphore {
    fn drop(&mut self) {
        if self.destroy_native() == 0 {
            // SAFETY: destroyed above; the slot is not touched again.
            unsafe { ptr::read(&self.slot).free() };
        }
    }
}
