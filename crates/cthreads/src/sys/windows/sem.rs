use core::ptr;

use cthreads_core::time::relative_timeout_ms;
use cthreads_core::{Result, SEM_VALUE_MAX, ThreadError, validate_initial_count};

use super::{EINVAL, ffi, last_error};
use crate::sys::RawSemaphore;

pub(crate) struct Semaphore {
    handle: ffi::HANDLE,
}

// SAFETY: kernel semaphore handles may be used from any thread.
unsafe impl Send for Semaphore {}
// SAFETY: as above.
unsafe impl Sync for Semaphore {}

impl Semaphore {
    fn wait_for(&self, ms: ffi::DWORD, on_timeout: ThreadError) -> Result<()> {
        // SAFETY: `handle` is an open semaphore handle.
        match unsafe { ffi::WaitForSingleObject(self.handle, ms) } {
            ffi::WAIT_OBJECT_0 => Ok(()),
            ffi::WAIT_TIMEOUT => Err(on_timeout),
            ffi::WAIT_FAILED => Err(ThreadError::WaitFailed(last_error())),
            other => Err(ThreadError::WaitFailed(other as i32)),
        }
    }

    fn close(&self) -> Result<()> {
        // SAFETY: `handle` is open and closed exactly once.
        if unsafe { ffi::CloseHandle(self.handle) } == 0 {
            return Err(ThreadError::DestroyFailed(last_error()));
        }
        Ok(())
    }
}

impl RawSemaphore for Semaphore {
    fn init(initial: u32) -> Result<Self> {
        validate_initial_count(initial).map_err(|_| ThreadError::InitFailed(EINVAL))?;
        // SAFETY: unnamed semaphore with default security.
        let handle = unsafe {
            ffi::CreateSemaphoreW(
                ptr::null_mut(),
                initial as i32,
                SEM_VALUE_MAX as i32,
                ptr::null(),
            )
        };
        if handle.is_null() {
            return Err(ThreadError::InitFailed(last_error()));
        }
        Ok(Self { handle })
    }

    fn wait(&self) -> Result<()> {
        self.wait_for(ffi::INFINITE, ThreadError::WaitFailed(ffi::WAIT_TIMEOUT as i32))
    }

    fn try_wait(&self) -> Result<()> {
        self.wait_for(0, ThreadError::WouldBlock)
    }

    fn timed_wait(&self, timeout_ms: u64) -> Result<()> {
        self.wait_for(relative_timeout_ms(timeout_ms), ThreadError::TimedOut)
    }

    fn post(&self) -> Result<()> {
        // SAFETY: `handle` is an open semaphore handle.
        if unsafe { ffi::ReleaseSemaphore(self.handle, 1, ptr::null_mut()) } == 0 {
            return Err(ThreadError::SignalFailed(last_error()));
        }
        Ok(())
    }

    fn value(&self) -> Option<u32> {
        None
    }

    fn destroy(self) -> Result<()> {
        let this = core::mem::ManuallyDrop::new(self);
        this.close()
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
