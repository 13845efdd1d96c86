//! Win32 threads.
//!
//! Win32 has no exit value wider than a `DWORD` and no cancellation, so
//! every thread started here shares a small [`Packet`] with its handles: the
//! full exit value lands there, and `cancel` raises a flag that the target
//! observes at its next `testcancel`.

use core::cell::RefCell;
use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cthreads_core::{CANCELED, Result, ThreadAttr, ThreadError};
use parking_lot::Mutex;

use super::{EINVAL, ffi, last_error};
use crate::sys::{Entry, RawThread};

#[derive(Debug, Default)]
struct Packet {
    value: Mutex<Option<usize>>,
    cancel_requested: AtomicBool,
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<Packet>>> = const { RefCell::new(None) };
}

/// Thread identity. Threads not started by this crate carry no packet and
/// cannot be cancelled.
#[derive(Clone, Debug)]
pub(crate) struct Handle {
    id: ffi::DWORD,
    packet: Option<Arc<Packet>>,
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Handle {}

pub(crate) struct Thread {
    raw: ffi::HANDLE,
    packet: Arc<Packet>,
}

// SAFETY: thread handles may be waited on and closed from any thread.
unsafe impl Send for Thread {}

struct Start {
    entry: Entry,
    packet: Arc<Packet>,
}

/// A panic cannot cross this `extern "system"` boundary; it aborts instead.
unsafe extern "system" fn thread_start(param: *mut c_void) -> ffi::DWORD {
    // SAFETY: `param` is the `Box<Start>` leaked by `spawn`, handed over once.
    let Start { entry, packet } = *unsafe { Box::from_raw(param.cast::<Start>()) };
    CURRENT.with(|current| *current.borrow_mut() = Some(Arc::clone(&packet)));
    let value = entry();
    *packet.value.lock() = Some(value);
    value as ffi::DWORD
}

fn current_packet() -> Option<Arc<Packet>> {
    CURRENT.with(|current| current.borrow().clone())
}

impl RawThread for Thread {
    type Handle = Handle;

    fn spawn(attr: &ThreadAttr, entry: Entry) -> Result<(Option<Self>, Handle)> {
        attr.validate().map_err(|_| ThreadError::CreationFailed(EINVAL))?;
        let packet = Arc::new(Packet::default());
        let start = Box::into_raw(Box::new(Start {
            entry,
            packet: Arc::clone(&packet),
        }));

        // Caller-provided stack memory cannot be used; only its size is kept.
        let stack_size = attr.effective_stack_size().unwrap_or(0);
        let flags = if stack_size == 0 {
            0
        } else {
            ffi::STACK_SIZE_PARAM_IS_A_RESERVATION
        };
        let mut id: ffi::DWORD = 0;
        // SAFETY: `start` ownership moves to the new thread on success.
        let raw = unsafe {
            ffi::CreateThread(ptr::null_mut(), stack_size, thread_start, start.cast(), flags, &mut id)
        };
        if raw.is_null() {
            let code = last_error();
            // SAFETY: the thread was not created, so `start` is still ours.
            drop(unsafe { Box::from_raw(start) });
            return Err(ThreadError::CreationFailed(code));
        }

        let handle = Handle {
            id,
            packet: Some(Arc::clone(&packet)),
        };
        if attr.is_detached() {
            // SAFETY: `raw` is open and not used again.
            unsafe { ffi::CloseHandle(raw) };
            return Ok((None, handle));
        }
        Ok((Some(Self { raw, packet }), handle))
    }

    fn join(self) -> Result<usize> {
        // SAFETY: `raw` is an open thread handle.
        if unsafe { ffi::WaitForSingleObject(self.raw, ffi::INFINITE) } != ffi::WAIT_OBJECT_0 {
            return Err(ThreadError::JoinFailed(last_error()));
        }
        let stored = self.packet.value.lock().take();
        let value = match stored {
            Some(value) => value,
            None => {
                let mut code: ffi::DWORD = 0;
                // SAFETY: `raw` is open; the thread has finished.
                unsafe { ffi::GetExitCodeThread(self.raw, &mut code) };
                code as usize
            }
        };
        // SAFETY: `raw` is open and not used again.
        unsafe { ffi::CloseHandle(self.raw) };
        Ok(value)
    }

    fn detach(self) -> Result<()> {
        // SAFETY: `raw` is open and not used again.
        if unsafe { ffi::CloseHandle(self.raw) } == 0 {
            return Err(ThreadError::DetachFailed(last_error()));
        }
        Ok(())
    }

    fn current() -> Handle {
        Handle {
            // SAFETY: always callable.
            id: unsafe { ffi::GetCurrentThreadId() },
            packet: current_packet(),
        }
    }

    fn id(handle: &Handle) -> u64 {
        u64::from(handle.id)
    }

    fn exit(value: usize) -> ! {
        if let Some(packet) = current_packet() {
            *packet.value.lock() = Some(value);
        }
        // SAFETY: terminates only the calling thread.
        unsafe { ffi::ExitThread(value as ffi::DWORD) }
    }

    fn cancel(handle: &Handle) -> Result<()> {
        match &handle.packet {
            Some(packet) => {
                packet.cancel_requested.store(true, Ordering::Release);
                Ok(())
            }
            None => Err(ThreadError::CancelFailed(ffi::ERROR_NOT_SUPPORTED)),
        }
    }

    fn testcancel() {
        let requested = current_packet()
            .is_some_and(|packet| packet.cancel_requested.load(Ordering::Acquire));
        if requested {
            Self::exit(CANCELED);
        }
    }
}
