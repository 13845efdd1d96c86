//! Thread lifecycle: create, join, detach, identify, exit, cancel.

use core::fmt;

use cthreads_core::{Result, ThreadAttr, ThreadError};

use crate::sys::{RawThread, imp};

pub use cthreads_core::CANCELED;

/// Identity of a running or finished thread.
///
/// Handles compare equal exactly when they denote the same thread. A handle
/// does not keep the thread's resources alive; the right to join lives in
/// [`Thread`].
#[derive(Clone, PartialEq, Eq)]
pub struct ThreadHandle(imp::Handle);

impl ThreadHandle {
    /// Numeric identifier for diagnostics. Not stable across backends or runs.
    #[must_use]
    pub fn id(&self) -> u64 {
        imp::Thread::id(&self.0)
    }
}

impl fmt::Debug for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ThreadHandle").field(&self.id()).finish()
    }
}

/// A started thread together with the right to join it.
///
/// Dropping a joinable `Thread` detaches it.
pub struct Thread {
    native: Option<imp::Thread>,
    handle: ThreadHandle,
}

impl Thread {
    #[must_use]
    pub fn handle(&self) -> &ThreadHandle {
        &self.handle
    }

    /// False for threads created with [`cthreads_core::DetachState::Detached`].
    #[must_use]
    pub fn is_joinable(&self) -> bool {
        self.native.is_some()
    }

    /// Blocks until the thread finishes and returns its exit value:
    /// what the entry returned, what it passed to [`exit`], or [`CANCELED`].
    ///
    /// Joining a thread created detached fails with `JoinFailed`.
    pub fn join(mut self) -> Result<usize> {
        match self.native.take() {
            Some(native) => native.join(),
            None => Err(ThreadError::JoinFailed(imp::EINVAL)),
        }
    }

    /// Gives up the right to join; resources are reclaimed when the thread ends.
    pub fn detach(mut self) -> Result<()> {
        match self.native.take() {
            Some(native) => native.detach(),
            None => Err(ThreadError::DetachFailed(imp::EINVAL)),
        }
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        if let Some(native) = self.native.take() {
            let _ = native.detach();
        }
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("handle", &self.handle)
            .field("joinable", &self.is_joinable())
            .finish()
    }
}

/// Starts `entry(arg)` on a new thread.
///
/// `attr` of `None` means a joinable thread with backend defaults. Options
/// the backend cannot express are ignored.
pub fn create<A>(attr: Option<&ThreadAttr>, entry: fn(A) -> usize, arg: A) -> Result<Thread>
where
    A: Send + 'static,
{
    spawn(attr, move || entry(arg))
}

/// Closure form of [`create`].
///
/// A panic escaping `f` aborts the process.
pub fn spawn<F>(attr: Option<&ThreadAttr>, f: F) -> Result<Thread>
where
    F: FnOnce() -> usize + Send + 'static,
{
    let defaults = ThreadAttr::default();
    let attr = attr.unwrap_or(&defaults);
    let (native, handle) = imp::Thread::spawn(attr, Box::new(f))?;
    Ok(Thread {
        native,
        handle: ThreadHandle(handle),
    })
}

/// Handle of the calling thread.
#[must_use]
pub fn current() -> ThreadHandle {
    ThreadHandle(imp::Thread::current())
}

#[must_use]
pub fn equal(a: &ThreadHandle, b: &ThreadHandle) -> bool {
    a == b
}

/// Ends the calling thread; `value` becomes the result of `join`.
///
/// Frames between here and the thread entry are unwound on POSIX backends
/// and abandoned on Win32, where destructors of live locals do not run.
pub fn exit(value: usize) -> ! {
    imp::Thread::exit(value)
}

/// Requests termination of `handle`.
///
/// POSIX backends act at the target's next cancellation point (blocking
/// waits included). The Win32 backend only sets a flag that the target polls
/// with [`testcancel`], and rejects threads not started by this crate.
/// The handle must name a thread that has not been joined.
pub fn cancel(handle: &ThreadHandle) -> Result<()> {
    imp::Thread::cancel(&handle.0)
}

/// Cancellation point: exits with [`CANCELED`] if a cancel is pending.
pub fn testcancel() {
    imp::Thread::testcancel();
}
