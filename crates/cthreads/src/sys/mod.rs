//! Backend seam.
//!
//! Each primitive is a capability trait with exactly one implementation
//! compiled per target: `unix` over pthreads, `windows` over Win32. The public
//! types call through the traits, so a missing method on either backend is a
//! compile error rather than a runtime surprise.

use core::cell::UnsafeCell;
use core::fmt;
use core::ptr::NonNull;

use cthreads_core::{CondAttr, MutexAttr, Result, ThreadAttr};

#[cfg(unix)]
pub(crate) mod unix;
#[cfg(unix)]
pub(crate) use unix as imp;

#[cfg(windows)]
pub(crate) mod windows;
#[cfg(windows)]
pub(crate) use windows as imp;

/// Thread body after the caller's entry and argument are bound together.
pub(crate) type Entry = Box<dyn FnOnce() -> usize + Send + 'static>;

pub(crate) trait RawThread: Sized {
    type Handle: Clone + Eq + fmt::Debug + Send + Sync;

    /// Starts `entry`. Detached threads come back without a joinable owner.
    fn spawn(attr: &ThreadAttr, entry: Entry) -> Result<(Option<Self>, Self::Handle)>;
    fn join(self) -> Result<usize>;
    fn detach(self) -> Result<()>;
    fn current() -> Self::Handle;
    fn id(handle: &Self::Handle) -> u64;
    fn exit(value: usize) -> !;
    fn cancel(handle: &Self::Handle) -> Result<()>;
    fn testcancel();
}

pub(crate) trait RawMutex: Sized + Send + Sync {
    fn init(attr: &MutexAttr) -> Result<Self>;
    fn lock(&self) -> Result<()>;
    fn try_lock(&self) -> Result<()>;
    /// # Safety
    /// The calling thread must hold the lock.
    unsafe fn unlock(&self) -> Result<()>;
    fn destroy(self) -> Result<()>;
}

pub(crate) trait RawCondvar: Sized + Send + Sync {
    type Mutex: RawMutex;

    fn init(attr: &CondAttr) -> Result<Self>;
    /// # Safety
    /// The calling thread must hold `mutex`.
    unsafe fn wait(&self, mutex: &Self::Mutex) -> Result<()>;
    /// # Safety
    /// The calling thread must hold `mutex`.
    unsafe fn timed_wait(&self, mutex: &Self::Mutex, timeout_ms: u64) -> Result<()>;
    fn signal(&self) -> Result<()>;
    fn broadcast(&self) -> Result<()>;
    fn destroy(self) -> Result<()>;
}

pub(crate) trait RawRwLock: Sized + Send + Sync {
    fn init() -> Result<Self>;
    fn read_lock(&self) -> Result<()>;
    fn write_lock(&self) -> Result<()>;
    fn try_read_lock(&self) -> Result<()>;
    fn try_write_lock(&self) -> Result<()>;
    /// # Safety
    /// The calling thread must hold the lock in some mode.
    unsafe fn unlock(&self) -> Result<()>;
    fn destroy(self) -> Result<()>;
}

#[cfg(any(windows, all(unix, not(target_vendor = "apple"))))]
pub(crate) trait RawSemaphore: Sized + Send + Sync {
    fn init(initial: u32) -> Result<Self>;
    fn wait(&self) -> Result<()>;
    fn try_wait(&self) -> Result<()>;
    fn timed_wait(&self, timeout_ms: u64) -> Result<()>;
    fn post(&self) -> Result<()>;
    /// Current count, where the backend can report it.
    fn value(&self) -> Option<u32>;
    fn destroy(self) -> Result<()>;
}

pub(crate) trait RawOnce: Sync {
    /// Runs `f` unless this or another thread already completed a call.
    fn call_once(&self, f: &mut dyn FnMut()) -> Result<()>;
}

pub(crate) trait RawErrors {
    fn last_error_code() -> i32;
    /// Raw message text for `code`, trailing decoration included.
    fn raw_message(code: i32) -> Option<String>;
}

/// Heap slot for a native object that must not move once initialized.
///
/// Not freed on drop: the owning primitive frees it only after the native
/// destroy call succeeds, and leaks it otherwise.
pub(crate) struct Pinned<T>(NonNull<UnsafeCell<T>>);

impl<T> Pinned<T> {
    pub(crate) fn new(value: T) -> Self {
        let boxed = Box::new(UnsafeCell::new(value));
        Self(NonNull::from(Box::leak(boxed)))
    }

    pub(crate) fn get(&self) -> *mut T {
        // SAFETY: the slot stays allocated for as long as `self` exists.
        unsafe { self.0.as_ref().get() }
    }

    /// # Safety
    /// No native call may still reference the slot.
    pub(crate) unsafe fn free(self) {
        // SAFETY: the pointer came from `Box::leak` in `new`, and `self` is consumed.
        drop(unsafe { Box::from_raw(self.0.as_ptr()) });
    }
}
