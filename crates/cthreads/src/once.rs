//! One-time initialization.

use cthreads_core::Result;

use crate::sys::{RawOnce, imp};

/// Runs a closure exactly once across all threads.
///
/// Threads arriving while the first call is in progress block until it
/// finishes. A panic inside the closure aborts the process.
pub struct Once {
    inner: imp::Once,
}

impl Once {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: imp::Once::new(),
        }
    }

    pub fn call_once<F: FnOnce()>(&self, f: F) -> Result<()> {
        let mut f = Some(f);
        self.inner.call_once(&mut || {
            if let Some(f) = f.take() {
                f();
            }
        })
    }
}

impl Default for Once {
    fn default() -> Self {
        Self::new()
    }
}
