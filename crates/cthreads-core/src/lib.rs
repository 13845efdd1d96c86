//! # cthreads-core
//!
//! Backend-independent pieces of the cthreads primitives layer.
//!
//! Everything here is plain safe Rust: attribute records and their
//! sanitizers, the error taxonomy shared by every primitive, the
//! relative-to-absolute deadline arithmetic used by timed waits, error
//! message normalization, and the read-write lock mode bookkeeping needed by
//! backends whose unlock call does not know how the lock was acquired.
//! The native calls themselves live in the `cthreads` crate.

#![deny(unsafe_code)]

pub mod cond;
pub mod error;
pub mod mutex;
pub mod rwlock;
pub mod sem;
pub mod strerror;
pub mod thread;
pub mod time;

pub use cond::{ClockSource, CondAttr};
pub use error::{AttrError, ErrorKind, Result, ThreadError};
pub use mutex::{Expected, MutexAttr, MutexKind, MutexOp, MutexState, PriorityProtocol};
pub use rwlock::{ModeTracker, RwLockMode};
pub use sem::{SEM_VALUE_MAX, validate_initial_count};
pub use thread::{CANCELED, ContentionScope, DetachState, SchedPolicy, ThreadAttr};
pub use time::{Timespec, deadline_after};
