//! Error taxonomy shared by every primitive.
//!
//! Variants that originate in a native call carry the raw platform code
//! (an errno value on POSIX backends, a `GetLastError` value on Win32).
//! Codes are not portable across backends; feed them to the backend's
//! `error_string` to get text.

use thiserror::Error;

/// Result alias used throughout the primitives layer.
pub type Result<T> = core::result::Result<T, ThreadError>;

/// Failure of a primitives-layer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ThreadError {
    /// The backend could not allocate a new execution context.
    #[error("thread creation failed (platform code {0})")]
    CreationFailed(i32),
    /// A mutex, condition variable, rwlock or semaphore could not be constructed.
    #[error("primitive initialization failed (platform code {0})")]
    InitFailed(i32),
    /// Acquiring a mutex or rwlock failed.
    #[error("lock acquisition failed (platform code {0})")]
    LockFailed(i32),
    /// A non-blocking acquire found the primitive unavailable.
    #[error("operation would block")]
    WouldBlock,
    /// Releasing a mutex or rwlock failed.
    #[error("unlock failed (platform code {0})")]
    UnlockFailed(i32),
    /// A condition-variable or semaphore wait failed.
    #[error("wait failed (platform code {0})")]
    WaitFailed(i32),
    /// A timed wait reached its deadline.
    #[error("wait timed out")]
    TimedOut,
    /// Signal, broadcast or post failed.
    #[error("wake-up failed (platform code {0})")]
    SignalFailed(i32),
    /// Waiting for a thread to finish failed.
    #[error("join failed (platform code {0})")]
    JoinFailed(i32),
    /// Releasing the right to join failed.
    #[error("detach failed (platform code {0})")]
    DetachFailed(i32),
    /// The backend rejected a cancellation request.
    #[error("cancel failed (platform code {0})")]
    CancelFailed(i32),
    /// The primitive is still in use, or the backend failed to release it.
    #[error("destroy failed (platform code {0})")]
    DestroyFailed(i32),
}

/// Fieldless discriminant of [`ThreadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CreationFailed,
    InitFailed,
    LockFailed,
    WouldBlock,
    UnlockFailed,
    WaitFailed,
    TimedOut,
    SignalFailed,
    JoinFailed,
    DetachFailed,
    CancelFailed,
    DestroyFailed,
}

impl ErrorKind {
    /// Stable snake_case name, used in structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreationFailed => "creation_failed",
            Self::InitFailed => "init_failed",
            Self::LockFailed => "lock_failed",
            Self::WouldBlock => "would_block",
            Self::UnlockFailed => "unlock_failed",
            Self::WaitFailed => "wait_failed",
            Self::TimedOut => "timed_out",
            Self::SignalFailed => "signal_failed",
            Self::JoinFailed => "join_failed",
            Self::DetachFailed => "detach_failed",
            Self::CancelFailed => "cancel_failed",
            Self::DestroyFailed => "destroy_failed",
        }
    }
}

impl ThreadError {
    /// Returns the variant without its payload.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::CreationFailed(_) => ErrorKind::CreationFailed,
            Self::InitFailed(_) => ErrorKind::InitFailed,
            Self::LockFailed(_) => ErrorKind::LockFailed,
            Self::WouldBlock => ErrorKind::WouldBlock,
            Self::UnlockFailed(_) => ErrorKind::UnlockFailed,
            Self::WaitFailed(_) => ErrorKind::WaitFailed,
            Self::TimedOut => ErrorKind::TimedOut,
            Self::SignalFailed(_) => ErrorKind::SignalFailed,
            Self::JoinFailed(_) => ErrorKind::JoinFailed,
            Self::DetachFailed(_) => ErrorKind::DetachFailed,
            Self::CancelFailed(_) => ErrorKind::CancelFailed,
            Self::DestroyFailed(_) => ErrorKind::DestroyFailed,
        }
    }

    /// The platform code carried by the error, if any.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        match self {
            Self::CreationFailed(code)
            | Self::InitFailed(code)
            | Self::LockFailed(code)
            | Self::UnlockFailed(code)
            | Self::WaitFailed(code)
            | Self::SignalFailed(code)
            | Self::JoinFailed(code)
            | Self::DetachFailed(code)
            | Self::CancelFailed(code)
            | Self::DestroyFailed(code) => Some(code),
            Self::WouldBlock | Self::TimedOut => None,
        }
    }

    /// True for the two "try again later" outcomes of bounded operations.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::WouldBlock | Self::TimedOut)
    }
}

/// Attribute combinations that cannot be expressed on any backend.
///
/// Backends translate these into the matching [`ThreadError`] kind with their
/// own "invalid argument" code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttrError {
    #[error("stack address supplied without an explicit stack size")]
    StackAddressWithoutSize,
    #[error("priority ceiling requires the priority-protect protocol")]
    CeilingWithoutProtect,
    #[error("priority ceiling {0} is negative")]
    NegativeCeiling(i32),
    #[error("initial semaphore count {0} exceeds the maximum")]
    CountAboveMaximum(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strips_payload() {
        assert_eq!(ThreadError::LockFailed(35).kind(), ErrorKind::LockFailed);
        assert_eq!(ThreadError::WouldBlock.kind(), ErrorKind::WouldBlock);
        assert_eq!(ThreadError::TimedOut.kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn code_only_for_backend_failures() {
        assert_eq!(ThreadError::DestroyFailed(16).code(), Some(16));
        assert_eq!(ThreadError::TimedOut.code(), None);
        assert_eq!(ThreadError::WouldBlock.code(), None);
    }

    #[test]
    fn transient_outcomes() {
        assert!(ThreadError::WouldBlock.is_transient());
        assert!(ThreadError::TimedOut.is_transient());
        assert!(!ThreadError::WaitFailed(4).is_transient());
    }

    #[test]
    fn display_mentions_code() {
        let text = ThreadError::InitFailed(22).to_string();
        assert!(text.contains("22"), "{text}");
        assert_eq!(ThreadError::TimedOut.to_string(), "wait timed out");
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(ErrorKind::WouldBlock.as_str(), "would_block");
        assert_eq!(ErrorKind::CreationFailed.as_str(), "creation_failed");
    }
}
