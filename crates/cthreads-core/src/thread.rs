//! Thread attributes.
//!
//! One record carries every knob either backend understands. A backend reads
//! the fields it can honor and ignores the rest; nothing is rejected merely
//! for being unsupported, so caller code stays portable.

use core::ptr::NonNull;

use crate::error::AttrError;

/// Default thread stack size used when `stack_size == 0`: 2 MiB.
pub const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Smallest stack size forwarded to a backend; smaller requests are raised.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Granularity explicit stack sizes are rounded up to.
pub const STACK_ALIGN: usize = 4096;

/// Exit value reported by `join` for a thread that was cancelled.
pub const CANCELED: usize = usize::MAX;

/// Whether the creator keeps the right to join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DetachState {
    #[default]
    Joinable,
    /// Resources are reclaimed on completion; `join` must not be called.
    Detached,
}

/// Scheduling policy requested when `inherit_scheduling` is false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SchedPolicy {
    #[default]
    Other,
    Fifo,
    RoundRobin,
}

/// Contention scope for the new thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentionScope {
    #[default]
    System,
    Process,
}

/// Configuration read once by thread creation and not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadAttr {
    /// Requested stack size in bytes; 0 selects the backend default.
    pub stack_size: usize,
    pub detach_state: DetachState,
    /// Guard region size; `None` keeps the backend default.
    pub guard_size: Option<usize>,
    /// Inherit the creator's scheduling instead of using the fields below.
    pub inherit_scheduling: bool,
    pub scheduling_policy: SchedPolicy,
    /// Static priority used with an explicit policy.
    pub scheduling_priority: i32,
    pub contention_scope: ContentionScope,
    stack_address: Option<NonNull<u8>>,
}

impl Default for ThreadAttr {
    fn default() -> Self {
        Self {
            stack_size: 0,
            detach_state: DetachState::Joinable,
            guard_size: None,
            inherit_scheduling: true,
            scheduling_policy: SchedPolicy::Other,
            scheduling_priority: 0,
            contention_scope: ContentionScope::System,
            stack_address: None,
        }
    }
}

impl ThreadAttr {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes;
        self
    }

    #[must_use]
    pub fn detached(mut self) -> Self {
        self.detach_state = DetachState::Detached;
        self
    }

    #[must_use]
    pub fn guard_size(mut self, bytes: usize) -> Self {
        self.guard_size = Some(bytes);
        self
    }

    /// Requests a fixed policy and priority instead of inheriting the
    /// creator's. A hint only: if the platform or the caller's privileges
    /// refuse it, the thread starts with inherited scheduling.
    #[must_use]
    pub fn explicit_scheduling(mut self, policy: SchedPolicy, priority: i32) -> Self {
        self.inherit_scheduling = false;
        self.scheduling_policy = policy;
        self.scheduling_priority = priority;
        self
    }

    #[must_use]
    pub fn contention_scope(mut self, scope: ContentionScope) -> Self {
        self.contention_scope = scope;
        self
    }

    /// Runs the thread on caller-provided stack memory of `size` bytes.
    ///
    /// # Safety
    ///
    /// `base..base + size` must be writable memory that outlives the thread
    /// and is not used for anything else while it runs.
    #[allow(unsafe_code)]
    pub unsafe fn set_stack(&mut self, base: NonNull<u8>, size: usize) {
        self.stack_address = Some(base);
        self.stack_size = size;
    }

    /// Caller-provided stack base, if any.
    #[must_use]
    pub fn stack_address(&self) -> Option<NonNull<u8>> {
        self.stack_address
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detach_state == DetachState::Detached
    }

    /// Rejects combinations no backend can express.
    pub fn validate(&self) -> Result<(), AttrError> {
        if self.stack_address.is_some() && self.stack_size == 0 {
            return Err(AttrError::StackAddressWithoutSize);
        }
        Ok(())
    }

    /// Stack size to hand to the backend, or `None` for its default.
    ///
    /// Caller-provided stacks are passed through untouched; requested sizes
    /// are raised to [`MIN_STACK_SIZE`] and rounded up to [`STACK_ALIGN`].
    #[must_use]
    pub fn effective_stack_size(&self) -> Option<usize> {
        if self.stack_size == 0 {
            return None;
        }
        if self.stack_address.is_some() {
            return Some(self.stack_size);
        }
        Some(sanitize_stack_size(self.stack_size))
    }
}

/// Raise to the minimum and round up to the page granularity, saturating.
#[must_use]
pub const fn sanitize_stack_size(bytes: usize) -> usize {
    let raised = if bytes < MIN_STACK_SIZE {
        MIN_STACK_SIZE
    } else {
        bytes
    };
    match raised.checked_add(STACK_ALIGN - 1) {
        Some(padded) => padded & !(STACK_ALIGN - 1),
        None => usize::MAX & !(STACK_ALIGN - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_joinable_with_inherited_scheduling() {
        let attr = ThreadAttr::default();
        assert!(!attr.is_detached());
        assert!(attr.inherit_scheduling);
        assert_eq!(attr.effective_stack_size(), None);
        assert_eq!(attr.validate(), Ok(()));
    }

    #[test]
    fn builder_sets_fields() {
        let attr = ThreadAttr::new()
            .stack_size(256 * 1024)
            .detached()
            .guard_size(8192)
            .explicit_scheduling(SchedPolicy::RoundRobin, 5)
            .contention_scope(ContentionScope::Process);
        assert!(attr.is_detached());
        assert_eq!(attr.guard_size, Some(8192));
        assert!(!attr.inherit_scheduling);
        assert_eq!(attr.scheduling_policy, SchedPolicy::RoundRobin);
        assert_eq!(attr.scheduling_priority, 5);
        assert_eq!(attr.contention_scope, ContentionScope::Process);
        assert_eq!(attr.effective_stack_size(), Some(256 * 1024));
    }

    #[test]
    fn tiny_stacks_are_raised_and_rounded() {
        assert_eq!(sanitize_stack_size(1), MIN_STACK_SIZE);
        assert_eq!(sanitize_stack_size(MIN_STACK_SIZE + 1), MIN_STACK_SIZE + STACK_ALIGN);
        assert_eq!(sanitize_stack_size(DEFAULT_STACK_SIZE), DEFAULT_STACK_SIZE);
        assert_eq!(sanitize_stack_size(usize::MAX) % STACK_ALIGN, 0);
    }

    #[test]
    #[allow(unsafe_code)]
    fn stack_address_requires_size() {
        let mut backing = [0u8; 64];
        let mut attr = ThreadAttr::default();
        let base = NonNull::new(backing.as_mut_ptr()).unwrap();
        // SAFETY: the attribute is only validated, never used to spawn.
        unsafe { attr.set_stack(base, 0) };
        assert_eq!(attr.validate(), Err(AttrError::StackAddressWithoutSize));

        // SAFETY: as above.
        unsafe { attr.set_stack(base, backing.len()) };
        assert_eq!(attr.validate(), Ok(()));
        assert_eq!(attr.effective_stack_size(), Some(64));
        assert_eq!(attr.stack_address(), Some(base));
    }
}
