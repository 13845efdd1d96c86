//! Mutex attributes and the observable lock contract.
//!
//! Backends honor `kind` where native mutex kinds exist and drop the rest of
//! the knobs they cannot express. The contract table below describes what a
//! caller may observe from each operation in each abstract state; the
//! conformance harness checks the compiled backend against it.

use crate::error::{AttrError, ErrorKind};

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Re-locking behavior for the owning thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MutexKind {
    /// Re-locking by the owner is undefined.
    #[default]
    Normal,
    /// The owner may re-lock; each lock needs a matching unlock.
    Recursive,
    /// Re-locking or foreign unlock reports an error where the backend checks.
    ErrorCheck,
}

/// Priority protocol requested for the mutex owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PriorityProtocol {
    #[default]
    None,
    Inherit,
    Protect,
}

/// Mutex configuration, read once by `init`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MutexAttr {
    pub process_shared: bool,
    pub kind: MutexKind,
    /// Best-effort: an owner dying while holding the lock does not wedge it.
    pub robust: bool,
    pub priority_protocol: PriorityProtocol,
    /// Only meaningful with [`PriorityProtocol::Protect`].
    pub priority_ceiling: Option<i32>,
}

impl MutexAttr {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(mut self, kind: MutexKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn recursive() -> Self {
        Self::default().kind(MutexKind::Recursive)
    }

    /// Forwarded to the native attribute where supported. The native object
    /// always lives in this process's heap, so the setting cannot make it
    /// usable from another process; it only selects the pshared variant.
    #[must_use]
    pub fn process_shared(mut self, shared: bool) -> Self {
        self.process_shared = shared;
        self
    }

    #[must_use]
    pub fn robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    #[must_use]
    pub fn priority_protect(mut self, ceiling: i32) -> Self {
        self.priority_protocol = PriorityProtocol::Protect;
        self.priority_ceiling = Some(ceiling);
        self
    }

    #[must_use]
    pub fn priority_inherit(mut self) -> Self {
        self.priority_protocol = PriorityProtocol::Inherit;
        self.priority_ceiling = None;
        self
    }

    /// Rejects combinations that are malformed on every backend.
    pub fn validate(&self) -> Result<(), AttrError> {
        match (self.priority_protocol, self.priority_ceiling) {
            (PriorityProtocol::Protect, Some(ceiling)) if ceiling < 0 => {
                Err(AttrError::NegativeCeiling(ceiling))
            }
            (PriorityProtocol::None | PriorityProtocol::Inherit, Some(_)) => {
                Err(AttrError::CeilingWithoutProtect)
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Abstract mutex state as seen by the calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutexState {
    Unlocked,
    LockedBySelf,
    LockedByOther,
}

/// Operations covered by the contract table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutexOp {
    Lock,
    TryLock,
    Unlock,
    Destroy,
}

/// What the caller can rely on after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    /// Succeeds and moves to the given state.
    Ok(MutexState),
    /// Fails with this kind; state unchanged.
    Fails(ErrorKind),
    /// Blocks until another thread makes progress.
    Blocks,
    /// Caller contract violation; nothing is promised.
    Undefined,
}

/// Observable result of `op` applied in `state` to a mutex of `kind`.
#[must_use]
pub const fn expected_outcome(kind: MutexKind, state: MutexState, op: MutexOp) -> Expected {
    use MutexState::{LockedByOther, LockedBySelf, Unlocked};

    match (state, op) {
        (Unlocked, MutexOp::Lock | MutexOp::TryLock) => Expected::Ok(LockedBySelf),
        (Unlocked, MutexOp::Destroy) => Expected::Ok(Unlocked),
        (Unlocked, MutexOp::Unlock) => Expected::Undefined,

        (LockedByOther, MutexOp::Lock) => Expected::Blocks,
        (LockedByOther, MutexOp::TryLock) => Expected::Fails(ErrorKind::WouldBlock),
        (LockedByOther, MutexOp::Unlock | MutexOp::Destroy) => Expected::Undefined,

        (LockedBySelf, MutexOp::Unlock) => Expected::Ok(Unlocked),
        (LockedBySelf, MutexOp::Destroy) => Expected::Undefined,
        (LockedBySelf, MutexOp::Lock) => match kind {
            MutexKind::Recursive => Expected::Ok(LockedBySelf),
            MutexKind::Normal | MutexKind::ErrorCheck => Expected::Undefined,
        },
        (LockedBySelf, MutexOp::TryLock) => match kind {
            MutexKind::Recursive => Expected::Ok(LockedBySelf),
            MutexKind::Normal | MutexKind::ErrorCheck => Expected::Undefined,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_attr_is_plain_normal_mutex() {
        let attr = MutexAttr::default();
        assert_eq!(attr.kind, MutexKind::Normal);
        assert!(!attr.process_shared);
        assert!(!attr.robust);
        assert_eq!(attr.priority_protocol, PriorityProtocol::None);
        assert_eq!(attr.validate(), Ok(()));
    }

    #[test]
    fn ceiling_requires_protect() {
        let mut attr = MutexAttr::new().priority_inherit();
        attr.priority_ceiling = Some(3);
        assert_eq!(attr.validate(), Err(AttrError::CeilingWithoutProtect));

        assert_eq!(MutexAttr::new().priority_protect(3).validate(), Ok(()));
        assert_eq!(
            MutexAttr::new().priority_protect(-1).validate(),
            Err(AttrError::NegativeCeiling(-1))
        );
    }

    #[test]
    fn inherit_clears_ceiling() {
        let attr = MutexAttr::new().priority_protect(9).priority_inherit();
        assert_eq!(attr.priority_ceiling, None);
        assert_eq!(attr.validate(), Ok(()));
    }

    #[test]
    fn contended_trylock_would_block() {
        for kind in [MutexKind::Normal, MutexKind::Recursive, MutexKind::ErrorCheck] {
            assert_eq!(
                expected_outcome(kind, MutexState::LockedByOther, MutexOp::TryLock),
                Expected::Fails(ErrorKind::WouldBlock)
            );
            assert_eq!(
                expected_outcome(kind, MutexState::LockedByOther, MutexOp::Lock),
                Expected::Blocks
            );
        }
    }

    #[test]
    fn only_recursive_relock_is_defined() {
        assert_eq!(
            expected_outcome(MutexKind::Recursive, MutexState::LockedBySelf, MutexOp::Lock),
            Expected::Ok(MutexState::LockedBySelf)
        );
        assert_eq!(
            expected_outcome(MutexKind::Normal, MutexState::LockedBySelf, MutexOp::Lock),
            Expected::Undefined
        );
    }

    #[test]
    fn destroying_held_mutex_is_undefined() {
        assert_eq!(
            expected_outcome(MutexKind::Normal, MutexState::LockedBySelf, MutexOp::Destroy),
            Expected::Undefined
        );
        assert_eq!(
            expected_outcome(MutexKind::Normal, MutexState::Unlocked, MutexOp::Destroy),
            Expected::Ok(MutexState::Unlocked)
        );
    }
}
