//! Condition-variable attributes.

/// Clock a timed wait measures its deadline against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClockSource {
    /// Wall clock; jumps if the system time is changed.
    #[default]
    Realtime,
    /// Never goes backwards. Honored where the backend can bind a clock to
    /// the condition variable; otherwise waits fall back to `Realtime`.
    Monotonic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CondAttr {
    pub process_shared: bool,
    pub clock_source: ClockSource,
}

impl CondAttr {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn clock_source(mut self, clock: ClockSource) -> Self {
        self.clock_source = clock;
        self
    }

    /// Forwarded to the native attribute where supported. The native object
    /// always lives in this process's heap, so the setting cannot make it
    /// usable from another process; it only selects the pshared variant.
    #[must_use]
    pub fn process_shared(mut self, shared: bool) -> Self {
        self.process_shared = shared;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_private_realtime() {
        let attr = CondAttr::new();
        assert!(!attr.process_shared);
        assert_eq!(attr.clock_source, ClockSource::Realtime);
    }

    #[test]
    fn builder_sets_clock() {
        let attr = CondAttr::new()
            .clock_source(ClockSource::Monotonic)
            .process_shared(true);
        assert_eq!(attr.clock_source, ClockSource::Monotonic);
        assert!(attr.process_shared);
    }
}
