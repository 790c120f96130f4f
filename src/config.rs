//! Controller and scheduler configuration.
//!
//! Plain structs with `Default` plus chained `with_*` setters. There is no
//! file format; hosts build these in code.

/// What happens when `repaint` is called while a transaction is running
/// (from a render function, a module hook, or a view callback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReentrancyPolicy {
    /// Fail the nested call with `Error::Reentrant`.
    Reject,
    /// Record the nodes and repaint them after the running pass commits.
    #[default]
    Defer,
}

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Policy for nested `repaint` calls.
    pub reentrancy: ReentrancyPolicy,
    /// Upper bound on follow-up passes run by `flush`.
    pub max_flush_passes: usize,
    /// Install the built-in `AppearanceModule` in front of user modules.
    pub inject_appearance: bool,
    /// Log a warning when state and module injections share a key.
    pub warn_on_injection_conflict: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reentrancy: ReentrancyPolicy::Defer,
            max_flush_passes: 16,
            inject_appearance: true,
            warn_on_injection_conflict: true,
        }
    }
}

impl ControllerConfig {
    pub fn with_reentrancy(mut self, policy: ReentrancyPolicy) -> Self {
        self.reentrancy = policy;
        self
    }

    pub fn with_max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes;
        self
    }

    pub fn with_appearance_injection(mut self, enabled: bool) -> Self {
        self.inject_appearance = enabled;
        self
    }

    pub fn with_conflict_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_injection_conflict = enabled;
        self
    }
}

/// Reference scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Re-render retained children whose incoming props changed.
    ///
    /// With this off, a retained child keeps its old output until something
    /// marks it changed directly.
    pub refresh_changed_props: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_changed_props: true,
        }
    }
}

impl SchedulerConfig {
    pub fn with_refresh_changed_props(mut self, enabled: bool) -> Self {
        self.refresh_changed_props = enabled;
        self
    }
}
