//! Intercepter - picks which part of a child diff gets built.

use crate::engine::CnodeRef;
use crate::types::DiffSets;

/// Precise update strategy: only newly introduced nodes are built.
///
/// Retained nodes are never rebuilt here. A retained node that needs a new
/// render must reach the scheduler's work list by other means (see
/// `SchedulerConfig::refresh_changed_props`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Intercepter;

impl Intercepter {
    pub fn intercept(&self, diff: &DiffSets) -> Vec<CnodeRef> {
        diff.to_initialize.clone()
    }
}
