//! Transaction guard around `paint` and `repaint`.
//!
//! `begin` moves the controller out of `Idle`, `commit` returns it. A guard
//! dropped without `commit` (an error propagated with `?`) rolls back the
//! pass-scoped bookkeeping: the scratch table, the digest queue and the
//! state trees' tombstones. Slots already created or released in the state
//! trees stay as they are.

use super::{Core, Phase};
use crate::error::{Error, Result};

#[must_use = "a transaction rolls back when dropped without commit"]
pub(crate) struct Transaction<'a> {
    core: &'a Core,
    phase: Phase,
    committed: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(core: &'a Core, phase: Phase) -> Result<Self> {
        let active = core.phase.get();
        if active != Phase::Idle {
            return Err(Error::Reentrant {
                active,
                requested: phase,
            });
        }
        core.phase.set(phase);
        tracing::debug!(?phase, "transaction begin");
        Ok(Self {
            core,
            phase,
            committed: false,
        })
    }

    pub(crate) fn commit(mut self) {
        self.committed = true;
        self.finish();
        tracing::debug!(phase = ?self.phase, "transaction commit");
    }

    fn finish(&self) {
        self.core.scratch.clear();
        self.core.queue.clear();
        self.core.state.end_pass();
        self.core.appearance.end_pass();
        self.core.phase.set(Phase::Idle);
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        tracing::warn!(
            phase = ?self.phase,
            queued = self.core.queue.len(),
            "transaction rolled back"
        );
        self.finish();
    }
}
