//! Scheduler contract and the reference tree scheduler.
//!
//! A scheduler owns tree construction. The controller hands it a
//! [`RenderHooks`] implementation for the duration of one pass; the
//! scheduler calls back into it for every render, review and intercept.
//!
//! ```text
//! Controller::repaint(changed)
//!     └─ Scheduler::repaint(changed, hooks)
//!          ├─ hooks.update_render(node)       per changed node
//!          ├─ hooks.review(node, diff)        per re-rendered node
//!          ├─ hooks.intercept(diff)           picks nodes to build
//!          └─ hooks.initial_render(child, ..) per picked node and its subtree
//! ```

mod tree_scheduler;

pub use tree_scheduler::*;

use crate::engine::{CTree, CnodeRef};
use crate::error::Result;
use crate::types::{DiffSets, VNode};

/// Callbacks a scheduler drives during `paint` and `repaint`.
///
/// Render hooks return the normalized output; storing it as the node's
/// `ret` is the scheduler's job.
pub trait RenderHooks {
    fn root_render(&self, cnode: &CnodeRef) -> Result<Vec<VNode>>;
    fn initial_render(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<Vec<VNode>>;
    fn update_render(&self, cnode: &CnodeRef) -> Result<Vec<VNode>>;
    fn review(&self, cnode: &CnodeRef, diff: &DiffSets) -> Result<()>;
    fn intercept(&self, diff: &DiffSets) -> Vec<CnodeRef>;
}

/// Builds and updates the cnode tree.
pub trait Scheduler {
    /// Build the whole tree for `vnode`.
    fn paint(&mut self, vnode: VNode, hooks: &dyn RenderHooks) -> Result<CTree>;

    /// Re-render `changed` and reconcile their children.
    fn repaint(&mut self, changed: &[CnodeRef], hooks: &dyn RenderHooks) -> Result<()>;
}
