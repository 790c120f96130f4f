//! Renderer - the render callbacks the scheduler drives.
//!
//! | Hook | Used for |
//! |------|----------|
//! | `root_render` | the tree root, rendered without injection |
//! | `initial_render` | a node seen for the first time |
//! | `update_render` | a live node being re-rendered |
//! | `review` | applying a child diff (teardown + scratch) |

use tracing::{trace, warn};

use super::intercepter::Intercepter;
use super::Core;
use crate::engine::{try_walk_cnodes, CnodeRef, NodeFlags};
use crate::error::{Error, Result};
use crate::injection::{keys, Injection};
use crate::scheduler::RenderHooks;
use crate::state::NodeStore;
use crate::types::{DiffSets, Rendered, VNode};

/// Render surface of a controller. Cheap to create; borrows the controller.
#[derive(Clone, Copy)]
pub struct Renderer<'a> {
    core: &'a Core,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(core: &'a Core) -> Self {
        Self { core }
    }

    /// Render the root node with an empty injection.
    pub fn root_render(&self, cnode: &CnodeRef) -> Result<Vec<VNode>> {
        trace!(id = ?cnode.id(), name = cnode.name(), "root render");
        let render = cnode.component().render_fn();
        render(&Injection::new())
            .map(Rendered::into_vec)
            .map_err(|err| Error::render(cnode.name(), err))
    }

    /// Register a new node with both trees and the modules, then render it.
    pub fn initial_render(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<Vec<VNode>> {
        trace!(path = %cnode.state_path(), name = cnode.name(), "initial render");
        self.core.state.initialize(cnode)?;
        self.core.appearance.initialize(cnode)?;
        self.core.modules.initialize(cnode, parent)?;
        cnode.insert_flags(NodeFlags::INITIALIZED);

        let args = self.inject(cnode, parent)?;
        self.render(cnode, &args)
    }

    /// Re-render a live node.
    ///
    /// The node's current `ret` is recorded as the pass's previous output and
    /// the node is queued for a digest before its render function runs.
    pub fn update_render(&self, cnode: &CnodeRef) -> Result<Vec<VNode>> {
        trace!(path = %cnode.state_path(), name = cnode.name(), "update render");
        if cnode.is_root() {
            self.core.scratch.record_ret(cnode, cnode.ret());
            self.core.queue.push(cnode.clone());
            return self.root_render(cnode);
        }

        self.core.modules.update(cnode)?;
        let parent = cnode.parent();
        let args = self
            .inject(cnode, parent.as_ref())?
            .with(keys::REFS, cnode.refs())
            .with(keys::VIEW_REFS, cnode.view_refs());

        self.core.scratch.record_ret(cnode, cnode.ret());
        self.core.queue.push(cnode.clone());
        self.render(cnode, &args)
    }

    /// Tear down `diff.to_destroy` and record the other two sets for `cnode`.
    pub fn review(&self, cnode: &CnodeRef, diff: &DiffSets) -> Result<()> {
        let doomed: Vec<CnodeRef> = diff
            .to_destroy
            .iter()
            .filter(|node| node.id() != cnode.id())
            .cloned()
            .collect();
        self.destroy_subtrees(&doomed)?;
        self.core
            .scratch
            .record_sets(cnode, diff.to_initialize.clone(), diff.to_remain.clone());
        Ok(())
    }

    /// Destroy every node under `roots`, children before parents.
    ///
    /// Each initialized node releases its state slot, then its appearance
    /// slot, then its module registrations. Nodes already destroyed are
    /// skipped.
    pub(crate) fn destroy_subtrees(&self, roots: &[CnodeRef]) -> Result<()> {
        try_walk_cnodes(roots, &mut |node: &CnodeRef| -> Result<()> {
            if node.is_destroyed() {
                return Ok(());
            }
            if node.is_initialized() {
                let path = node.state_path();
                self.core.state.destroy(path)?;
                self.core.appearance.destroy(path)?;
                self.core.modules.destroy(node)?;
            }
            node.insert_flags(NodeFlags::DESTROYED);
            trace!(path = %node.state_path(), name = node.name(), "destroyed");
            Ok(())
        })
    }

    fn inject(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<Injection> {
        let state = self.core.state.inject(cnode, parent)?;
        let modules = self.core.modules.inject(cnode, parent)?;
        if self.core.config.warn_on_injection_conflict {
            let conflicts = state.conflicts(&modules);
            if !conflicts.is_empty() {
                warn!(path = %cnode.state_path(), ?conflicts, "module injection overrides state keys");
            }
        }
        Ok(state.merge(modules))
    }

    fn render(&self, cnode: &CnodeRef, args: &Injection) -> Result<Vec<VNode>> {
        let render = cnode.component().render_fn().clone();
        let name = cnode.name().to_string();
        let call = move |args: &Injection| render(args).map_err(|err| Error::render(name.clone(), err));
        self.core
            .modules
            .hijack(cnode, args, &call)
            .map(Rendered::into_vec)
    }
}

impl RenderHooks for Renderer<'_> {
    fn root_render(&self, cnode: &CnodeRef) -> Result<Vec<VNode>> {
        Renderer::root_render(self, cnode)
    }

    fn initial_render(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<Vec<VNode>> {
        Renderer::initial_render(self, cnode, parent)
    }

    fn update_render(&self, cnode: &CnodeRef) -> Result<Vec<VNode>> {
        Renderer::update_render(self, cnode)
    }

    fn review(&self, cnode: &CnodeRef, diff: &DiffSets) -> Result<()> {
        Renderer::review(self, cnode, diff)
    }

    fn intercept(&self, diff: &DiffSets) -> Vec<CnodeRef> {
        Intercepter.intercept(diff)
    }
}
