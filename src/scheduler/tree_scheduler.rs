//! TreeScheduler - depth-first construction and keyed child reconciliation.
//!
//! Children of a cnode are the component vnodes found in its `ret`, searched
//! depth-first through elements and fragments. Each child is identified by a
//! segment appended to its parent's state path:
//!
//! - `Name#key` when the vnode carries a key
//! - `Name@i` otherwise, `i` being its position among the component vnodes
//!
//! On repaint, old and new children are matched by segment (and component
//! identity). Matches remain, new segments initialize, the rest is destroyed.
//! Duplicate segments are warned about; only the first occurrence is kept.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, warn};

use super::{RenderHooks, Scheduler};
use crate::config::SchedulerConfig;
use crate::engine::{CNode, CTree, CnodeRef};
use crate::error::{Error, Result};
use crate::types::{CnodeId, DiffSets, NodeType, VNode};

#[derive(Debug, Clone, Default)]
pub struct TreeScheduler {
    config: SchedulerConfig,
}

impl TreeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Render `child` for the first time and build everything below it.
    fn build(&self, child: &CnodeRef, parent: &CnodeRef, hooks: &dyn RenderHooks) -> Result<()> {
        let ret = hooks.initial_render(child, Some(parent))?;
        child.set_ret(ret);
        self.build_children(child, hooks)
    }

    fn build_children(&self, node: &CnodeRef, hooks: &dyn RenderHooks) -> Result<()> {
        let mut children = Vec::new();
        for (segment, vnode) in child_slots(node) {
            children.push(spawn(node, segment, vnode)?);
        }
        node.set_children(children.clone());
        for child in &children {
            self.build(child, node, hooks)?;
        }
        Ok(())
    }

    /// Diff `node`'s children against its fresh `ret`, review, then build
    /// what the intercept picks. Returns retained children that need a
    /// render of their own.
    fn reconcile(&self, node: &CnodeRef, hooks: &dyn RenderHooks) -> Result<Vec<CnodeRef>> {
        let old = node.children();
        let mut children = Vec::new();
        let mut to_initialize = Vec::new();
        let mut to_remain = Vec::new();
        let mut refresh = Vec::new();

        for (segment, vnode) in child_slots(node) {
            let existing = old.iter().find(|child| {
                last_segment(child) == Some(segment.as_str())
                    && vnode
                        .as_component()
                        .is_some_and(|c| Rc::ptr_eq(c, child.component()))
            });

            match existing {
                Some(child) => {
                    if child.vnode() != vnode {
                        child.set_vnode(vnode);
                        if self.config.refresh_changed_props {
                            refresh.push(child.clone());
                        }
                    }
                    to_remain.push(child.clone());
                    children.push(child.clone());
                }
                None => {
                    let child = spawn(node, segment, vnode)?;
                    to_initialize.push(child.clone());
                    children.push(child);
                }
            }
        }

        let to_destroy: Vec<CnodeRef> = old
            .iter()
            .filter(|child| !children.iter().any(|kept| Rc::ptr_eq(kept, child)))
            .cloned()
            .collect();

        let diff = DiffSets::new(to_initialize, to_destroy, to_remain);
        debug_assert!(diff.is_partition());
        hooks.review(node, &diff)?;
        node.set_children(children);

        for child in hooks.intercept(&diff) {
            self.build(&child, node, hooks)?;
        }
        Ok(refresh)
    }
}

impl Scheduler for TreeScheduler {
    fn paint(&mut self, vnode: VNode, hooks: &dyn RenderHooks) -> Result<CTree> {
        let root = CNode::root(vnode)?;
        let ret = hooks.root_render(&root)?;
        root.set_ret(ret);
        self.build_children(&root, hooks)?;
        Ok(CTree::new(root))
    }

    fn repaint(&mut self, changed: &[CnodeRef], hooks: &dyn RenderHooks) -> Result<()> {
        let mut work: Vec<CnodeRef> = changed.to_vec();
        work.sort_by_key(|node| node.depth());

        let mut rendered: HashSet<CnodeId> = HashSet::new();
        let mut next = 0;
        while next < work.len() {
            let node = work[next].clone();
            next += 1;
            if node.is_destroyed() || !rendered.insert(node.id()) {
                continue;
            }

            let ret = hooks.update_render(&node)?;
            node.set_ret(ret);
            for child in self.reconcile(&node, hooks)? {
                // Keep the pending tail in depth order so a parent always
                // renders before any changed descendant.
                let depth = child.depth();
                let at = next + work[next..].partition_point(|queued| queued.depth() <= depth);
                work.insert(at, child);
            }
        }

        debug!(changed = changed.len(), rendered = rendered.len(), "scheduler repaint");
        Ok(())
    }
}

// =============================================================================
// Child discovery
// =============================================================================

/// Component vnodes in `node`'s output paired with their path segment.
fn child_slots(node: &CnodeRef) -> Vec<(String, VNode)> {
    let mut found = Vec::new();
    collect_components(&node.ret(), &mut found);

    let mut seen = HashSet::new();
    let mut slots = Vec::new();
    for (index, vnode) in found.into_iter().enumerate() {
        let segment = segment_for(&vnode, index);
        if !seen.insert(segment.clone()) {
            warn!(parent = %node.state_path(), %segment, "duplicate child segment, keeping the first");
            continue;
        }
        slots.push((segment, vnode));
    }
    slots
}

fn collect_components(nodes: &[VNode], found: &mut Vec<VNode>) {
    for vnode in nodes {
        match &vnode.node_type {
            NodeType::Component(_) => found.push(vnode.clone()),
            NodeType::Element(_) | NodeType::Fragment => collect_components(&vnode.children, found),
            NodeType::Text(_) => {}
        }
    }
}

fn segment_for(vnode: &VNode, index: usize) -> String {
    let name = escape_name(vnode.as_component().map(|c| c.name()).unwrap_or_default());
    match &vnode.key {
        Some(key) => format!("{name}#{key}"),
        None => format!("{name}@{index}"),
    }
}

/// Escape the segment delimiters in a component name, so the first bare
/// `#` or `@` in a segment always separates the name from its key or index.
fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '\\' | '#' | '@') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn last_segment(node: &CnodeRef) -> Option<&str> {
    node.state_path().segments().last().map(String::as_str)
}

fn spawn(parent: &CnodeRef, segment: String, vnode: VNode) -> Result<CnodeRef> {
    let path = parent.state_path().child(segment);
    CNode::new(vnode, path).ok_or_else(|| Error::Scheduler("child vnode is not a component".into()))
}
