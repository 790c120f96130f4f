//! CNode - the persistent runtime instance behind one vnode occurrence.
//!
//! A CNode lives from the render that introduces it until the review that
//! places it in `toDestroy`. Every field is interior-mutable because the
//! scheduler, the renderer and the view all touch the same node during one
//! pass, on one thread.
//!
//! Per-pass scratch data (previous output, diff sets) is NOT stored here; it
//! lives in the controller's transaction side-table.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{Error, Result};
use crate::types::{CnodeId, Component, Props, Refs, StatePath, VNode, ViewHandle, ViewRefs};

bitflags::bitflags! {
    /// Lifecycle flags of a cnode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// Tree root. Rendered without injection.
        const ROOT = 1 << 0;
        /// Registered with the state tree, appearance tree and modules.
        const INITIALIZED = 1 << 1;
        /// Visited by a binding traversal.
        const BOUND = 1 << 2;
        /// Torn down. Never rendered or digested again.
        const DESTROYED = 1 << 3;
    }
}

/// Shared handle to a cnode.
pub type CnodeRef = Rc<CNode>;

pub struct CNode {
    id: CnodeId,
    component: Rc<Component>,
    vnode: RefCell<VNode>,
    state_path: StatePath,
    ret: RefCell<Vec<VNode>>,
    parent: RefCell<Weak<CNode>>,
    children: RefCell<Vec<CnodeRef>>,
    refs: RefCell<Refs>,
    view_refs: RefCell<ViewRefs>,
    flags: Cell<NodeFlags>,
}

impl CNode {
    /// Create a node for a component vnode. Returns `None` for any other vnode.
    pub fn new(vnode: VNode, state_path: StatePath) -> Option<CnodeRef> {
        let component = vnode.as_component()?.clone();
        Some(Rc::new(Self {
            id: CnodeId::next(),
            component,
            vnode: RefCell::new(vnode),
            state_path,
            ret: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            refs: RefCell::new(Refs::new()),
            view_refs: RefCell::new(ViewRefs::new()),
            flags: Cell::new(NodeFlags::empty()),
        }))
    }

    /// Create the tree root at the root state path.
    pub fn root(vnode: VNode) -> Result<CnodeRef> {
        let node = Self::new(vnode, StatePath::root()).ok_or(Error::InvalidRoot)?;
        node.insert_flags(NodeFlags::ROOT);
        Ok(node)
    }

    pub fn id(&self) -> CnodeId {
        self.id
    }

    pub fn component(&self) -> &Rc<Component> {
        &self.component
    }

    pub fn name(&self) -> &str {
        self.component.name()
    }

    pub fn state_path(&self) -> &StatePath {
        &self.state_path
    }

    pub fn depth(&self) -> usize {
        self.state_path.depth()
    }

    // =========================================================================
    // Description
    // =========================================================================

    pub fn vnode(&self) -> VNode {
        self.vnode.borrow().clone()
    }

    pub fn props(&self) -> Props {
        self.vnode.borrow().props.clone()
    }

    /// Vnode children handed down by the parent.
    pub fn passed_children(&self) -> Vec<VNode> {
        self.vnode.borrow().children.clone()
    }

    /// Replace the description when the parent re-renders and keeps this node.
    pub fn set_vnode(&self, vnode: VNode) {
        *self.vnode.borrow_mut() = vnode;
    }

    // =========================================================================
    // Render output
    // =========================================================================

    pub fn ret(&self) -> Vec<VNode> {
        self.ret.borrow().clone()
    }

    pub fn set_ret(&self, ret: Vec<VNode>) {
        *self.ret.borrow_mut() = ret;
    }

    // =========================================================================
    // Tree links
    // =========================================================================

    pub fn parent(&self) -> Option<CnodeRef> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<CnodeRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Replace the child list and point every child back at this node.
    pub fn set_children(self: &Rc<Self>, children: Vec<CnodeRef>) {
        for child in &children {
            *child.parent.borrow_mut() = Rc::downgrade(self);
        }
        *self.children.borrow_mut() = children;
    }

    pub fn append_child(self: &Rc<Self>, child: CnodeRef) {
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
    }

    // =========================================================================
    // View bindings
    // =========================================================================

    pub fn refs(&self) -> Refs {
        self.refs.borrow().clone()
    }

    pub fn view_refs(&self) -> ViewRefs {
        self.view_refs.borrow().clone()
    }

    pub fn bind_ref(&self, name: impl Into<String>, handle: ViewHandle) {
        self.refs.borrow_mut().insert(name.into(), handle);
    }

    pub fn bind_view_ref(&self, handle: ViewHandle) {
        self.view_refs.borrow_mut().push(handle);
    }

    /// Drop all bindings and mark the node as visited by a binding pass.
    pub(crate) fn rebind(&self) {
        self.refs.borrow_mut().clear();
        self.view_refs.borrow_mut().clear();
        self.insert_flags(NodeFlags::BOUND);
    }

    // =========================================================================
    // Flags
    // =========================================================================

    pub fn flags(&self) -> NodeFlags {
        self.flags.get()
    }

    pub fn insert_flags(&self, flags: NodeFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    pub fn remove_flags(&self, flags: NodeFlags) {
        self.flags.set(self.flags.get() - flags);
    }

    pub fn is_root(&self) -> bool {
        self.flags().contains(NodeFlags::ROOT)
    }

    pub fn is_initialized(&self) -> bool {
        self.flags().contains(NodeFlags::INITIALIZED)
    }

    pub fn is_bound(&self) -> bool {
        self.flags().contains(NodeFlags::BOUND)
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags().contains(NodeFlags::DESTROYED)
    }
}

impl fmt::Debug for CNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CNode")
            .field("id", &self.id)
            .field("name", &self.component.name())
            .field("path", &self.state_path.to_string())
            .field("flags", &self.flags.get())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}
