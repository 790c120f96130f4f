//! Pending digest queue.

use std::cell::RefCell;

use crate::engine::CnodeRef;

/// Nodes re-rendered during the running pass, in render order.
#[derive(Debug, Default)]
pub struct DigestQueue {
    nodes: RefCell<Vec<CnodeRef>>,
}

impl DigestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, cnode: CnodeRef) {
        self.nodes.borrow_mut().push(cnode);
    }

    /// Take every queued node, leaving the queue empty.
    pub fn drain(&self) -> Vec<CnodeRef> {
        std::mem::take(&mut *self.nodes.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.nodes.borrow_mut().clear();
    }
}
