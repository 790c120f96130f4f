//! Traversor - the walk a view follows while digesting.

use std::collections::VecDeque;

use crate::controller::Modified;
use crate::engine::{walk_preorder, CTree, CnodeRef};
use crate::types::{VNode, ViewHandle};

/// What changed for a re-rendered node.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    pub previous: Vec<VNode>,
    pub next: Vec<VNode>,
    /// Children built during the pass.
    pub initialized: Vec<CnodeRef>,
    /// Children kept during the pass.
    pub remained: Vec<CnodeRef>,
}

/// One visited node. `depth` is relative to the first node of the walk.
#[derive(Debug, Clone)]
pub struct Traversal {
    pub cnode: CnodeRef,
    pub depth: usize,
    pub patch: Option<Patch>,
}

impl Traversal {
    /// Attach a root presentation handle to the visited node.
    pub fn bind_view_ref(&self, handle: ViewHandle) {
        self.cnode.bind_view_ref(handle);
    }

    /// Attach a named element handle to the visited node.
    pub fn bind_ref(&self, name: impl Into<String>, handle: ViewHandle) {
        self.cnode.bind_ref(name, handle);
    }
}

/// Iterator over [`Traversal`]s. Each node is rebound when yielded.
#[derive(Debug)]
pub struct Traversor {
    pending: VecDeque<Traversal>,
}

impl Traversor {
    /// Every node of `tree`, parents first.
    pub fn initial(tree: &CTree) -> Self {
        let mut pending = VecDeque::new();
        walk_preorder(tree.root(), &mut |cnode, depth| {
            pending.push_back(Traversal {
                cnode: cnode.clone(),
                depth,
                patch: None,
            });
        });
        Self { pending }
    }

    /// `cnode` with its patch, then each subtree built under it this pass.
    pub fn patch(cnode: &CnodeRef, modified: Modified) -> Self {
        let mut pending = VecDeque::new();
        let patch = Patch {
            previous: modified.ret,
            next: cnode.ret(),
            initialized: modified.to_initialize,
            remained: modified.to_remain,
        };
        let initialized = patch.initialized.clone();
        pending.push_back(Traversal {
            cnode: cnode.clone(),
            depth: 0,
            patch: Some(patch),
        });
        for child in &initialized {
            walk_preorder(child, &mut |node, depth| {
                pending.push_back(Traversal {
                    cnode: node.clone(),
                    depth: depth + 1,
                    patch: None,
                });
            });
        }
        Self { pending }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Iterator for Traversor {
    type Item = Traversal;

    fn next(&mut self) -> Option<Traversal> {
        let item = self.pending.pop_front()?;
        item.cnode.rebind();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}
