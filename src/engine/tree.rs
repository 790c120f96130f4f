//! CTree - the live cnode tree and its walkers.

use crate::engine::CnodeRef;
use crate::types::{CnodeId, StatePath};

/// The live tree, identified by its root.
#[derive(Debug, Clone)]
pub struct CTree {
    root: CnodeRef,
}

impl CTree {
    pub fn new(root: CnodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &CnodeRef {
        &self.root
    }

    /// All nodes, parents before children.
    pub fn preorder(&self) -> Vec<CnodeRef> {
        let mut nodes = Vec::new();
        walk_preorder(&self.root, &mut |node, _| nodes.push(node.clone()));
        nodes
    }

    pub fn len(&self) -> usize {
        self.preorder().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn find(&self, path: &StatePath) -> Option<CnodeRef> {
        self.preorder()
            .into_iter()
            .find(|node| node.state_path() == path)
    }

    pub fn find_by_id(&self, id: CnodeId) -> Option<CnodeRef> {
        self.preorder().into_iter().find(|node| node.id() == id)
    }
}

/// Visit `node` and its descendants, parents first. `depth` is relative to `node`.
pub fn walk_preorder(node: &CnodeRef, visit: &mut impl FnMut(&CnodeRef, usize)) {
    fn go(node: &CnodeRef, depth: usize, visit: &mut impl FnMut(&CnodeRef, usize)) {
        visit(node, depth);
        for child in node.children() {
            go(&child, depth + 1, visit);
        }
    }
    go(node, 0, visit);
}

/// Visit every node in `roots` together with its descendants, children
/// before their parent.
///
/// This is the teardown order: a descendant finishes before its ancestor.
/// A node reachable twice (listed itself and under a listed ancestor) is
/// visited twice; callers guard with `NodeFlags::DESTROYED`.
pub fn walk_cnodes(roots: &[CnodeRef], visit: &mut impl FnMut(&CnodeRef)) {
    fn go(node: &CnodeRef, visit: &mut impl FnMut(&CnodeRef)) {
        for child in node.children() {
            go(&child, visit);
        }
        visit(node);
    }
    for root in roots {
        go(root, visit);
    }
}

/// Fallible variant of [`walk_cnodes`]; stops at the first error.
pub fn try_walk_cnodes<E>(
    roots: &[CnodeRef],
    visit: &mut impl FnMut(&CnodeRef) -> Result<(), E>,
) -> Result<(), E> {
    fn go<E>(node: &CnodeRef, visit: &mut impl FnMut(&CnodeRef) -> Result<(), E>) -> Result<(), E> {
        for child in node.children() {
            go(&child, visit)?;
        }
        visit(node)
    }
    for root in roots {
        go(root, visit)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CNode;
    use crate::types::{Component, VNode};

    /// root -> [a -> [a1], b]
    fn sample() -> (CTree, CnodeRef, CnodeRef, CnodeRef) {
        let c = Component::new("N", |_| Ok(())).build();
        let root = CNode::root(VNode::component(&c)).unwrap();
        let a = CNode::new(VNode::component(&c), StatePath::root().child("a")).unwrap();
        let a1 = CNode::new(VNode::component(&c), StatePath::root().child("a").child("a1")).unwrap();
        let b = CNode::new(VNode::component(&c), StatePath::root().child("b")).unwrap();
        a.set_children(vec![a1.clone()]);
        root.set_children(vec![a.clone(), b.clone()]);
        (CTree::new(root), a, a1, b)
    }

    #[test]
    fn test_preorder() {
        let (tree, a, a1, b) = sample();
        let ids: Vec<CnodeId> = tree.preorder().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec![tree.root().id(), a.id(), a1.id(), b.id()]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_walk_cnodes_children_first() {
        let (tree, a, a1, b) = sample();
        let mut order = Vec::new();
        walk_cnodes(&[tree.root().clone()], &mut |n| order.push(n.id()));
        assert_eq!(order, vec![a1.id(), a.id(), b.id(), tree.root().id()]);
    }

    #[test]
    fn test_try_walk_stops_on_error() {
        let (tree, _a, a1, _b) = sample();
        let mut seen = Vec::new();
        let result: Result<(), &str> = try_walk_cnodes(&[tree.root().clone()], &mut |n| {
            seen.push(n.id());
            Err("stop")
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(seen, vec![a1.id()]);
    }

    #[test]
    fn test_find() {
        let (tree, a, a1, _b) = sample();
        assert_eq!(tree.find(a1.state_path()).map(|n| n.id()), Some(a1.id()));
        assert_eq!(tree.find_by_id(a.id()).map(|n| n.id()), Some(a.id()));
        assert!(tree.find(&StatePath::root().child("zzz")).is_none());
    }
}
