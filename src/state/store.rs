//! Slot store - the keyed storage shared by the state and appearance trees.
//!
//! Both trees follow the same contract ([`NodeStore`]) and differ only in
//! which slot declarations they read from a component and which key they
//! inject under. [`SlotStore`] holds the common bookkeeping:
//! - `StatePath` → slot + weak owner
//! - tombstones for paths destroyed in the current pass (double-destroy
//!   detection), released when the pass ends
//! - seed values that override default factories

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::engine::{CNode, CnodeRef};
use crate::error::{Error, Result};
use crate::injection::Injection;
use crate::types::{SlotDecl, StatePath};

use super::cell::{CellContext, ChangeNotifier, StateSlot};

// =============================================================================
// Contract
// =============================================================================

/// The lifecycle contract shared by the state and appearance trees.
pub trait NodeStore {
    /// Create the slot for `cnode`. Fails if its path is already registered.
    fn initialize(&self, cnode: &CnodeRef) -> Result<()>;

    /// Render arguments for `cnode`. Fails if its path is not registered.
    fn inject(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<Injection>;

    /// Drop the slot at `path`.
    fn destroy(&self, path: &StatePath) -> Result<()>;
}

// =============================================================================
// Seed
// =============================================================================

/// Initial slot values keyed by path and slot name.
#[derive(Default)]
pub struct Seed {
    values: HashMap<StatePath, HashMap<String, Box<dyn Any>>>,
}

impl Seed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: 'static>(&mut self, path: StatePath, name: impl Into<String>, value: T) {
        self.values
            .entry(path)
            .or_default()
            .insert(name.into(), Box::new(value));
    }

    pub fn with<T: 'static>(mut self, path: StatePath, name: impl Into<String>, value: T) -> Self {
        self.insert(path, name, value);
        self
    }

    pub fn get(&self, path: &StatePath, name: &str) -> Option<&(dyn Any + 'static)> {
        self.values
            .get(path)
            .and_then(|names| names.get(name))
            .map(|value| value.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// SlotStore
// =============================================================================

struct SlotEntry {
    slot: StateSlot,
    owner: Weak<CNode>,
}

/// Shared storage behind [`StateTree`](super::StateTree) and
/// [`AppearanceTree`](super::AppearanceTree).
pub struct SlotStore {
    namespace: &'static str,
    seed: Seed,
    notifier: ChangeNotifier,
    slots: RefCell<HashMap<StatePath, SlotEntry>>,
    destroyed: RefCell<HashSet<StatePath>>,
}

impl SlotStore {
    pub fn new(namespace: &'static str, seed: Seed, notifier: ChangeNotifier) -> Self {
        Self {
            namespace,
            seed,
            notifier,
            slots: RefCell::new(HashMap::new()),
            destroyed: RefCell::new(HashSet::new()),
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Create a slot for `cnode` from `decls`.
    pub fn initialize_with(&self, cnode: &CnodeRef, decls: &[SlotDecl]) -> Result<()> {
        let path = cnode.state_path().clone();
        if self.slots.borrow().contains_key(&path) {
            return Err(Error::AlreadyInitialized { path });
        }

        let props = cnode.props();
        let cx = CellContext::new(path.clone(), self.notifier.clone());
        let cells: BTreeMap<String, Rc<dyn Any>> = decls
            .iter()
            .map(|decl| {
                let seed = self.seed.get(&path, decl.name());
                (decl.name().to_string(), decl.create(&props, seed, &cx))
            })
            .collect();

        tracing::trace!(namespace = self.namespace, path = %path, cells = cells.len(), "slot initialized");

        self.destroyed.borrow_mut().remove(&path);
        self.slots.borrow_mut().insert(
            path.clone(),
            SlotEntry {
                slot: StateSlot::new(path, cells),
                owner: Rc::downgrade(cnode),
            },
        );
        Ok(())
    }

    /// The slot at `path`.
    pub fn slot(&self, path: &StatePath) -> Result<StateSlot> {
        self.slots
            .borrow()
            .get(path)
            .map(|entry| entry.slot.clone())
            .ok_or_else(|| Error::StateNotInitialized { path: path.clone() })
    }

    /// The live node that owns `path`, if any.
    pub fn owner(&self, path: &StatePath) -> Option<CnodeRef> {
        self.slots
            .borrow()
            .get(path)
            .and_then(|entry| entry.owner.upgrade())
    }

    pub fn remove(&self, path: &StatePath) -> Result<()> {
        let removed = self.slots.borrow_mut().remove(path);
        if removed.is_none() {
            return if self.destroyed.borrow().contains(path) {
                Err(Error::AlreadyDestroyed { path: path.clone() })
            } else {
                Err(Error::StateNotInitialized { path: path.clone() })
            };
        }
        tracing::trace!(namespace = self.namespace, path = %path, "slot destroyed");
        self.destroyed.borrow_mut().insert(path.clone());
        Ok(())
    }

    pub fn contains(&self, path: &StatePath) -> bool {
        self.slots.borrow().contains_key(path)
    }

    /// Paths destroyed since the tombstones were last released.
    pub fn tombstones(&self) -> usize {
        self.destroyed.borrow().len()
    }

    /// Forget destroyed paths. Called at the end of every pass; a later
    /// destroy of the same path reports `StateNotInitialized`.
    pub fn release_tombstones(&self) {
        self.destroyed.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> Vec<StatePath> {
        let mut paths: Vec<StatePath> = self.slots.borrow().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, VNode};

    fn store() -> SlotStore {
        SlotStore::new("test", Seed::new(), Rc::new(|_: &StatePath| {}))
    }

    fn node(path: &str) -> CnodeRef {
        let c = Component::new("N", |_| Ok(())).state("n", |_| 1i32).build();
        CNode::new(VNode::component(&c), StatePath::root().child(path)).unwrap()
    }

    #[test]
    fn test_initialize_and_lookup() {
        let store = store();
        let cnode = node("a");
        store.initialize_with(&cnode, cnode.component().state_decls()).unwrap();

        assert!(store.contains(cnode.state_path()));
        assert_eq!(store.slot(cnode.state_path()).unwrap().get::<i32>("n"), Some(1));
        assert_eq!(store.owner(cnode.state_path()).map(|n| n.id()), Some(cnode.id()));
    }

    #[test]
    fn test_double_initialize_fails() {
        let store = store();
        let cnode = node("a");
        store.initialize_with(&cnode, &[]).unwrap();
        assert!(matches!(
            store.initialize_with(&cnode, &[]),
            Err(Error::AlreadyInitialized { .. })
        ));
    }

    #[test]
    fn test_destroy_then_double_destroy() {
        let store = store();
        let cnode = node("a");
        store.initialize_with(&cnode, &[]).unwrap();

        store.remove(cnode.state_path()).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.remove(cnode.state_path()),
            Err(Error::AlreadyDestroyed { .. })
        ));
        assert!(matches!(
            store.remove(&StatePath::root().child("never")),
            Err(Error::StateNotInitialized { .. })
        ));
    }

    #[test]
    fn test_tombstones_released_between_passes() {
        let store = store();
        for i in 0..1_000 {
            let cnode = node(&format!("Row#{i}"));
            store.initialize_with(&cnode, &[]).unwrap();
            store.remove(cnode.state_path()).unwrap();
            if i % 10 == 9 {
                store.release_tombstones();
            }
            assert!(store.tombstones() <= 10);
        }
        assert_eq!(store.tombstones(), 0);

        let cnode = node("Row#0");
        assert!(matches!(
            store.remove(cnode.state_path()),
            Err(Error::StateNotInitialized { .. })
        ));
    }

    #[test]
    fn test_reinitialize_after_destroy() {
        let store = store();
        let cnode = node("a");
        store.initialize_with(&cnode, &[]).unwrap();
        store.remove(cnode.state_path()).unwrap();
        store.initialize_with(&cnode, &[]).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_seed_overrides_default() {
        let cnode = node("a");
        let seed = Seed::new().with(cnode.state_path().clone(), "n", 42i32);
        let store = SlotStore::new("test", seed, Rc::new(|_: &StatePath| {}));
        store.initialize_with(&cnode, cnode.component().state_decls()).unwrap();
        assert_eq!(store.slot(cnode.state_path()).unwrap().get::<i32>("n"), Some(42));
    }

    #[test]
    fn test_seed_with_wrong_type_is_ignored() {
        let cnode = node("a");
        let seed = Seed::new().with(cnode.state_path().clone(), "n", "nope");
        let store = SlotStore::new("test", seed, Rc::new(|_: &StatePath| {}));
        store.initialize_with(&cnode, cnode.component().state_decls()).unwrap();
        assert_eq!(store.slot(cnode.state_path()).unwrap().get::<i32>("n"), Some(1));
    }
}
