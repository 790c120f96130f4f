//! StateTree - behavioral state per component node.
//!
//! One slot per live `StatePath`, built from the component's `state(...)`
//! declarations. Injects the node's props, passed children and its slot.

use crate::engine::CnodeRef;
use crate::error::Result;
use crate::injection::{keys, Injection};
use crate::types::StatePath;

use super::cell::{ChangeNotifier, StateSlot};
use super::store::{NodeStore, Seed, SlotStore};

pub struct StateTree {
    store: SlotStore,
}

impl StateTree {
    pub fn new(seed: Seed, notifier: ChangeNotifier) -> Self {
        Self {
            store: SlotStore::new("state", seed, notifier),
        }
    }

    pub fn slot(&self, path: &StatePath) -> Result<StateSlot> {
        self.store.slot(path)
    }

    /// The live node owning `path`.
    pub fn owner(&self, path: &StatePath) -> Option<CnodeRef> {
        self.store.owner(path)
    }

    pub fn contains(&self, path: &StatePath) -> bool {
        self.store.contains(path)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Paths destroyed during the current pass.
    pub fn tombstones(&self) -> usize {
        self.store.tombstones()
    }

    pub(crate) fn end_pass(&self) {
        self.store.release_tombstones();
    }

    pub fn paths(&self) -> Vec<StatePath> {
        self.store.paths()
    }
}

impl NodeStore for StateTree {
    fn initialize(&self, cnode: &CnodeRef) -> Result<()> {
        self.store
            .initialize_with(cnode, cnode.component().state_decls())
    }

    fn inject(&self, cnode: &CnodeRef, _parent: Option<&CnodeRef>) -> Result<Injection> {
        let slot = self.store.slot(cnode.state_path())?;
        Ok(Injection::new()
            .with(keys::PROPS, cnode.props())
            .with(keys::CHILDREN, cnode.passed_children())
            .with(keys::STATE, slot))
    }

    fn destroy(&self, path: &StatePath) -> Result<()> {
        self.store.remove(path)
    }
}
