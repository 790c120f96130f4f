//! AppearanceTree - presentation state per component node.
//!
//! Same lifecycle as the [`StateTree`](super::StateTree), separate namespace.
//! Slots come from the component's `appearance(...)` declarations (focus,
//! hover, expanded and other style-driving state) and are injected under
//! `appearance`.

use crate::engine::CnodeRef;
use crate::error::Result;
use crate::injection::{keys, Injection};
use crate::types::StatePath;

use super::cell::{ChangeNotifier, StateSlot};
use super::store::{NodeStore, Seed, SlotStore};

pub struct AppearanceTree {
    store: SlotStore,
}

impl AppearanceTree {
    pub fn new(seed: Seed, notifier: ChangeNotifier) -> Self {
        Self {
            store: SlotStore::new("appearance", seed, notifier),
        }
    }

    pub fn slot(&self, path: &StatePath) -> Result<StateSlot> {
        self.store.slot(path)
    }

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
}

impl NodeStore for AppearanceTree {
    fn initialize(&self, cnode: &CnodeRef) -> Result<()> {
        self.store
            .initialize_with(cnode, cnode.component().appearance_decls())
    }

    fn inject(&self, cnode: &CnodeRef, _parent: Option<&CnodeRef>) -> Result<Injection> {
        let slot = self.store.slot(cnode.state_path())?;
        Ok(Injection::new().with(keys::APPEARANCE, slot))
    }

    fn destroy(&self, path: &StatePath) -> Result<()> {
        self.store.remove(path)
    }
}
