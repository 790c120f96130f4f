//! Per-transaction scratch records, keyed by cnode identity.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::engine::CnodeRef;
use crate::types::{CnodeId, VNode};

/// What one repaint pass learned about a re-rendered node.
#[derive(Debug, Clone, Default)]
pub struct Modified {
    /// Render output before the pass re-rendered the node.
    pub ret: Vec<VNode>,
    /// Children built from scratch during the pass.
    pub to_initialize: Vec<CnodeRef>,
    /// Children kept across the pass.
    pub to_remain: Vec<CnodeRef>,
}

/// Side table of [`Modified`] records. Emptied when a transaction ends.
#[derive(Debug, Default)]
pub struct Scratch {
    records: RefCell<HashMap<CnodeId, Modified>>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ret(&self, cnode: &CnodeRef, ret: Vec<VNode>) {
        self.records.borrow_mut().entry(cnode.id()).or_default().ret = ret;
    }

    pub fn record_sets(&self, cnode: &CnodeRef, to_initialize: Vec<CnodeRef>, to_remain: Vec<CnodeRef>) {
        let mut records = self.records.borrow_mut();
        let record = records.entry(cnode.id()).or_default();
        record.to_initialize = to_initialize;
        record.to_remain = to_remain;
    }

    pub fn get(&self, cnode: &CnodeRef) -> Option<Modified> {
        self.records.borrow().get(&cnode.id()).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}
