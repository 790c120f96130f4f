//! Built-in module that injects the appearance slot.
//!
//! The controller registers and releases appearance slots itself; this
//! module only exposes the slot to render functions under `appearance`.

use std::rc::Rc;

use crate::engine::CnodeRef;
use crate::error::Result;
use crate::injection::Injection;
use crate::state::{AppearanceTree, NodeStore};

use super::Module;

pub struct AppearanceModule {
    tree: Rc<AppearanceTree>,
}

impl AppearanceModule {
    pub fn new(tree: Rc<AppearanceTree>) -> Self {
        Self { tree }
    }
}

impl Module for AppearanceModule {
    fn name(&self) -> &str {
        "appearance"
    }

    fn inject(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<Injection> {
        self.tree.inject(cnode, parent)
    }
}
