//! Injection - the argument object handed to render functions.
//!
//! The state tree and the module system each produce an `Injection`; the
//! renderer merges them shallowly, later sources winning on key collision.
//! Keys are expected not to collide, so a collision is logged, not resolved.
//!
//! Values are type-erased; readers downcast with [`Injection::get`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::state::StateSlot;
use crate::types::{Prop, Props, Refs, VNode, ViewRefs};

/// Well-known injection keys.
pub mod keys {
    /// Props of the vnode that produced the node (`Props`).
    pub const PROPS: &str = "props";
    /// Children vnodes passed by the parent (`Vec<VNode>`).
    pub const CHILDREN: &str = "children";
    /// Behavioral state slot (`StateSlot`).
    pub const STATE: &str = "state";
    /// Presentation state slot (`StateSlot`).
    pub const APPEARANCE: &str = "appearance";
    /// Named view handles (`Refs`). Only on re-render.
    pub const REFS: &str = "refs";
    /// Root view handles (`ViewRefs`). Only on re-render.
    pub const VIEW_REFS: &str = "view_refs";
}

/// Shallow map of named, type-erased render arguments.
#[derive(Clone, Default)]
pub struct Injection {
    entries: BTreeMap<String, Rc<dyn Any>>,
}

impl Injection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `key`, replacing any previous value.
    pub fn insert<T: 'static>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Rc::new(value));
    }

    pub fn with<T: 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Typed lookup. `None` when missing or of another type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys present in both injections.
    pub fn conflicts(&self, other: &Injection) -> Vec<String> {
        other
            .entries
            .keys()
            .filter(|key| self.entries.contains_key(*key))
            .cloned()
            .collect()
    }

    /// Shallow merge; `other` wins on collision.
    pub fn merge(mut self, other: Injection) -> Self {
        self.entries.extend(other.entries);
        self
    }

    // =========================================================================
    // Well-known accessors
    // =========================================================================

    pub fn props(&self) -> Option<&Props> {
        self.get::<Props>(keys::PROPS)
    }

    /// Shortcut for a single prop.
    pub fn prop(&self, name: &str) -> Option<&Prop> {
        self.props().and_then(|props| props.get(name))
    }

    pub fn children(&self) -> &[VNode] {
        self.get::<Vec<VNode>>(keys::CHILDREN)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn state(&self) -> Option<&StateSlot> {
        self.get::<StateSlot>(keys::STATE)
    }

    pub fn appearance(&self) -> Option<&StateSlot> {
        self.get::<StateSlot>(keys::APPEARANCE)
    }

    pub fn refs(&self) -> Option<&Refs> {
        self.get::<Refs>(keys::REFS)
    }

    pub fn view_refs(&self) -> Option<&ViewRefs> {
        self.get::<ViewRefs>(keys::VIEW_REFS)
    }
}

impl fmt::Debug for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
