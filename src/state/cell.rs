//! StateCell - a reactive value owned by one state slot.
//!
//! Each cell wraps a spark-signals `Signal<T>`, so effects and deriveds that
//! read it are tracked as usual. Writing through the cell additionally
//! reports the owning `StatePath` to the tree's notifier; the controller
//! turns those reports into repaint passes.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::types::StatePath;

/// Callback receiving the path of every slot written through a cell.
pub type ChangeNotifier = Rc<dyn Fn(&StatePath)>;

/// Owner information handed to a cell at creation.
#[derive(Clone)]
pub struct CellContext {
    path: StatePath,
    notifier: ChangeNotifier,
}

impl CellContext {
    pub(crate) fn new(path: StatePath, notifier: ChangeNotifier) -> Self {
        Self { path, notifier }
    }

    pub fn path(&self) -> &StatePath {
        &self.path
    }
}

// =============================================================================
// StateCell
// =============================================================================

/// Reactive cell bound to a state path.
///
/// Every `set` reports the path, even when the value is unchanged.
#[derive(Clone)]
pub struct StateCell<T> {
    value: Signal<T>,
    cx: CellContext,
}

impl<T: Clone + PartialEq + 'static> StateCell<T> {
    pub(crate) fn new(value: T, cx: CellContext) -> Self {
        Self {
            value: signal(value),
            cx,
        }
    }

    /// Current value. Tracked when read inside an effect or derived.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Write a new value and report the owning path.
    pub fn set(&self, value: T) {
        self.value.set(value);
        (self.cx.notifier)(&self.cx.path);
    }

    /// Compute the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.value.get());
        self.set(next);
    }

    /// The underlying signal, for wiring into effects.
    pub fn signal(&self) -> &Signal<T> {
        &self.value
    }

    pub fn path(&self) -> &StatePath {
        &self.cx.path
    }
}

// =============================================================================
// StateSlot
// =============================================================================

/// The named cells belonging to one state path.
#[derive(Clone)]
pub struct StateSlot {
    path: StatePath,
    cells: Rc<BTreeMap<String, Rc<dyn Any>>>,
}

impl StateSlot {
    pub(crate) fn new(path: StatePath, cells: BTreeMap<String, Rc<dyn Any>>) -> Self {
        Self {
            path,
            cells: Rc::new(cells),
        }
    }

    pub fn path(&self) -> &StatePath {
        &self.path
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Typed cell lookup. `None` when missing or declared with another type.
    pub fn cell<T: Clone + PartialEq + 'static>(&self, name: &str) -> Option<StateCell<T>> {
        self.cells
            .get(name)
            .and_then(|cell| cell.downcast_ref::<StateCell<T>>())
            .cloned()
    }

    pub fn get<T: Clone + PartialEq + 'static>(&self, name: &str) -> Option<T> {
        self.cell::<T>(name).map(|cell| cell.get())
    }

    /// Write through the named cell. Returns false when there is no such cell.
    pub fn set<T: Clone + PartialEq + 'static>(&self, name: &str, value: T) -> bool {
        match self.cell::<T>(name) {
            Some(cell) => {
                cell.set(value);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for StateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSlot")
            .field("path", &self.path.to_string())
            .field("cells", &self.cells.keys().collect::<Vec<_>>())
            .finish()
    }
}
