//! View contract and the built-in terminal view.
//!
//! The controller never touches a presentation surface itself. It hands the
//! view a [`Traversor`] over the part of the cnode tree that changed:
//!
//! - `initial_digest` once per paint, covering the whole tree
//! - `update_digest` once per queued node after each repaint pass
//!
//! Walking a traversor rebinds the nodes it yields, so the view attaches
//! fresh `refs`/`view_refs` while it digests.

mod terminal;
mod traversor;

pub use terminal::*;
pub use traversor::*;

use crate::error::Result;
use crate::types::ViewRefs;

/// A presentation layer driven by the controller.
pub trait View {
    /// Where the initial digest mounts the tree.
    type Surface;

    fn initial_digest(&mut self, traversor: Traversor, surface: Self::Surface) -> Result<()>;

    /// Apply one re-rendered node. `view_refs` are the node's bindings from
    /// the previous digest.
    fn update_digest(&mut self, traversor: Traversor, view_refs: &ViewRefs) -> Result<()>;

    /// Run `f` as one batch of mutations. Default: run it directly.
    fn batch<F: FnOnce(&mut Self)>(&mut self, f: F)
    where
        Self: Sized,
    {
        f(self)
    }
}
