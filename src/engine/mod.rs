//! Engine - the live component-node tree.
//!
//! - CNode: persistent runtime instance per component occurrence
//! - CTree: the tree rooted at the painted root
//! - Walkers: preorder for digests, children-first for teardown
//!
//! # Architecture
//!
//! ```text
//! VNode (immutable)  ──scheduler──▶  CNode (persistent, Rc)
//!                                      ├─ ret: last render output
//!                                      ├─ state_path ──▶ StateTree / AppearanceTree slot
//!                                      └─ refs / view_refs ◀── view traversal
//! ```

mod cnode;
mod tree;

pub use cnode::*;
pub use tree::*;
