//! State Module - keyed reactive storage behind component nodes.
//!
//! - **StateTree** - behavioral state slots, one per live `StatePath`
//! - **AppearanceTree** - presentation state slots, same contract
//! - **StateCell / StateSlot** - spark-signals backed cells with change reports
//! - **Seed** - initial values that override default factories
//!
//! Both trees implement [`NodeStore`]: `initialize(cnode)`,
//! `inject(cnode, parent)`, `destroy(path)`.

mod appearance;
mod cell;
mod state_tree;
mod store;

pub use appearance::*;
pub use cell::*;
pub use state_tree::*;
pub use store::*;
