//! # spark-reconciler
//!
//! Reactive component reconciliation core.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for reactive state cells.
//!
//! ## Architecture
//!
//! A declarative vnode tree is turned into a persistent cnode tree. Each cnode
//! owns a state slot and an appearance slot keyed by its `StatePath`. State
//! writes mark paths dirty; the controller turns them into repaint passes and
//! hands the changed nodes to a view.
//!
//! ```text
//! StateCell::set → dirty paths → Controller::flush
//!   → Scheduler::repaint → Renderer (update_render, review, intercept)
//!   → DigestQueue → View::update_digest
//! ```
//!
//! ## Modules
//!
//! - [`types`] - VNode, Component, StatePath, DiffSets, view handles
//! - [`injection`] - the merged render-argument object
//! - [`engine`] - CNode, CTree, tree walkers
//! - [`state`] - StateTree / AppearanceTree and their reactive cells
//! - [`module`] - cross-cutting extensions (inject, hijack, lifecycle hooks)
//! - [`controller`] - paint/repaint transactions, renderer, intercepter, observer
//! - [`scheduler`] - scheduler contract and the reference `TreeScheduler`
//! - [`view`] - view contract, traversors, crossterm `TerminalView`

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod injection;
pub mod module;
pub mod scheduler;
pub mod state;
pub mod types;
pub mod view;

// Re-export commonly used items
pub use types::*;

pub use config::{ControllerConfig, ReentrancyPolicy, SchedulerConfig};

pub use controller::{
    ChangeListener, Controller, ControllerBuilder, Intercepter, Modified, Observer, Phase, Renderer,
};

pub use engine::{CNode, CTree, CnodeRef, NodeFlags};

pub use error::{Error, RenderError, Result};

pub use injection::{keys, Injection};

pub use module::{AppearanceModule, Module, ModuleSystem, NullModule, RenderNext};

pub use scheduler::{RenderHooks, Scheduler, TreeScheduler};

pub use state::{AppearanceTree, NodeStore, Seed, StateCell, StateSlot, StateTree};

pub use view::{NodeAnchor, Patch, TerminalView, Traversal, Traversor, View, Viewport};
