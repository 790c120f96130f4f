//! Controller - owns the live tree and runs paint/repaint transactions.
//!
//! ```text
//!                 ┌──────────── Controller ─────────────┐
//!  paint(vnode) ─▶│ Transaction(FirstPaint)              │
//!                 │   scheduler.paint ─▶ Renderer hooks  │
//!                 │   view.initial_digest(Traversor)     │
//! repaint(refs) ─▶│ Transaction(Repaint)                 │
//!                 │   scheduler.repaint ─▶ Renderer hooks│──▶ DigestQueue
//!                 │   view.update_digest per queued node │◀── drain
//!                 │   on_change(root)                    │
//!                 └──────────────────────────────────────┘
//! ```
//!
//! State writes made through `StateCell`s are recorded as dirty paths.
//! [`Controller::flush`] turns them into repaint passes; `repaint` flushes
//! after its own pass so that writes made while rendering are applied before
//! it returns.

mod intercepter;
mod observer;
mod queue;
mod renderer;
mod scratch;
mod transaction;

pub use intercepter::Intercepter;
pub use observer::Observer;
pub use queue::DigestQueue;
pub use renderer::Renderer;
pub use scratch::{Modified, Scratch};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::{ControllerConfig, ReentrancyPolicy};
use crate::engine::{CTree, CnodeRef};
use crate::error::{Error, Result};
use crate::module::{AppearanceModule, Module, ModuleSystem};
use crate::scheduler::Scheduler;
use crate::state::{AppearanceTree, ChangeNotifier, Seed, StateTree};
use crate::types::{StatePath, VNode};
use crate::view::{Traversor, View};

use transaction::Transaction;

/// Which transaction is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    FirstPaint,
    Repaint,
}

/// Listener notified with the tree root after every repaint pass.
pub type ChangeListener = Box<dyn FnMut(&CnodeRef)>;

/// Everything the renderer callbacks need, shared by reference.
pub(crate) struct Core {
    config: ControllerConfig,
    state: Rc<StateTree>,
    appearance: Rc<AppearanceTree>,
    modules: ModuleSystem,
    queue: DigestQueue,
    scratch: Scratch,
    phase: Cell<Phase>,
    dirty: Rc<RefCell<Vec<StatePath>>>,
}

impl Core {
    fn new(
        config: ControllerConfig,
        state_seed: Seed,
        appearance_seed: Seed,
        user_modules: Vec<Box<dyn Module>>,
    ) -> Self {
        let dirty: Rc<RefCell<Vec<StatePath>>> = Rc::default();
        let sink = dirty.clone();
        let notifier: ChangeNotifier = Rc::new(move |path: &StatePath| {
            let mut dirty = sink.borrow_mut();
            if !dirty.contains(path) {
                dirty.push(path.clone());
            }
        });

        let state = Rc::new(StateTree::new(state_seed, notifier.clone()));
        let appearance = Rc::new(AppearanceTree::new(appearance_seed, notifier));

        let mut modules = ModuleSystem::new();
        if config.inject_appearance {
            modules.push(AppearanceModule::new(appearance.clone()));
        }
        for module in user_modules {
            modules.push_boxed(module);
        }

        Self {
            config,
            state,
            appearance,
            modules,
            queue: DigestQueue::new(),
            scratch: Scratch::new(),
            phase: Cell::new(Phase::Idle),
            dirty,
        }
    }

    fn mark_dirty(&self, nodes: &[CnodeRef]) {
        let mut dirty = self.dirty.borrow_mut();
        for node in nodes {
            if !dirty.contains(node.state_path()) {
                dirty.push(node.state_path().clone());
            }
        }
    }

    fn take_dirty(&self) -> Vec<StatePath> {
        std::mem::take(&mut *self.dirty.borrow_mut())
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct Controller<V: View> {
    core: Core,
    scheduler: RefCell<Option<Box<dyn Scheduler>>>,
    view: RefCell<Option<V>>,
    ctree: RefCell<Option<CTree>>,
    on_change: RefCell<Option<ChangeListener>>,
}

impl<V: View> Controller<V> {
    pub fn builder() -> ControllerBuilder<V> {
        ControllerBuilder::default()
    }

    /// An unwired controller. Supply the collaborators with
    /// [`receive_scheduler`](Self::receive_scheduler) and
    /// [`receive_view`](Self::receive_view) before painting.
    pub fn new(initial_state: Seed, initial_appearance: Seed, modules: Vec<Box<dyn Module>>) -> Self {
        let mut builder = Self::builder()
            .initial_state(initial_state)
            .initial_appearance(initial_appearance);
        builder.modules = modules;
        builder.build()
    }

    // =========================================================================
    // Wiring
    // =========================================================================

    pub fn receive_scheduler(&mut self, scheduler: impl Scheduler + 'static) {
        *self.scheduler.get_mut() = Some(Box::new(scheduler));
    }

    pub fn receive_view(&mut self, view: V) {
        *self.view.get_mut() = Some(view);
    }

    /// Register the listener called with the root after each repaint pass.
    pub fn on_change(&self, listener: impl FnMut(&CnodeRef) + 'static) {
        *self.on_change.borrow_mut() = Some(Box::new(listener));
    }

    /// A collaborator that is borrowed right now is in use, so it is wired.
    fn ensure_wired(&self) -> Result<()> {
        if self.scheduler.try_borrow().is_ok_and(|s| s.is_none()) {
            return Err(Error::NotWired("scheduler"));
        }
        if self.view.try_borrow().is_ok_and(|v| v.is_none()) {
            return Err(Error::NotWired("view"));
        }
        Ok(())
    }

    // =========================================================================
    // Paint / repaint
    // =========================================================================

    /// Build the tree for `vnode` and digest it onto `surface`.
    pub fn paint(&self, vnode: VNode, surface: V::Surface) -> Result<()> {
        if self.ctree.borrow().is_some() {
            return Err(Error::AlreadyPainted);
        }
        self.ensure_wired()?;
        let tx = Transaction::begin(&self.core, Phase::FirstPaint)?;

        let tree = self.with_scheduler(|scheduler, renderer| scheduler.paint(vnode, renderer))?;
        *self.ctree.borrow_mut() = Some(tree.clone());
        self.with_view(|view| view.initial_digest(Traversor::initial(&tree), surface))?;

        tx.commit();
        debug!(nodes = tree.len(), "paint finished");
        self.flush().map(|_| ())
    }

    /// Re-render `changed` and digest every node the pass re-rendered.
    ///
    /// While another transaction is running this follows
    /// [`ReentrancyPolicy`]: `Reject` fails, `Defer` records the nodes for
    /// the next flush.
    pub fn repaint(&self, changed: &[CnodeRef]) -> Result<()> {
        let active = self.core.phase.get();
        if active != Phase::Idle {
            return match self.core.config.reentrancy {
                ReentrancyPolicy::Reject => Err(Error::Reentrant {
                    active,
                    requested: Phase::Repaint,
                }),
                ReentrancyPolicy::Defer => {
                    debug!(nodes = changed.len(), "repaint deferred");
                    self.core.mark_dirty(changed);
                    Ok(())
                }
            };
        }
        self.repaint_pass(changed)?;
        self.flush().map(|_| ())
    }

    /// Repaint the owners of every state path written since the last pass.
    /// Returns the number of passes run.
    pub fn flush(&self) -> Result<usize> {
        let active = self.core.phase.get();
        if active != Phase::Idle {
            return match self.core.config.reentrancy {
                ReentrancyPolicy::Reject => Err(Error::Reentrant {
                    active,
                    requested: Phase::Repaint,
                }),
                ReentrancyPolicy::Defer => Ok(0),
            };
        }

        let mut passes = 0;
        loop {
            let paths = self.core.take_dirty();
            if paths.is_empty() {
                return Ok(passes);
            }
            if passes >= self.core.config.max_flush_passes {
                self.core.dirty.borrow_mut().extend(paths);
                return Err(Error::UpdateLoop { passes });
            }

            let nodes = self.resolve(&paths);
            if nodes.is_empty() {
                continue;
            }
            self.repaint_pass(&nodes)?;
            passes += 1;
        }
    }

    /// Live nodes owning `paths`. The root owns no slot; it is matched by path.
    fn resolve(&self, paths: &[StatePath]) -> Vec<CnodeRef> {
        let root = self.ctree.borrow().as_ref().map(|tree| tree.root().clone());
        paths
            .iter()
            .filter_map(|path| {
                self.core
                    .state
                    .owner(path)
                    .or_else(|| self.core.appearance.owner(path))
                    .or_else(|| root.clone().filter(|root| root.state_path() == path))
            })
            .filter(|node| !node.is_destroyed())
            .collect()
    }

    fn repaint_pass(&self, changed: &[CnodeRef]) -> Result<()> {
        let root = self
            .ctree
            .borrow()
            .as_ref()
            .map(|tree| tree.root().clone())
            .ok_or(Error::NotPainted)?;
        self.ensure_wired()?;
        let tx = Transaction::begin(&self.core, Phase::Repaint)?;

        self.with_scheduler(|scheduler, renderer| scheduler.repaint(changed, renderer))?;

        let queued = self.core.queue.drain();
        self.with_view(|view| {
            for cnode in &queued {
                if cnode.is_destroyed() {
                    warn!(path = %cnode.state_path(), "queued node destroyed before digest");
                    continue;
                }
                let view_refs = cnode.view_refs();
                let modified = self.core.scratch.get(cnode).unwrap_or_default();
                view.update_digest(Traversor::patch(cnode, modified), &view_refs)?;
            }
            Ok(())
        })?;

        tx.commit();
        debug!(changed = changed.len(), digested = queued.len(), "repaint pass");
        self.notify(&root);
        Ok(())
    }

    /// Tear the live tree down, children first.
    pub fn unmount(&self) -> Result<()> {
        let tree = self.ctree.borrow().clone().ok_or(Error::NotPainted)?;
        let tx = Transaction::begin(&self.core, Phase::Repaint)?;
        self.renderer().destroy_subtrees(&[tree.root().clone()])?;
        *self.ctree.borrow_mut() = None;
        self.core.dirty.borrow_mut().clear();
        tx.commit();
        debug!("unmounted");
        Ok(())
    }

    fn with_scheduler<T>(&self, f: impl FnOnce(&mut dyn Scheduler, &Renderer<'_>) -> Result<T>) -> Result<T> {
        let mut scheduler = self.scheduler.borrow_mut();
        let scheduler = scheduler.as_mut().ok_or(Error::NotWired("scheduler"))?;
        f(&mut **scheduler, &self.renderer())
    }

    fn with_view<T>(&self, f: impl FnOnce(&mut V) -> Result<T>) -> Result<T> {
        let mut view = self.view.borrow_mut();
        let view = view.as_mut().ok_or(Error::NotWired("view"))?;
        f(view)
    }

    fn notify(&self, root: &CnodeRef) {
        let listener = self.on_change.borrow_mut().take();
        if let Some(mut listener) = listener {
            listener(root);
            let mut slot = self.on_change.borrow_mut();
            if slot.is_none() {
                *slot = Some(listener);
            }
        }
    }

    // =========================================================================
    // Surfaces and accessors
    // =========================================================================

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.core)
    }

    pub fn intercepter(&self) -> Intercepter {
        Intercepter
    }

    pub fn observer(&self) -> Observer<'_, V> {
        Observer::new(&self.view)
    }

    pub fn get_ctree(&self) -> Option<CTree> {
        self.ctree.borrow().clone()
    }

    pub fn get_state_tree(&self) -> &StateTree {
        &self.core.state
    }

    pub fn appearance_tree(&self) -> &AppearanceTree {
        &self.core.appearance
    }

    pub fn modules(&self) -> &ModuleSystem {
        &self.core.modules
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.core.config
    }

    pub fn phase(&self) -> Phase {
        self.core.phase.get()
    }

    /// Nodes queued for a digest in the running pass.
    pub fn pending_digest_len(&self) -> usize {
        self.core.queue.len()
    }

    /// Scratch record of `cnode` in the running pass.
    pub fn modified(&self, cnode: &CnodeRef) -> Option<Modified> {
        self.core.scratch.get(cnode)
    }

    /// State paths written since the last pass.
    pub fn dirty_paths(&self) -> Vec<StatePath> {
        self.core.dirty.borrow().clone()
    }

    /// Run `f` with the view, if one is wired.
    pub fn with_view_ref<T>(&self, f: impl FnOnce(&V) -> T) -> Option<T> {
        self.view.borrow().as_ref().map(f)
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct ControllerBuilder<V: View> {
    config: ControllerConfig,
    scheduler: Option<Box<dyn Scheduler>>,
    view: Option<V>,
    modules: Vec<Box<dyn Module>>,
    initial_state: Seed,
    initial_appearance: Seed,
}

impl<V: View> Default for ControllerBuilder<V> {
    fn default() -> Self {
        Self {
            config: ControllerConfig::default(),
            scheduler: None,
            view: None,
            modules: Vec::new(),
            initial_state: Seed::new(),
            initial_appearance: Seed::new(),
        }
    }
}

impl<V: View> ControllerBuilder<V> {
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    pub fn view(mut self, view: V) -> Self {
        self.view = Some(view);
        self
    }

    /// Append a module. Modules run in the order they are added.
    pub fn module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn initial_state(mut self, seed: Seed) -> Self {
        self.initial_state = seed;
        self
    }

    pub fn initial_appearance(mut self, seed: Seed) -> Self {
        self.initial_appearance = seed;
        self
    }

    pub fn build(self) -> Controller<V> {
        Controller {
            core: Core::new(
                self.config,
                self.initial_state,
                self.initial_appearance,
                self.modules,
            ),
            scheduler: RefCell::new(self.scheduler),
            view: RefCell::new(self.view),
            ctree: RefCell::new(None),
            on_change: RefCell::new(None),
        }
    }
}
