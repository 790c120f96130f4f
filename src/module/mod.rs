//! Module System - ordered cross-cutting extensions around rendering.
//!
//! A [`Module`] can observe node lifecycle (`initialize`, `update`,
//! `destroy`), contribute render arguments (`inject`) and wrap the render
//! call itself (`hijack`). Every hook has a no-op default, so a module only
//! implements what it needs and an empty [`ModuleSystem`] is a pass-through.
//!
//! # Ordering
//!
//! | Hook | Order |
//! |------|-------|
//! | `initialize`, `update` | registration order |
//! | `inject` | registration order, later keys win |
//! | `hijack` | first module is the outermost wrapper |
//! | `destroy` | reverse registration order |

mod appearance;

pub use appearance::AppearanceModule;

use crate::engine::CnodeRef;
use crate::error::Result;
use crate::injection::Injection;
use crate::types::Rendered;

/// The continuation a module calls to run the rest of the render chain.
pub type RenderNext<'a> = &'a dyn Fn(&Injection) -> Result<Rendered>;

/// A cross-cutting extension. All hooks default to no-ops.
pub trait Module {
    /// Name used in logs and module errors.
    fn name(&self) -> &str;

    fn initialize(&self, _cnode: &CnodeRef, _parent: Option<&CnodeRef>) -> Result<()> {
        Ok(())
    }

    /// Extra render arguments for `cnode`.
    fn inject(&self, _cnode: &CnodeRef, _parent: Option<&CnodeRef>) -> Result<Injection> {
        Ok(Injection::new())
    }

    fn update(&self, _cnode: &CnodeRef) -> Result<()> {
        Ok(())
    }

    fn destroy(&self, _cnode: &CnodeRef) -> Result<()> {
        Ok(())
    }

    /// Wrap or replace the render call. The default calls `next` unchanged.
    ///
    /// A module may rewrite `args` before calling `next`, post-process the
    /// result, or skip `next` entirely.
    fn hijack(&self, _cnode: &CnodeRef, args: &Injection, next: RenderNext<'_>) -> Result<Rendered> {
        next(args)
    }
}

/// A module with no behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullModule;

impl Module for NullModule {
    fn name(&self) -> &str {
        "null"
    }
}

// =============================================================================
// ModuleSystem
// =============================================================================

/// Ordered list of modules, driven as one.
#[derive(Default)]
pub struct ModuleSystem {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: impl Module + 'static) {
        self.modules.push(Box::new(module));
    }

    pub fn push_boxed(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    pub fn with(mut self, module: impl Module + 'static) -> Self {
        self.push(module);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn initialize(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<()> {
        for module in &self.modules {
            module.initialize(cnode, parent)?;
        }
        Ok(())
    }

    pub fn inject(&self, cnode: &CnodeRef, parent: Option<&CnodeRef>) -> Result<Injection> {
        let mut merged = Injection::new();
        for module in &self.modules {
            merged = merged.merge(module.inject(cnode, parent)?);
        }
        Ok(merged)
    }

    pub fn update(&self, cnode: &CnodeRef) -> Result<()> {
        for module in &self.modules {
            module.update(cnode)?;
        }
        Ok(())
    }

    pub fn destroy(&self, cnode: &CnodeRef) -> Result<()> {
        for module in self.modules.iter().rev() {
            module.destroy(cnode)?;
        }
        Ok(())
    }

    /// Run `render` through every module's `hijack`, first module outermost.
    pub fn hijack(&self, cnode: &CnodeRef, args: &Injection, render: RenderNext<'_>) -> Result<Rendered> {
        self.hijack_from(0, cnode, args, render)
    }

    fn hijack_from(
        &self,
        index: usize,
        cnode: &CnodeRef,
        args: &Injection,
        render: RenderNext<'_>,
    ) -> Result<Rendered> {
        match self.modules.get(index) {
            None => render(args),
            Some(module) => {
                let next = |args: &Injection| self.hijack_from(index + 1, cnode, args, render);
                module.hijack(cnode, args, &next)
            }
        }
    }
}
