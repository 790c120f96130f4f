//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use spark_reconciler::{
    Component, CnodeRef, Error, Injection, Module, Rendered, RenderError, RenderNext, Result,
    StatePath, Traversor, VNode, View, ViewHandle, ViewRefs,
};

// =============================================================================
// Recording view
// =============================================================================

/// One `update_digest` call as the view saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub path: String,
    pub previous: Vec<VNode>,
    pub next: Vec<VNode>,
    pub initialized: Vec<String>,
    pub visited: Vec<String>,
    pub view_refs: usize,
}

#[derive(Debug, Default)]
pub struct ViewLog {
    pub surfaces: Vec<String>,
    pub initial: Vec<Vec<String>>,
    pub updates: Vec<Update>,
    pub batches: usize,
}

/// A view that records every digest and binds one handle per visited node.
#[derive(Clone, Default)]
pub struct RecordingView {
    pub log: Rc<RefCell<ViewLog>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_paths(&self) -> Vec<String> {
        self.log.borrow().updates.iter().map(|u| u.path.clone()).collect()
    }

    pub fn initial_count(&self) -> usize {
        self.log.borrow().initial.len()
    }

    pub fn update_count(&self) -> usize {
        self.log.borrow().updates.len()
    }
}

impl View for RecordingView {
    type Surface = String;

    fn initial_digest(&mut self, traversor: Traversor, surface: String) -> Result<()> {
        let mut visited = Vec::new();
        for traversal in traversor {
            let path = traversal.cnode.state_path().to_string();
            traversal.bind_view_ref(ViewHandle::new(path.clone()));
            visited.push(path);
        }
        let mut log = self.log.borrow_mut();
        log.surfaces.push(surface);
        log.initial.push(visited);
        Ok(())
    }

    fn update_digest(&mut self, traversor: Traversor, view_refs: &ViewRefs) -> Result<()> {
        let mut update: Option<Update> = None;
        let mut visited = Vec::new();
        for traversal in traversor {
            let path = traversal.cnode.state_path().to_string();
            traversal.bind_view_ref(ViewHandle::new(path.clone()));
            if let Some(patch) = &traversal.patch {
                update = Some(Update {
                    path: path.clone(),
                    previous: patch.previous.clone(),
                    next: patch.next.clone(),
                    initialized: patch
                        .initialized
                        .iter()
                        .map(|n| n.state_path().to_string())
                        .collect(),
                    visited: Vec::new(),
                    view_refs: view_refs.len(),
                });
            }
            visited.push(path);
        }
        let mut update = update.ok_or_else(|| Error::View("traversor without a patch".into()))?;
        update.visited = visited;
        self.log.borrow_mut().updates.push(update);
        Ok(())
    }

    fn batch<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.log.borrow_mut().batches += 1;
        f(self);
    }
}

// =============================================================================
// Recording module
// =============================================================================

pub type EventLog = Rc<RefCell<Vec<String>>>;

/// A module that logs every hook as `"<hook> <path>"`.
pub struct RecordingModule {
    pub name: String,
    pub events: EventLog,
    pub inject: Option<(String, String)>,
    pub fail_update: bool,
    pub wrap_in: Option<String>,
}

impl RecordingModule {
    pub fn new(name: &str, events: EventLog) -> Self {
        Self {
            name: name.to_string(),
            events,
            inject: None,
            fail_update: false,
            wrap_in: None,
        }
    }

    pub fn injecting(mut self, key: &str, value: &str) -> Self {
        self.inject = Some((key.to_string(), value.to_string()));
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    /// Wrap every render output in an element with this tag.
    pub fn wrapping(mut self, tag: &str) -> Self {
        self.wrap_in = Some(tag.to_string());
        self
    }

    fn record(&self, hook: &str, cnode: &CnodeRef) {
        self.events
            .borrow_mut()
            .push(format!("{hook} {}", cnode.state_path()));
    }
}

impl Module for RecordingModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, cnode: &CnodeRef, _parent: Option<&CnodeRef>) -> Result<()> {
        self.record("initialize", cnode);
        Ok(())
    }

    fn inject(&self, _cnode: &CnodeRef, _parent: Option<&CnodeRef>) -> Result<Injection> {
        let mut injection = Injection::new();
        if let Some((key, value)) = &self.inject {
            injection.insert(key.clone(), value.clone());
        }
        Ok(injection)
    }

    fn update(&self, cnode: &CnodeRef) -> Result<()> {
        self.record("update", cnode);
        if self.fail_update {
            return Err(Error::module(self.name.clone(), "update refused"));
        }
        Ok(())
    }

    fn destroy(&self, cnode: &CnodeRef) -> Result<()> {
        self.record("destroy", cnode);
        Ok(())
    }

    fn hijack(&self, cnode: &CnodeRef, args: &Injection, next: RenderNext<'_>) -> Result<Rendered> {
        let out = next(args)?;
        match &self.wrap_in {
            Some(tag) => {
                self.record("hijack", cnode);
                Ok(Rendered::One(VNode::element(tag.clone()).with_children(out.into_vec())))
            }
            None => Ok(out),
        }
    }
}

/// Events from `log` that start with `hook`.
pub fn events_of(log: &EventLog, hook: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|event| event.split(' ').next() == Some(hook))
        .cloned()
        .collect()
}

// =============================================================================
// Components
// =============================================================================

/// Renders `count: N` from its `count` state (start value from the `start` prop).
pub fn counter() -> Rc<Component> {
    Component::new("Counter", |args: &Injection| -> std::result::Result<VNode, RenderError> {
        let count = args
            .state()
            .and_then(|state| state.get::<i64>("count"))
            .ok_or_else(|| RenderError::new("missing count"))?;
        Ok(VNode::text(format!("count: {count}")))
    })
    .state("count", |props| {
        props.get("start").and_then(|p| p.as_int()).unwrap_or(0)
    })
    .appearance("focused", |_| false)
    .build()
}

/// Renders its `label` prop.
pub fn label() -> Rc<Component> {
    Component::new("Label", |args: &Injection| {
        let text = args.prop("label").map(|p| p.to_string()).unwrap_or_default();
        Ok::<_, RenderError>(VNode::text(text))
    })
    .build()
}

/// A root listing one `Label` per key in `items`.
pub fn keyed_list(items: Rc<RefCell<Vec<&'static str>>>) -> Rc<Component> {
    let label = label();
    Component::new("List", move |_: &Injection| {
        let rows: Vec<VNode> = items
            .borrow()
            .iter()
            .map(|key| VNode::component(&label).with_key(*key).with_prop("label", *key))
            .collect();
        Ok::<_, RenderError>(VNode::element("column").with_children(rows))
    })
    .build()
}

pub fn path(segments: &[&str]) -> StatePath {
    segments
        .iter()
        .fold(StatePath::root(), |path, segment| path.child(*segment))
}
