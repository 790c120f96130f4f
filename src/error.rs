//! Error types for the reconciliation runtime.
//!
//! Errors are grouped by where they come from:
//! - **Render** - a component's render function failed
//! - **State access** - a `StatePath` was used outside its lifecycle
//! - **Module** - a module hook failed
//! - **Collaborators** - scheduler, view, or terminal I/O failures
//!
//! Nothing inside the runtime catches or retries these. They travel out of
//! `paint`/`repaint` with `?`.

use thiserror::Error;

use crate::controller::Phase;
use crate::types::StatePath;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a component's render function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<&str> for RenderError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for RenderError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("render of `{component}` failed: {source}")]
    Render {
        component: String,
        #[source]
        source: RenderError,
    },

    #[error("no state registered at `{path}`")]
    StateNotInitialized { path: StatePath },

    #[error("state at `{path}` is already registered")]
    AlreadyInitialized { path: StatePath },

    #[error("state at `{path}` was already destroyed")]
    AlreadyDestroyed { path: StatePath },

    #[error("module `{module}` failed: {reason}")]
    Module { module: String, reason: String },

    #[error("scheduler failed: {0}")]
    Scheduler(String),

    #[error("view failed: {0}")]
    View(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("controller has no {0} wired")]
    NotWired(&'static str),

    #[error("cannot open a {requested:?} transaction while {active:?} is running")]
    Reentrant { active: Phase, requested: Phase },

    #[error("controller already holds a painted tree")]
    AlreadyPainted,

    #[error("controller has no painted tree")]
    NotPainted,

    #[error("root vnode must be a component")]
    InvalidRoot,

    #[error("state changes did not settle after {passes} repaint passes")]
    UpdateLoop { passes: usize },
}

impl Error {
    /// Wrap a render failure with the name of the component that produced it.
    pub fn render(component: impl Into<String>, source: RenderError) -> Self {
        Self::Render {
            component: component.into(),
            source,
        }
    }

    /// Build a module failure.
    pub fn module(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Module {
            module: module.into(),
            reason: reason.into(),
        }
    }
}
