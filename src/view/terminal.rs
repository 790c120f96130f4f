//! TerminalView - a line-oriented crossterm view.
//!
//! The live tree is flattened into text rows: text vnodes become rows,
//! elements indent their children by two columns, component vnodes are
//! replaced by the output of the matching child cnode.
//!
//! # Algorithm
//!
//! 1. Digest: walk the traversor, binding one view ref per node
//! 2. Compose the full row list from the root
//! 3. For each row index: skip if unchanged since the previous frame,
//!    otherwise move there, clear the line, print the new row
//! 4. Flush once and keep the rows for the next comparison
//!
//! Inside [`View::batch`] step 2-4 are deferred until the outermost batch
//! closes. A deferred redraw that fails is held and returned by the next
//! digest. Rows past the last addressable terminal row are not drawn.

use std::io::Write;
use std::slice;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use super::{Traversor, View};
use crate::engine::CnodeRef;
use crate::error::{Error, Result};
use crate::types::{CnodeId, NodeType, VNode, ViewHandle, ViewRefs};

/// Where the tree is mounted on the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First terminal row used by the view.
    pub row: u16,
}

/// The handle bound to every digested node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAnchor {
    pub id: CnodeId,
}

pub struct TerminalView<W: Write> {
    out: W,
    viewport: Viewport,
    root: Option<CnodeRef>,
    previous: Vec<String>,
    batching: usize,
    dirty: bool,
    frames: usize,
    last_changed: usize,
    deferred_error: Option<Error>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            viewport: Viewport::default(),
            root: None,
            previous: Vec::new(),
            batching: 0,
            dirty: false,
            frames: 0,
            last_changed: 0,
            deferred_error: None,
        }
    }

    /// Rows of the last drawn frame.
    pub fn rows(&self) -> &[String] {
        &self.previous
    }

    /// Number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Rows rewritten by the last frame.
    pub fn last_changed(&self) -> usize {
        self.last_changed
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Error from a redraw deferred by `batch`, if it has not been reported yet.
    pub fn deferred_error(&self) -> Option<&Error> {
        self.deferred_error.as_ref()
    }

    /// Forget the previous frame. The next redraw rewrites every row.
    pub fn invalidate(&mut self) {
        self.previous.clear();
    }

    fn bind(traversor: Traversor) -> Option<CnodeRef> {
        let mut first = None;
        for traversal in traversor {
            traversal.bind_view_ref(ViewHandle::new(NodeAnchor {
                id: traversal.cnode.id(),
            }));
            first.get_or_insert(traversal.cnode);
        }
        first
    }

    fn schedule_redraw(&mut self) -> Result<()> {
        self.dirty = true;
        if self.batching > 0 {
            return Ok(());
        }
        self.redraw()
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(root) = self.root.clone() else {
            return Ok(());
        };
        let mut rows = Vec::new();
        compose_node(&root, 0, &mut rows);

        let mut changed = 0;
        let height = rows.len().max(self.previous.len());
        for index in 0..height {
            let next = rows.get(index);
            if next.is_some() && next == self.previous.get(index) {
                continue;
            }
            let Some(y) = u16::try_from(index)
                .ok()
                .and_then(|offset| self.viewport.row.checked_add(offset))
            else {
                tracing::warn!(from = index, rows = height, "frame clipped at the last terminal row");
                break;
            };
            queue!(
                self.out,
                MoveTo(0, y),
                Clear(ClearType::UntilNewLine),
                Print(next.map(String::as_str).unwrap_or(""))
            )?;
            changed += 1;
        }
        self.out.flush()?;

        tracing::trace!(rows = rows.len(), changed, "terminal frame");
        self.previous = rows;
        self.dirty = false;
        self.frames += 1;
        self.last_changed = changed;
        Ok(())
    }
}

impl<W: Write> View for TerminalView<W> {
    type Surface = Viewport;

    fn initial_digest(&mut self, traversor: Traversor, surface: Viewport) -> Result<()> {
        if let Some(err) = self.deferred_error.take() {
            return Err(err);
        }
        self.viewport = surface;
        self.root = Self::bind(traversor);
        self.invalidate();
        self.schedule_redraw()
    }

    fn update_digest(&mut self, traversor: Traversor, _view_refs: &ViewRefs) -> Result<()> {
        if self.root.is_none() {
            return Err(Error::View("update digest before the initial digest".into()));
        }
        if let Some(err) = self.deferred_error.take() {
            return Err(err);
        }
        Self::bind(traversor);
        self.schedule_redraw()
    }

    fn batch<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.batching += 1;
        f(self);
        self.batching -= 1;
        if self.batching == 0 && self.dirty {
            if let Err(err) = self.redraw() {
                tracing::warn!(%err, "deferred redraw failed");
                self.deferred_error = Some(err);
            }
        }
    }
}

// =============================================================================
// Row composition
// =============================================================================

fn compose_node(cnode: &CnodeRef, indent: usize, rows: &mut Vec<String>) {
    let children = cnode.children();
    let mut next_child = children.iter();
    compose_vnodes(&cnode.ret(), indent, &mut next_child, rows);
}

fn compose_vnodes(
    nodes: &[VNode],
    indent: usize,
    children: &mut slice::Iter<'_, CnodeRef>,
    rows: &mut Vec<String>,
) {
    for vnode in nodes {
        match &vnode.node_type {
            NodeType::Text(text) => rows.push(format!("{:width$}{text}", "", width = indent * 2)),
            NodeType::Element(_) => compose_vnodes(&vnode.children, indent + 1, children, rows),
            NodeType::Fragment => compose_vnodes(&vnode.children, indent, children, rows),
            NodeType::Component(_) => {
                if let Some(child) = children.next() {
                    compose_node(child, indent, rows);
                }
            }
        }
    }
}
