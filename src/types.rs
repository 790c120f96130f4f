//! Core types for spark-reconciler.
//!
//! - [`VNode`] / [`NodeType`] - immutable "what to render" descriptions
//! - [`Component`] - render function plus state/appearance slot declarations
//! - [`Rendered`] - what a render function returns, normalized to a sequence
//! - [`StatePath`] - stable identity of a node's state slot
//! - [`DiffSets`] - partition of a node's children between two renders
//! - [`ViewHandle`], [`Refs`], [`ViewRefs`] - opaque handles owned by the view

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::CnodeRef;
use crate::error::RenderError;
use crate::injection::Injection;
use crate::state::{CellContext, StateCell};

// =============================================================================
// Node identity
// =============================================================================

static NEXT_CNODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a live component node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CnodeId(u64);

impl CnodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CNODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hierarchical key locating a node's slot in the state and appearance trees.
///
/// Derived from tree position, so the same logical instance resolves to the
/// same path on every render. The root path has no segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatePath(Vec<String>);

impl StatePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of a child at `segment` under this path.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// True when `other` lies strictly below this path.
    pub fn is_ancestor_of(&self, other: &StatePath) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Props
// =============================================================================

/// A single prop value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Prop {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Prop>),
}

impl Prop {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<()> for Prop {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for Prop {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Prop {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<i64> for Prop {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Prop {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Prop {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Prop {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Prop>> From<Vec<T>> for Prop {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Named props of a vnode.
pub type Props = BTreeMap<String, Prop>;

// =============================================================================
// Components
// =============================================================================

/// Render function stored on a component.
pub type RenderFn = Rc<dyn Fn(&Injection) -> Result<Rendered, RenderError>>;

type SlotInit = Rc<dyn Fn(&Props, Option<&(dyn Any + 'static)>, &CellContext) -> Rc<dyn Any>>;

/// A named slot declaration with its default factory.
#[derive(Clone)]
pub struct SlotDecl {
    name: String,
    init: SlotInit,
}

impl SlotDecl {
    fn new<T, F>(name: String, default: F) -> Self
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&Props) -> T + 'static,
    {
        let init: SlotInit = Rc::new(move |props: &Props, seed: Option<&(dyn Any + 'static)>, cx: &CellContext| {
            let value = seed
                .and_then(|seed| seed.downcast_ref::<T>())
                .cloned()
                .unwrap_or_else(|| default(props));
            Rc::new(StateCell::new(value, cx.clone())) as Rc<dyn Any>
        });
        Self { name, init }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the cell, preferring `seed` when it holds a value of the right type.
    pub(crate) fn create(&self, props: &Props, seed: Option<&(dyn Any + 'static)>, cx: &CellContext) -> Rc<dyn Any> {
        (self.init)(props, seed, cx)
    }
}

impl fmt::Debug for SlotDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDecl").field("name", &self.name).finish()
    }
}

/// A component definition: a render function and the slots it owns.
///
/// # Example
///
/// ```ignore
/// let counter = Component::new("Counter", |args| {
///     let count = args.state().and_then(|s| s.get::<i32>("count")).unwrap_or(0);
///     Ok(VNode::text(format!("count: {count}")))
/// })
/// .state("count", |_| 0i32)
/// .build();
/// ```
pub struct Component {
    name: String,
    render: RenderFn,
    state: Vec<SlotDecl>,
    appearance: Vec<SlotDecl>,
}

impl Component {
    pub fn new<R, F>(name: impl Into<String>, render: F) -> Self
    where
        R: Into<Rendered>,
        F: Fn(&Injection) -> Result<R, RenderError> + 'static,
    {
        Self {
            name: name.into(),
            render: Rc::new(move |args: &Injection| render(args).map(Into::into)),
            state: Vec::new(),
            appearance: Vec::new(),
        }
    }

    /// Declare a behavioral state slot with a default factory.
    pub fn state<T, F>(mut self, name: impl Into<String>, default: F) -> Self
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&Props) -> T + 'static,
    {
        self.state.push(SlotDecl::new(name.into(), default));
        self
    }

    /// Declare a presentation slot with a default factory.
    pub fn appearance<T, F>(mut self, name: impl Into<String>, default: F) -> Self
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&Props) -> T + 'static,
    {
        self.appearance.push(SlotDecl::new(name.into(), default));
        self
    }

    pub fn build(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render_fn(&self) -> &RenderFn {
        &self.render
    }

    pub fn state_decls(&self) -> &[SlotDecl] {
        &self.state
    }

    pub fn appearance_decls(&self) -> &[SlotDecl] {
        &self.appearance
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("appearance", &self.appearance)
            .finish()
    }
}

// =============================================================================
// VNode
// =============================================================================

/// What a vnode describes.
#[derive(Clone)]
pub enum NodeType {
    /// A user component. Becomes a cnode.
    Component(Rc<Component>),
    /// An intrinsic element, digested by the view.
    Element(String),
    /// A text leaf.
    Text(String),
    /// Groups children without a node of its own.
    Fragment,
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Component(a), Self::Component(b)) => Rc::ptr_eq(a, b),
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Fragment, Self::Fragment) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(c) => write!(f, "Component({})", c.name()),
            Self::Element(tag) => write!(f, "Element({tag})"),
            Self::Text(text) => write!(f, "Text({text:?})"),
            Self::Fragment => f.write_str("Fragment"),
        }
    }
}

/// Immutable description of one position in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VNode {
    pub node_type: NodeType,
    pub key: Option<String>,
    pub props: Props,
    pub children: Vec<VNode>,
}

impl VNode {
    fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            key: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn component(component: &Rc<Component>) -> Self {
        Self::new(NodeType::Component(component.clone()))
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::new(NodeType::Element(tag.into()))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeType::Text(content.into()))
    }

    pub fn fragment(children: impl IntoIterator<Item = VNode>) -> Self {
        Self::new(NodeType::Fragment).with_children(children)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Prop>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn as_component(&self) -> Option<&Rc<Component>> {
        match &self.node_type {
            NodeType::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_component(&self) -> bool {
        self.as_component().is_some()
    }
}

// =============================================================================
// Rendered
// =============================================================================

/// Output of a render function before normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Rendered {
    #[default]
    Empty,
    One(VNode),
    Many(Vec<VNode>),
}

impl Rendered {
    /// Normalize to a sequence.
    pub fn into_vec(self) -> Vec<VNode> {
        match self {
            Self::Empty => Vec::new(),
            Self::One(node) => vec![node],
            Self::Many(nodes) => nodes,
        }
    }
}

impl From<()> for Rendered {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl From<VNode> for Rendered {
    fn from(node: VNode) -> Self {
        Self::One(node)
    }
}

impl From<Vec<VNode>> for Rendered {
    fn from(nodes: Vec<VNode>) -> Self {
        Self::Many(nodes)
    }
}

impl From<Option<VNode>> for Rendered {
    fn from(node: Option<VNode>) -> Self {
        match node {
            Some(node) => Self::One(node),
            None => Self::Empty,
        }
    }
}

// =============================================================================
// Diff sets
// =============================================================================

/// `{toInitialize, toDestroy, toRemain}` for one node's children.
#[derive(Debug, Clone, Default)]
pub struct DiffSets {
    pub to_initialize: Vec<CnodeRef>,
    pub to_destroy: Vec<CnodeRef>,
    pub to_remain: Vec<CnodeRef>,
}

impl DiffSets {
    pub fn new(to_initialize: Vec<CnodeRef>, to_destroy: Vec<CnodeRef>, to_remain: Vec<CnodeRef>) -> Self {
        Self {
            to_initialize,
            to_destroy,
            to_remain,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_initialize.is_empty() && self.to_destroy.is_empty() && self.to_remain.is_empty()
    }

    /// True when no node appears in more than one set (or twice in one).
    pub fn is_partition(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.to_initialize
            .iter()
            .chain(&self.to_destroy)
            .chain(&self.to_remain)
            .all(|cnode| seen.insert(cnode.id()))
    }
}

// =============================================================================
// View handles
// =============================================================================

/// Opaque handle into the external view layer.
#[derive(Clone)]
pub struct ViewHandle(Rc<dyn Any>);

impl ViewHandle {
    pub fn new<T: 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &ViewHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewHandle(..)")
    }
}

/// Named element handles bound by the view.
pub type Refs = BTreeMap<String, ViewHandle>;

/// Root handles of a node's presentation, bound by the view.
pub type ViewRefs = Vec<ViewHandle>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_path_child_and_display() {
        let root = StatePath::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "/");

        let leaf = root.child("App@0").child("Leaf#a");
        assert_eq!(leaf.depth(), 2);
        assert_eq!(leaf.to_string(), "/App@0/Leaf#a");
        assert_eq!(leaf.parent(), Some(root.child("App@0")));
    }

    #[test]
    fn test_state_path_ancestry() {
        let a = StatePath::root().child("A@0");
        let b = a.child("B@0");
        assert!(a.is_ancestor_of(&b));
        assert!(!b.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
        assert!(StatePath::root().is_ancestor_of(&a));
    }

    #[test]
    fn test_cnode_ids_are_unique() {
        let a = CnodeId::next();
        let b = CnodeId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_rendered_normalization() {
        assert!(Rendered::from(()).into_vec().is_empty());
        assert_eq!(Rendered::from(VNode::text("a")).into_vec(), vec![VNode::text("a")]);
        assert_eq!(
            Rendered::from(vec![VNode::text("a"), VNode::text("b")]).into_vec().len(),
            2
        );
        assert!(Rendered::from(None::<VNode>).into_vec().is_empty());
    }

    #[test]
    fn test_prop_conversions() {
        assert_eq!(Prop::from(3), Prop::Int(3));
        assert_eq!(Prop::from("x").as_str(), Some("x"));
        assert_eq!(Prop::from(true).as_bool(), Some(true));
        assert!(Prop::from(()).is_null());
        assert_eq!(Prop::from(vec![1, 2]).to_string(), "1,2");
    }

    #[test]
    fn test_vnode_builders() {
        let node = VNode::element("row")
            .with_key("k")
            .with_prop("gap", 1)
            .with_child(VNode::text("hi"));
        assert_eq!(node.key.as_deref(), Some("k"));
        assert_eq!(node.props.get("gap"), Some(&Prop::Int(1)));
        assert_eq!(node.children.len(), 1);
        assert!(!node.is_component());
    }

    #[test]
    fn test_component_vnode_equality_is_identity() {
        let a = Component::new("A", |_| Ok(())).build();
        let b = Component::new("A", |_| Ok(())).build();
        assert_eq!(VNode::component(&a), VNode::component(&a));
        assert_ne!(VNode::component(&a), VNode::component(&b));
    }

    #[test]
    fn test_view_handle_downcast() {
        let handle = ViewHandle::new(42u32);
        assert_eq!(handle.downcast_ref::<u32>(), Some(&42));
        assert!(handle.downcast_ref::<String>().is_none());
        assert!(handle.ptr_eq(&handle.clone()));
    }
}
