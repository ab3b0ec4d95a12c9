//! The node tree.
//!
//! A [`Node`] describes one unit of UI: a [`NodeType`] saying *what* it is,
//! the [`Props`] it was created with, and an optional reconciliation key.
//!
//! ```text
//! Node
//! ├── ty: NodeType ── Tag | Text | Fragment    (terminal, rendered as-is)
//! │                └─ Component               (callable, still pending)
//! │                └─ Rendered                (callable, already resolved)
//! ├── props: Props ── named values + children
//! └── key: Option<Str>
//! ```
//!
//! Nodes are plain values. Resolving a tree never mutates a node; it builds
//! a new one with the type or children substituted.

use alloc::{rc::Rc, vec::Vec};
use core::fmt::{self, Display, Write};

use crate::{Children, Component, Prop, Props, Str};

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeType {
    /// A host element identified by its tag, such as `"div"`.
    Tag(Str),
    /// A text leaf.
    Text(Str),
    /// A grouping marker with no element of its own.
    Fragment,
    /// A component that has not been invoked yet.
    Component(Component),
    /// A component that has been invoked and fully resolved.
    Rendered(Rendered),
}

impl NodeType {
    /// Returns `true` for types that produce further nodes when called.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Component(_) | Self::Rendered(_))
    }

    /// Returns the display name of a callable type.
    #[must_use]
    pub const fn name(&self) -> Option<&Str> {
        match self {
            Self::Component(component) => Some(component.name()),
            Self::Rendered(rendered) => Some(rendered.name()),
            _ => None,
        }
    }
}

/// The zero-argument callable left in place of a component after resolution.
///
/// Calling it always yields the same fully resolved node. It keeps the name
/// of the component it replaced so debugging output stays readable.
#[derive(Clone)]
pub struct Rendered {
    name: Str,
    node: Rc<Node>,
}

impl Rendered {
    /// Wraps a resolved node under the given component name.
    pub fn new(name: impl Into<Str>, node: Node) -> Self {
        Self {
            name: name.into(),
            node: Rc::new(node),
        }
    }

    /// Returns the name of the component this replaced.
    #[must_use]
    pub const fn name(&self) -> &Str {
        &self.name
    }

    /// Borrows the resolved node.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Invokes the callable, returning a copy of the resolved node.
    #[must_use]
    pub fn call(&self) -> Node {
        Node::clone(&self.node)
    }
}

impl PartialEq for Rendered {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && (Rc::ptr_eq(&self.node, &other.node) || self.node == other.node)
    }
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("name", &self.name)
            .field("node", &self.node)
            .finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rendered {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Rendered", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("node", &*self.node)?;
        state.end()
    }
}

/// A description of a unit of UI.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    ty: NodeType,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    key: Option<Str>,
    props: Props,
}

impl Node {
    /// Creates a node from a type and its props.
    #[must_use]
    pub const fn new(ty: NodeType, props: Props) -> Self {
        Self {
            ty,
            key: None,
            props,
        }
    }

    /// Creates a host element node.
    pub fn tag(tag: impl Into<Str>) -> Self {
        Self::new(NodeType::Tag(tag.into()), Props::new())
    }

    /// Creates a text leaf.
    pub fn text(text: impl Into<Str>) -> Self {
        Self::new(NodeType::Text(text.into()), Props::new())
    }

    /// Creates a fragment holding the given children.
    pub fn fragment(children: impl Into<Children>) -> Self {
        Self::new(NodeType::Fragment, Props::new().with_children(children))
    }

    /// Creates a node that invokes `component` when resolved.
    #[must_use]
    pub const fn component(component: Component) -> Self {
        Self::new(NodeType::Component(component), Props::new())
    }

    /// Returns the node type.
    #[must_use]
    pub const fn ty(&self) -> &NodeType {
        &self.ty
    }

    /// Returns the props.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }

    /// Returns the reconciliation key.
    #[must_use]
    pub const fn key(&self) -> Option<&Str> {
        self.key.as_ref()
    }

    /// Returns the children slot of the props.
    #[must_use]
    pub const fn children(&self) -> Option<&Children> {
        self.props.children()
    }

    /// Sets a named prop.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<Str>, value: impl Into<Prop>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Replaces all props, children included.
    #[must_use]
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// Appends a child. The first child is stored as a single node; later
    /// ones turn the slot into a sequence.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        let children = match self.props.take_children() {
            Some(children) => children.push(child),
            None => Children::from(child),
        };
        self.props.set_children(Some(children));
        self
    }

    /// Sets the children to an ordered sequence.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.props
            .set_children(Some(Children::Many(children.into_iter().collect())));
        self
    }

    /// Sets the reconciliation key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Str>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Returns a copy of this node with another type.
    #[must_use]
    pub fn with_type(&self, ty: NodeType) -> Self {
        Self {
            ty,
            key: self.key.clone(),
            props: self.props.clone(),
        }
    }

    /// Returns a copy of this node whose children slot holds `children`.
    ///
    /// The previous children are not cloned.
    #[must_use]
    pub fn with_children_slot(&self, children: Children) -> Self {
        Self {
            ty: self.ty.clone(),
            key: self.key.clone(),
            props: Props {
                values: self.props.values.clone(),
                children: Some(children),
            },
        }
    }

    /// Replaces the type in place.
    pub fn set_type(&mut self, ty: NodeType) {
        self.ty = ty;
    }

    /// Moves the children out, leaving the slot empty.
    pub fn take_children(&mut self) -> Option<Children> {
        self.props.take_children()
    }

    /// Replaces the children slot in place.
    pub fn set_children(&mut self, children: Option<Children>) {
        self.props.set_children(children);
    }

    /// Returns `true` if no component is left to invoke anywhere in the tree.
    ///
    /// The children of a rendered node are owned by the component that
    /// produced it, so only its resolved output is inspected.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        match &self.ty {
            NodeType::Component(_) => false,
            NodeType::Rendered(rendered) => rendered.node().is_resolved(),
            _ => self
                .children()
                .is_none_or(|children| children.iter().all(Self::is_resolved)),
        }
    }

    /// Counts the nodes in this tree, looking through rendered components.
    #[must_use]
    pub fn count(&self) -> usize {
        match &self.ty {
            NodeType::Rendered(rendered) => 1 + rendered.node().count(),
            _ => {
                1 + self
                    .children()
                    .map_or(0, |children| children.iter().map(Self::count).sum())
            }
        }
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }

        let name = match &self.ty {
            NodeType::Text(text) => return writeln!(f, "{:?}", text.as_str()),
            NodeType::Tag(tag) => tag.as_str(),
            NodeType::Fragment => "",
            NodeType::Component(component) => {
                f.write_char('<')?;
                f.write_str(component.name())?;
                self.write_attributes(f)?;
                return f.write_str(" …/>\n");
            }
            NodeType::Rendered(rendered) => rendered.name().as_str(),
        };

        f.write_char('<')?;
        f.write_str(name)?;
        self.write_attributes(f)?;

        let nested: Vec<&Self> = match &self.ty {
            NodeType::Rendered(rendered) => alloc::vec![rendered.node()],
            _ => self
                .children()
                .map(|children| children.iter().collect())
                .unwrap_or_default(),
        };

        if nested.is_empty() {
            return f.write_str("/>\n");
        }

        f.write_str(">\n")?;
        for child in nested {
            child.write_outline(f, depth + 1)?;
        }
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        writeln!(f, "</{name}>")
    }

    fn write_attributes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(key) = &self.key {
            write!(f, " key={:?}", key.as_str())?;
        }
        for (name, value) in self.props.iter() {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

/// Renders the tree as an indented outline, one node per line.
impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}

impl From<&'static str> for Node {
    fn from(text: &'static str) -> Self {
        Self::text(text)
    }
}

impl From<Component> for Node {
    fn from(component: Component) -> Self {
        Self::component(component)
    }
}
