//! Callable components.
//!
//! A component turns a [`Props`] record into a [`Node`], possibly after
//! awaiting something. Anything implementing [`Render`] can be wrapped into
//! a [`Component`], which erases its type so heterogeneous components can
//! live in the same tree.
//!
//! # Example
//!
//! ```
//! use patchui_core::{Component, Node, Props};
//!
//! let greeting = Component::new("Greeting", |props: Props| async move {
//!     let name = props.str("name")?.clone();
//!     Ok(Node::tag("p").with_child(Node::text(name)))
//! });
//!
//! let tree = Node::component(greeting).with_prop("name", "Ada");
//! assert!(!tree.is_resolved());
//! ```

use alloc::{boxed::Box, rc::Rc};
use core::{any::type_name, fmt::Debug, future::Future};

use futures::future::{self, LocalBoxFuture};

use crate::{Node, Props, Str};

/// Something that can render a node from props.
///
/// Implemented for every `Fn(Props) -> impl Future<Output = anyhow::Result<Node>>`,
/// so async closures work directly.
pub trait Render: 'static {
    /// Produces a node from the given props.
    fn render(&self, props: Props) -> impl Future<Output = anyhow::Result<Node>>;

    /// The display name used when none is given explicitly.
    fn name(&self) -> Str {
        Str::from_static(type_name::<Self>())
    }
}

impl<F, Fut> Render for F
where
    F: Fn(Props) -> Fut + 'static,
    Fut: Future<Output = anyhow::Result<Node>>,
{
    fn render(&self, props: Props) -> impl Future<Output = anyhow::Result<Node>> {
        self(props)
    }
}

trait RenderImpl {
    fn render_boxed(&self, props: Props) -> LocalBoxFuture<'_, anyhow::Result<Node>>;
}

impl<R: Render> RenderImpl for R {
    fn render_boxed(&self, props: Props) -> LocalBoxFuture<'_, anyhow::Result<Node>> {
        Box::pin(self.render(props))
    }
}

/// A type-erased, shareable component.
///
/// Cloning is cheap; clones compare equal because they share the same
/// render function.
#[derive(Clone)]
pub struct Component {
    name: Str,
    render: Rc<dyn RenderImpl>,
}

impl Component {
    /// Creates a component from an async render function.
    pub fn new<F, Fut>(name: impl Into<Str>, render: F) -> Self
    where
        F: Fn(Props) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<Node>> + 'static,
    {
        Self {
            name: name.into(),
            render: Rc::new(render),
        }
    }

    /// Creates a component from any [`Render`] implementation, named after
    /// [`Render::name`].
    pub fn from_render(render: impl Render) -> Self {
        let name = render.name();
        Self {
            name,
            render: Rc::new(render),
        }
    }

    /// Creates a component from a synchronous render function.
    pub fn from_fn<F, N>(name: impl Into<Str>, render: F) -> Self
    where
        F: Fn(Props) -> N + 'static,
        N: Into<Node>,
    {
        Self::new(name, move |props: Props| {
            let node: Node = render(props).into();
            future::ready(Ok(node))
        })
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &Str {
        &self.name
    }

    /// Invokes the component.
    pub fn call(&self, props: Props) -> LocalBoxFuture<'_, anyhow::Result<Node>> {
        self.render.render_boxed(props)
    }

    /// Returns `true` if both handles share the same render function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Rc::as_ptr(&self.render), Rc::as_ptr(&other.render))
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Debug for Component {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Component {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.name, serializer)
    }
}
