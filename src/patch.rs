//! The `patch` entry point.
//!
//! [`patch`] is what a host calls before handing a tree to its renderer. It
//! accepts either a ready [`Node`] or a future that will produce one, awaits
//! it, resolves the whole tree, and returns a [`Patched`] wrapper that the
//! renderer can invoke without ever awaiting again.

use std::{fmt, rc::Rc};

use patchui_core::{Component, IntoTree, Node, Str};

use crate::{error::Result, resolve::Resolver};

/// A fully resolved tree, ready to be rendered synchronously.
///
/// Invoking it with [`Patched::render`] never does any asynchronous work;
/// every call returns the same tree wrapped in a fragment.
#[derive(Clone, PartialEq)]
pub struct Patched {
    root: Rc<Node>,
}

impl Patched {
    fn new(root: Node) -> Self {
        Self {
            root: Rc::new(root),
        }
    }

    /// Returns the resolved tree wrapped in a fragment.
    #[must_use]
    pub fn render(&self) -> Node {
        Node::fragment(Node::clone(&self.root))
    }

    /// Borrows the resolved root, without the fragment.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Turns the wrapper into a component that can be mounted in another
    /// tree. The component ignores its props.
    pub fn into_component(self, name: impl Into<Str>) -> Component {
        Component::from_fn(name, move |_| self.render())
    }
}

impl fmt::Debug for Patched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patched").field("root", &self.root).finish()
    }
}

impl Resolver {
    /// Awaits `input`, resolves it, and wraps the result for rendering.
    ///
    /// # Errors
    ///
    /// Fails if the pending input fails, or for any reason
    /// [`Resolver::resolve`] fails.
    pub async fn patch(&self, input: impl IntoTree) -> Result<Patched> {
        let root = input.into_tree().await?;
        let resolved = self.resolve(&root).await?;
        tracing::debug!(nodes = resolved.count(), "patched tree");
        Ok(Patched::new(resolved))
    }
}

/// Resolves `input` with the default [`Resolver`] and wraps the result.
///
/// # Errors
///
/// Fails with the first error raised by the input or by a component.
pub async fn patch(input: impl IntoTree) -> Result<Patched> {
    Resolver::default().patch(input).await
}
