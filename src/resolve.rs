//! # Tree resolution
//!
//! Resolution walks a [`Node`] tree depth-first and removes every pending
//! piece of work from it:
//!
//! - a **callable** node (a [`Component`](patchui_core::Component), or a
//!   [`Rendered`] left by an earlier pass) is invoked with a copy of its
//!   props, its output is awaited and resolved in turn, and the node's type
//!   is replaced by a [`Rendered`] holding that output under the
//!   component's name. The node's own children belong to the component and
//!   are left as they are.
//! - a **terminal** node keeps its type; its children, single or sequence,
//!   are resolved and substituted.
//!
//! ```text
//! <Page>                         <Page>            (Rendered)
//!   children: [<Header>, "x"]      <main>
//!                        ──▶         <Header>      (Rendered)
//!                                      <h1/>
//!                                    "x"
//! ```
//!
//! The caller's tree is never mutated: every substitution builds a new
//! node. Running the result through the resolver again yields an equal
//! tree.
//!
//! The walk keeps its pending work in a frame stack on the heap, so tall
//! trees cost memory rather than native stack. Concurrent siblings are the
//! exception: each concurrently resolved child runs its own walk.
//!
//! Siblings are resolved one at a time, left to right, so side effects in
//! components happen in document order. [`SiblingOrder::Concurrent`] trades
//! that guarantee for polling all siblings together.

use std::{iter, slice, vec};

use futures::{
    FutureExt,
    future::{LocalBoxFuture, try_join_all},
};
use patchui_core::{Children, Node, NodeType, Rendered, Str};
use tracing::Instrument;

use crate::error::{ResolveError, Result};

/// How the children of a sequence are awaited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SiblingOrder {
    /// One child at a time, in index order.
    #[default]
    Sequential,
    /// All children polled together on the current task. Output order still
    /// matches input order, but component side effects may interleave.
    Concurrent,
}

/// Options controlling a [`Resolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    siblings: SiblingOrder,
    max_depth: Option<usize>,
}

impl ResolveOptions {
    /// Creates the default options: sequential siblings, unbounded depth.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            siblings: SiblingOrder::Sequential,
            max_depth: None,
        }
    }

    /// Sets how sibling children are awaited.
    #[must_use]
    pub const fn siblings(mut self, order: SiblingOrder) -> Self {
        self.siblings = order;
        self
    }

    /// Fails resolution with [`ResolveError::DepthExceeded`] once the tree
    /// nests deeper than `limit`.
    #[must_use]
    pub const fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// Returns the sibling order.
    #[must_use]
    pub const fn sibling_order(&self) -> SiblingOrder {
        self.siblings
    }

    /// Returns the depth limit, if any.
    #[must_use]
    pub const fn depth_limit(&self) -> Option<usize> {
        self.max_depth
    }
}

/// Resolves node trees according to a set of [`ResolveOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    /// Creates a resolver with the given options.
    #[must_use]
    pub const fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// Returns the options this resolver was built with.
    #[must_use]
    pub const fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolves `node` into a tree with no pending components.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a component, unchanged, or
    /// [`ResolveError::DepthExceeded`] if a depth limit is configured and
    /// exceeded.
    pub async fn resolve(&self, node: &Node) -> Result<Node> {
        self.resolve_from(Source::Borrowed(node), 0).await
    }

    /// Drives the walk below `root` with a heap-allocated frame stack, so the
    /// native stack does not grow with the height of the tree.
    fn resolve_from<'a>(
        &'a self,
        root: Source<'a>,
        depth: usize,
    ) -> LocalBoxFuture<'a, Result<Node>> {
        async move {
            let mut stack: Vec<Frame<'a>> = Vec::new();
            let mut current = (root, depth);

            loop {
                let (source, depth) = current;
                self.check_depth(depth)?;

                let mut value = match self.enter(source, depth, &mut stack).await? {
                    Step::Descend(source, depth) => {
                        current = (source, depth);
                        continue;
                    }
                    Step::Done(node) => node,
                };

                current = loop {
                    match stack.pop() {
                        None => return Ok(value),
                        Some(Frame::Render { source, name }) => {
                            value = source.retyped(NodeType::Rendered(Rendered::new(name, value)));
                        }
                        Some(Frame::Children {
                            parent,
                            single,
                            mut pending,
                            mut resolved,
                            depth,
                        }) => {
                            resolved.push(value);
                            if let Some(next) = pending.next() {
                                stack.push(Frame::Children {
                                    parent,
                                    single,
                                    pending,
                                    resolved,
                                    depth,
                                });
                                break (next, depth + 1);
                            }
                            value = parent.with_children(single, resolved);
                        }
                    }
                };
            }
        }
        .boxed_local()
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if let Some(limit) = self.options.max_depth
            && depth > limit
        {
            tracing::debug!(limit, "depth limit exceeded");
            return Err(ResolveError::DepthExceeded { limit });
        }
        Ok(())
    }

    /// Handles one node. Callable nodes are invoked here and their output is
    /// handed back for the caller to walk into.
    async fn enter<'a>(
        &'a self,
        source: Source<'a>,
        depth: usize,
        stack: &mut Vec<Frame<'a>>,
    ) -> Result<Step<'a>> {
        let (name, output) = match source.node().ty() {
            NodeType::Component(component) => {
                let name = component.name().clone();
                let span = tracing::debug_span!("render", component = %name, depth);
                let output = component
                    .call(source.node().props().clone())
                    .instrument(span)
                    .await
                    .inspect_err(|err| {
                        tracing::debug!(component = %name, error = %err, "component failed");
                    })?;
                (name, output)
            }
            NodeType::Rendered(rendered) => {
                tracing::trace!(component = %rendered.name(), depth, "re-rendering");
                (rendered.name().clone(), rendered.call())
            }
            NodeType::Tag(_) | NodeType::Text(_) | NodeType::Fragment => {
                return self.enter_children(source, depth, stack).await;
            }
        };

        stack.push(Frame::Render { source, name });
        Ok(Step::Descend(Source::Owned(output), depth + 1))
    }

    async fn enter_children<'a>(
        &'a self,
        source: Source<'a>,
        depth: usize,
        stack: &mut Vec<Frame<'a>>,
    ) -> Result<Step<'a>> {
        let (parent, single, mut pending) = match source {
            Source::Borrowed(node) => match node.children() {
                None => return Ok(Step::Done(node.clone())),
                Some(Children::Single(child)) => (
                    Source::Borrowed(node),
                    true,
                    Pending::Borrowed(slice::from_ref(&**child).iter()),
                ),
                Some(Children::Many(nodes)) => {
                    (Source::Borrowed(node), false, Pending::Borrowed(nodes.iter()))
                }
            },
            Source::Owned(mut node) => match node.take_children() {
                None => return Ok(Step::Done(node)),
                Some(Children::Single(child)) => {
                    (Source::Owned(node), true, Pending::Owned(vec![*child].into_iter()))
                }
                Some(Children::Many(nodes)) => {
                    (Source::Owned(node), false, Pending::Owned(nodes.into_iter()))
                }
            },
        };

        if !single && self.options.siblings == SiblingOrder::Concurrent {
            tracing::trace!(count = pending.len(), depth, "resolving children together");
            let resolved = try_join_all(
                iter::from_fn(|| pending.next()).map(move |child| self.resolve_from(child, depth + 1)),
            )
            .await?;
            return Ok(Step::Done(parent.with_children(false, resolved)));
        }

        tracing::trace!(count = pending.len(), depth, "resolving children");
        match pending.next() {
            None => Ok(Step::Done(parent.with_children(single, Vec::new()))),
            Some(child) => {
                stack.push(Frame::Children {
                    parent,
                    single,
                    pending,
                    resolved: Vec::new(),
                    depth,
                });
                Ok(Step::Descend(child, depth + 1))
            }
        }
    }
}

/// A node being resolved: either part of the caller's tree or produced by a
/// component during this pass.
enum Source<'a> {
    Borrowed(&'a Node),
    Owned(Node),
}

impl Source<'_> {
    fn node(&self) -> &Node {
        match self {
            Self::Borrowed(node) => node,
            Self::Owned(node) => node,
        }
    }

    fn retyped(self, ty: NodeType) -> Node {
        match self {
            Self::Borrowed(node) => node.with_type(ty),
            Self::Owned(mut node) => {
                node.set_type(ty);
                node
            }
        }
    }

    /// Rebuilds the parent around its resolved children. An owned parent
    /// had its children moved out when it was entered.
    fn with_children(self, single: bool, mut resolved: Vec<Node>) -> Node {
        let children = if single && let Some(only) = resolved.pop() {
            Children::from(only)
        } else {
            Children::Many(resolved)
        };
        match self {
            Self::Borrowed(node) => node.with_children_slot(children),
            Self::Owned(mut node) => {
                node.set_children(Some(children));
                node
            }
        }
    }
}

/// Children still waiting to be resolved.
enum Pending<'a> {
    Borrowed(slice::Iter<'a, Node>),
    Owned(vec::IntoIter<Node>),
}

impl<'a> Pending<'a> {
    fn next(&mut self) -> Option<Source<'a>> {
        match self {
            Self::Borrowed(nodes) => nodes.next().map(Source::Borrowed),
            Self::Owned(nodes) => nodes.next().map(Source::Owned),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Borrowed(nodes) => nodes.len(),
            Self::Owned(nodes) => nodes.len(),
        }
    }
}

/// Work suspended while a descendant is being resolved.
enum Frame<'a> {
    /// A callable whose output is being resolved.
    Render { source: Source<'a>, name: Str },
    /// A terminal node partway through its children.
    Children {
        parent: Source<'a>,
        single: bool,
        pending: Pending<'a>,
        resolved: Vec<Node>,
        depth: usize,
    },
}

enum Step<'a> {
    Descend(Source<'a>, usize),
    Done(Node),
}

/// Resolves `node` with the default [`Resolver`].
///
/// # Errors
///
/// Returns the first error raised by a component, unchanged.
pub async fn resolve(node: &Node) -> Result<Node> {
    Resolver::default().resolve(node).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use patchui_core::{Component, Props};

    #[test]
    fn terminal_without_children_is_unchanged() {
        let node = Node::tag("hr").with_prop("class", "thin");
        assert_eq!(block_on(resolve(&node)).unwrap(), node);
    }

    #[test]
    fn component_becomes_rendered() {
        let badge = Component::from_fn("Badge", |_| Node::tag("span"));
        let out = block_on(resolve(&Node::component(badge))).unwrap();

        let NodeType::Rendered(rendered) = out.ty() else {
            panic!("expected a rendered node, got {out:?}");
        };
        assert_eq!(rendered.name(), "Badge");
        assert_eq!(rendered.call(), Node::tag("span"));
    }

    #[test]
    fn component_children_are_left_to_the_component() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let inner = Component::from_fn("Inner", {
            let calls = calls.clone();
            move |_| {
                calls.set(calls.get() + 1);
                Node::text("inner")
            }
        });
        let outer = Component::from_fn("Outer", |_| Node::tag("div"));
        let tree = Node::component(outer).with_child(Node::component(inner.clone()));

        let out = block_on(resolve(&tree)).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(out.children(), Some(&Children::from(Node::component(inner))));
    }

    #[test]
    fn single_child_is_resolved() {
        let item = Component::from_fn("Item", |_| Node::text("x"));
        let tree = Node::tag("li").with_child(Node::component(item));

        let out = block_on(resolve(&tree)).unwrap();
        assert!(out.is_resolved());
        assert!(matches!(out.children(), Some(Children::Single(_))));
    }

    #[test]
    fn empty_sequence_is_kept() {
        let list = Node::tag("ul").with_children([]);
        let out = block_on(resolve(&list)).unwrap();

        assert_eq!(out, list);
        assert_eq!(out.children(), Some(&Children::Many(Vec::new())));
    }

    #[test]
    fn empty_sequence_from_a_component_is_kept() {
        let empty = Component::from_fn("Empty", |_| Node::fragment(Vec::<Node>::new()));
        let out = block_on(resolve(&Node::component(empty))).unwrap();

        let NodeType::Rendered(rendered) = out.ty() else {
            panic!("expected a rendered node");
        };
        assert_eq!(rendered.node().children(), Some(&Children::Many(Vec::new())));
    }

    #[test]
    fn component_receives_a_copy_of_props() {
        let echo = Component::new("Echo", |props: Props| async move {
            Ok(Node::tag("p").with_prop("title", props.str("title")?.clone()))
        });
        let tree = Node::component(echo).with_prop("title", "hello");

        let out = block_on(resolve(&tree)).unwrap();
        assert_eq!(out.props().str("title").unwrap(), "hello");
        let NodeType::Rendered(rendered) = out.ty() else {
            panic!("expected a rendered node");
        };
        assert_eq!(rendered.node().props().str("title").unwrap(), "hello");
    }

    #[test]
    fn depth_limit() {
        let leaf = Node::tag("a").with_child(Node::tag("b").with_child(Node::tag("c")));
        let shallow = Resolver::new(ResolveOptions::new().max_depth(1));
        let deep = Resolver::new(ResolveOptions::new().max_depth(2));

        assert!(matches!(
            block_on(shallow.resolve(&leaf)),
            Err(ResolveError::DepthExceeded { limit: 1 })
        ));
        assert_eq!(block_on(deep.resolve(&leaf)).unwrap(), leaf);
    }

    #[test]
    fn options_builder() {
        let options = ResolveOptions::new()
            .siblings(SiblingOrder::Concurrent)
            .max_depth(64);
        assert_eq!(options.sibling_order(), SiblingOrder::Concurrent);
        assert_eq!(options.depth_limit(), Some(64));
        assert_eq!(ResolveOptions::default(), ResolveOptions::new());
    }
}
