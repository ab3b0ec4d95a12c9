//! Starting points for resolution.

use core::future::Future;

use futures::{
    FutureExt,
    future::{self, LocalBoxFuture},
};

use crate::{Component, Node};

/// Anything a resolution can start from: a node, a component, or a future
/// that will produce a node.
pub trait IntoTree {
    /// Converts `self` into a future yielding the root node.
    fn into_tree(self) -> LocalBoxFuture<'static, anyhow::Result<Node>>;
}

impl IntoTree for Node {
    fn into_tree(self) -> LocalBoxFuture<'static, anyhow::Result<Node>> {
        future::ready(Ok(self)).boxed_local()
    }
}

impl IntoTree for Component {
    fn into_tree(self) -> LocalBoxFuture<'static, anyhow::Result<Node>> {
        Node::component(self).into_tree()
    }
}

impl<F> IntoTree for F
where
    F: Future<Output = anyhow::Result<Node>> + 'static,
{
    fn into_tree(self) -> LocalBoxFuture<'static, anyhow::Result<Node>> {
        self.boxed_local()
    }
}
