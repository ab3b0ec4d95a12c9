#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

pub mod error;
pub mod logging;
pub mod patch;
pub mod resolve;

#[doc(inline)]
pub use error::ResolveError;
#[doc(inline)]
pub use patch::{Patched, patch};
#[doc(inline)]
pub use resolve::{ResolveOptions, Resolver, SiblingOrder, resolve};

#[doc(inline)]
pub use patchui_core::{
    Children, Component, IntoTree, Node, NodeType, Prop, PropError, Props, Render, Rendered,
    Str, props,
};

pub mod prelude {
    //! The types and functions needed to build and resolve a tree.
    //!
    //! ```rust
    //! use patchui::prelude::*;
    //!
    //! let tree = Node::tag("div").with_child(Node::text("hello"));
    //! assert!(tree.is_resolved());
    //! ```
    pub use crate::{
        Children, Component, IntoTree, Node, NodeType, Patched, Prop, PropError, Props, Render,
        ResolveError, ResolveOptions, Resolver, SiblingOrder, patch, props, resolve,
    };
}

pub use anyhow;
pub use tracing as log;

#[cfg(test)]
mod tests;
