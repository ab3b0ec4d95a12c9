#![no_std]
//! Node model for `patchui`.
//!
//! This crate defines the tree that the resolver walks:
//!
//! - [`Node`] and [`NodeType`]: a unit of UI and what kind it is,
//! - [`Props`], [`Prop`] and [`Children`]: the record a node carries,
//! - [`Component`] and [`Render`]: callables that produce nodes,
//! - [`Rendered`]: the zero-argument callable left behind once a component
//!   has been resolved.
//!
//! Everything here is single-threaded. Components and rendered subtrees are
//! shared through `Rc`, and their futures are `!Send`.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;
pub mod component;
pub mod node;
pub mod props;
pub mod tree;

#[doc(inline)]
pub use component::{Component, Render};
#[doc(inline)]
pub use node::{Node, NodeType, Rendered};
#[doc(inline)]
pub use props::{Children, Prop, PropError, Props};
#[doc(inline)]
pub use tree::IntoTree;

pub use anyhow;
pub use patchui_str::Str;
