//! Property records passed to components.
//!
//! A [`Props`] value is an ordered record of named [`Prop`] values plus an
//! optional [`Children`] slot. Components receive a shallow copy of their
//! node's props when they are invoked, so reading from it never affects the
//! tree being resolved.

use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt::{self, Display};

use crate::{Node, Str};

/// A single property value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Prop {
    /// The absence of a value.
    #[default]
    Null,
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(Str),
    /// An ordered list of values.
    List(Vec<Prop>),
}

impl Prop {
    /// Returns the name of this value's kind, as reported in [`PropError`].
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
        }
    }

    /// Returns `true` for [`Prop::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean value, if this is a [`Prop::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is a [`Prop::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Returns the string value, if this is a [`Prop::Str`].
    #[must_use]
    pub const fn as_str(&self) -> Option<&Str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the list items, if this is a [`Prop::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{:?}", value.as_str()),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_prop_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Prop {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_prop_from! {
    bool => Bool,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    i16 => Int,
    u16 => Int,
    u8 => Int,
    f64 => Float,
    f32 => Float,
    Str => Str,
    &'static str => Str,
    String => Str,
}

impl<T: Into<Self>> From<Vec<T>> for Prop {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Prop {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// The `children` slot of a [`Props`] record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Children {
    /// A single child node.
    Single(Box<Node>),
    /// An ordered sequence of child nodes.
    Many(Vec<Node>),
}

impl Children {
    /// Returns the number of child nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(nodes) => nodes.len(),
        }
    }

    /// Returns `true` if this is an empty sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the child nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let (single, many) = match self {
            Self::Single(node) => (Some(&**node), [].as_slice()),
            Self::Many(nodes) => (None, nodes.as_slice()),
        };
        single.into_iter().chain(many)
    }

    /// Appends a node, turning a single child into a sequence.
    #[must_use]
    pub fn push(self, node: Node) -> Self {
        match self {
            Self::Single(first) => Self::Many(alloc::vec![*first, node]),
            Self::Many(mut nodes) => {
                nodes.push(node);
                Self::Many(nodes)
            }
        }
    }
}

impl From<Node> for Children {
    fn from(node: Node) -> Self {
        Self::Single(Box::new(node))
    }
}

impl From<Vec<Node>> for Children {
    fn from(nodes: Vec<Node>) -> Self {
        Self::Many(nodes)
    }
}

impl FromIterator<Node> for Children {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::Many(iter.into_iter().collect())
    }
}

/// Errors raised by the typed accessors on [`Props`].
///
/// Keys are stored as owned strings so the error can cross into
/// `anyhow::Error` from inside a component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropError {
    /// The requested key is not present.
    #[error("missing prop `{key}`")]
    Missing {
        /// The requested key.
        key: String,
    },
    /// The key is present but holds a different kind of value.
    #[error("prop `{key}` expected {expected}, found {found}")]
    Mismatch {
        /// The requested key.
        key: String,
        /// The kind the caller asked for.
        expected: &'static str,
        /// The kind actually stored.
        found: &'static str,
    },
}

/// A record of named property values with an optional children slot.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Props {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub(crate) values: BTreeMap<Str, Prop>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub(crate) children: Option<Children>,
}

impl Props {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            children: None,
        }
    }

    /// Inserts a value, returning the previous one under that key.
    pub fn insert(&mut self, key: impl Into<Str>, value: impl Into<Prop>) -> Option<Prop> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder form of [`Props::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<Str>, value: impl Into<Prop>) -> Self {
        self.insert(key, value);
        self
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<Prop> {
        self.values.remove(key)
    }

    /// Returns the value under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.values.get(key)
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of named values, not counting children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are neither named values nor children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.children.is_none()
    }

    /// Iterates over the named values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Str, &Prop)> {
        self.values.iter()
    }

    /// Returns the value under `key` or a [`PropError::Missing`].
    ///
    /// # Errors
    ///
    /// Fails if the key is absent.
    pub fn require(&self, key: &str) -> Result<&Prop, PropError> {
        self.get(key).ok_or_else(|| PropError::Missing {
            key: key.to_string(),
        })
    }

    /// Reads a string value.
    ///
    /// # Errors
    ///
    /// Fails if the key is absent or does not hold a string.
    pub fn str(&self, key: &str) -> Result<&Str, PropError> {
        let prop = self.require(key)?;
        prop.as_str().ok_or_else(|| mismatch(key, "str", prop))
    }

    /// Reads a boolean value.
    ///
    /// # Errors
    ///
    /// Fails if the key is absent or does not hold a bool.
    pub fn bool(&self, key: &str) -> Result<bool, PropError> {
        let prop = self.require(key)?;
        prop.as_bool().ok_or_else(|| mismatch(key, "bool", prop))
    }

    /// Reads an integer value.
    ///
    /// # Errors
    ///
    /// Fails if the key is absent or does not hold an int.
    pub fn int(&self, key: &str) -> Result<i64, PropError> {
        let prop = self.require(key)?;
        prop.as_int().ok_or_else(|| mismatch(key, "int", prop))
    }

    /// Reads a numeric value, widening integers.
    ///
    /// # Errors
    ///
    /// Fails if the key is absent or does not hold a number.
    pub fn float(&self, key: &str) -> Result<f64, PropError> {
        let prop = self.require(key)?;
        prop.as_float().ok_or_else(|| mismatch(key, "float", prop))
    }

    /// Reads a list value.
    ///
    /// # Errors
    ///
    /// Fails if the key is absent or does not hold a list.
    pub fn list(&self, key: &str) -> Result<&[Prop], PropError> {
        let prop = self.require(key)?;
        prop.as_list().ok_or_else(|| mismatch(key, "list", prop))
    }

    /// Returns the children slot.
    #[must_use]
    pub const fn children(&self) -> Option<&Children> {
        self.children.as_ref()
    }

    /// Replaces the children slot.
    pub fn set_children(&mut self, children: Option<Children>) {
        self.children = children;
    }

    /// Builder form of [`Props::set_children`].
    #[must_use]
    pub fn with_children(mut self, children: impl Into<Children>) -> Self {
        self.children = Some(children.into());
        self
    }

    /// Removes and returns the children slot.
    pub fn take_children(&mut self) -> Option<Children> {
        self.children.take()
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Prop) -> PropError {
    PropError::Mismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

impl<K: Into<Str>, V: Into<Prop>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            children: None,
        }
    }
}
