//! Errors surfaced by resolution.

use core::fmt::{Debug, Display};

use thiserror::Error;

/// The reason a resolution failed.
///
/// Faults raised by components, or by a pending input handed to
/// [`patch`](crate::patch), are carried through untouched: the displayed
/// message is the original one and the original error can be recovered with
/// [`ResolveError::downcast_ref`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A component or pending input failed.
    #[error(transparent)]
    Render(#[from] anyhow::Error),
    /// The tree nested deeper than the configured limit.
    #[error("resolution exceeded the maximum depth of {limit}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

impl ResolveError {
    /// Returns the original error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        match self {
            Self::Render(err) => err.downcast_ref(),
            Self::DepthExceeded { .. } => None,
        }
    }

    /// Returns `true` if the failure came from a component or pending input.
    #[must_use]
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = ResolveError> = core::result::Result<T, E>;
