//! # UI Error Types
//!
//! Protocol violations abort the frame being built and surface from
//! [`Context::new_frame`](crate::Context::new_frame). None of them are retried.

use glint_core::StateError;
use thiserror::Error;

/// Errors that can occur while building or emitting a frame.
#[derive(Error, Debug)]
pub enum UiError {
    /// Retained state access failed (collision or unregistered type).
    #[error(transparent)]
    State(#[from] StateError),

    /// `pop_region` was called with no open region.
    #[error("pop_region called with no open region")]
    PopWithoutPush,

    /// The frame ended with regions still open.
    #[error("frame ended with {open} unbalanced region(s)")]
    UnbalancedRegions {
        /// Number of regions left open.
        open: usize,
    },

    /// A bounds patch targeted an operation that is not a `push_region`.
    #[error("operation {index} is not a push_region")]
    NotARegion {
        /// Operation log index of the patch target.
        index: usize,
    },

    /// The font backend rejected a request.
    #[error("font error: {0}")]
    Font(String),

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configuration file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for UiError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;
