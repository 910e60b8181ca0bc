//! # Core Error Types
//!
//! Errors raised by the retained state manager. Both variants are protocol
//! violations by the calling widget code.

use crate::state::TypeTag;
use crate::uid::Uid;
use thiserror::Error;

/// Errors that can occur when accessing retained state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Storage was requested for a type that was never registered.
    #[error("state type {type_name} accessed before registration")]
    Unregistered {
        /// Rust name of the requested type.
        type_name: &'static str,
    },

    /// A uid was requested with a different type than it was created with.
    #[error("hash collision on {uid}: stored as {stored}, requested as {requested}")]
    Collision {
        /// The colliding uid.
        uid: Uid,
        /// Type the uid was first stored with.
        stored: TypeTag,
        /// Type of the failing request.
        requested: TypeTag,
    },
}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;
