//! # GLINT Core
//!
//! The leaf layer of the GLINT immediate-mode UI:
//! - Deterministic widget identity derived from the call structure
//! - Plain value geometry (points, sizes, bounds, colors)
//! - A per-frame arena of recycled buffers
//! - The retained state manager that gives widgets memory across frames
//!
//! ## Identity
//!
//! Widgets never allocate or name their storage. A widget's [`Uid`] is the mix
//! of its parent's uid and a local tag, so the same nesting of calls yields the
//! same uid every frame:
//!
//! ```rust
//! use glint_core::Uid;
//!
//! let row = Uid::ROOT.mix(Uid::tag("row"));
//! let label = row.mix(Uid::tag("label"));
//! assert_eq!(label, Uid::ROOT.mix(Uid::tag("row")).mix(Uid::tag("label")));
//! ```
//!
//! ## Retained state
//!
//! ```rust
//! use glint_core::{StateManager, Uid};
//!
//! let mut state = StateManager::new();
//! let uid = Uid::tag("counter");
//! *state.ensure::<u32>(uid)? += 1;
//! assert_eq!(*state.ensure::<u32>(uid)?, 1);
//! # Ok::<(), glint_core::StateError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod color;
pub mod error;
pub mod geometry;
pub mod state;
pub mod uid;

pub use arena::{Arena, ArenaStats, ArenaVec};
pub use color::Color;
pub use error::{StateError, StateResult};
pub use geometry::{Bounds, Point, Size};
pub use state::{StateManager, TypeTag};
pub use uid::{fnv1a, Uid};
