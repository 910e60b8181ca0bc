//! # GLINT UI
//!
//! Immediate-mode UI core: widgets are plain function calls made every frame,
//! and everything that must outlive a frame is keyed by a deterministic
//! [`Uid`](glint_core::Uid) in the state manager.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FRAME PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  widgets → Canvas (op log) → layouts patch bounds → Emitter  │
//! │      ↓            ↓                                   ↓      │
//! │  StateManager  RootCanvas                 CommandList → RenderBackend
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use glint_core::Uid;
//! use glint_ui::layout::{layout_row, Align};
//! use glint_ui::{widgets, Context, GlintConfig, HeadlessRenderer, InputState, MonospaceFonts};
//!
//! let mut ctx = Context::new(
//!     GlintConfig::default(),
//!     InputState::new(),
//!     MonospaceFonts::new(),
//!     HeadlessRenderer::new(),
//! );
//! let stats = ctx.new_frame(200.0, 100.0, 0.016, |canvas| {
//!     layout_row(canvas, Uid::tag("toolbar"), Align::Left, |row| {
//!         widgets::text(row, Uid::tag("title"), "Hello");
//!         row.newline()?;
//!         widgets::button_label(row, Uid::tag("exit"), "Exit")?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! assert!(stats.commands > 0);
//! # Ok::<(), glint_ui::UiError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod canvas;
pub mod command;
pub mod config;
pub mod context;
pub mod emitter;
pub mod error;
pub mod fade;
pub mod fonts;
pub mod input;
pub mod layout;
pub mod optimizer;
pub mod primitive;
pub mod render;
pub mod style;
pub mod widgets;

pub use canvas::{Canvas, CanvasExt, RegionHandle, RootCanvas};
pub use command::{Batch, Command, CommandKind, CommandList, NativeCallback, TextureId, Topology, Vertex};
pub use config::{ContextConfig, GlintConfig};
pub use context::{Context, FrameStats};
pub use emitter::{calculate_bounds, transform, Emitter};
pub use error::{UiError, UiResult};
pub use fade::Fade;
pub use fonts::{FontBackend, FontId, Glyph, MonoFace, MonospaceFonts};
pub use input::{CursorShape, InputBackend, InputState, Key, Modifier, MouseButton};
pub use optimizer::optimize;
pub use primitive::{ButtonState, CustomPrimitive, Fill, Op, Primitive};
pub use render::{ChannelFormat, HeadlessRenderer, RenderBackend};
pub use style::Style;
