//! Render backend interface.
//!
//! The core hands the backend one finished [`CommandList`] per frame and asks
//! it to present. Everything GPU-specific lives behind [`RenderBackend`].

use crate::command::{CommandKind, CommandList, TextureId};
use glint_core::Size;

/// Pixel layout of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelFormat {
    /// Single 8-bit channel (glyph coverage).
    R8,
    /// Four 8-bit channels.
    Rgba8,
}

impl ChannelFormat {
    /// Bytes per pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::R8 => 1,
            Self::Rgba8 => 4,
        }
    }
}

/// Consumer of emitted command lists.
pub trait RenderBackend {
    /// Replaces the list drawn by subsequent [`emit`](Self::emit) calls.
    fn update_command_list(&mut self, commands: CommandList);

    /// Allocates a texture and returns its handle.
    fn create_texture(&mut self, width: u32, height: u32, format: ChannelFormat) -> TextureId;

    /// Draws the current list to a target of `size` pixels.
    fn emit(&mut self, size: Size);
}

/// Description of a texture created through [`HeadlessRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: ChannelFormat,
}

/// Backend that records what it is given instead of drawing.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    commands: CommandList,
    textures: Vec<TextureInfo>,
    updates: usize,
    emits: usize,
    last_size: Option<Size>,
}

impl HeadlessRenderer {
    /// Creates a recorder with no textures and an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent command list.
    #[must_use]
    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    /// Number of command list updates received.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Number of emit calls received.
    #[must_use]
    pub fn emits(&self) -> usize {
        self.emits
    }

    /// Target size of the last emit.
    #[must_use]
    pub fn last_size(&self) -> Option<Size> {
        self.last_size
    }

    /// Textures created so far, indexed by [`TextureId`].
    #[must_use]
    pub fn textures(&self) -> &[TextureInfo] {
        &self.textures
    }

    /// Total vertices in the current list.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.commands.iter().map(|command| command.vertex_count()).sum()
    }
}

impl RenderBackend for HeadlessRenderer {
    fn update_command_list(&mut self, commands: CommandList) {
        self.commands = commands;
        self.updates += 1;
    }

    fn create_texture(&mut self, width: u32, height: u32, format: ChannelFormat) -> TextureId {
        let id = TextureId(u32::try_from(self.textures.len()).unwrap_or(u32::MAX));
        self.textures.push(TextureInfo {
            width,
            height,
            format,
        });
        id
    }

    fn emit(&mut self, size: Size) {
        for command in &self.commands {
            if let CommandKind::Native(callback) = &command.kind {
                callback.invoke(command.clip);
            }
        }
        self.emits += 1;
        self.last_size = Some(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, NativeCallback};
    use glint_core::Bounds;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_texture_ids_are_sequential() {
        let mut renderer = HeadlessRenderer::new();
        assert_eq!(renderer.create_texture(256, 256, ChannelFormat::R8), TextureId(0));
        assert_eq!(renderer.create_texture(64, 64, ChannelFormat::Rgba8), TextureId(1));
        assert_eq!(renderer.textures()[1].format.bytes_per_pixel(), 4);
    }

    #[test]
    fn test_emit_runs_native_callbacks() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let mut renderer = HeadlessRenderer::new();
        renderer.update_command_list(vec![Command {
            clip: Bounds::new(0.0, 0.0, 4.0, 4.0),
            kind: CommandKind::Native(NativeCallback::new(move |clip| {
                assert_eq!(clip.width(), 4.0);
                counter.set(counter.get() + 1);
            })),
        }]);
        renderer.emit(Size::new(4.0, 4.0));
        assert_eq!(hits.get(), 1);
        assert_eq!(renderer.emits(), 1);
        assert_eq!(renderer.last_size(), Some(Size::new(4.0, 4.0)));
    }
}
