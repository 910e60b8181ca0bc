//! GPU-facing draw commands.
//!
//! A [`Command`] is the unit handed to the render backend: a clip rectangle
//! plus either a batch of vertices or a native callback.

use bytemuck::{Pod, Zeroable};
use glint_core::{Bounds, Color, Point};
use std::fmt;
use std::rc::Rc;

/// Handle of a texture owned by the render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

/// Primitive topology of a vertex batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// One vertex per point, drawn as squares of `Batch::size`.
    Points,
    /// Two vertices per segment, drawn `Batch::size` wide.
    Lines,
    /// Three vertices per triangle.
    Triangles,
}

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position (x, y) in pixels.
    pub position: [f32; 2],
    /// UV coordinates.
    pub uv: [f32; 2],
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl Vertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(x: f32, y: f32, u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            color,
        }
    }

    /// Creates an untextured vertex.
    #[must_use]
    pub const fn solid(at: Point, color: Color) -> Self {
        Self::new(at.x, at.y, 0.0, 0.0, color.to_array())
    }
}

/// A list of vertices drawn with one pipeline state.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// How vertices are assembled.
    pub topology: Topology,
    /// The vertex list.
    pub vertices: Vec<Vertex>,
    /// Sampled texture, if any.
    pub texture: Option<TextureId>,
    /// Line width or point size. Zero for triangles.
    pub size: f32,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new(topology: Topology, texture: Option<TextureId>, size: f32) -> Self {
        Self {
            topology,
            vertices: Vec::new(),
            texture,
            size,
        }
    }

    /// Returns true if `other` can be appended to this batch.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.topology == other.topology
            && self.texture == other.texture
            && self.size.to_bits() == other.size.to_bits()
    }

    /// Bounding box of all vertex positions.
    #[must_use]
    pub fn vertex_bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?;
        let start = Bounds::new(first.position[0], first.position[1], first.position[0], first.position[1]);
        Some(self.vertices.iter().fold(start, |acc, vertex| {
            Bounds::new(
                acc.left.min(vertex.position[0]),
                acc.top.min(vertex.position[1]),
                acc.right.max(vertex.position[0]),
                acc.bottom.max(vertex.position[1]),
            )
        }))
    }
}

/// Escape hatch: backend-specific drawing invoked with the clip rectangle.
#[derive(Clone)]
pub struct NativeCallback(Rc<dyn Fn(Bounds)>);

impl NativeCallback {
    /// Wraps a callback.
    pub fn new(callback: impl Fn(Bounds) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Runs the callback.
    pub fn invoke(&self, clip: Bounds) {
        (self.0)(clip);
    }
}

impl fmt::Debug for NativeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeCallback(..)")
    }
}

/// Payload of a [`Command`].
#[derive(Debug, Clone)]
pub enum CommandKind {
    /// Vertex batch.
    Batch(Batch),
    /// Native callback.
    Native(NativeCallback),
}

/// One clipped draw instruction.
#[derive(Debug, Clone)]
pub struct Command {
    /// Scissor rectangle in pixels.
    pub clip: Bounds,
    /// What to draw.
    pub kind: CommandKind,
}

impl Command {
    /// Returns the batch, if this is a batch command.
    #[must_use]
    pub fn batch(&self) -> Option<&Batch> {
        match &self.kind {
            CommandKind::Batch(batch) => Some(batch),
            CommandKind::Native(_) => None,
        }
    }

    /// Number of vertices (zero for native callbacks).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.batch().map_or(0, |batch| batch.vertices.len())
    }
}

/// The emitter's output for one frame.
pub type CommandList = Vec<Command>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        let pair = [Vertex::default(); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&pair);
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn test_batch_compatibility() {
        let a = Batch::new(Topology::Triangles, None, 0.0);
        let b = Batch::new(Topology::Triangles, None, 0.0);
        let c = Batch::new(Topology::Triangles, Some(TextureId(1)), 0.0);
        let d = Batch::new(Topology::Lines, None, 2.0);
        assert!(a.is_compatible(&b));
        assert!(!a.is_compatible(&c));
        assert!(!a.is_compatible(&d));
    }

    #[test]
    fn test_vertex_bounds() {
        let mut batch = Batch::new(Topology::Triangles, None, 0.0);
        assert!(batch.vertex_bounds().is_none());
        batch.vertices.push(Vertex::solid(Point::new(4.0, 9.0), Color::WHITE));
        batch.vertices.push(Vertex::solid(Point::new(1.0, 12.0), Color::WHITE));
        assert_eq!(batch.vertex_bounds(), Some(Bounds::new(1.0, 9.0, 4.0, 12.0)));
    }
}
