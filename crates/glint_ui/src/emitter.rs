//! # Emitter
//!
//! Turns a frame's operation log into clipped [`Command`]s.
//!
//! One pass over the log keeps a stack of `(origin, clip)` pairs seeded with
//! the whole canvas. A region whose clip rectangle is empty is discarded along
//! with everything nested inside it. Geometry that survives is cropped against
//! the active clip on the CPU:
//!
//! | Primitive            | Cropping                           |
//! |----------------------|------------------------------------|
//! | rect, button frame   | Sutherland–Hodgman, fan triangles  |
//! | image, glyph         | proportional UV crop of the quad   |
//! | line                 | Liang–Barsky                       |
//! | point                | containment                        |

use crate::command::{Batch, Command, CommandKind, CommandList, Topology, Vertex};
use crate::fonts::{measure_text, resolve_glyph, FontBackend, FontId};
use crate::primitive::{ButtonState, Fill, Op, Primitive};
use crate::style::Style;
use glint_core::{Bounds, Color, Point, Size};
use smallvec::SmallVec;

type Polygon = SmallVec<[Point; 64]>;

/// Arc segments per rounded corner.
const CORNER_SEGMENTS: usize = 4;

/// Intrinsic size of a primitive, used by layouts to wrap bare primitives.
#[must_use]
pub fn calculate_bounds(primitive: &Primitive, style: &Style, fonts: &dyn FontBackend) -> Size {
    match primitive {
        Primitive::Rect { bounds, .. } | Primitive::Image { bounds, .. } => bounds.size(),
        Primitive::Line { from, to, width, .. } => {
            Bounds::from_points(*from, *to).expand(width * 0.5).size()
        }
        Primitive::Point { size, .. } => Size::new(*size, *size),
        Primitive::Text { text, font, .. } => {
            measure_text(fonts, style, font.unwrap_or(style.default_font), text)
        }
        Primitive::Button { content, .. } => content.pad(style.padding),
        Primitive::Custom(custom) => custom.size(style, fonts),
    }
}

/// Converts `ops` to commands with default settings.
#[must_use]
pub fn transform(canvas_size: Size, ops: &[Op], style: &Style, fonts: &dyn FontBackend) -> CommandList {
    let mut commands = CommandList::new();
    Emitter::new(style, fonts).transform(canvas_size, ops, &mut commands);
    commands
}

/// Single-pass op log to command converter.
pub struct Emitter<'a> {
    style: &'a Style,
    fonts: &'a dyn FontBackend,
    discarded_regions: usize,
}

impl<'a> Emitter<'a> {
    /// Creates an emitter reading `style` and `fonts`.
    #[must_use]
    pub fn new(style: &'a Style, fonts: &'a dyn FontBackend) -> Self {
        Self {
            style,
            fonts,
            discarded_regions: 0,
        }
    }

    /// Number of regions skipped because their clip was empty, nested ones
    /// included, over every call to [`transform`](Self::transform).
    #[must_use]
    pub fn discarded_regions(&self) -> usize {
        self.discarded_regions
    }

    /// Appends the commands for `ops` to `out`.
    pub fn transform(&mut self, canvas_size: Size, ops: &[Op], out: &mut CommandList) {
        let mut stack: SmallVec<[(Point, Bounds); 16]> = SmallVec::new();
        stack.push((Point::ZERO, Bounds::from_size(canvas_size)));
        let mut discard = 0usize;

        for op in ops {
            match op {
                Op::PushRegion { bounds, .. } => {
                    if discard > 0 {
                        discard += 1;
                        self.discarded_regions += 1;
                        continue;
                    }
                    let (origin, clip) = stack[stack.len() - 1];
                    let absolute = bounds.offset(origin);
                    let region_clip = absolute.intersection(&clip);
                    if region_clip.is_empty() {
                        discard = 1;
                        self.discarded_regions += 1;
                    } else {
                        stack.push((absolute.origin(), region_clip));
                    }
                }
                Op::PopRegion => {
                    if discard > 0 {
                        discard -= 1;
                    } else if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Op::Primitive(primitive) => {
                    if discard == 0 {
                        let (origin, clip) = stack[stack.len() - 1];
                        self.emit(primitive, origin, clip, out);
                    }
                }
            }
        }
    }

    fn emit(&self, primitive: &Primitive, origin: Point, clip: Bounds, out: &mut CommandList) {
        match primitive {
            Primitive::Rect {
                bounds,
                color,
                fill,
                rounding,
            } => {
                let bounds = bounds.offset(origin);
                let batch = match fill {
                    Fill::Solid => fill_rect(bounds, *rounding, *color, clip),
                    Fill::Stroke(width) => stroke_rect(bounds, *rounding, *width, *color, clip),
                };
                push_batch(out, clip, batch);
            }
            Primitive::Line {
                from,
                to,
                color,
                width,
            } => {
                if let Some((a, b)) = clip_segment(*from + origin, *to + origin, clip) {
                    let mut batch = Batch::new(Topology::Lines, None, *width);
                    batch.vertices.push(Vertex::solid(a, *color));
                    batch.vertices.push(Vertex::solid(b, *color));
                    push_batch(out, clip, batch);
                }
            }
            Primitive::Point { at, color, size } => {
                let at = *at + origin;
                if *size > 0.0 && clip.contains(at) {
                    let mut batch = Batch::new(Topology::Points, None, *size);
                    batch.vertices.push(Vertex::solid(at, *color));
                    push_batch(out, clip, batch);
                }
            }
            Primitive::Image {
                bounds,
                texture,
                uv,
                tint,
            } => {
                let mut batch = Batch::new(Topology::Triangles, Some(*texture), 0.0);
                textured_quad(&mut batch, bounds.offset(origin), *uv, *tint, clip);
                push_batch(out, clip, batch);
            }
            Primitive::Text { text, font, color } => {
                let font = font.unwrap_or(self.style.default_font);
                let color = color.unwrap_or(self.style.font_color);
                self.emit_text(text, font, color, origin, clip, out);
            }
            Primitive::Button {
                content,
                state,
                highlight,
            } => {
                let frame = Bounds::from_size(content.pad(self.style.padding)).offset(origin);
                let fill = button_color(self.style, *state, *highlight);
                push_batch(out, clip, fill_rect(frame, self.style.rounding, fill, clip));
                if self.style.bounds_edge_width > 0.0 {
                    let edge = stroke_rect(
                        frame,
                        self.style.rounding,
                        self.style.bounds_edge_width,
                        self.style.edge_color,
                        clip,
                    );
                    push_batch(out, clip, edge);
                }
            }
            Primitive::Custom(custom) => custom.emit(origin, clip, self.style, out),
        }
    }

    fn emit_text(
        &self,
        text: &str,
        font: FontId,
        color: Color,
        origin: Point,
        clip: Bounds,
        out: &mut CommandList,
    ) {
        let mut pen = origin.x;
        let mut batch: Option<Batch> = None;

        for ch in text.chars() {
            if pen >= clip.right {
                break;
            }
            let Some(glyph) = resolve_glyph(self.fonts, self.style, font, ch) else {
                continue;
            };
            if glyph.size.width > 0.0 && glyph.size.height > 0.0 {
                if batch.as_ref().is_some_and(|b| b.texture != Some(glyph.texture)) {
                    if let Some(done) = batch.take() {
                        push_batch(out, clip, done);
                    }
                }
                let current = batch
                    .get_or_insert_with(|| Batch::new(Topology::Triangles, Some(glyph.texture), 0.0));
                let cell = Point::new(pen, origin.y) + glyph.bearing;
                textured_quad(current, Bounds::from_pos_size(cell, glyph.size), glyph.uv, color, clip);
            }
            pen += glyph.advance;
        }

        if let Some(done) = batch {
            push_batch(out, clip, done);
        }
    }
}

fn push_batch(out: &mut CommandList, clip: Bounds, batch: Batch) {
    if !batch.vertices.is_empty() {
        out.push(Command {
            clip,
            kind: CommandKind::Batch(batch),
        });
    }
}

fn button_color(style: &Style, state: ButtonState, highlight: f32) -> Color {
    match state {
        ButtonState::Disabled => style.disabled_color,
        ButtonState::Pressed => style.pressed_color,
        ButtonState::Selected => style.selected_color,
        ButtonState::Normal | ButtonState::Hovered => style
            .normal_color
            .lerp(style.highlight_color, highlight.clamp(0.0, 1.0)),
    }
}

/// Outline of `bounds` with corners of radius `radius`, wound clockwise on
/// screen. Always yields `4 * (segments + 1)` points.
fn rounded_rect(bounds: Bounds, radius: f32, segments: usize) -> Polygon {
    let radius = radius.max(0.0);
    let corners = [
        (Point::new(bounds.left + radius, bounds.top + radius), std::f32::consts::PI),
        (Point::new(bounds.right - radius, bounds.top + radius), std::f32::consts::PI * 1.5),
        (Point::new(bounds.right - radius, bounds.bottom - radius), 0.0),
        (Point::new(bounds.left + radius, bounds.bottom - radius), std::f32::consts::FRAC_PI_2),
    ];
    let mut polygon = Polygon::new();
    for (center, start) in corners {
        for step in 0..=segments {
            let angle = if segments == 0 {
                start
            } else {
                #[allow(clippy::cast_precision_loss)]
                let t = step as f32 / segments as f32;
                start + std::f32::consts::FRAC_PI_2 * t
            };
            polygon.push(Point::new(
                center.x + angle.cos() * radius,
                center.y + angle.sin() * radius,
            ));
        }
    }
    polygon
}

fn corner_radius(bounds: Bounds, rounding: f32) -> f32 {
    rounding
        .min(bounds.width() * 0.5)
        .min(bounds.height() * 0.5)
        .max(0.0)
}

fn segments_for(radius: f32) -> usize {
    if radius > 0.0 {
        CORNER_SEGMENTS
    } else {
        0
    }
}

fn fill_rect(bounds: Bounds, rounding: f32, color: Color, clip: Bounds) -> Batch {
    let mut batch = Batch::new(Topology::Triangles, None, 0.0);
    if bounds.is_empty() {
        return batch;
    }
    let radius = corner_radius(bounds, rounding);
    let outline = rounded_rect(bounds, radius, segments_for(radius));
    fan(&mut batch, &clip_polygon(&outline, clip), color);
    batch
}

fn stroke_rect(bounds: Bounds, rounding: f32, width: f32, color: Color, clip: Bounds) -> Batch {
    if bounds.is_empty() || width <= 0.0 {
        return Batch::new(Topology::Triangles, None, 0.0);
    }
    if width * 2.0 >= bounds.width().min(bounds.height()) {
        return fill_rect(bounds, rounding, color, clip);
    }
    let radius = corner_radius(bounds, rounding);
    let segments = segments_for(radius);
    let outer = rounded_rect(bounds, radius, segments);
    let inner = rounded_rect(bounds.shrink(width), (radius - width).max(0.0), segments);

    let mut batch = Batch::new(Topology::Triangles, None, 0.0);
    let count = outer.len();
    for i in 0..count {
        let next = (i + 1) % count;
        let quad = [outer[i], outer[next], inner[next], inner[i]];
        fan(&mut batch, &clip_polygon(&quad, clip), color);
    }
    batch
}

/// Triangulates a convex polygon as a fan around its first vertex.
fn fan(batch: &mut Batch, polygon: &[Point], color: Color) {
    if polygon.len() < 3 || polygon_area(polygon) <= f32::EPSILON {
        return;
    }
    for i in 1..polygon.len() - 1 {
        batch.vertices.push(Vertex::solid(polygon[0], color));
        batch.vertices.push(Vertex::solid(polygon[i], color));
        batch.vertices.push(Vertex::solid(polygon[i + 1], color));
    }
}

fn polygon_area(polygon: &[Point]) -> f32 {
    let mut twice = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    (twice * 0.5).abs()
}

#[derive(Clone, Copy)]
enum Edge {
    Left(f32),
    Right(f32),
    Top(f32),
    Bottom(f32),
}

impl Edge {
    fn inside(self, p: Point) -> bool {
        match self {
            Self::Left(x) => p.x >= x,
            Self::Right(x) => p.x <= x,
            Self::Top(y) => p.y >= y,
            Self::Bottom(y) => p.y <= y,
        }
    }

    /// Crossing of segment `a`-`b` with the edge. Only called when exactly one
    /// endpoint is inside, so the divisor is never zero.
    fn intersect(self, a: Point, b: Point) -> Point {
        match self {
            Self::Left(x) | Self::Right(x) => {
                let t = (x - a.x) / (b.x - a.x);
                Point::new(x, a.y + (b.y - a.y) * t)
            }
            Self::Top(y) | Self::Bottom(y) => {
                let t = (y - a.y) / (b.y - a.y);
                Point::new(a.x + (b.x - a.x) * t, y)
            }
        }
    }
}

/// Sutherland–Hodgman clip of a convex polygon against an axis-aligned rect.
fn clip_polygon(polygon: &[Point], clip: Bounds) -> Polygon {
    let mut output: Polygon = polygon.iter().copied().collect();
    let edges = [
        Edge::Left(clip.left),
        Edge::Right(clip.right),
        Edge::Top(clip.top),
        Edge::Bottom(clip.bottom),
    ];
    for edge in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for &current in &input {
            match (edge.inside(prev), edge.inside(current)) {
                (true, true) => output.push(current),
                (true, false) => output.push(edge.intersect(prev, current)),
                (false, true) => {
                    output.push(edge.intersect(prev, current));
                    output.push(current);
                }
                (false, false) => {}
            }
            prev = current;
        }
    }
    output
}

/// Liang–Barsky clip of the segment `a`-`b`.
fn clip_segment(a: Point, b: Point, clip: Bounds) -> Option<(Point, Point)> {
    let delta = b - a;
    if delta.x == 0.0 && delta.y == 0.0 {
        return None;
    }
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    let checks = [
        (-delta.x, a.x - clip.left),
        (delta.x, clip.right - a.x),
        (-delta.y, a.y - clip.top),
        (delta.y, clip.bottom - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((a + delta * t0, a + delta * t1))
}

/// Appends two triangles for `quad`, cropped to `clip` with texture
/// coordinates scaled proportionally.
fn textured_quad(batch: &mut Batch, quad: Bounds, uv: Bounds, color: Color, clip: Bounds) {
    if quad.is_empty() {
        return;
    }
    let crop = quad.intersection(&clip);
    if crop.is_empty() {
        return;
    }
    let u = |x: f32| uv.left + (x - quad.left) / quad.width() * uv.width();
    let v = |y: f32| uv.top + (y - quad.top) / quad.height() * uv.height();
    let color = color.to_array();
    let corner = |x: f32, y: f32| Vertex::new(x, y, u(x), v(y), color);

    let tl = corner(crop.left, crop.top);
    let tr = corner(crop.right, crop.top);
    let br = corner(crop.right, crop.bottom);
    let bl = corner(crop.left, crop.bottom);
    batch.vertices.extend_from_slice(&[tl, tr, br, tl, br, bl]);
}
