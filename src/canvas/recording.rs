use glam::DVec2;

use crate::canvas::{Ink, Sprite, Surface, TextAnchor, TextStyle, Transform};
use crate::geo::Rect;

/// A draw call resolved to screen space
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Sprite { ink: Ink, rect: Rect },
    Path { ink: Ink, points: Vec<DVec2>, closed: bool, width: f64 },
    Circle { ink: Ink, center: DVec2, radius: f64, outline: f64 },
    Text { ink: Ink, text: String, rect: Rect, font_size: f64, outline: f64 },
}

impl DrawOp {
    pub fn ink(&self) -> Option<Ink> {
        match self {
            DrawOp::Clear => None,
            DrawOp::Sprite { ink, .. }
            | DrawOp::Path { ink, .. }
            | DrawOp::Circle { ink, .. }
            | DrawOp::Text { ink, .. } => Some(*ink),
        }
    }
}

/// Display-list surface. Keeps every call in screen coordinates, which makes
/// frames easy to inspect and cheap to produce without a terminal.
pub struct RecordingSurface {
    width: f64,
    height: f64,
    /// Average glyph advance as a fraction of the font size
    glyph_aspect: f64,
    transforms: Vec<Transform>,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            glyph_aspect: 0.6,
            transforms: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn ops_for(&self, ink: Ink) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| op.ink() == Some(ink))
    }

    /// Depth of the transform stack; zero once a frame is complete
    pub fn transform_depth(&self) -> usize {
        self.transforms.len()
    }

    fn current(&self) -> Transform {
        self.transforms.last().copied().unwrap_or(Transform::IDENTITY)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.transforms.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn push_transform(&mut self, transform: Transform) {
        let outer = self.current();
        self.transforms.push(Transform {
            offset: outer.apply(transform.offset),
            scale: outer.scale * transform.scale,
        });
    }

    fn pop_transform(&mut self) {
        self.transforms.pop();
    }

    fn draw_sprite(&mut self, sprite: &Sprite, at: DVec2, ink: Ink) {
        if !sprite.is_ready() {
            return;
        }
        let t = self.current();
        let origin = t.apply(at);
        let rect = Rect::new(
            origin.x,
            origin.y,
            sprite.width() as f64 * t.scale,
            sprite.height() as f64 * t.scale,
        );
        self.ops.push(DrawOp::Sprite { ink, rect });
    }

    fn stroke_path(&mut self, points: &[DVec2], closed: bool, width: f64, ink: Ink) {
        let t = self.current();
        self.ops.push(DrawOp::Path {
            ink,
            points: points.iter().map(|&p| t.apply(p)).collect(),
            closed,
            width: width * t.scale,
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, outline: f64, ink: Ink) {
        let t = self.current();
        self.ops.push(DrawOp::Circle {
            ink,
            center: t.apply(center),
            radius: radius * t.scale,
            outline: outline * t.scale,
        });
    }

    fn measure_text(&self, text: &str, font_size: f64) -> DVec2 {
        DVec2::new(text.chars().count() as f64 * font_size * self.glyph_aspect, font_size)
    }

    fn draw_text(&mut self, text: &str, at: DVec2, style: TextStyle, ink: Ink) {
        let t = self.current();
        let font_size = style.font_size * t.scale;
        let size = self.measure_text(text, font_size);
        let p = t.apply(at);
        let origin = match style.anchor {
            TextAnchor::TopLeft => p,
            TextAnchor::Center => p - size / 2.0,
        };
        self.ops.push(DrawOp::Text {
            ink,
            text: text.to_string(),
            rect: Rect::new(origin.x, origin.y, size.x, size.y),
            font_size,
            outline: style.outline * t.scale,
        });
    }
}
