use glam::DVec2;

use crate::canvas::geometry::{draw_circle, draw_wide_line};
use crate::canvas::{Ink, Sprite, Surface, TextAnchor, TextStyle, Transform};

/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 pixel grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
#[derive(Clone)]
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Bit pattern per char, row-major
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    /// Set a pixel at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        self.cells[cy * self.width + cx] |= bit;
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    #[inline(always)]
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Raw dot pattern of a character cell (0 when out of range)
    pub fn cell(&self, col: usize, row: usize) -> u8 {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col]
        } else {
            0
        }
    }

    /// Get a specific row as a string (for line-by-line rendering)
    pub fn row_to_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
            .collect()
    }

    /// Get all rows as an iterator of strings
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }
}

/// A text run positioned on the character grid
#[derive(Clone, Debug, PartialEq)]
pub struct TextCell {
    pub col: i32,
    pub row: i32,
    pub text: String,
    pub ink: Ink,
}

/// Terminal drawing target: one braille layer per [`Ink`] plus text runs,
/// so the UI can color and stack them back-to-front
pub struct BrailleSurface {
    cols: usize,
    rows: usize,
    layers: Vec<BrailleCanvas>,
    texts: Vec<TextCell>,
    transforms: Vec<Transform>,
}

impl BrailleSurface {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            layers: vec![BrailleCanvas::new(cols, rows); Ink::ALL.len()],
            texts: Vec::new(),
            transforms: Vec::new(),
        }
    }

    /// Drop all content and adopt new character dimensions
    pub fn resize(&mut self, cols: usize, rows: usize) {
        if cols != self.cols || rows != self.rows {
            *self = Self::new(cols, rows);
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn layer(&self, ink: Ink) -> &BrailleCanvas {
        &self.layers[ink.index()]
    }

    pub fn texts(&self, ink: Ink) -> impl Iterator<Item = &TextCell> {
        self.texts.iter().filter(move |t| t.ink == ink)
    }

    #[inline(always)]
    fn current(&self) -> Transform {
        self.transforms.last().copied().unwrap_or(Transform::IDENTITY)
    }

    fn pixel_size(&self) -> DVec2 {
        DVec2::new((self.cols * 2) as f64, (self.rows * 4) as f64)
    }
}

/// Clip a segment to `[min, max]` (Liang-Barsky); `None` when fully outside
fn clip_segment(a: DVec2, b: DVec2, min: DVec2, max: DVec2) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
    }
    Some((a + d * t0, a + d * t1))
}

impl Surface for BrailleSurface {
    fn size(&self) -> (f64, f64) {
        let size = self.pixel_size();
        (size.x, size.y)
    }

    fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
        self.texts.clear();
        self.transforms.clear();
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
        let extent = DVec2::new(sprite.width() as f64, sprite.height() as f64) * t.scale;
        let canvas = self.pixel_size();

        // Nearest-neighbour sample of every covered screen pixel
        let x_start = origin.x.max(0.0).floor() as i64;
        let y_start = origin.y.max(0.0).floor() as i64;
        let x_end = (origin.x + extent.x).min(canvas.x).ceil() as i64;
        let y_end = (origin.y + extent.y).min(canvas.y).ceil() as i64;

        let layer = &mut self.layers[ink.index()];
        for py in y_start..y_end {
            let sy = ((py as f64 + 0.5 - origin.y) / t.scale).floor();
            if sy < 0.0 {
                continue;
            }
            for px in x_start..x_end {
                let sx = ((px as f64 + 0.5 - origin.x) / t.scale).floor();
                if sx >= 0.0 && sprite.pixel(sx as u32, sy as u32) {
                    layer.set_pixel(px as usize, py as usize);
                }
            }
        }
    }

    fn stroke_path(&mut self, points: &[DVec2], closed: bool, width: f64, ink: Ink) {
        if points.len() < 2 {
            return;
        }
        let t = self.current();
        let stroke = (width * t.scale).round().max(1.0) as i32;
        let max = self.pixel_size();
        let layer = &mut self.layers[ink.index()];

        let closing = closed.then(|| (points[points.len() - 1], points[0]));
        let segments = points.windows(2).map(|w| (w[0], w[1])).chain(closing);
        for (a, b) in segments {
            if let Some((a, b)) = clip_segment(t.apply(a), t.apply(b), DVec2::ZERO, max) {
                draw_wide_line(
                    layer,
                    a.x.round() as i32,
                    a.y.round() as i32,
                    b.x.round() as i32,
                    b.y.round() as i32,
                    stroke,
                );
            }
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, outline: f64, ink: Ink) {
        let t = self.current();
        let c = t.apply(center);
        let size = self.pixel_size();
        let r = ((radius + outline / 2.0) * t.scale).round().max(0.0);
        if c.x + r < 0.0 || c.y + r < 0.0 || c.x - r > size.x || c.y - r > size.y {
            return;
        }
        draw_circle(&mut self.layers[ink.index()], c.x.round() as i32, c.y.round() as i32, r as i32);
    }

    fn measure_text(&self, text: &str, _font_size: f64) -> DVec2 {
        // One character cell per glyph regardless of requested size
        DVec2::new(text.chars().count() as f64 * 2.0, 4.0)
    }

    fn draw_text(&mut self, text: &str, at: DVec2, style: TextStyle, ink: Ink) {
        let p = self.current().apply(at);
        if !p.x.is_finite() || !p.y.is_finite() {
            return;
        }
        let len = text.chars().count() as i32;
        let mut col = (p.x / 2.0).floor() as i32;
        let mut row = (p.y / 4.0).floor() as i32;
        if style.anchor == TextAnchor::Center {
            col -= len / 2;
        } else {
            // Top-left position names the corner; bump to the row it mostly covers
            row = (p.y / 4.0).round() as i32;
        }
        if row < 0 || row >= self.rows as i32 || col + len <= 0 || col >= self.cols as i32 {
            return;
        }
        self.texts.push(TextCell {
            col,
            row,
            text: text.to_string(),
            ink,
        });
    }
}
