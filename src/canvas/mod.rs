mod braille;
mod geometry;
mod recording;
mod sprite;

pub use braille::{BrailleCanvas, BrailleSurface, TextCell};
pub use recording::{DrawOp, RecordingSurface};
pub use sprite::Sprite;

use glam::DVec2;

/// What a drawing belongs to; backends use it for color and stacking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ink {
    BaseMap,
    Boundary,
    CityDot,
    CityLabel,
    CountryLabel,
    GuessMarker,
    AnswerMarker,
    Connector,
}

impl Ink {
    /// Back-to-front
    pub const ALL: [Ink; 8] = [
        Ink::BaseMap,
        Ink::Boundary,
        Ink::CityDot,
        Ink::CityLabel,
        Ink::CountryLabel,
        Ink::GuessMarker,
        Ink::AnswerMarker,
        Ink::Connector,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Uniform scale followed by a translation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub offset: DVec2,
    pub scale: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        offset: DVec2::ZERO,
        scale: 1.0,
    };

    #[inline(always)]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        p * self.scale + self.offset
    }

    #[inline(always)]
    pub fn invert(&self, p: DVec2) -> DVec2 {
        (p - self.offset) / self.scale
    }
}

/// Where a text position sits relative to the rendered string
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// In the units of the active transform
    pub font_size: f64,
    pub anchor: TextAnchor,
    /// Outline stroke drawn under the fill, 0 for none
    pub outline: f64,
}

/// Immediate-mode drawing target. Coordinates are in the space set by the
/// innermost pushed transform, or screen pixels when none is active.
pub trait Surface {
    /// Canvas size in screen pixels
    fn size(&self) -> (f64, f64);

    fn clear(&mut self);

    fn push_transform(&mut self, transform: Transform);

    fn pop_transform(&mut self);

    /// Draw a sprite at its natural size with its top-left corner at `at`.
    /// Sprites that are not ready are skipped.
    fn draw_sprite(&mut self, sprite: &Sprite, at: DVec2, ink: Ink);

    fn stroke_path(&mut self, points: &[DVec2], closed: bool, width: f64, ink: Ink);

    fn fill_circle(&mut self, center: DVec2, radius: f64, outline: f64, ink: Ink);

    /// Rendered text extent in screen pixels for a screen-space font size
    fn measure_text(&self, text: &str, font_size: f64) -> DVec2;

    fn draw_text(&mut self, text: &str, at: DVec2, style: TextStyle, ink: Ink);
}
