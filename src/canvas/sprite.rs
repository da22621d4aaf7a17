use anyhow::{Context, Result};
use std::path::Path;

/// Opaque drawable image reduced to a 1-bit mask.
/// A sprite that has not finished loading draws nothing.
#[derive(Clone, Debug, Default)]
pub struct Sprite {
    width: u32,
    height: u32,
    mask: Vec<bool>,
    ready: bool,
}

impl Sprite {
    /// Placeholder for an image that has not arrived yet
    pub fn pending() -> Self {
        Self::default()
    }

    /// Build from a row-major mask; `mask.len()` must equal `width * height`
    pub fn from_mask(width: u32, height: u32, mask: Vec<bool>) -> Result<Self> {
        anyhow::ensure!(
            mask.len() == width as usize * height as usize,
            "mask has {} pixels, expected {}x{}",
            mask.len(),
            width,
            height
        );
        Ok(Self {
            width,
            height,
            mask,
            ready: true,
        })
    }

    /// Load a PNG/JPEG and keep pixels that are dark enough and opaque
    pub fn load(path: &Path, luma_threshold: u8) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("decoding {}", path.display()))?
            .to_luma_alpha8();
        let (width, height) = img.dimensions();
        let mask = img
            .pixels()
            .map(|p| p.0[1] >= 128 && p.0[0] <= luma_threshold)
            .collect();
        Self::from_mask(width, height, mask)
    }

    /// Built-in map pin, point at the bottom center
    pub fn pin() -> Self {
        const ROWS: [&str; 9] = [
            " ### ",
            "#####",
            "## ##",
            "#####",
            " ### ",
            " ### ",
            "  #  ",
            "  #  ",
            "  #  ",
        ];
        let mask = ROWS.iter().flat_map(|row| row.chars().map(|c| c == '#')).collect();
        Self {
            width: 5,
            height: ROWS.len() as u32,
            mask,
            ready: true,
        }
    }

    #[inline(always)]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) is set; out of range is unset
    #[inline(always)]
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.mask[(y * self.width + x) as usize]
    }
}
