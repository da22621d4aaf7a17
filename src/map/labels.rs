use glam::DVec2;

use crate::geo::{Rect, ScreenPoint};

/// Screen-space bounding box of one placed label
pub type LabelBox = Rect;

/// Slot relative to the anchor, in try order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Candidate {
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl Candidate {
    pub const ORDER: [Candidate; 4] = [
        Candidate::TopRight,
        Candidate::TopLeft,
        Candidate::BottomRight,
        Candidate::BottomLeft,
    ];

    /// Label box for this slot
    pub fn label_box(self, anchor: ScreenPoint, size: DVec2, margin: f64) -> LabelBox {
        let (w, h) = (size.x, size.y);
        let (x, y) = match self {
            Candidate::TopRight => (anchor.x + margin, anchor.y - margin - h),
            Candidate::TopLeft => (anchor.x - w - margin, anchor.y - margin - h),
            Candidate::BottomRight => (anchor.x + margin, anchor.y + margin),
            Candidate::BottomLeft => (anchor.x - w - margin, anchor.y + margin),
        };
        Rect::new(x, y, w, h)
    }
}

/// Where a label ended up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub bbox: LabelBox,
    pub candidate: Candidate,
    /// All four slots collided; the box may overlap earlier labels
    pub fallback: bool,
}

/// Greedy per-frame label placement around point anchors.
///
/// Each city label tries four slots around its dot in a fixed order and takes
/// the first one that does not touch a label already placed in the same pass.
/// Dataset order decides who wins; there is no priority sort. When every slot
/// is taken the label goes top-right anyway and the placement is flagged.
/// The placed list is scratch space for a single pass.
#[derive(Clone, Debug)]
pub struct LabelPlacer {
    margin: f64,
    placed: Vec<Placement>,
}

impl LabelPlacer {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            placed: Vec::new(),
        }
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Start a render pass; forgets every box from the previous one
    pub fn begin_pass(&mut self) {
        self.placed.clear();
    }

    /// Place a label of `size` next to `anchor` and record it
    pub fn place(&mut self, anchor: ScreenPoint, size: DVec2) -> Placement {
        let free = Candidate::ORDER.iter().find_map(|&candidate| {
            let bbox = candidate.label_box(anchor, size, self.margin);
            let collides = self.placed.iter().any(|p| bbox.overlaps(&p.bbox));
            (!collides).then_some(Placement { bbox, candidate, fallback: false })
        });

        let placement = free.unwrap_or_else(|| Placement {
            bbox: Candidate::TopRight.label_box(anchor, size, self.margin),
            candidate: Candidate::TopRight,
            fallback: true,
        });
        self.placed.push(placement);
        placement
    }

    /// Placements made so far in the current pass, in order
    pub fn placed(&self) -> &[Placement] {
        &self.placed
    }
}

impl Default for LabelPlacer {
    fn default() -> Self {
        Self::new(7.0)
    }
}
