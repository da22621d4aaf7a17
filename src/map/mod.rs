mod features;
mod labels;
mod projection;
mod renderer;
mod viewport;
mod visibility;

pub use features::{BoundaryFeature, BoundaryLayer, City, CountryLabel, ProjectedRing};
pub use labels::{Candidate, LabelBox, LabelPlacer, Placement};
pub use projection::{Projection, BASE_MAP_HEIGHT, BASE_MAP_WIDTH};
pub use renderer::{DisplaySettings, FrameStats, MapRenderer, RenderStyle, Scene, Sprites};
pub use viewport::{Viewport, MAX_ZOOM, MIN_ZOOM};
pub use visibility::{on_screen, PopulationBand, VisibilityPolicy};
