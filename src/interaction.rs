use crate::geo::{GeoPoint, ScreenPoint};
use crate::map::{Projection, Viewport};

/// Zoom multiplier applied per wheel tick
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// The player's pick and whether the answer marker is revealed
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionState {
    pub selected: Option<GeoPoint>,
    pub marker_visible: bool,
}

impl SelectionState {
    /// New pick; hides the answer again
    pub fn select(&mut self, point: GeoPoint) {
        self.selected = Some(point);
        self.marker_visible = false;
    }

    pub fn reveal(&mut self) {
        self.marker_visible = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Pointer input in screen pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up(ScreenPoint),
    /// Positive `delta_y` scrolls down, which zooms out
    Wheel { at: ScreenPoint, delta_y: f64 },
}

/// What a handled event asks of the caller
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Response {
    pub redraw: bool,
    pub clicked: Option<GeoPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState {
    Idle,
    Panning { last: ScreenPoint, moved: bool },
}

/// Turns pointer events into pans, anchor zooms, and clicks.
/// A press that moves at all before release is a drag and never a click.
#[derive(Clone, Debug)]
pub struct InteractionController {
    state: DragState,
    projection: Projection,
}

impl InteractionController {
    pub fn new(projection: Projection) -> Self {
        Self {
            state: DragState::Idle,
            projection,
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, DragState::Panning { .. })
    }

    pub fn handle(&mut self, event: PointerEvent, viewport: &mut Viewport, selection: &mut SelectionState) -> Response {
        match (event, self.state) {
            (PointerEvent::Down(at), _) => {
                self.state = DragState::Panning { last: at, moved: false };
                Response::default()
            }
            (PointerEvent::Move(at), DragState::Panning { last, moved }) => {
                let (dx, dy) = (at.x - last.x, at.y - last.y);
                let moved = moved || dx != 0.0 || dy != 0.0;
                viewport.pan(dx, dy);
                self.state = DragState::Panning { last: at, moved };
                Response { redraw: true, clicked: None }
            }
            (PointerEvent::Move(_), DragState::Idle) => Response::default(),
            (PointerEvent::Up(at), DragState::Panning { moved, .. }) => {
                self.state = DragState::Idle;
                if moved {
                    return Response::default();
                }
                let point = self.projection.unproject(viewport.screen_to_map(at));
                log::debug!("click at {:.3}, {:.3}", point.lat, point.lon);
                selection.select(point);
                Response { redraw: true, clicked: Some(point) }
            }
            (PointerEvent::Up(_), DragState::Idle) => Response::default(),
            (PointerEvent::Wheel { at, delta_y }, _) => {
                let factor = if delta_y > 0.0 { 1.0 / WHEEL_ZOOM_STEP } else { WHEEL_ZOOM_STEP };
                viewport.zoom_at(at, factor);
                log::debug!("zoom {:.4}", viewport.zoom());
                Response { redraw: true, clicked: None }
            }
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(Projection::default())
    }
}
