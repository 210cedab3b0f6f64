use serde::{Deserialize, Serialize};

use crate::frame::{DisplayFrame, Rect};
use crate::geometry::ZoomRegion;
use crate::viewport::Viewport;

/// RGB outline used while a zoom area is being picked.
pub const ZOOM_PICK_COLOR: [u8; 3] = [0x10, 0xb9, 0x81];
/// RGB outline used for analysis-area picks.
pub const SELECTION_COLOR: [u8; 3] = [0xef, 0x44, 0x44];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZoomState {
    Off,
    /// The next completed drag picks the zoom area.
    Arming,
    Zoomed(ZoomRegion),
}

/// What a completed drag means under the current zoom state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragIntent {
    /// Pick the sub-area to magnify.
    ZoomPick,
    /// Pick the analysis area on the unzoomed canvas.
    Direct,
    /// Pick the analysis area on the magnified canvas.
    ThroughZoom,
}

/// One toggle button arms zoom picking; later drags default to analysis picks.
#[derive(Clone, Debug)]
pub struct ZoomController {
    state: ZoomState,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomController {
    pub fn new() -> Self {
        Self {
            state: ZoomState::Off,
        }
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn region(&self) -> Option<&ZoomRegion> {
        match &self.state {
            ZoomState::Zoomed(region) => Some(region),
            ZoomState::Off | ZoomState::Arming => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, ZoomState::Arming)
    }

    /// Toggle button: `Off -> Arming`, `Arming -> Off`, `Zoomed -> Off`.
    ///
    /// Returns `true` when a zoom was reset and the full image must be
    /// redrawn.
    pub fn toggle(&mut self) -> bool {
        let (next, reset) = match self.state {
            ZoomState::Off => (ZoomState::Arming, false),
            ZoomState::Arming => (ZoomState::Off, false),
            ZoomState::Zoomed(_) => (ZoomState::Off, true),
        };
        log::debug!("zoom toggle: {:?} -> {:?}", self.state, next);
        self.state = next;
        reset
    }

    pub fn intent(&self) -> DragIntent {
        match self.state {
            ZoomState::Off => DragIntent::Direct,
            ZoomState::Arming => DragIntent::ZoomPick,
            ZoomState::Zoomed(_) => DragIntent::ThroughZoom,
        }
    }

    /// Apply a completed zoom-area drag. Only valid while arming; returns the
    /// new region, or `None` when the controller was not armed.
    pub fn apply(&mut self, rect: Rect<DisplayFrame>, viewport: Viewport) -> Option<ZoomRegion> {
        if !self.is_armed() {
            return None;
        }
        let region = ZoomRegion::new(rect, viewport);
        log::info!("zoom applied to display region {:?}", rect);
        self.state = ZoomState::Zoomed(region);
        Some(region)
    }

    pub fn reset(&mut self) {
        self.state = ZoomState::Off;
    }

    pub fn button_label(&self) -> &'static str {
        match self.state {
            ZoomState::Off => "Zoom area",
            ZoomState::Arming => "Pick zoom area...",
            ZoomState::Zoomed(_) => "Reset zoom",
        }
    }

    /// Outline colour for the drag overlay.
    pub fn overlay_color(&self) -> [u8; 3] {
        if self.is_armed() {
            ZOOM_PICK_COLOR
        } else {
            SELECTION_COLOR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::fit_to_bounds;

    #[test]
    fn toggle_cycles_through_states() {
        let vp = fit_to_bounds(1000.0, 1000.0, 500.0, 500.0).unwrap();
        let mut z = ZoomController::new();
        assert_eq!(z.intent(), DragIntent::Direct);

        assert!(!z.toggle());
        assert!(z.is_armed());
        assert_eq!(z.intent(), DragIntent::ZoomPick);
        assert_eq!(z.overlay_color(), ZOOM_PICK_COLOR);

        let region = z.apply(Rect::new(100.0, 100.0, 200.0, 200.0), vp).unwrap();
        assert_eq!(z.region(), Some(&region));
        assert_eq!(z.intent(), DragIntent::ThroughZoom);
        assert_eq!(z.button_label(), "Reset zoom");

        assert!(z.toggle());
        assert_eq!(z.state(), ZoomState::Off);
        assert!(z.region().is_none());
    }

    #[test]
    fn toggle_while_arming_disarms() {
        let mut z = ZoomController::new();
        z.toggle();
        assert!(!z.toggle());
        assert_eq!(z.state(), ZoomState::Off);
    }

    #[test]
    fn apply_requires_arming() {
        let vp = fit_to_bounds(1000.0, 1000.0, 500.0, 500.0).unwrap();
        let mut z = ZoomController::new();
        assert!(z.apply(Rect::new(0.0, 0.0, 50.0, 50.0), vp).is_none());

        z.toggle();
        z.apply(Rect::new(0.0, 0.0, 50.0, 50.0), vp);
        // Re-zoom needs a reset first.
        assert!(z.apply(Rect::new(10.0, 10.0, 50.0, 50.0), vp).is_none());
        assert_eq!(z.region().unwrap().region, Rect::new(0.0, 0.0, 50.0, 50.0));
    }
}
