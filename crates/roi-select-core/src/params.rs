use serde::{Deserialize, Serialize};

use crate::selection::MIN_SELECTION_SIZE;
use crate::viewport::CanvasBounds;

/// Which capture the selection modal is opened for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionFlow {
    /// Colour-reference chart; no zoom.
    Table,
    /// Test sample; zoom-capable.
    Probeta,
}

/// Parameters of one selection modal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    /// Minimum side length of a committed drag, in its own frame.
    pub min_size: f64,
    /// Whether the zoom toggle is available.
    pub zoom_enabled: bool,
    /// Horizontal screen space taken by the modal chrome.
    pub screen_margin_w: f64,
    /// Vertical screen space taken by the modal chrome.
    pub screen_margin_h: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self::table()
    }
}

impl SelectionParams {
    pub fn table() -> Self {
        Self {
            min_size: MIN_SELECTION_SIZE,
            zoom_enabled: false,
            screen_margin_w: 80.0,
            screen_margin_h: 200.0,
        }
    }

    /// The probeta modal has an extra toolbar row for the zoom button.
    pub fn probeta() -> Self {
        Self {
            zoom_enabled: true,
            screen_margin_h: 300.0,
            ..Self::table()
        }
    }

    pub fn for_flow(flow: SelectionFlow) -> Self {
        match flow {
            SelectionFlow::Table => Self::table(),
            SelectionFlow::Probeta => Self::probeta(),
        }
    }

    pub fn canvas_bounds(&self, screen_w: f64, screen_h: f64) -> CanvasBounds {
        CanvasBounds::from_screen(screen_w, screen_h, self.screen_margin_w, self.screen_margin_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_in_zoom_and_chrome() {
        let table = SelectionParams::for_flow(SelectionFlow::Table);
        let probeta = SelectionParams::for_flow(SelectionFlow::Probeta);
        assert!(!table.zoom_enabled);
        assert!(probeta.zoom_enabled);
        assert_eq!(table.canvas_bounds(1280.0, 900.0), CanvasBounds::new(1200.0, 700.0));
        assert_eq!(probeta.canvas_bounds(1280.0, 900.0), CanvasBounds::new(1200.0, 600.0));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p: SelectionParams = serde_json::from_str(r#"{"zoom_enabled": true}"#).unwrap();
        assert!(p.zoom_enabled);
        assert_eq!(p.min_size, MIN_SELECTION_SIZE);
        assert_eq!(p.screen_margin_h, 200.0);
    }
}
