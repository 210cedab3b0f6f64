use serde::{Deserialize, Serialize};

use crate::selection::Drag;

/// Selection outline drawn on top of the canvas image, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// RGB outline and label colour.
    pub color: [u8; 3],
}

impl Overlay {
    pub fn from_drag(drag: &Drag, color: [u8; 3]) -> Self {
        Self {
            x: drag.start.x.min(drag.end.x),
            y: drag.start.y.min(drag.end.y),
            w: drag.width(),
            h: drag.height(),
            color,
        }
    }

    /// Size label, e.g. `"200 x 150 px"`.
    pub fn label(&self) -> String {
        format!(
            "{} x {} px",
            self.w.round() as i64,
            self.h.round() as i64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn label_rounds_display_size() {
        let drag = Drag {
            start: Point2::new(300.4, 250.0),
            end: Point2::new(100.0, 100.2),
        };
        let overlay = Overlay::from_drag(&drag, [255, 0, 0]);
        assert_eq!(overlay.x, 100.0);
        assert_eq!(overlay.label(), "200 x 150 px");
    }
}
