//! Conversions between display, zoom and source frames.

use serde::{Deserialize, Serialize};

use crate::frame::{DisplayFrame, Rect, Roi, SourceFrame, ZoomFrame};
use crate::viewport::Viewport;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Sub-area of the displayed image that is magnified to fill the canvas.
///
/// The region is captured in display-frame pixels and stays bound to the
/// viewport that was active when it was picked, so a later canvas resize
/// cannot change which source pixels it denotes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomRegion {
    pub region: Rect<DisplayFrame>,
    pub viewport: Viewport,
}

impl ZoomRegion {
    pub fn new(region: Rect<DisplayFrame>, viewport: Viewport) -> Self {
        Self { region, viewport }
    }

    /// The magnified area in source pixels, unrounded.
    pub fn source_rect(&self) -> Rect<SourceFrame> {
        self.viewport.to_source(&self.region)
    }

    /// A zoom covering the whole canvas.
    pub fn full_canvas(viewport: Viewport) -> Self {
        Self::new(viewport.canvas_rect(), viewport)
    }
}

/// Display-frame box to integer source pixels (divide by scale, round).
///
/// No clamping to the image bounds happens here.
pub fn to_source_frame(rect: &Rect<DisplayFrame>, viewport: &Viewport) -> Roi {
    Roi::from_source(&viewport.to_source(rect))
}

/// Map a box drawn on the zoomed canvas back to source pixels.
///
/// Inside the magnified view the display-to-source factor is no longer
/// `viewport.scale`, so the local box is first expressed as ratios of the
/// current canvas and those ratios are laid onto the zoom region's source box.
/// Rounding happens once, at the end.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(viewport)))]
pub fn compose_through_zoom(
    local: &Rect<ZoomFrame>,
    zoom: &ZoomRegion,
    viewport: &Viewport,
) -> Roi {
    let zoom_src = zoom.source_rect();

    let ratio_x = local.x / viewport.canvas_w;
    let ratio_y = local.y / viewport.canvas_h;
    let ratio_w = local.w / viewport.canvas_w;
    let ratio_h = local.h / viewport.canvas_h;

    let composed = Rect::<SourceFrame>::new(
        zoom_src.x + ratio_x * zoom_src.w,
        zoom_src.y + ratio_y * zoom_src.h,
        ratio_w * zoom_src.w,
        ratio_h * zoom_src.h,
    );
    log::debug!(
        "compose {:?} through zoom {:?} -> {:?}",
        local,
        zoom.region,
        composed
    );
    Roi::from_source(&composed)
}
