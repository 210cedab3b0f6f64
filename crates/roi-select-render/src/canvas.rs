use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use roi_select_core::{Overlay, Viewport, ZoomRegion};

use crate::draw::{draw_rect_outline, draw_text, fill_rect};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Stroke width of the selection outline.
pub const OUTLINE_WIDTH: i32 = 3;
/// Size of the filled box holding the size label.
pub const LABEL_BOX: (i32, i32) = (120, 20);
/// Distance from the label box top to the selection top edge.
const LABEL_OFFSET: i32 = 25;
const LABEL_PADDING: (i32, i32) = (5, 6);
const LABEL_TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Everything a single redraw needs besides the decoded image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RedrawRequest {
    pub viewport: Viewport,
    pub zoom: Option<ZoomRegion>,
    pub overlay: Option<Overlay>,
}

impl RedrawRequest {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            zoom: None,
            overlay: None,
        }
    }

    pub fn with_zoom(mut self, zoom: Option<ZoomRegion>) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_overlay(mut self, overlay: Option<Overlay>) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Drawing surface sized to the viewport's canvas.
#[derive(Clone, Debug)]
pub struct Canvas {
    surface: RgbaImage,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            surface: RgbaImage::from_pixel(1, 1, BACKGROUND),
        }
    }
}

impl Canvas {
    pub fn new(viewport: &Viewport) -> Self {
        let (w, h) = viewport.surface_size();
        Self {
            surface: RgbaImage::from_pixel(w, h, BACKGROUND),
        }
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn into_surface(self) -> RgbaImage {
        self.surface
    }

    /// Clear, draw the image (whole or zoomed), then the overlay on top.
    ///
    /// A zoomed redraw crops the zoom region's source box out of `source` and
    /// stretches it over the full canvas.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn redraw(&mut self, source: &RgbaImage, request: &RedrawRequest) {
        let (w, h) = request.viewport.surface_size();
        if self.surface.dimensions() != (w, h) {
            self.surface = RgbaImage::from_pixel(w, h, BACKGROUND);
        } else {
            for p in self.surface.pixels_mut() {
                *p = BACKGROUND;
            }
        }

        let scaled = match &request.zoom {
            Some(zoom) => {
                let (cx, cy, cw, ch) = crop_box(zoom, source.width(), source.height());
                log::debug!("redraw zoomed crop {cx},{cy} {cw}x{ch} onto {w}x{h}");
                let crop = imageops::crop_imm(source, cx, cy, cw, ch).to_image();
                imageops::resize(&crop, w, h, FilterType::Triangle)
            }
            None => imageops::resize(source, w, h, FilterType::Triangle),
        };
        imageops::replace(&mut self.surface, &scaled, 0, 0);

        if let Some(overlay) = &request.overlay {
            draw_overlay(&mut self.surface, overlay);
        }
    }
}

/// Integer crop of the zoom's source box, at least one pixel and inside the image.
fn crop_box(zoom: &ZoomRegion, src_w: u32, src_h: u32) -> (u32, u32, u32, u32) {
    let r = zoom.source_rect();
    let max_w = src_w.max(1) as f64;
    let max_h = src_h.max(1) as f64;
    let x0 = r.x.floor().clamp(0.0, max_w - 1.0);
    let y0 = r.y.floor().clamp(0.0, max_h - 1.0);
    let x1 = r.right().ceil().clamp(x0 + 1.0, max_w);
    let y1 = r.bottom().ceil().clamp(y0 + 1.0, max_h);
    (x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
}

/// Outline plus a filled label box above it, pushed down to stay on canvas.
pub fn draw_overlay(surface: &mut RgbaImage, overlay: &Overlay) {
    let [r, g, b] = overlay.color;
    let color = Rgba([r, g, b, 255]);
    let x = overlay.x.round() as i32;
    let y = overlay.y.round() as i32;
    let w = overlay.w.round() as i32;
    let h = overlay.h.round() as i32;

    draw_rect_outline(surface, x, y, w, h, color, OUTLINE_WIDTH);

    let label_y = y.saturating_sub(LABEL_OFFSET).max(0);
    fill_rect(surface, x, label_y, LABEL_BOX.0, LABEL_BOX.1, color);
    draw_text(
        surface,
        x.saturating_add(LABEL_PADDING.0),
        label_y.saturating_add(LABEL_PADDING.1),
        &overlay.label(),
        LABEL_TEXT,
    );
}
