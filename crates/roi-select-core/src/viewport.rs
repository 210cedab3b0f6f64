use serde::{Deserialize, Serialize};

use crate::frame::{DisplayFrame, Rect, SourceFrame};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced while fitting an image into the canvas.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("invalid source image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("invalid canvas bounds (max_w={max_w}, max_h={max_h})")]
    InvalidBounds { max_w: f64, max_h: f64 },
}

/// Maximum canvas size available for the selection modal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub max_w: f64,
    pub max_h: f64,
}

impl CanvasBounds {
    pub fn new(max_w: f64, max_h: f64) -> Self {
        Self { max_w, max_h }
    }

    /// Bounds left for the canvas once the modal chrome is subtracted from
    /// the screen. Never smaller than one pixel per axis.
    pub fn from_screen(screen_w: f64, screen_h: f64, margin_w: f64, margin_h: f64) -> Self {
        Self {
            max_w: (screen_w - margin_w).max(1.0),
            max_h: (screen_h - margin_h).max(1.0),
        }
    }
}

/// How a `src_w x src_h` image is fit into a `canvas_w x canvas_h` canvas.
///
/// `scale = canvas_w / src_w`; the same factor holds for the height since the
/// aspect ratio is preserved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub src_w: f64,
    pub src_h: f64,
    pub canvas_w: f64,
    pub canvas_h: f64,
    pub scale: f64,
}

impl Viewport {
    /// Display-frame box to source frame, without rounding.
    #[inline]
    pub fn to_source(&self, rect: &Rect<DisplayFrame>) -> Rect<SourceFrame> {
        Rect::new(
            rect.x / self.scale,
            rect.y / self.scale,
            rect.w / self.scale,
            rect.h / self.scale,
        )
    }

    /// Inverse of [`Viewport::to_source`].
    #[inline]
    pub fn to_display(&self, rect: &Rect<SourceFrame>) -> Rect<DisplayFrame> {
        Rect::new(
            rect.x * self.scale,
            rect.y * self.scale,
            rect.w * self.scale,
            rect.h * self.scale,
        )
    }

    /// The whole canvas as a display-frame box.
    pub fn canvas_rect(&self) -> Rect<DisplayFrame> {
        Rect::new(0.0, 0.0, self.canvas_w, self.canvas_h)
    }

    /// Integer size of the drawing surface backing the canvas.
    pub fn surface_size(&self) -> (u32, u32) {
        (
            self.canvas_w.floor().max(1.0) as u32,
            self.canvas_h.floor().max(1.0) as u32,
        )
    }
}

/// Largest canvas inside `max_w x max_h` that keeps the aspect ratio of the
/// source image.
///
/// Width is made to fit first, then height is re-checked; this order keeps the
/// result deterministic when both sides exceed the bounds. Images already
/// inside the bounds are shown at scale 1.
#[cfg_attr(feature = "tracing", instrument(level = "debug"))]
pub fn fit_to_bounds(
    src_w: f64,
    src_h: f64,
    max_w: f64,
    max_h: f64,
) -> Result<Viewport, GeometryError> {
    if !(src_w.is_finite() && src_h.is_finite()) || src_w <= 0.0 || src_h <= 0.0 {
        return Err(GeometryError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }
    if !(max_w.is_finite() && max_h.is_finite()) || max_w <= 0.0 || max_h <= 0.0 {
        return Err(GeometryError::InvalidBounds { max_w, max_h });
    }

    let mut width = src_w;
    let mut height = src_h;

    if width > max_w {
        height *= max_w / width;
        width = max_w;
    }
    if height > max_h {
        width *= max_h / height;
        height = max_h;
    }

    let viewport = Viewport {
        src_w,
        src_h,
        canvas_w: width,
        canvas_h: height,
        scale: width / src_w,
    };
    log::debug!(
        "fit {}x{} into {}x{}: canvas {:.1}x{:.1}, scale {:.4}",
        src_w,
        src_h,
        max_w,
        max_h,
        viewport.canvas_w,
        viewport.canvas_h,
        viewport.scale
    );
    Ok(viewport)
}

/// [`fit_to_bounds`] taking a [`CanvasBounds`].
pub fn fit_within(src_w: f64, src_h: f64, bounds: CanvasBounds) -> Result<Viewport, GeometryError> {
    fit_to_bounds(src_w, src_h, bounds.max_w, bounds.max_h)
}
