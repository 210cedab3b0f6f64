use std::fmt;
use std::marker::PhantomData;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Marker trait for a coordinate frame a [`Rect`] can be expressed in.
pub trait Frame: Copy + Default + fmt::Debug + PartialEq + 'static {
    const NAME: &'static str;
}

/// Pixels of the on-screen canvas while it shows the whole image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayFrame;

/// Pixels of the same canvas while it shows a magnified sub-region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoomFrame;

/// Pixels of the original full-resolution image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceFrame;

impl Frame for DisplayFrame {
    const NAME: &'static str = "display";
}

impl Frame for ZoomFrame {
    const NAME: &'static str = "zoom";
}

impl Frame for SourceFrame {
    const NAME: &'static str = "source";
}

/// Axis-aligned box `{x, y, w, h}` tagged with the frame it lives in.
///
/// Values from different frames do not mix; going from one frame to another
/// always goes through [`crate::Viewport`] or [`crate::compose_through_zoom`].
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Rect<F: Frame> {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(skip)]
    frame: PhantomData<F>,
}

impl<F: Frame> Rect<F> {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            frame: PhantomData,
        }
    }

    /// Normalized box spanned by two drag points: `min` as origin, `abs(delta)` as size.
    pub fn from_corners(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }

    #[inline]
    pub fn origin(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// `false` when either side is below `min_size` (or not a number).
    pub fn is_valid(&self, min_size: f64) -> bool {
        self.w >= min_size && self.h >= min_size
    }
}

impl<F: Frame> fmt::Debug for Rect<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect<{}>{{x: {}, y: {}, w: {}, h: {}}}",
            F::NAME,
            self.x,
            self.y,
            self.w,
            self.h
        )
    }
}

/// Integer pixel box in the source frame: the region of interest handed to
/// the analysis backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Roi {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Round every component of a source-frame box to the nearest pixel.
    pub fn from_source(rect: &Rect<SourceFrame>) -> Self {
        Self {
            x: rect.x.round() as i32,
            y: rect.y.round() as i32,
            w: rect.w.round() as i32,
            h: rect.h.round() as i32,
        }
    }

    /// `[x, y, w, h]`, the layout the backend expects.
    pub fn to_array(self) -> [i32; 4] {
        [self.x, self.y, self.w, self.h]
    }

    /// Intersect with the image `[0, width) x [0, height)`.
    ///
    /// The frame conversions never clamp; callers that want in-bounds boxes
    /// use this explicitly.
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        let max_x = width.min(i32::MAX as u32) as i32;
        let max_y = height.min(i32::MAX as u32) as i32;
        let x0 = self.x.clamp(0, max_x);
        let y0 = self.y.clamp(0, max_y);
        let x1 = self.x.saturating_add(self.w).clamp(0, max_x);
        let y1 = self.y.saturating_add(self.h).clamp(0, max_y);
        Self {
            x: x0,
            y: y0,
            w: (x1 - x0).max(0),
            h: (y1 - y0).max(0),
        }
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x, self.y, self.w, self.h)
    }
}
