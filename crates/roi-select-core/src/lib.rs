//! Core types for interactive region-of-interest selection.
//!
//! A user drags a rectangle on a canvas showing a scaled (and possibly
//! zoomed) image; this crate maps that rectangle back to pixels of the
//! full-resolution image. It is purely geometric and does *not* depend on any
//! image type or UI toolkit.
//!
//! ## Quickstart
//!
//! ```
//! use roi_select_core::{PointerEvent, Roi, SelectionParams, SessionHost, SessionUpdate};
//!
//! let mut host = SessionHost::new();
//! // 4000x3000 photo on a 880x800 screen: the table modal leaves 800x600.
//! let id = host.open(SelectionParams::table(), 4000.0, 3000.0, 880.0, 800.0).unwrap();
//!
//! let session = host.session(id).unwrap();
//! session.handle(&PointerEvent::mouse_down(100.0, 100.0));
//! let update = session.handle(&PointerEvent::mouse_up(300.0, 250.0));
//! assert_eq!(update, SessionUpdate::Committed(Roi::new(500, 500, 1000, 750)));
//! assert_eq!(host.confirm().unwrap().to_array(), [500, 500, 1000, 750]);
//! ```
//!
//! Frames:
//! - `DisplayFrame`: canvas pixels while the whole image is shown.
//! - `ZoomFrame`: canvas pixels while a zoom region fills the canvas.
//! - `SourceFrame`: pixels of the original image; `Roi` is its integer form.

mod frame;
mod geometry;
mod host;
mod logger;
mod overlay;
mod params;
mod selection;
mod session;
mod viewport;
mod zoom;

pub use frame::{DisplayFrame, Frame, Rect, Roi, SourceFrame, ZoomFrame};
pub use geometry::{compose_through_zoom, to_source_frame, ZoomRegion};
pub use host::SessionHost;
pub use overlay::Overlay;
pub use params::{SelectionFlow, SelectionParams};
pub use selection::{
    Drag, DragStep, PointerEvent, PointerId, PointerPhase, SelectionMachine, MIN_SELECTION_SIZE,
};
pub use session::{SelectionError, SelectionSession, SessionId, SessionUpdate, Severity};
pub use viewport::{fit_to_bounds, fit_within, CanvasBounds, GeometryError, Viewport};
pub use zoom::{DragIntent, ZoomController, ZoomState, SELECTION_COLOR, ZOOM_PICK_COLOR};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
