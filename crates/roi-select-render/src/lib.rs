//! Canvas rendering for ROI selection.
//!
//! [`Canvas`] draws the decoded photo (whole, or the zoomed region stretched
//! over the canvas) and the selection outline with its size label.
//! [`RedrawDriver`] sequences image decoding and redraw requests for one
//! session so a slow decode never paints into a session that has moved on.

mod canvas;
mod draw;
mod driver;

pub use canvas::{draw_overlay, Canvas, RedrawRequest, LABEL_BOX, OUTLINE_WIDTH};
pub use driver::{decode_image, DecodeTicket, Redraw, RedrawDriver, RenderError};
