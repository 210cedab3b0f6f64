//! High-level facade crate for the `roi-select-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry/session core and the canvas renderer
//! - the analysis-backend boundary (validated request payloads, submit guard)
//! - a per-user measurement history store
//! - JSON-driven replay of recorded pointer sessions (also exposed by the
//!   `roi-select` binary, feature `cli`)
//!
//! ## Quickstart
//!
//! ```
//! use roi_select::{replay, ReplayConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg: ReplayConfig = serde_json::from_str(
//!     r#"{"image_size": [4000, 3000], "screen": [880, 800], "flow": "table",
//!         "events": [{"down": [100, 100]}, {"up": [300, 250]}, "confirm"]}"#,
//! )?;
//! let outcome = replay(&cfg)?;
//! assert_eq!(outcome.report.confirmed.map(|r| r.to_array()), Some([500, 500, 1000, 750]));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `roi_select::core`: frames, viewport fitting, drag and zoom state machines, sessions.
//! - `roi_select::render`: canvas redraw and the decode/redraw driver.
//! - `roi_select::backend`: request/response types for the analysis server.
//! - `roi_select::store`: measurement history.

pub use roi_select_core as core;
pub use roi_select_render as render;

pub use roi_select_core::{
    compose_through_zoom, fit_to_bounds, init_with_level, to_source_frame, PointerEvent, Roi,
    SelectionError, SelectionFlow, SelectionParams, SelectionSession, SessionHost, SessionId,
    SessionUpdate, Viewport, ZoomRegion,
};

pub mod backend;
pub mod replay;
pub mod store;
pub mod submit;

pub use backend::{AnalysisBackend, AnalysisRequest, AnalysisResponse, BackendError, BackendRoi};
pub use replay::{replay, ReplayConfig, ReplayError, ReplayEvent, ReplayOutcome, ReplayReport};
pub use store::{JsonFileStore, MeasurementRecord, MeasurementStore, MemoryStore, StoreError};
pub use submit::{SubmitError, SubmitGuard, SubmitTicket};

/// Route `log` records into a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Ignores errors if a logger or subscriber is already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    roi_select_core::init_tracing(json);
    // No-op when the subscriber already bridged `log` itself.
    let _ = tracing_log::LogTracer::init();
}
