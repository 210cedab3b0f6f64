//! One selection modal lifetime: drag tracking, optional zoom, commit.

use serde::{Deserialize, Serialize};

use crate::frame::{DisplayFrame, Roi, ZoomFrame};
use crate::geometry::{compose_through_zoom, to_source_frame, ZoomRegion};
use crate::overlay::Overlay;
use crate::params::SelectionParams;
use crate::selection::{Drag, DragStep, PointerEvent, SelectionMachine};
use crate::viewport::{fit_within, CanvasBounds, GeometryError, Viewport};
use crate::zoom::{DragIntent, ZoomController, ZoomState, SELECTION_COLOR};

/// Identifier of a selection session; increases monotonically per host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Errors surfaced by a selection session.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("selection too small ({w:.0} x {h:.0}, minimum {min})")]
    SelectionTooSmall { w: f64, h: f64, min: f64 },
    #[error("no area selected")]
    NoActiveSelection,
    #[error("zoom is not available for this selection")]
    ZoomUnavailable,
    #[error("result for closed session {0:?} discarded")]
    StaleSessionCallback(SessionId),
}

/// How an error should reach the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Aborts the session with a visible message.
    Fatal,
    /// Transient notice; the user can try again.
    Notice,
    /// Dropped without telling anyone.
    Silent,
}

impl SelectionError {
    pub fn severity(&self) -> Severity {
        match self {
            SelectionError::Geometry(_) => Severity::Fatal,
            SelectionError::SelectionTooSmall { .. }
            | SelectionError::NoActiveSelection
            | SelectionError::ZoomUnavailable => Severity::Notice,
            SelectionError::StaleSessionCallback(_) => Severity::Silent,
        }
    }
}

/// Outcome of feeding one pointer event into a session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionUpdate {
    Ignored,
    Started,
    /// Redraw with the in-progress drag outline.
    Preview(Overlay),
    /// Analysis area committed; the confirm action is now enabled.
    Committed(Roi),
    /// Zoom area picked; redraw the magnified region.
    Zoomed(ZoomRegion),
    /// Drag discarded; show the error as a transient notice.
    Rejected(SelectionError),
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct SelectionSession {
    id: SessionId,
    params: SelectionParams,
    viewport: Viewport,
    machine: SelectionMachine,
    zoom: Option<ZoomController>,
    committed: Option<Roi>,
    last_overlay: Option<Overlay>,
}

impl SelectionSession {
    /// Open a session over an already fitted viewport.
    pub fn new(id: SessionId, params: SelectionParams, viewport: Viewport) -> Self {
        let zoom = params.zoom_enabled.then(ZoomController::new);
        Self {
            id,
            machine: SelectionMachine::new(params.min_size),
            params,
            viewport,
            zoom,
            committed: None,
            last_overlay: None,
        }
    }

    /// Fit a `src_w x src_h` image into `bounds` and open a session over it.
    pub fn open(
        id: SessionId,
        params: SelectionParams,
        src_w: f64,
        src_h: f64,
        bounds: CanvasBounds,
    ) -> Result<Self, SelectionError> {
        let viewport = fit_within(src_w, src_h, bounds)?;
        log::info!(
            "session {} opened: {}x{} image on {:.0}x{:.0} canvas (scale {:.4})",
            id.0,
            src_w,
            src_h,
            viewport.canvas_w,
            viewport.canvas_h,
            viewport.scale
        );
        Ok(Self::new(id, params, viewport))
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn params(&self) -> &SelectionParams {
        &self.params
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn committed(&self) -> Option<Roi> {
        self.committed
    }

    pub fn confirm_enabled(&self) -> bool {
        self.committed.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.machine.is_dragging()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom
            .as_ref()
            .map_or(ZoomState::Off, ZoomController::state)
    }

    pub fn zoom_region(&self) -> Option<&ZoomRegion> {
        self.zoom.as_ref().and_then(ZoomController::region)
    }

    pub fn zoom_button_label(&self) -> Option<&'static str> {
        self.zoom.as_ref().map(ZoomController::button_label)
    }

    /// Outline to draw on the next redraw: the drag in progress, else the
    /// last committed drag.
    pub fn overlay(&self) -> Option<Overlay> {
        match self.machine.current() {
            Some(drag) => Some(Overlay::from_drag(&drag, self.overlay_color())),
            None => self.last_overlay,
        }
    }

    fn overlay_color(&self) -> [u8; 3] {
        self.zoom
            .as_ref()
            .map_or(SELECTION_COLOR, ZoomController::overlay_color)
    }

    /// Feed one pointer event.
    ///
    /// A `PointerPhase::Cancel` (e.g. `touchcancel`) only aborts the drag in
    /// progress; the committed ROI survives. Cancelling the modal is
    /// [`SelectionSession::reset`], or `SessionHost::close` which drops the
    /// whole session.
    pub fn handle(&mut self, event: &PointerEvent) -> SessionUpdate {
        match self.machine.handle(event) {
            DragStep::Ignored => SessionUpdate::Ignored,
            DragStep::Started(_) => SessionUpdate::Started,
            DragStep::Moved(drag) => {
                SessionUpdate::Preview(Overlay::from_drag(&drag, self.overlay_color()))
            }
            DragStep::Cancelled => SessionUpdate::Cancelled,
            DragStep::TooSmall(drag) => SessionUpdate::Rejected(SelectionError::SelectionTooSmall {
                w: drag.width(),
                h: drag.height(),
                min: self.machine.min_size(),
            }),
            DragStep::Completed(drag) => self.finish(drag),
        }
    }

    fn finish(&mut self, drag: Drag) -> SessionUpdate {
        let intent = self
            .zoom
            .as_ref()
            .map_or(DragIntent::Direct, ZoomController::intent);

        let roi = match intent {
            DragIntent::ZoomPick => {
                let Some(zoom) = self.zoom.as_mut() else {
                    return SessionUpdate::Ignored;
                };
                return match zoom.apply(drag.rect::<DisplayFrame>(), self.viewport) {
                    Some(region) => {
                        self.last_overlay = None;
                        SessionUpdate::Zoomed(region)
                    }
                    None => SessionUpdate::Ignored,
                };
            }
            DragIntent::Direct => to_source_frame(&drag.rect::<DisplayFrame>(), &self.viewport),
            DragIntent::ThroughZoom => match self.zoom_region() {
                Some(region) => {
                    compose_through_zoom(&drag.rect::<ZoomFrame>(), region, &self.viewport)
                }
                None => to_source_frame(&drag.rect::<DisplayFrame>(), &self.viewport),
            },
        };

        // A huge magnification can shrink a valid on-screen drag below one
        // source pixel; such a box never leaves the session.
        if roi.w < 1 || roi.h < 1 {
            log::warn!("session {}: {roi} collapses in source frame", self.id.0);
            return SessionUpdate::Rejected(SelectionError::SelectionTooSmall {
                w: f64::from(roi.w),
                h: f64::from(roi.h),
                min: 1.0,
            });
        }

        log::info!(
            "session {}: committed {} ({:.0} x {:.0} on canvas)",
            self.id.0,
            roi,
            drag.width(),
            drag.height()
        );
        self.committed = Some(roi);
        self.last_overlay = Some(Overlay::from_drag(&drag, self.overlay_color()));
        SessionUpdate::Committed(roi)
    }

    /// Zoom toggle button. Fails for sessions opened without zoom support.
    pub fn toggle_zoom(&mut self) -> Result<ZoomState, SelectionError> {
        let zoom = self.zoom.as_mut().ok_or(SelectionError::ZoomUnavailable)?;
        if zoom.toggle() {
            log::info!("session {}: zoom reset", self.id.0);
        }
        // The overlay belonged to the previous view.
        self.last_overlay = None;
        Ok(zoom.state())
    }

    /// The committed ROI, or `NoActiveSelection` when nothing was committed.
    pub fn confirm(&self) -> Result<Roi, SelectionError> {
        self.committed.ok_or(SelectionError::NoActiveSelection)
    }

    /// Drop the drag in progress and any commit; zoom is reset too.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.committed = None;
        self.last_overlay = None;
        if let Some(zoom) = self.zoom.as_mut() {
            zoom.reset();
        }
    }
}
