//! Replay a recorded pointer session from a JSON config.
//!
//! A replay opens one selection session for the configured image and screen,
//! feeds the recorded events through it and reports every outcome. When the
//! config names an actual image the canvas is rendered along the way, so the
//! final frame (image, zoom and outline) can be written out for inspection.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use nalgebra::Point2;
use roi_select_core::{
    Overlay, PointerEvent, PointerId, PointerPhase, Roi, SelectionError, SelectionFlow,
    SelectionParams, SessionHost, SessionId, SessionUpdate, Viewport, ZoomRegion, ZoomState,
};
use roi_select_render::{RedrawDriver, RedrawRequest, RenderError};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::backend::BackendRoi;

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("config needs either image_path or image_size")]
    MissingImage,
}

/// One recorded input, in canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayEvent {
    Down([f64; 2]),
    Move([f64; 2]),
    /// Mouse release; `null` releases at the last known position.
    Up(Option<[f64; 2]>),
    /// Touch list; only the first touch point drives the drag.
    TouchStart(Vec<[f64; 2]>),
    TouchMove(Vec<[f64; 2]>),
    TouchEnd,
    ToggleZoom,
    Cancel,
    Confirm,
}

fn default_screen() -> [f64; 2] {
    [1280.0, 800.0]
}

fn default_flow() -> SelectionFlow {
    SelectionFlow::Table
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub image_path: Option<String>,
    /// Source size `[w, h]` when no image file is given.
    #[serde(default)]
    pub image_size: Option<[u32; 2]>,
    #[serde(default = "default_screen")]
    pub screen: [f64; 2],
    #[serde(default = "default_flow")]
    pub flow: SelectionFlow,
    /// Overrides for the flow's preset parameters.
    #[serde(default)]
    pub params: Option<SelectionParams>,
    pub events: Vec<ReplayEvent>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub overlay_path: Option<String>,
}

impl ReplayConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("roi_replay_report.json"))
    }

    pub fn params(&self) -> SelectionParams {
        self.params
            .clone()
            .unwrap_or_else(|| SelectionParams::for_flow(self.flow))
    }
}

/// What one event did, in report form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    Ignored,
    Started,
    Preview { overlay: Overlay },
    Committed { roi: Roi },
    Zoomed { region: ZoomRegion, source: Roi },
    Rejected { notice: String },
    Cancelled,
    Zoom { state: String },
    Confirmed { roi: Roi },
    Closed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub event: ReplayEvent,
    pub outcome: StepOutcome,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub session: u64,
    pub flow: SelectionFlow,
    pub source_size: [u32; 2],
    pub viewport: Viewport,
    pub steps: Vec<ReplayStep>,
    pub zoom: Option<ZoomRegion>,
    pub committed: Option<Roi>,
    pub confirmed: Option<Roi>,
    /// `confirmed` as sent to the backend, absent when it would be refused.
    pub backend_roi: Option<BackendRoi>,
    pub notices: Vec<String>,
    pub redraws: u64,
}

impl ReplayReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct ReplayOutcome {
    pub report: ReplayReport,
    /// Last rendered canvas, when an image was available.
    pub canvas: Option<RgbaImage>,
}

fn point([x, y]: [f64; 2]) -> Point2<f64> {
    Point2::new(x, y)
}

fn touches(list: &[[f64; 2]]) -> Vec<(u64, Point2<f64>)> {
    list.iter()
        .enumerate()
        .map(|(i, p)| (i as u64, point(*p)))
        .collect()
}

fn zoom_label(state: &ZoomState) -> String {
    match state {
        ZoomState::Off => "off".into(),
        ZoomState::Arming => "arming".into(),
        ZoomState::Zoomed(_) => "zoomed".into(),
    }
}

fn load_source(config: &ReplayConfig) -> Result<(Option<RgbaImage>, [u32; 2]), ReplayError> {
    match (&config.image_path, config.image_size) {
        (Some(path), _) => {
            let img = image::open(path)?.to_rgba8();
            let size = [img.width(), img.height()];
            Ok((Some(img), size))
        }
        (None, Some(size)) => Ok((None, size)),
        (None, None) => Err(ReplayError::MissingImage),
    }
}

/// Run `config.events` through a fresh session and collect the outcome.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(config), fields(events = config.events.len())))]
pub fn replay(config: &ReplayConfig) -> Result<ReplayOutcome, ReplayError> {
    let (image, source_size) = load_source(config)?;
    let [screen_w, screen_h] = config.screen;

    let mut host = SessionHost::new();
    let id = host.open(
        config.params(),
        f64::from(source_size[0]),
        f64::from(source_size[1]),
        screen_w,
        screen_h,
    )?;
    let viewport = *host.session(id)?.viewport();

    let mut driver = RedrawDriver::new();
    driver.bind(id);
    let ticket = driver.begin_decode()?;
    driver.request(RedrawRequest::new(viewport))?;
    if let Some(img) = image {
        driver.complete_decode(ticket, Ok(img))?;
    }

    let mut report = ReplayReport {
        session: id.0,
        flow: config.flow,
        source_size,
        viewport,
        steps: Vec::with_capacity(config.events.len()),
        zoom: None,
        committed: None,
        confirmed: None,
        backend_roi: None,
        notices: Vec::new(),
        redraws: 0,
    };

    for event in &config.events {
        let outcome = step(&mut host, id, event, &mut report);
        if let StepOutcome::Rejected { notice } = &outcome {
            report.notices.push(notice.clone());
        }
        if let Some(session) = host.active() {
            report.zoom = session.zoom_region().copied();
            report.committed = session.committed();
            let request = RedrawRequest::new(*session.viewport())
                .with_zoom(session.zoom_region().copied())
                .with_overlay(session.overlay());
            driver.request(request)?;
        } else if driver.session().is_some() {
            driver.close();
        }
        report.steps.push(ReplayStep {
            event: event.clone(),
            outcome,
        });
    }

    report.backend_roi = report
        .confirmed
        .and_then(|roi| BackendRoi::new(roi).ok());
    report.redraws = driver.redraw_count();
    log::info!(
        "replayed {} events: committed {:?}, confirmed {:?}",
        config.events.len(),
        report.committed,
        report.confirmed
    );

    let canvas = (driver.redraw_count() > 0).then(|| driver.canvas().surface().clone());
    Ok(ReplayOutcome { report, canvas })
}

fn step(
    host: &mut SessionHost,
    id: SessionId,
    event: &ReplayEvent,
    report: &mut ReplayReport,
) -> StepOutcome {
    match event {
        ReplayEvent::Cancel => {
            return match host.close() {
                Some(_) => StepOutcome::Closed,
                None => StepOutcome::Ignored,
            };
        }
        ReplayEvent::Confirm => {
            return match host.confirm() {
                Ok(roi) => {
                    report.confirmed = Some(roi);
                    StepOutcome::Confirmed { roi }
                }
                Err(err) => StepOutcome::Rejected {
                    notice: err.to_string(),
                },
            };
        }
        _ => {}
    }

    let session = match host.session(id) {
        Ok(session) => session,
        Err(_) => return StepOutcome::Ignored,
    };

    if let ReplayEvent::ToggleZoom = event {
        return match session.toggle_zoom() {
            Ok(state) => StepOutcome::Zoom {
                state: zoom_label(&state),
            },
            Err(err) => StepOutcome::Rejected {
                notice: err.to_string(),
            },
        };
    }

    let pointer = match event {
        ReplayEvent::Down(p) => Some(PointerEvent::mouse_down(p[0], p[1])),
        ReplayEvent::Move(p) => Some(PointerEvent::mouse_move(p[0], p[1])),
        ReplayEvent::Up(Some(p)) => Some(PointerEvent::mouse_up(p[0], p[1])),
        ReplayEvent::Up(None) => Some(PointerEvent::new(PointerId::Mouse, PointerPhase::Up, None)),
        ReplayEvent::TouchStart(list) => {
            PointerEvent::from_touch_list(PointerPhase::Down, &touches(list))
        }
        ReplayEvent::TouchMove(list) => {
            PointerEvent::from_touch_list(PointerPhase::Move, &touches(list))
        }
        ReplayEvent::TouchEnd => Some(PointerEvent::touch_end(0)),
        ReplayEvent::ToggleZoom | ReplayEvent::Cancel | ReplayEvent::Confirm => None,
    };
    let Some(pointer) = pointer else {
        return StepOutcome::Ignored;
    };

    match session.handle(&pointer) {
        SessionUpdate::Ignored => StepOutcome::Ignored,
        SessionUpdate::Started => StepOutcome::Started,
        SessionUpdate::Preview(overlay) => StepOutcome::Preview { overlay },
        SessionUpdate::Committed(roi) => StepOutcome::Committed { roi },
        SessionUpdate::Zoomed(region) => StepOutcome::Zoomed {
            region,
            source: Roi::from_source(&region.source_rect()),
        },
        SessionUpdate::Rejected(err) => StepOutcome::Rejected {
            notice: err.to_string(),
        },
        SessionUpdate::Cancelled => StepOutcome::Cancelled,
    }
}
