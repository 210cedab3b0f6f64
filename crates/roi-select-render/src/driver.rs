//! Decode-then-draw sequencing for one selection session.
//!
//! Decoding the photo is asynchronous in any real host: the caller starts a
//! decode, receives a [`DecodeTicket`] and hands the ticket back together
//! with the decoded image when it is ready. Redraw requests that arrive in
//! the meantime are coalesced so only the newest one is drawn once the image
//! lands. A ticket from a closed session, or one superseded by a newer
//! decode, is rejected without touching the canvas.

use image::RgbaImage;
use roi_select_core::SessionId;

use crate::canvas::{Canvas, RedrawRequest};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("decode callback for {0:?} arrived after the session closed")]
    StaleSessionCallback(SessionId),
    #[error("decode #{0} was superseded by a newer request")]
    Superseded(u64),
    #[error("no session is bound to the redraw driver")]
    NoSession,
    #[error("decoded image is empty")]
    EmptySurface,
}

/// Handle identifying one decode started by [`RedrawDriver::begin_decode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodeTicket {
    pub session: SessionId,
    seq: u64,
}

impl DecodeTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Outcome of [`RedrawDriver::request`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redraw {
    /// Drawn immediately onto the canvas.
    Drawn,
    /// Image not ready; kept as the pending request (replacing any older one).
    Deferred,
}

#[derive(Debug, Default)]
enum ImageState {
    #[default]
    Empty,
    Decoding(u64),
    Ready(RgbaImage),
}

#[derive(Debug, Default)]
pub struct RedrawDriver {
    session: Option<SessionId>,
    next_seq: u64,
    image: ImageState,
    pending: Option<RedrawRequest>,
    canvas: Canvas,
    redraws: u64,
}

impl RedrawDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to `session`, dropping any state of the previous one.
    pub fn bind(&mut self, session: SessionId) {
        if let Some(prev) = self.session.replace(session) {
            log::debug!("redraw driver rebound from session {} to {}", prev.0, session.0);
        }
        self.image = ImageState::Empty;
        self.pending = None;
        self.canvas = Canvas::default();
    }

    /// Detach; outstanding tickets become stale.
    pub fn close(&mut self) {
        self.session = None;
        self.image = ImageState::Empty;
        self.pending = None;
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Start a decode for the bound session. Supersedes any in-flight one.
    pub fn begin_decode(&mut self) -> Result<DecodeTicket, RenderError> {
        let session = self.session.ok_or(RenderError::NoSession)?;
        self.next_seq += 1;
        self.image = ImageState::Decoding(self.next_seq);
        Ok(DecodeTicket {
            session,
            seq: self.next_seq,
        })
    }

    /// Install a decoded image, or the decode error, for `ticket`.
    ///
    /// Returns `true` when a pending redraw was flushed onto the canvas.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, decoded)))]
    pub fn complete_decode(
        &mut self,
        ticket: DecodeTicket,
        decoded: Result<RgbaImage, RenderError>,
    ) -> Result<bool, RenderError> {
        if self.session != Some(ticket.session) {
            log::warn!(
                "dropping decode #{} for closed session {}",
                ticket.seq,
                ticket.session.0
            );
            return Err(RenderError::StaleSessionCallback(ticket.session));
        }
        if !matches!(self.image, ImageState::Decoding(seq) if seq == ticket.seq) {
            log::debug!("dropping superseded decode #{}", ticket.seq);
            return Err(RenderError::Superseded(ticket.seq));
        }

        let image = match decoded {
            Ok(img) if img.width() == 0 || img.height() == 0 => {
                self.image = ImageState::Empty;
                return Err(RenderError::EmptySurface);
            }
            Ok(img) => img,
            Err(err) => {
                log::error!("image decode failed: {err}");
                self.image = ImageState::Empty;
                return Err(err);
            }
        };
        self.image = ImageState::Ready(image);

        match self.pending.take() {
            Some(request) => {
                self.draw(&request);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Redraw now if the image is ready, otherwise remember only this request.
    pub fn request(&mut self, request: RedrawRequest) -> Result<Redraw, RenderError> {
        if self.session.is_none() {
            return Err(RenderError::NoSession);
        }
        if matches!(self.image, ImageState::Ready(_)) {
            self.draw(&request);
            Ok(Redraw::Drawn)
        } else {
            self.pending = Some(request);
            Ok(Redraw::Deferred)
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.image, ImageState::Ready(_))
    }

    pub fn pending(&self) -> Option<&RedrawRequest> {
        self.pending.as_ref()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Number of redraws performed since construction.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    fn draw(&mut self, request: &RedrawRequest) {
        if let ImageState::Ready(image) = &self.image {
            self.canvas.redraw(image, request);
            self.redraws += 1;
        }
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(RenderError::EmptySurface);
    }
    Ok(img)
}
