use roi_select_core::SessionId;

use crate::backend::BackendError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("a request is already in flight")]
    Busy,
    #[error("response for abandoned submission from {0:?} discarded")]
    Stale(SessionId),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Handle for one in-flight submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubmitTicket {
    pub session: SessionId,
    seq: u64,
}

/// One-at-a-time gate in front of the analysis backend.
///
/// While a request is in flight the triggering control reports disabled and
/// further submissions fail with [`SubmitError::Busy`]. The control is
/// enabled again when the request finishes, successfully or not.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    next_seq: u64,
    in_flight: Option<SubmitTicket>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the triggering control should be clickable.
    pub fn is_enabled(&self) -> bool {
        self.in_flight.is_none()
    }

    pub fn begin(&mut self, session: SessionId) -> Result<SubmitTicket, SubmitError> {
        if let Some(current) = self.in_flight {
            log::warn!(
                "duplicate submission from session {} while #{} is in flight",
                session.0,
                current.seq
            );
            return Err(SubmitError::Busy);
        }
        self.next_seq += 1;
        let ticket = SubmitTicket {
            session,
            seq: self.next_seq,
        };
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Hand the backend's answer for `ticket` through the guard.
    ///
    /// Answers for an abandoned ticket are dropped with `Stale` and leave the
    /// current state alone.
    pub fn finish<T>(
        &mut self,
        ticket: SubmitTicket,
        result: Result<T, BackendError>,
    ) -> Result<T, SubmitError> {
        if self.in_flight != Some(ticket) {
            log::warn!(
                "discarding response #{} for session {}",
                ticket.seq,
                ticket.session.0
            );
            return Err(SubmitError::Stale(ticket.session));
        }
        self.in_flight = None;
        result.map_err(|err| {
            log::error!("submission #{} failed: {err}", ticket.seq);
            SubmitError::Backend(err)
        })
    }

    /// Give up on the in-flight request (the user left the screen); its
    /// answer will be discarded.
    pub fn abandon(&mut self) -> Option<SubmitTicket> {
        self.in_flight.take()
    }

    /// `begin`, run `request`, `finish`, for synchronous transports.
    pub fn run<T>(
        &mut self,
        session: SessionId,
        request: impl FnOnce() -> Result<T, BackendError>,
    ) -> Result<T, SubmitError> {
        let ticket = self.begin(session)?;
        self.finish(ticket, request())
    }
}
