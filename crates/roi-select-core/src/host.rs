use crate::frame::Roi;
use crate::params::SelectionParams;
use crate::session::{SelectionError, SelectionSession, SessionId};
use crate::viewport::CanvasBounds;

/// Owner of the single canvas: at most one selection session is open at a
/// time, and opening a new one closes the previous one.
#[derive(Debug, Default)]
pub struct SessionHost {
    last_id: u64,
    active: Option<SelectionSession>,
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a `src_w x src_h` image on a `screen_w x screen_h`
    /// screen. Any open session is closed first, even if this one fails to
    /// open.
    pub fn open(
        &mut self,
        params: SelectionParams,
        src_w: f64,
        src_h: f64,
        screen_w: f64,
        screen_h: f64,
    ) -> Result<SessionId, SelectionError> {
        let bounds = params.canvas_bounds(screen_w, screen_h);
        self.open_with_bounds(params, src_w, src_h, bounds)
    }

    pub fn open_with_bounds(
        &mut self,
        params: SelectionParams,
        src_w: f64,
        src_h: f64,
        bounds: CanvasBounds,
    ) -> Result<SessionId, SelectionError> {
        self.close();
        self.last_id += 1;
        let id = SessionId(self.last_id);
        match SelectionSession::open(id, params, src_w, src_h, bounds) {
            Ok(session) => {
                self.active = Some(session);
                Ok(id)
            }
            Err(err) => {
                log::error!("session {} aborted: {err}", id.0);
                Err(err)
            }
        }
    }

    /// Close the open session, if any, discarding its drag and commit.
    pub fn close(&mut self) -> Option<SessionId> {
        let closed = self.active.take()?;
        log::debug!("session {} closed", closed.id().0);
        Some(closed.id())
    }

    pub fn active(&self) -> Option<&SelectionSession> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut SelectionSession> {
        self.active.as_mut()
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(SelectionSession::id)
    }

    /// `Ok` only while `id` is the open session; completions for anything
    /// else are stale.
    pub fn check(&self, id: SessionId) -> Result<(), SelectionError> {
        if self.active_id() == Some(id) {
            Ok(())
        } else {
            log::warn!("discarding callback for closed session {}", id.0);
            Err(SelectionError::StaleSessionCallback(id))
        }
    }

    /// The open session, if `id` still names it.
    pub fn session(&mut self, id: SessionId) -> Result<&mut SelectionSession, SelectionError> {
        self.check(id)?;
        self.active
            .as_mut()
            .ok_or(SelectionError::StaleSessionCallback(id))
    }

    /// Confirm the open session's ROI and close the modal. Without a commit
    /// the session stays open.
    pub fn confirm(&mut self) -> Result<Roi, SelectionError> {
        let session = self
            .active
            .as_ref()
            .ok_or(SelectionError::NoActiveSelection)?;
        let roi = session.confirm()?;
        self.close();
        Ok(roi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::PointerEvent;

    #[test]
    fn opening_second_session_closes_first() {
        let mut host = SessionHost::new();
        let first = host
            .open(SelectionParams::table(), 4000.0, 3000.0, 880.0, 800.0)
            .unwrap();
        let second = host
            .open(SelectionParams::probeta(), 2000.0, 1000.0, 880.0, 800.0)
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(host.active_id(), Some(second));
        assert_eq!(
            host.check(first),
            Err(SelectionError::StaleSessionCallback(first))
        );
        assert!(host.session(first).is_err());
        assert!(host.session(second).is_ok());
    }

    #[test]
    fn failed_open_still_closes_previous() {
        let mut host = SessionHost::new();
        let first = host
            .open(SelectionParams::table(), 4000.0, 3000.0, 880.0, 800.0)
            .unwrap();
        assert!(host
            .open(SelectionParams::table(), 0.0, 0.0, 880.0, 800.0)
            .is_err());
        assert!(host.active().is_none());
        assert!(host.check(first).is_err());
    }

    #[test]
    fn confirm_closes_only_with_commit() {
        let mut host = SessionHost::new();
        let id = host
            .open(SelectionParams::table(), 4000.0, 3000.0, 880.0, 800.0)
            .unwrap();
        assert_eq!(host.confirm(), Err(SelectionError::NoActiveSelection));
        assert_eq!(host.active_id(), Some(id));

        let session = host.session(id).unwrap();
        session.handle(&PointerEvent::mouse_down(100.0, 100.0));
        session.handle(&PointerEvent::mouse_up(300.0, 250.0));
        assert_eq!(host.confirm(), Ok(Roi::new(500, 500, 1000, 750)));
        assert!(host.active().is_none());
        assert_eq!(host.confirm(), Err(SelectionError::NoActiveSelection));
    }
}
