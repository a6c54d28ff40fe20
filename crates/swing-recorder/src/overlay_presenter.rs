//! Terminal rendering of the session overlay.
//!
//! Receives snapshots from two places: the phase observer registered on the
//! runtime, and the app loop following the snapshot channel for countdown
//! and elapsed updates. Only changes are rendered, so both may feed it.

use crate::OverlayText;

use swing_recorder_core::{SessionPhase, SessionSnapshot};
use tracing::{debug, info, instrument};

/// Renders overlay text and recording progress for a running session.
#[derive(Debug)]
pub struct OverlayPresenter {
    countdown_secs: u32,
    shown: Option<OverlayText>,
    shown_elapsed: Option<u32>,
}

impl OverlayPresenter {
    /// Create a presenter for sessions with the given countdown length.
    pub fn new(countdown_secs: u32) -> Self {
        Self {
            countdown_secs,
            shown: None,
            shown_elapsed: None,
        }
    }

    /// Text currently on screen.
    pub fn shown(&self) -> Option<OverlayText> {
        self.shown
    }

    /// Render a snapshot, returning the overlay if it changed.
    #[instrument(level = "debug", skip_all, fields(phase = %snapshot.phase))]
    pub fn present(&mut self, snapshot: &SessionSnapshot) -> Option<OverlayText> {
        if snapshot.phase == SessionPhase::Recording
            && self.shown_elapsed != Some(snapshot.recording_elapsed)
        {
            self.shown_elapsed = Some(snapshot.recording_elapsed);
            debug!(
                elapsed = snapshot.recording_elapsed,
                limit = snapshot.recording_limit,
                "Recording progress"
            );
        }

        let text = OverlayText::for_snapshot(snapshot, self.countdown_secs);
        if self.shown == Some(text) {
            return None;
        }

        if text == OverlayText::FindPerson {
            self.shown_elapsed = None;
        }

        info!(
            session_id = %snapshot.session_id,
            attempt = snapshot.attempt,
            overlay = %text,
            "Overlay updated"
        );

        self.shown = Some(text);
        Some(text)
    }
}
