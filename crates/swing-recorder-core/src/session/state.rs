use crate::session::{CaptureMode, SessionPhase};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of one recording attempt.
///
/// Owned and mutated only by the session controller. Observers receive
/// clones of it as [`SessionSnapshot`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique id for log correlation. Kept across re-arms.
    pub session_id: Uuid,
    /// Attempt number within this session, starting at 1.
    pub attempt: u32,
    /// Current phase; the source of truth for the presentation layer.
    pub phase: SessionPhase,
    /// Last detection signal accepted while finding a person.
    pub person_in_view: bool,
    /// Countdown steps left.
    pub countdown_remaining: u32,
    /// Recording steps taken.
    pub recording_elapsed: u32,
    /// Recording steps allowed.
    pub recording_limit: u32,
    /// Sink selected for this session.
    pub capture_mode: CaptureMode,
    /// Frames reported by the capture collaborator during this attempt.
    pub frames_received: u64,
    /// File produced by the collaborator for this attempt's movie capture.
    pub recorded_file: Option<PathBuf>,
    /// Every file reported during this session, tagged with its attempt.
    /// Kept across re-arms.
    pub recordings: Vec<RecordedClip>,
}

/// Movie file written for one attempt of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedClip {
    /// Attempt whose capture window produced the file.
    pub attempt: u32,
    /// Where the collaborator wrote it.
    pub path: PathBuf,
}

/// Immutable copy of [`SessionState`] handed to observers.
pub type SessionSnapshot = SessionState;

impl SessionState {
    pub(crate) fn new(
        session_id: Uuid,
        capture_mode: CaptureMode,
        countdown: u32,
        recording_limit: u32,
    ) -> Self {
        Self {
            session_id,
            attempt: 1,
            phase: SessionPhase::FindingPerson,
            person_in_view: false,
            countdown_remaining: countdown,
            recording_elapsed: 0,
            recording_limit,
            capture_mode,
            frames_received: 0,
            recorded_file: None,
            recordings: Vec::new(),
        }
    }

    /// Back to `FindingPerson` for the next attempt of the same session.
    pub(crate) fn rearm(&mut self, countdown: u32) {
        self.attempt += 1;
        self.phase = SessionPhase::FindingPerson;
        self.person_in_view = false;
        self.countdown_remaining = countdown;
        self.recording_elapsed = 0;
        self.frames_received = 0;
        self.recorded_file = None;
    }
}
