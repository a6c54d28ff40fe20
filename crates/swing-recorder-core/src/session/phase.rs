use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete phase of a recording attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the detector to report a person in frame.
    FindingPerson,
    /// Pre-roll countdown before capture begins.
    CountdownTimer,
    /// Capture window is open.
    Recording,
    /// Capture window closed normally.
    StopRecording,
    /// Attempt aborted by the user or by a capture failure.
    Cancelled,
}

impl SessionPhase {
    /// Terminal phases accept no further ticks or detection signals.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::StopRecording | SessionPhase::Cancelled)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::FindingPerson => "finding_person",
            SessionPhase::CountdownTimer => "countdown_timer",
            SessionPhase::Recording => "recording",
            SessionPhase::StopRecording => "stop_recording",
            SessionPhase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Which sink the capture collaborator attaches once recording begins.
///
/// Chosen when a session starts and fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Write the capture window to a movie file.
    RecordMovie,
    /// Stream frames to an in-process consumer; nothing is written to disk.
    #[default]
    StreamForProcessing,
}
