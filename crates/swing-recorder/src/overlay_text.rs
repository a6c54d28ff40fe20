use swing_recorder_core::{SessionPhase, SessionSnapshot};

use std::fmt;

/// Instruction overlay shown over the camera preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayText {
    /// Waiting for the golfer to step into frame.
    FindPerson,
    /// Countdown armed, no tick delivered yet.
    GetReady,
    /// Seconds left before recording starts.
    Countdown(u32),
    /// Capture is running.
    Swing,
    /// Recording window completed.
    Complete,
    /// Session ended without a full recording.
    Cancelled,
}

impl OverlayText {
    /// Overlay for a session snapshot.
    ///
    /// The countdown shows instructions until its first tick, then the
    /// remaining seconds.
    pub fn for_snapshot(snapshot: &SessionSnapshot, countdown_secs: u32) -> Self {
        match snapshot.phase {
            SessionPhase::FindingPerson => Self::FindPerson,
            SessionPhase::CountdownTimer if snapshot.countdown_remaining >= countdown_secs => {
                Self::GetReady
            }
            SessionPhase::CountdownTimer => Self::Countdown(snapshot.countdown_remaining),
            SessionPhase::Recording => Self::Swing,
            SessionPhase::StopRecording => Self::Complete,
            SessionPhase::Cancelled => Self::Cancelled,
        }
    }
}

impl fmt::Display for OverlayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindPerson => f.write_str("Stand so that you can see your whole body in screen"),
            Self::GetReady => f.write_str("Get ready to swing after the timer"),
            Self::Countdown(remaining) => write!(f, "{}", remaining),
            Self::Swing => f.write_str("Swing!"),
            Self::Complete => f.write_str("Recording complete"),
            Self::Cancelled => f.write_str("Recording cancelled"),
        }
    }
}
