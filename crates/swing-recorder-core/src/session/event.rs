use std::{path::PathBuf, time::Duration};

/// Metadata for one frame delivered by the capture collaborator.
///
/// Pixel data never crosses into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Monotonic frame counter assigned by the collaborator.
    pub sequence: u64,
    /// Presentation timestamp relative to the start of the preview.
    pub timestamp: Duration,
}

/// Typed inputs to the session controller.
///
/// Every external signal, including framework delegate callbacks, enters the
/// controller as one of these through the serialized inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Detector verdict for the current frame.
    DetectionUpdated(bool),
    /// A preview or stream frame arrived.
    FrameArrived(FrameInfo),
    /// The collaborator finished writing a movie file.
    RecordingFinished(PathBuf),
    /// The capture collaborator lost its device or failed mid-capture.
    CaptureFailed {
        /// Description reported by the collaborator.
        reason: String,
    },
    /// One period of the armed timer elapsed.
    Tick {
        /// Generation of the timer that produced this tick.
        generation: u64,
    },
    /// User asked to abort the attempt.
    Cancel,
}
