use crate::{CoreResult, session::CaptureMode};

/// Camera subsystem driven by the session controller.
///
/// Implementations own device access, frame delivery and file writing. The
/// controller only tells them when to open and close the capture window.
/// Inbound signals (frames, detection verdicts, finished files) go back
/// through an [`EventSender`](crate::EventSender), never through this trait.
pub trait CaptureCollaborator: Send {
    /// Attach the sink for `mode` and start capturing.
    ///
    /// # Errors
    ///
    /// Any error cancels the session; capture start is not retried.
    fn begin_capture(&mut self, mode: CaptureMode) -> CoreResult<()>;

    /// Close the capture window and finalize its output.
    ///
    /// # Errors
    ///
    /// Any error cancels the session.
    fn end_capture(&mut self) -> CoreResult<()>;

    /// Close the capture window and drop whatever was captured.
    ///
    /// # Errors
    ///
    /// Errors are logged; the session is already being cancelled.
    fn discard_capture(&mut self) -> CoreResult<()>;

    /// Open the device and start the preview.
    ///
    /// Called by `start` whenever the controller does not hold the device,
    /// including the first start. Must succeed without side effects when the
    /// device is already open.
    ///
    /// # Errors
    ///
    /// The start fails and no session is created.
    fn acquire_resources(&mut self) -> CoreResult<()>;

    /// Stop the preview and release the device. Called at most once between
    /// two successful starts.
    fn release_resources(&mut self);
}
