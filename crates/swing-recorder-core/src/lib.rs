//! Swing-recorder Core Library
//!
//! Recording-session state machine for a camera capture flow: wait for a
//! person in frame, count down, record a fixed window, stop or cancel. Camera
//! access stays behind the [`CaptureCollaborator`] trait.
//!
//! # Example
//!
//! ```no_run
//! use swing_recorder_core::{
//!     CaptureCollaborator, CaptureMode, CoreResult, SessionConfig, SessionInbox, SessionPhase,
//!     SessionRuntime,
//! };
//!
//! struct Camera;
//!
//! impl CaptureCollaborator for Camera {
//!     fn begin_capture(&mut self, _mode: CaptureMode) -> CoreResult<()> { Ok(()) }
//!     fn end_capture(&mut self) -> CoreResult<()> { Ok(()) }
//!     fn discard_capture(&mut self) -> CoreResult<()> { Ok(()) }
//!     fn acquire_resources(&mut self) -> CoreResult<()> { Ok(()) }
//!     fn release_resources(&mut self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let inbox = SessionInbox::default();
//!     let detector = inbox.sender();
//!     let (runtime, handle) =
//!         SessionRuntime::new(SessionConfig::default(), Box::new(Camera), inbox);
//!     let task = tokio::spawn(runtime.run());
//!
//!     handle.start(CaptureMode::RecordMovie).await?;
//!     detector.post_detection(true)?;
//!
//!     let done = handle
//!         .wait_for_phase(|phase| phase == SessionPhase::StopRecording)
//!         .await?;
//!     println!("Recorded {} seconds", done.recording_elapsed);
//!
//!     handle.shutdown().await?;
//!     let _ = task.await;
//!     Ok(())
//! }
//! ```

mod error;
mod session;

pub use {
    error::Result as CoreResult,
    error::SessionError,
    session::{
        ArmedTimer, CaptureCollaborator, CaptureMode, Countdown, CountdownStep,
        DEFAULT_INBOX_CAPACITY, EventSender, FrameInfo, PartialCapturePolicy, PhaseObserver,
        RecordedClip, SessionConfig, SessionController, SessionEvent, SessionHandle,
        SessionInbox, SessionPhase, SessionRuntime, SessionSnapshot, SessionState, TimerKind,
    },
};

#[cfg(test)]
mod tests;
