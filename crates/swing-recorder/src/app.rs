use crate::{AppResult, OverlayPresenter, OverlayText};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use swing_recorder_core::{CaptureMode, SessionHandle, SessionPhase, SessionSnapshot};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// How long to wait for the camera to report the written file after stopping.
const RECORDED_FILE_WAIT: Duration = Duration::from_secs(2);

/// Main application state.
///
/// Runs on the async runtime next to the session runtime task. Drives the
/// session through its handle and keeps the overlay in step with the
/// published snapshots. Ctrl-C cancels the live session.
pub struct App {
    pub(crate) handle: SessionHandle,
    pub(crate) presenter: Arc<Mutex<OverlayPresenter>>,
    pub(crate) capture_mode: CaptureMode,
    pub(crate) rearm_after_stop: bool,
}

impl App {
    /// Run one recording session to completion.
    ///
    /// The session runtime is always asked to shut down before returning,
    /// which tears down the session and releases the camera.
    #[instrument(skip(self))]
    pub(crate) async fn run(self) -> AppResult<()> {
        info!("Swing-Recorder starting");

        let result = self.drive().await;

        if let Err(e) = self.handle.shutdown().await {
            debug!(error = %e, "Session runtime already stopped");
        }

        info!("Swing-Recorder shut down successfully");

        result
    }

    async fn drive(&self) -> AppResult<()> {
        let mut snapshots = self.handle.subscribe();

        self.handle.start(self.capture_mode).await?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut cancel_requested = false;

        loop {
            tokio::select! {
                result = &mut ctrl_c, if !cancel_requested => {
                    cancel_requested = true;
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for ctrl-c");
                        continue;
                    }
                    info!("Cancel requested");
                    self.handle.cancel().await?;
                }

                changed = snapshots.changed() => {
                    if changed.is_err() {
                        warn!("Session runtime stopped unexpectedly");
                        break;
                    }

                    let snapshot = snapshots.borrow_and_update().clone();
                    let Some(snapshot) = snapshot else {
                        continue;
                    };

                    self.present(&snapshot);

                    if self.is_finished(&snapshot) {
                        self.report_outcome(snapshot, &mut snapshots).await;
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Whether the app should stop following the session.
    ///
    /// With re-arming enabled a completed recording flows straight back into
    /// `FindingPerson`, so only a cancel ends the app.
    fn is_finished(&self, snapshot: &SessionSnapshot) -> bool {
        match snapshot.phase {
            SessionPhase::Cancelled => true,
            SessionPhase::StopRecording => !self.rearm_after_stop,
            _ => false,
        }
    }

    fn present(&self, snapshot: &SessionSnapshot) {
        self.presenter
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .present(snapshot);
    }

    fn shown_overlay(&self) -> Option<OverlayText> {
        self.presenter
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .shown()
    }

    async fn report_outcome(
        &self,
        mut snapshot: SessionSnapshot,
        snapshots: &mut watch::Receiver<Option<SessionSnapshot>>,
    ) {
        if snapshot.phase == SessionPhase::StopRecording
            && self.capture_mode == CaptureMode::RecordMovie
            && snapshot.recorded_file.is_none()
        {
            let written = tokio::time::timeout(
                RECORDED_FILE_WAIT,
                snapshots.wait_for(|s| s.as_ref().is_some_and(|s| s.recorded_file.is_some())),
            )
            .await;

            match written {
                Ok(Ok(latest)) => {
                    if let Some(latest) = (*latest).clone() {
                        snapshot = latest;
                    }
                }
                Ok(Err(_)) => warn!("Session runtime stopped before the file was reported"),
                Err(_) => warn!("Camera did not report a recorded file in time"),
            }
        }

        info!(
            session_id = %snapshot.session_id,
            phase = %snapshot.phase,
            attempt = snapshot.attempt,
            recording_elapsed = snapshot.recording_elapsed,
            frames = snapshot.frames_received,
            recorded_file = ?snapshot.recorded_file,
            clips = snapshot.recordings.len(),
            overlay = ?self.shown_overlay(),
            "Session finished"
        );
    }
}
