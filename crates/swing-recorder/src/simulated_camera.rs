//! Stand-in for the platform camera stack.
//!
//! Runs a frame pump on its own thread, the way a camera delivers sample
//! buffers on a background queue. The pump doubles as the person detector:
//! every frame carries a verdict, positive once `detection_delay` has passed.
//! Releasing stops the pump and acquiring starts a fresh one.
//! Nothing here touches session state; it only posts events.

use crate::{AppError, AppResult, config::CameraConfig};

use std::{
    fs,
    panic::Location,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use swing_recorder_core::{
    CaptureCollaborator, CaptureMode, CoreResult, EventSender, FrameInfo, SessionError,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug)]
struct ActiveCapture {
    mode: CaptureMode,
    file: Option<PathBuf>,
    started_at: Instant,
}

/// Simulated camera implementing [`CaptureCollaborator`].
pub struct SimulatedCamera {
    events: EventSender,
    recordings_dir: PathBuf,
    frame_interval: Duration,
    detection_delay: Duration,
    /// Stop flag of the running frame pump, `None` while released. Each pump
    /// gets its own flag so a restart never revives a stopping thread.
    pump: Option<Arc<AtomicBool>>,
    active: Option<ActiveCapture>,
}

impl SimulatedCamera {
    /// Starts the preview frame pump.
    ///
    /// # Errors
    ///
    /// Returns `CameraError` for a zero frame rate or if the pump thread
    /// cannot be spawned.
    #[track_caller]
    #[instrument(skip(events))]
    pub fn new(
        events: EventSender,
        recordings_dir: PathBuf,
        config: &CameraConfig,
    ) -> AppResult<Self> {
        if config.frame_rate == 0 {
            return Err(AppError::CameraError {
                reason: "frame rate must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut camera = Self {
            events,
            recordings_dir,
            frame_interval: Duration::from_secs(1) / config.frame_rate,
            detection_delay: Duration::from_millis(config.detection_delay_ms),
            pump: None,
            active: None,
        };

        camera.start_pump().map_err(|e| AppError::CameraError {
            reason: format!("Failed to spawn frame pump: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(
            frame_rate = config.frame_rate,
            detection_delay_ms = config.detection_delay_ms,
            recordings_dir = ?camera.recordings_dir,
            "Simulated camera initialized"
        );

        Ok(camera)
    }

    fn start_pump(&mut self) -> std::io::Result<()> {
        if self.pump.is_some() {
            return Ok(());
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let pump_shutdown = Arc::clone(&shutdown);
        let events = self.events.clone();
        let frame_interval = self.frame_interval;
        let detection_delay = self.detection_delay;

        // Detached: the pump checks its flag before every post and exits on
        // its next frame, so stopping never blocks the session task.
        std::thread::Builder::new()
            .name("camera-frames".to_string())
            .spawn(move || run_frame_pump(events, pump_shutdown, frame_interval, detection_delay))?;

        self.pump = Some(shutdown);
        debug!("Frame pump started");

        Ok(())
    }

    fn stop_pump(&mut self) {
        if let Some(shutdown) = self.pump.take() {
            shutdown.store(true, Ordering::Release);
            info!("Simulated camera stopped");
        }
    }

    #[track_caller]
    fn unavailable(reason: String) -> SessionError {
        SessionError::CaptureUnavailable {
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl CaptureCollaborator for SimulatedCamera {
    #[instrument(skip(self))]
    fn acquire_resources(&mut self) -> CoreResult<()> {
        self.start_pump()
            .map_err(|e| Self::unavailable(format!("Failed to restart frame pump: {}", e)))
    }

    #[instrument(skip(self))]
    fn begin_capture(&mut self, mode: CaptureMode) -> CoreResult<()> {
        if self.pump.is_none() {
            return Err(Self::unavailable("camera already released".to_string()));
        }

        let file = match mode {
            CaptureMode::RecordMovie => Some(
                self.recordings_dir
                    .join(format!("swing-{}.mov", Uuid::new_v4())),
            ),
            CaptureMode::StreamForProcessing => None,
        };

        info!(?mode, file = ?file, "Capture started");

        self.active = Some(ActiveCapture {
            mode,
            file,
            started_at: Instant::now(),
        });

        Ok(())
    }

    #[instrument(skip(self))]
    fn end_capture(&mut self) -> CoreResult<()> {
        let Some(capture) = self.active.take() else {
            warn!("end_capture without an active capture");
            return Ok(());
        };

        let duration = capture.started_at.elapsed();

        if let Some(file) = capture.file {
            fs::File::create(&file).map_err(|e| {
                Self::unavailable(format!("Failed to write {}: {}", file.display(), e))
            })?;

            if let Err(e) = self.events.post_recording_finished(file.clone()) {
                warn!(error = %e, "Failed to report finished recording");
            }
        }

        info!(
            mode = ?capture.mode,
            duration_ms = duration.as_millis(),
            "Capture finished"
        );

        Ok(())
    }

    #[instrument(skip(self))]
    fn discard_capture(&mut self) -> CoreResult<()> {
        if let Some(capture) = self.active.take() {
            info!(mode = ?capture.mode, "Partial capture discarded");
        }
        Ok(())
    }

    fn release_resources(&mut self) {
        self.active = None;
        self.stop_pump();
    }
}

impl Drop for SimulatedCamera {
    fn drop(&mut self) {
        self.stop_pump();
    }
}

fn run_frame_pump(
    events: EventSender,
    shutdown: Arc<AtomicBool>,
    frame_interval: Duration,
    detection_delay: Duration,
) {
    let started = Instant::now();
    let mut sequence: u64 = 0;

    while !shutdown.load(Ordering::Acquire) {
        let timestamp = started.elapsed();

        if !events.post_frame(FrameInfo {
            sequence,
            timestamp,
        }) && events.is_closed()
        {
            break;
        }

        // Full inbox: the verdict is repeated on the next frame anyway.
        if let Err(e) = events.post_detection(timestamp >= detection_delay)
            && events.is_closed()
        {
            debug!(error = %e, "Session gone, frame pump exiting");
            break;
        }

        sequence += 1;
        std::thread::sleep(frame_interval);
    }

    debug!(frames = sequence, "Frame pump stopped");
}
