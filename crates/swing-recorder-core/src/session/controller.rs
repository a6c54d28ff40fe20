//! Recording session state machine.
//!
//! `FindingPerson -> CountdownTimer -> Recording -> StopRecording`, with
//! `Cancelled` reachable from every non-terminal phase. The controller is
//! synchronous and single-writer: the async runtime (or a test) feeds it one
//! event at a time and schedules real ticks from [`SessionController::armed_timer`].

use crate::{
    CoreResult, SessionError,
    session::{
        CaptureCollaborator, CaptureMode, Countdown, CountdownStep, FrameInfo,
        PartialCapturePolicy, RecordedClip, SessionConfig, SessionEvent, SessionPhase,
        SessionSnapshot, SessionState,
    },
};

use std::{collections::VecDeque, panic::Location, path::PathBuf, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

/// Callback invoked synchronously on every phase transition.
pub type PhaseObserver = Box<dyn FnMut(&SessionSnapshot) + Send>;

/// Which countdown a timer is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Pre-roll countdown in `CountdownTimer`.
    Countdown,
    /// Capture window in `Recording`.
    Recording,
}

/// Handle describing the currently armed timer.
///
/// Every arm gets a fresh generation; ticks carrying any other generation
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    /// What the timer counts.
    pub kind: TimerKind,
    /// Generation to stamp on ticks for this timer.
    pub generation: u64,
}

struct Timer {
    kind: TimerKind,
    generation: u64,
    countdown: Countdown,
}

/// Movie capture that was closed and whose file has not been reported yet.
struct PendingFile {
    session_id: Uuid,
    attempt: u32,
}

/// Owns the phase of one recording flow and coordinates the capture
/// collaborator with it.
pub struct SessionController {
    config: SessionConfig,
    capture: Box<dyn CaptureCollaborator>,
    state: Option<SessionState>,
    timer: Option<Timer>,
    next_generation: u64,
    observers: Vec<PhaseObserver>,
    resources_held: bool,
    /// Closed movie captures in the order their files will be reported.
    pending_files: VecDeque<PendingFile>,
}

impl SessionController {
    /// Creates an uninitialized controller. Nothing happens until [`start`](Self::start).
    pub fn new(config: SessionConfig, capture: Box<dyn CaptureCollaborator>) -> Self {
        Self {
            config,
            capture,
            state: None,
            timer: None,
            next_generation: 0,
            observers: Vec::new(),
            resources_held: false,
            pending_files: VecDeque::new(),
        }
    }

    /// Registers an observer for phase transitions.
    pub fn on_phase_change<F>(&mut self, observer: F)
    where
        F: FnMut(&SessionSnapshot) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Starts a new session in `FindingPerson`.
    ///
    /// Allowed when no session exists yet or the previous one is terminal.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the configured recording limit or tick
    ///   interval is zero. The controller is left untouched.
    /// - `SessionActive` if the current session has not finished.
    /// - `CaptureUnavailable` if the collaborator released its device after
    ///   the previous session and cannot reopen it. The controller keeps the
    ///   previous terminal state.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self, capture_mode: CaptureMode) -> CoreResult<()> {
        self.config.validate()?;

        if let Some(state) = &self.state
            && !state.phase.is_terminal()
        {
            return Err(SessionError::SessionActive {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !self.resources_held {
            if let Err(e) = self.capture.acquire_resources() {
                error!(error = %e, "Capture device could not be opened");
                return Err(e);
            }
            self.resources_held = true;
        }

        let state = SessionState::new(
            Uuid::new_v4(),
            capture_mode,
            self.config.countdown_secs,
            self.config.recording_limit_secs,
        );

        info!(
            session_id = %state.session_id,
            capture_mode = ?capture_mode,
            countdown = self.config.countdown_secs,
            recording_limit = self.config.recording_limit_secs,
            "Recording session started"
        );

        self.timer = None;
        self.state = Some(state);
        self.notify();

        Ok(())
    }

    /// Feeds one detector verdict. Only effective in `FindingPerson`.
    ///
    /// Detectors report on every frame, so ignored verdicts log at trace.
    #[instrument(level = "trace", skip(self))]
    pub fn report_person_detected(&mut self, detected: bool) {
        let countdown = self.config.countdown_secs;

        let Some(state) = self.state.as_mut() else {
            trace!("Detection ignored, no session started");
            return;
        };

        if state.phase != SessionPhase::FindingPerson {
            trace!(phase = %state.phase, "Detection ignored outside finding_person");
            return;
        }

        state.person_in_view = detected;
        if !detected {
            return;
        }

        state.phase = SessionPhase::CountdownTimer;
        state.countdown_remaining = countdown;

        self.arm(TimerKind::Countdown, countdown);
        self.notify();
    }

    /// Delivers one tick to whichever timer is armed.
    ///
    /// # Errors
    ///
    /// `CaptureUnavailable` if the tick opened or closed the capture window
    /// and the collaborator failed. The session is `Cancelled` by then.
    #[track_caller]
    pub fn tick(&mut self) -> CoreResult<()> {
        match self.timer.as_ref().map(|timer| timer.generation) {
            Some(generation) => self.on_tick(generation),
            None => {
                debug!("Tick ignored, no timer armed");
                Ok(())
            }
        }
    }

    /// Aborts the current attempt. No-op when already terminal or never started.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) {
        let Some(phase) = self.phase() else {
            debug!("Cancel ignored, no session started");
            return;
        };

        if phase.is_terminal() {
            debug!(phase = %phase, "Cancel ignored in terminal phase");
            return;
        }

        self.disarm();

        if phase == SessionPhase::Recording {
            let result = match self.config.partial_capture {
                PartialCapturePolicy::Keep => self.capture.end_capture(),
                PartialCapturePolicy::Discard => self.capture.discard_capture(),
            };
            match result {
                Ok(()) if self.config.partial_capture == PartialCapturePolicy::Keep => {
                    self.expect_file();
                }
                Ok(()) => {}
                Err(e) => warn!(error = %e, "Failed to settle partial capture on cancel"),
            }
        }

        if let Some(state) = self.state.as_mut() {
            state.phase = SessionPhase::Cancelled;
        }
        self.release();
        self.notify();
    }

    /// Routes one typed inbound event.
    ///
    /// # Errors
    ///
    /// `CaptureUnavailable` when the event (a tick or `CaptureFailed`) ends
    /// the session because of a collaborator failure.
    #[track_caller]
    pub fn handle(&mut self, event: SessionEvent) -> CoreResult<()> {
        match event {
            SessionEvent::DetectionUpdated(detected) => {
                self.report_person_detected(detected);
                Ok(())
            }
            SessionEvent::FrameArrived(frame) => {
                self.frame_arrived(frame);
                Ok(())
            }
            SessionEvent::RecordingFinished(path) => {
                self.recording_finished(path);
                Ok(())
            }
            SessionEvent::CaptureFailed { reason } => self.capture_failed(reason),
            SessionEvent::Tick { generation } => self.on_tick(generation),
            SessionEvent::Cancel => {
                self.cancel();
                Ok(())
            }
        }
    }

    /// Releases capture resources for good, cancelling a running attempt first.
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        self.cancel();
        self.disarm();
        self.release();
    }

    /// Current phase, `None` before the first successful start.
    pub fn phase(&self) -> Option<SessionPhase> {
        self.state.as_ref().map(|state| state.phase)
    }

    /// Countdown steps left (0 before start).
    pub fn countdown_remaining(&self) -> u32 {
        self.state
            .as_ref()
            .map_or(0, |state| state.countdown_remaining)
    }

    /// Recording steps taken (0 before start).
    pub fn recording_elapsed(&self) -> u32 {
        self.state.as_ref().map_or(0, |state| state.recording_elapsed)
    }

    /// Configured capture window length.
    pub fn recording_limit(&self) -> u32 {
        self.config.recording_limit_secs
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.state.clone()
    }

    /// Timer the driver should be ticking, if any.
    pub fn armed_timer(&self) -> Option<ArmedTimer> {
        self.timer.as_ref().map(|timer| ArmedTimer {
            kind: timer.kind,
            generation: timer.generation,
        })
    }

    /// Wall-clock period of one tick.
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    #[track_caller]
    fn on_tick(&mut self, generation: u64) -> CoreResult<()> {
        let Some(timer) = self.timer.as_mut() else {
            debug!(generation, "Tick ignored, no timer armed");
            return Ok(());
        };

        if timer.generation != generation {
            debug!(
                generation,
                armed = timer.generation,
                "Stale tick ignored"
            );
            return Ok(());
        }

        let kind = timer.kind;
        let step = timer.countdown.tick();
        let elapsed = timer.countdown.elapsed();

        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        match (kind, step) {
            (_, CountdownStep::AlreadyExpired) => {
                debug!(?kind, "Tick ignored, timer already expired");
                Ok(())
            }
            (TimerKind::Countdown, CountdownStep::Ticked { remaining }) => {
                state.countdown_remaining = remaining;
                debug!(session_id = %state.session_id, remaining, "Countdown tick");
                Ok(())
            }
            (TimerKind::Countdown, CountdownStep::Expired) => {
                state.countdown_remaining = 0;
                self.begin_recording()
            }
            (TimerKind::Recording, CountdownStep::Ticked { .. }) => {
                state.recording_elapsed = elapsed;
                debug!(session_id = %state.session_id, elapsed, "Recording tick");
                Ok(())
            }
            (TimerKind::Recording, CountdownStep::Expired) => {
                state.recording_elapsed = elapsed;
                self.finish_recording()
            }
        }
    }

    #[track_caller]
    fn begin_recording(&mut self) -> CoreResult<()> {
        self.disarm();

        let Some(mode) = self.state.as_ref().map(|state| state.capture_mode) else {
            return Ok(());
        };

        if let Err(e) = self.capture.begin_capture(mode) {
            return Err(self.fail_capture(e.to_string()));
        }

        if let Some(state) = self.state.as_mut() {
            state.phase = SessionPhase::Recording;
            state.recording_elapsed = 0;
        }

        let limit = self.config.recording_limit_secs;
        self.arm(TimerKind::Recording, limit);
        self.notify();

        Ok(())
    }

    #[track_caller]
    fn finish_recording(&mut self) -> CoreResult<()> {
        self.disarm();

        if let Err(e) = self.capture.end_capture() {
            return Err(self.fail_capture(e.to_string()));
        }
        self.expect_file();

        if let Some(state) = self.state.as_mut() {
            state.phase = SessionPhase::StopRecording;
        }
        self.notify();

        if self.config.rearm_after_stop {
            let countdown = self.config.countdown_secs;
            if let Some(state) = self.state.as_mut() {
                state.rearm(countdown);
            }
            self.notify();
        }

        Ok(())
    }

    #[track_caller]
    fn capture_failed(&mut self, reason: String) -> CoreResult<()> {
        match self.phase() {
            Some(phase) if !phase.is_terminal() => Err(self.fail_capture(reason)),
            phase => {
                debug!(?phase, reason = %reason, "Capture failure ignored, no active session");
                Ok(())
            }
        }
    }

    /// Forces `Cancelled` after a collaborator failure.
    #[track_caller]
    fn fail_capture(&mut self, reason: String) -> SessionError {
        self.disarm();

        if let Some(state) = self.state.as_mut() {
            error!(
                session_id = %state.session_id,
                phase = %state.phase,
                reason = %reason,
                "Capture unavailable, cancelling session"
            );
            state.phase = SessionPhase::Cancelled;
        }

        self.release();
        self.notify();

        SessionError::CaptureUnavailable {
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    fn frame_arrived(&mut self, frame: FrameInfo) {
        match self.state.as_mut() {
            Some(state) if !state.phase.is_terminal() => {
                state.frames_received += 1;
                trace!(sequence = frame.sequence, timestamp = ?frame.timestamp, "Frame arrived");
            }
            _ => trace!(sequence = frame.sequence, "Frame ignored, no active session"),
        }
    }

    /// Remembers that a movie capture of the current attempt was closed and
    /// its file will be reported later.
    fn expect_file(&mut self) {
        if let Some(state) = self.state.as_ref()
            && state.capture_mode == CaptureMode::RecordMovie
        {
            self.pending_files.push_back(PendingFile {
                session_id: state.session_id,
                attempt: state.attempt,
            });
        }
    }

    /// Attaches a reported file to the attempt whose capture produced it.
    ///
    /// Collaborators report files in the order captures were closed, which
    /// may be after a re-arm has already moved on to the next attempt.
    fn recording_finished(&mut self, path: PathBuf) {
        let Some(pending) = self.pending_files.pop_front() else {
            debug!(path = ?path, "Recording file ignored, no capture awaiting a file");
            return;
        };

        let Some(state) = self.state.as_mut() else {
            return;
        };

        if pending.session_id != state.session_id {
            debug!(
                path = ?path,
                session_id = %pending.session_id,
                "Recording file ignored, session already replaced"
            );
            return;
        }

        info!(
            session_id = %state.session_id,
            attempt = pending.attempt,
            path = ?path,
            "Recording file written"
        );

        if pending.attempt == state.attempt {
            state.recorded_file = Some(path.clone());
        }
        state.recordings.push(RecordedClip {
            attempt: pending.attempt,
            path,
        });
    }

    fn arm(&mut self, kind: TimerKind, duration: u32) {
        self.next_generation += 1;
        self.timer = Some(Timer {
            kind,
            generation: self.next_generation,
            countdown: Countdown::new(duration),
        });
    }

    fn disarm(&mut self) {
        self.timer = None;
    }

    fn release(&mut self) {
        if self.resources_held {
            self.capture.release_resources();
            self.resources_held = false;
        }
    }

    fn notify(&mut self) {
        let Some(state) = self.state.as_ref() else {
            return;
        };

        info!(
            session_id = %state.session_id,
            attempt = state.attempt,
            phase = %state.phase,
            "Session phase changed"
        );

        for observer in &mut self.observers {
            observer(state);
        }
    }
}
