mod countdown;
mod runtime;

use crate::{
    CaptureCollaborator, CaptureMode, CoreResult, SessionConfig, SessionController,
    SessionError, SessionPhase,
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
    time::Duration,
};

use error_location::ErrorLocation;

/// One call made by the controller into the capture collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaptureCall {
    Acquire,
    Begin(CaptureMode),
    End,
    Discard,
    Release,
}

/// Capture collaborator that records every call and can be told to fail.
#[derive(Clone, Default)]
pub(crate) struct MockCapture {
    calls: Arc<Mutex<Vec<CaptureCall>>>,
    fail_acquire: bool,
    fail_begin: bool,
    fail_end: bool,
}

impl MockCapture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_acquire() -> Self {
        Self {
            fail_acquire: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_end() -> Self {
        Self {
            fail_end: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<CaptureCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn count(&self, call: CaptureCall) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: CaptureCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    #[track_caller]
    fn unavailable() -> SessionError {
        SessionError::CaptureUnavailable {
            reason: "camera busy".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl CaptureCollaborator for MockCapture {
    fn acquire_resources(&mut self) -> CoreResult<()> {
        self.record(CaptureCall::Acquire);
        if self.fail_acquire {
            return Err(Self::unavailable());
        }
        Ok(())
    }

    fn begin_capture(&mut self, mode: CaptureMode) -> CoreResult<()> {
        self.record(CaptureCall::Begin(mode));
        if self.fail_begin {
            return Err(Self::unavailable());
        }
        Ok(())
    }

    fn end_capture(&mut self) -> CoreResult<()> {
        self.record(CaptureCall::End);
        if self.fail_end {
            return Err(Self::unavailable());
        }
        Ok(())
    }

    fn discard_capture(&mut self) -> CoreResult<()> {
        self.record(CaptureCall::Discard);
        Ok(())
    }

    fn release_resources(&mut self) {
        self.record(CaptureCall::Release);
    }
}

/// Phases seen by a registered observer, in order.
pub(crate) type PhaseLog = Arc<Mutex<Vec<SessionPhase>>>;

pub(crate) fn phases(log: &PhaseLog) -> Vec<SessionPhase> {
    log.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

pub(crate) fn config(countdown: u32, limit: u32) -> SessionConfig {
    SessionConfig {
        countdown_secs: countdown,
        recording_limit_secs: limit,
        tick_interval: Duration::from_secs(1),
        ..SessionConfig::default()
    }
}

/// Controller wired to `capture` with a phase-logging observer.
pub(crate) fn observed_controller(
    config: SessionConfig,
    capture: &MockCapture,
) -> (SessionController, PhaseLog) {
    let log: PhaseLog = Arc::new(Mutex::new(Vec::new()));
    let mut controller = SessionController::new(config, Box::new(capture.clone()));

    let sink = Arc::clone(&log);
    controller.on_phase_change(move |snapshot| {
        sink.lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(snapshot.phase);
    });

    (controller, log)
}

pub(crate) fn tick_n(controller: &mut SessionController, n: u32) {
    for _ in 0..n {
        let _ = controller.tick();
    }
}
