mod capture;
mod config;
mod controller;
mod countdown;
mod event;
mod phase;
mod runtime;
mod state;

pub use {
    capture::CaptureCollaborator,
    config::{PartialCapturePolicy, SessionConfig},
    controller::{ArmedTimer, PhaseObserver, SessionController, TimerKind},
    countdown::{Countdown, CountdownStep},
    event::{FrameInfo, SessionEvent},
    phase::{CaptureMode, SessionPhase},
    runtime::{DEFAULT_INBOX_CAPACITY, EventSender, SessionHandle, SessionInbox, SessionRuntime},
    state::{RecordedClip, SessionSnapshot, SessionState},
};
