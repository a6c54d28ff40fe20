use crate::config::{default_countdown_secs, default_recording_limit_secs, default_tick_interval_ms};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use swing_recorder_core::{CaptureMode, PartialCapturePolicy, SessionConfig};

/// Recording flow timing and policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Pre-roll countdown, in seconds.
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,

    /// Length of the recorded clip, in seconds.
    #[serde(default = "default_recording_limit_secs")]
    pub recording_limit_secs: u32,

    /// Milliseconds per countdown step.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Write a movie file or stream frames for processing.
    #[serde(default)]
    pub capture_mode: CaptureMode,

    /// Wait for the next golfer automatically after each recording.
    #[serde(default)]
    pub rearm_after_stop: bool,

    /// Keep or discard a clip cut short by cancel.
    #[serde(default)]
    pub partial_capture: PartialCapturePolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            countdown_secs: default_countdown_secs(),
            recording_limit_secs: default_recording_limit_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            capture_mode: CaptureMode::default(),
            rearm_after_stop: false,
            partial_capture: PartialCapturePolicy::default(),
        }
    }
}

impl SessionSettings {
    /// Controller configuration for these settings. Validation happens at start.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            countdown_secs: self.countdown_secs,
            recording_limit_secs: self.recording_limit_secs,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            rearm_after_stop: self.rearm_after_stop,
            partial_capture: self.partial_capture,
        }
    }
}
