use crate::{CoreResult, SessionError};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

const DEFAULT_COUNTDOWN_SECS: u32 = 5;
const DEFAULT_RECORDING_LIMIT_SECS: u32 = 30;
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What happens to a partially captured clip when a session is cancelled
/// while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialCapturePolicy {
    /// Finalize the partial clip through `end_capture`.
    Keep,
    /// Throw the partial clip away through `discard_capture`.
    #[default]
    Discard,
}

/// Timing and policy knobs for a recording session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pre-roll countdown length, in ticks.
    pub countdown_secs: u32,
    /// Capture window length, in ticks. Must be greater than zero.
    pub recording_limit_secs: u32,
    /// Wall-clock period of one tick.
    pub tick_interval: Duration,
    /// Return to `FindingPerson` for another swing as soon as a recording
    /// completes, instead of waiting for an explicit `start`.
    pub rearm_after_stop: bool,
    /// Handling of the partial clip on cancel during `Recording`.
    pub partial_capture: PartialCapturePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            recording_limit_secs: DEFAULT_RECORDING_LIMIT_SECS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            rearm_after_stop: false,
            partial_capture: PartialCapturePolicy::Discard,
        }
    }
}

impl SessionConfig {
    /// Reject configurations that cannot produce a recording.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero recording limit or a zero
    /// tick interval.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        if self.recording_limit_secs == 0 {
            return Err(SessionError::InvalidConfiguration {
                reason: "recording limit must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.tick_interval.is_zero() {
            return Err(SessionError::InvalidConfiguration {
                reason: "tick interval must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
