use crate::config::{default_detection_delay_ms, default_frame_rate};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Simulated camera configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Directory for recorded clips (None = platform data dir).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Preview frames per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// How long the simulated detector takes to see the golfer.
    #[serde(default = "default_detection_delay_ms")]
    pub detection_delay_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            frame_rate: default_frame_rate(),
            detection_delay_ms: default_detection_delay_ms(),
        }
    }
}
