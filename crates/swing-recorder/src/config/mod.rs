mod camera_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod session_settings;

pub(crate) use {
    camera_config::CameraConfig, config::Config, logging_config::LoggingConfig,
    session_settings::SessionSettings,
};

pub(crate) const DEFAULT_COUNTDOWN_SECS: u32 = 5;
pub(crate) const DEFAULT_RECORDING_LIMIT_SECS: u32 = 30;
pub(crate) const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub(crate) const DEFAULT_FRAME_RATE: u32 = 30;
pub(crate) const DEFAULT_DETECTION_DELAY_MS: u64 = 3000;
pub(crate) const DEFAULT_LOG_FILTER: &str = "swing_recorder=info,swing_recorder_core=info";

pub(crate) fn default_countdown_secs() -> u32 {
    DEFAULT_COUNTDOWN_SECS
}

pub(crate) fn default_recording_limit_secs() -> u32 {
    DEFAULT_RECORDING_LIMIT_SECS
}

pub(crate) fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

pub(crate) fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

pub(crate) fn default_detection_delay_ms() -> u64 {
    DEFAULT_DETECTION_DELAY_MS
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
