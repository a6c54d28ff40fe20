use error_location::ErrorLocation;
use thiserror::Error;

/// Recording session errors with source location tracking.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Session configuration cannot drive a recording (e.g. zero-length window).
    #[error("Invalid configuration: {reason} {location}")]
    InvalidConfiguration {
        /// What is wrong with the configuration.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture collaborator could not start or finish a capture.
    ///
    /// The session is already `Cancelled` when this is returned.
    #[error("Capture unavailable: {reason} {location}")]
    CaptureUnavailable {
        /// Description reported by the capture collaborator.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `start` was called while a session is still in a non-terminal phase.
    #[error("A recording session is already active {location}")]
    SessionActive {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The session runtime exited before answering.
    #[error("Session runtime stopped {location}")]
    RuntimeStopped {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The session inbox is closed or full.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
