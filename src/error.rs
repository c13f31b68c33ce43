//! Error types for flipclock

use thiserror::Error;

/// Errors produced while parsing clock configuration values.
///
/// The clock itself never fails to build: callers that go through
/// [`FlipClockConfig`](crate::config::FlipClockConfig) get defaults
/// substituted for bad values, and these errors only surface from the
/// explicit parsing helpers.
#[derive(Error, Debug)]
pub enum Error {
    /// A target date string could not be understood
    #[error("invalid target date {0:?}")]
    InvalidDate(String),

    /// A CSS color string could not be understood
    #[error("invalid color {0:?}")]
    InvalidColor(String),

    /// A CSS length string could not be understood
    #[error("invalid length {0:?}")]
    InvalidLength(String),

    /// An easing function string could not be understood
    #[error("invalid easing function {0:?}")]
    InvalidEasing(String),

    /// A timer could not be registered with the event loop
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),

    /// A JSON configuration document was malformed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for flipclock parsing operations
pub type Result<T> = std::result::Result<T, Error>;
