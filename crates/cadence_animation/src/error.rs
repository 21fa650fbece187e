//! Timeline error types

use thiserror::Error;

use crate::scheduler::TimelineId;

/// Timeline-related errors
#[derive(Error, Debug)]
pub enum TimelineError {
    /// The operation has no meaning on the base timing engine
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// The id does not refer to a timeline owned by this scheduler
    #[error("Unknown timeline: {0:?}")]
    UnknownTimeline(TimelineId),

    /// Timeline configuration could not be parsed
    #[error("Invalid timeline config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
