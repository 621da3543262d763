//! Error types for sensor sources.

use thiserror::Error;

/// Errors delivered by a location source after subscription.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The user has not granted location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// Location services are switched off on the device.
    #[error("location services disabled")]
    LocationDisabled,

    /// Anything else; the source may recover on its own.
    #[error("location error: {0}")]
    Other(String),
}

impl LocationError {
    /// Whether the pipeline cannot continue without user or system action.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LocationError::PermissionDenied | LocationError::LocationDisabled
        )
    }
}

/// Errors returned synchronously by a `subscribe` call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source already has a subscriber.
    #[error("{0} source already subscribed")]
    AlreadySubscribed(&'static str),

    /// The source could not be reached.
    #[error("{source_name} source unavailable: {reason}")]
    Unavailable {
        source_name: &'static str,
        reason: String,
    },
}
