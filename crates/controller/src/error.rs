//! Error types for the controller.

use parkwatch_detector::ThresholdsError;
use parkwatch_events::SinkError;
use parkwatch_sensors::SourceError;
use thiserror::Error;

/// Errors raised while configuring or starting a controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The configured thresholds are inconsistent.
    #[error("invalid thresholds: {0}")]
    Thresholds(#[from] ThresholdsError),

    /// The activity polling interval is zero.
    #[error("polling interval must be greater than zero")]
    PollingInterval,

    /// The monitoring notification or foreground registration failed.
    #[error("failed to enter foreground: {0}")]
    Foreground(#[source] SinkError),

    /// A sensor source refused the subscription.
    #[error("failed to subscribe to {stage}: {source}")]
    Subscribe {
        stage: &'static str,
        #[source]
        source: SourceError,
    },
}
