//! Controller configuration.

use crate::error::ControllerError;
use parkwatch_detector::Thresholds;
use parkwatch_sensors::DEFAULT_POLLING_INTERVAL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text of the notification shown while monitoring starts up.
pub const DEFAULT_MONITORING_MESSAGE: &str = "Monitoring activity...";

/// Settings fixed for the lifetime of a [`crate::Controller`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Detection thresholds passed to the detector.
    pub thresholds: Thresholds,

    /// Interval requested from the activity polling source.
    #[serde(rename = "polling_interval_ms", with = "duration_ms")]
    pub polling_interval: Duration,

    /// Initial foreground notification text.
    pub monitoring_message: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            monitoring_message: DEFAULT_MONITORING_MESSAGE.to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        self.thresholds.validate()?;
        if self.polling_interval.is_zero() {
            return Err(ControllerError::PollingInterval);
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
