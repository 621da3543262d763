//! Detection thresholds.

use crate::activity::ActivityKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default speed (m/s) under which a driving vehicle may be stopping.
pub const DEFAULT_STOP_SPEED: f32 = 0.1;

/// Default speed (m/s) above which the device is definitely in motion.
pub const DEFAULT_DRIVING_SPEED: f32 = 0.7;

/// Default minimum confidence an activity sample must exceed.
pub const DEFAULT_CONFIDENCE_THRESHOLD: i32 = 70;

/// Errors raised when a threshold set is inconsistent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThresholdsError {
    #[error("speed thresholds must be finite and non-negative (stop: {stop}, driving: {driving})")]
    InvalidSpeed { stop: f32, driving: f32 },

    #[error("stop speed {stop} must be below driving speed {driving}")]
    SpeedOrder { stop: f32, driving: f32 },

    #[error("confidence threshold {0} is outside 0-100")]
    Confidence(i32),

    #[error("at least one confirm activity kind is required")]
    NoConfirmKinds,
}

/// Fixed configuration for a [`crate::ParkingDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub stop_speed: f32,
    pub driving_speed: f32,
    pub confidence_threshold: i32,
    pub confirm_activity_kinds: Vec<ActivityKind>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stop_speed: DEFAULT_STOP_SPEED,
            driving_speed: DEFAULT_DRIVING_SPEED,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            confirm_activity_kinds: ActivityKind::HUMAN_LOCOMOTION.to_vec(),
        }
    }
}

impl Thresholds {
    /// Build a threshold set with the default confirm kinds.
    pub fn new(
        stop_speed: f32,
        driving_speed: f32,
        confidence_threshold: i32,
    ) -> Result<Self, ThresholdsError> {
        let thresholds = Self {
            stop_speed,
            driving_speed,
            confidence_threshold,
            ..Self::default()
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Replace the confirm kinds.
    pub fn with_confirm_kinds(
        mut self,
        kinds: impl IntoIterator<Item = ActivityKind>,
    ) -> Result<Self, ThresholdsError> {
        self.confirm_activity_kinds = kinds.into_iter().collect();
        self.validate()?;
        Ok(self)
    }

    /// Check the `stop_speed < driving_speed` invariant and value ranges.
    pub fn validate(&self) -> Result<(), ThresholdsError> {
        let (stop, driving) = (self.stop_speed, self.driving_speed);
        if !stop.is_finite() || !driving.is_finite() || stop < 0.0 || driving < 0.0 {
            return Err(ThresholdsError::InvalidSpeed { stop, driving });
        }
        if stop >= driving {
            return Err(ThresholdsError::SpeedOrder { stop, driving });
        }
        if !(0..=100).contains(&self.confidence_threshold) {
            return Err(ThresholdsError::Confidence(self.confidence_threshold));
        }
        if self.confirm_activity_kinds.is_empty() {
            return Err(ThresholdsError::NoConfirmKinds);
        }
        Ok(())
    }

    pub fn is_confirm_kind(&self, kind: ActivityKind) -> bool {
        self.confirm_activity_kinds.contains(&kind)
    }
}
