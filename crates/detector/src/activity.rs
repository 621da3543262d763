//! Activity-recognition classifications.

use serde::{Deserialize, Serialize};

/// Coarse activity classification reported by the platform recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Still,
    Walking,
    Running,
    OnFoot,
    OnBicycle,
    InVehicle,
    /// Tilting, unknown, or any code this crate does not model.
    Other,
}

impl ActivityKind {
    /// Kinds that show the owner has left the vehicle on their own power.
    pub const HUMAN_LOCOMOTION: [ActivityKind; 4] = [
        ActivityKind::Walking,
        ActivityKind::Running,
        ActivityKind::OnFoot,
        ActivityKind::OnBicycle,
    ];

    /// Map a platform activity-recognition code.
    ///
    /// Codes follow the Play Services `DetectedActivity` numbering.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ActivityKind::InVehicle,
            1 => ActivityKind::OnBicycle,
            2 => ActivityKind::OnFoot,
            3 => ActivityKind::Still,
            7 => ActivityKind::Walking,
            8 => ActivityKind::Running,
            _ => ActivityKind::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Still => "STILL",
            ActivityKind::Walking => "WALKING",
            ActivityKind::Running => "RUNNING",
            ActivityKind::OnFoot => "ON_FOOT",
            ActivityKind::OnBicycle => "ON_BICYCLE",
            ActivityKind::InVehicle => "IN_VEHICLE",
            ActivityKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One polled classification with its confidence (nominally 0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySample {
    pub kind: ActivityKind,
    pub confidence: i32,
}

impl ActivitySample {
    pub fn new(kind: ActivityKind, confidence: i32) -> Self {
        Self { kind, confidence }
    }
}
