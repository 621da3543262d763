//! JSON-lines sensor traces.
//!
//! One entry per line, tagged by `type`. Blank lines and lines starting
//! with `#` are skipped.

use parkwatch_detector::{ActivityKind, VehicleTransition};
use parkwatch_sensors::LocationError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Location error categories as written in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationErrorKind {
    PermissionDenied,
    LocationDisabled,
    Other,
}

impl LocationErrorKind {
    pub fn into_error(self, message: Option<&str>) -> LocationError {
        match self {
            LocationErrorKind::PermissionDenied => LocationError::PermissionDenied,
            LocationErrorKind::LocationDisabled => LocationError::LocationDisabled,
            LocationErrorKind::Other => {
                LocationError::Other(message.unwrap_or("unspecified").to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    Location {
        #[serde(default)]
        speed: Option<f32>,
    },
    LocationError {
        error: LocationErrorKind,
        #[serde(default)]
        message: Option<String>,
    },
    Transition {
        activity: ActivityKind,
        transition: VehicleTransition,
    },
    Activity {
        activity: ActivityKind,
        confidence: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceEntry {
    /// Offset from the start of the trace.
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: TraceEvent,
}

pub fn parse_trace(text: &str) -> Result<Vec<TraceEntry>, TraceError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| TraceError::Parse {
                line: index + 1,
                source,
            })
        })
        .collect()
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let text = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&text)
}
