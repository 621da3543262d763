//! Output surfaces and event contracts for parking state changes.
//!
//! This crate defines:
//! - the sink traits the controller drives on every transition
//!   (notification, broadcast, foreground lifecycle)
//! - the `Logger` contract and a `tracing`-backed implementation
//! - recording implementations of all of the above for tests
//! - the serializable [`ParkingStateEvent`] a host forwards to its UI layer

mod logger;
mod recording;
mod sink;

pub use logger::{LogLevel, LogRecord, Logger, LoggerRef, RecordingLogger, TracingLogger};
pub use recording::{
    LifecycleCall, NotificationCall, RecordingBroadcastSink, RecordingLifecycleSink,
    RecordingNotificationSink,
};
pub use sink::{
    BroadcastSink, BroadcastSinkRef, LifecycleSink, LifecycleSinkRef, NotificationHandle,
    NotificationSink, NotificationSinkRef, SinkError,
};

use parkwatch_detector::ParkingState;
use serde::{Deserialize, Serialize};

/// Event emitted when the parking state changes.
///
/// Producers: controller observer
/// Consumers: host UI layer, replay output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingStateEvent {
    /// New state.
    pub state: ParkingState,
    /// Timestamp in milliseconds since epoch.
    pub timestamp_ms: i64,
}

impl ParkingStateEvent {
    /// Stamp `state` with the current wall clock time.
    pub fn now(state: ParkingState) -> Self {
        Self {
            state,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_parked(&self) -> bool {
        self.state.is_parked()
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Parking state changed event.
    pub const PARKING_STATE_CHANGED: &str = "parking:state_changed";
}
