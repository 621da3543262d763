//! Parking monitor controller.
//!
//! Owns a [`parkwatch_detector::ParkingDetector`], feeds it from the three
//! sensor sources and fans each state change out to the broadcast sink, the
//! foreground notification and an optional observer.
//!
//! ```
//! use parkwatch_controller::{Collaborators, Controller, ControllerConfig};
//! use parkwatch_detector::ParkingState;
//! use parkwatch_events::{
//!     RecordingBroadcastSink, RecordingLifecycleSink, RecordingNotificationSink, TracingLogger,
//! };
//! use parkwatch_sensors::{ManualLocationSource, ManualPollingSource, ManualTransitionSource};
//! use std::sync::Arc;
//!
//! let location = Arc::new(ManualLocationSource::new());
//! let controller = Controller::new(
//!     ControllerConfig::default(),
//!     Collaborators {
//!         location: location.clone(),
//!         transitions: Arc::new(ManualTransitionSource::new()),
//!         polling: Arc::new(ManualPollingSource::new()),
//!         notifications: Arc::new(RecordingNotificationSink::new()),
//!         broadcast: Arc::new(RecordingBroadcastSink::new()),
//!         lifecycle: Arc::new(RecordingLifecycleSink::new()),
//!         logger: Arc::new(TracingLogger),
//!     },
//! )?;
//!
//! controller.start()?;
//! location.emit_speed(Some(20.0));
//! assert_eq!(controller.current_state(), ParkingState::Driving);
//! controller.stop();
//! # Ok::<(), parkwatch_controller::ControllerError>(())
//! ```

mod config;
mod controller;
mod error;

pub use config::{ControllerConfig, DEFAULT_MONITORING_MESSAGE};
pub use controller::{Collaborators, Controller, StateObserver};
pub use error::ControllerError;
