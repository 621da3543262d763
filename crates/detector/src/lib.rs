//! Parking detection state machine for parkwatch.
//!
//! Infers whether a vehicle is being driven or parked from three pushed
//! signal kinds:
//! - GPS speed samples
//! - vehicle enter/exit transitions
//! - polled activity classifications with a confidence
//!
//! ```text
//!            speed > driving / Enter
//!   Unknown ───────────────────────────► Driving ◄──────────────┐
//!                                          │                    │
//!                speed < stop / Still      │     speed > driving│
//!                                          ▼                    │
//!                                   TentativeParked ────────────┤
//!                                          │                    │
//!                 walking / running /      │                    │
//!                 on foot / bicycle        ▼                    │
//!                                   ConfirmedParked ────────────┘
//! ```
//!
//! The detector is synchronous and unsynchronized; see
//! `parkwatch-controller` for the component that feeds it from live sources.
//!
//! # Example
//!
//! ```
//! use parkwatch_detector::{ParkingDetector, ParkingState, Thresholds, VehicleTransition};
//!
//! let mut detector = ParkingDetector::new(Thresholds::default(), |state| {
//!     println!("now {state}");
//! });
//!
//! detector.on_vehicle_transition(VehicleTransition::Enter);
//! assert_eq!(detector.state(), ParkingState::Driving);
//! ```

mod activity;
mod detector;
mod state;
mod thresholds;

pub use activity::{ActivityKind, ActivitySample};
pub use detector::{ParkingDetector, StateCallback};
pub use state::{ParkingState, VehicleTransition};
pub use thresholds::{
    Thresholds, ThresholdsError, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_DRIVING_SPEED,
    DEFAULT_STOP_SPEED,
};
