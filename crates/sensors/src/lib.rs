//! Sensor source contracts for parkwatch.
//!
//! Three independent push-based feeds drive the detector:
//! - [`LocationSource`]: GPS speed, plus errors such as a revoked permission
//! - [`ActivityTransitionSource`]: in-vehicle enter/exit transitions
//! - [`ActivityPollingSource`]: periodic activity classifications
//!
//! Platform bindings implement these traits outside this workspace. The
//! `Manual*` sources are in-process implementations driven by explicit
//! `emit` calls, used by tests and the replay tool.

mod error;
mod manual;
mod source;

pub use error::{LocationError, SourceError};
pub use manual::{ManualLocationSource, ManualPollingSource, ManualTransitionSource};
pub use source::{
    ActivityCallback, ActivityPollingSource, ActivityPollingSourceRef, ActivityTransitionSource,
    ActivityTransitionSourceRef, LocationErrorCallback, LocationSource, LocationSourceRef,
    SpeedCallback, TransitionCallback, TransitionEvent, TransitionSpec,
    DEFAULT_POLLING_INTERVAL,
};
