//! Source traits for the three sensor feeds.
//!
//! Implementations wrap platform services (fused location, activity
//! recognition). They deliver on whatever thread the platform uses; the
//! consumer is responsible for serializing what it does with the samples.

use crate::error::{LocationError, SourceError};
use parkwatch_detector::{ActivityKind, ActivitySample, VehicleTransition};
use std::sync::Arc;
use std::time::Duration;

/// Default interval between activity recognition polls.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(5000);

/// Receives a speed in m/s, or `None` when there is no fix yet.
pub type SpeedCallback = Arc<dyn Fn(Option<f32>) + Send + Sync + 'static>;

/// Receives errors raised by a location source after subscription.
pub type LocationErrorCallback = Arc<dyn Fn(LocationError) + Send + Sync + 'static>;

/// Receives activity transition events.
pub type TransitionCallback = Arc<dyn Fn(TransitionEvent) + Send + Sync + 'static>;

/// Receives polled activity classifications.
pub type ActivityCallback = Arc<dyn Fn(ActivitySample) + Send + Sync + 'static>;

/// An activity/transition pair to register interest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionSpec {
    pub kind: ActivityKind,
    pub transition: VehicleTransition,
}

impl TransitionSpec {
    pub fn new(kind: ActivityKind, transition: VehicleTransition) -> Self {
        Self { kind, transition }
    }

    /// Enter and exit of the in-vehicle classification.
    pub fn in_vehicle() -> Vec<TransitionSpec> {
        vec![
            TransitionSpec::new(ActivityKind::InVehicle, VehicleTransition::Enter),
            TransitionSpec::new(ActivityKind::InVehicle, VehicleTransition::Exit),
        ]
    }
}

/// A transition reported by the activity recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEvent {
    pub kind: ActivityKind,
    pub transition: VehicleTransition,
}

impl TransitionEvent {
    pub fn new(kind: ActivityKind, transition: VehicleTransition) -> Self {
        Self { kind, transition }
    }
}

/// Stream of GPS speed samples.
pub trait LocationSource: Send + Sync {
    /// Start delivering samples.
    ///
    /// A source may report permission or availability problems through
    /// `on_error`, either during this call or later.
    fn subscribe(
        &self,
        on_sample: SpeedCallback,
        on_error: LocationErrorCallback,
    ) -> Result<(), SourceError>;

    /// Stop delivering. Once this returns no new delivery starts; one already
    /// running on another thread may still finish. Calling it without a
    /// subscription is a no-op, and it may be called from inside a callback.
    fn unsubscribe(&self);
}

/// Stream of activity enter/exit transitions.
pub trait ActivityTransitionSource: Send + Sync {
    fn subscribe(
        &self,
        specs: Vec<TransitionSpec>,
        on_event: TransitionCallback,
    ) -> Result<(), SourceError>;

    /// Same guarantees as [`LocationSource::unsubscribe`].
    fn unsubscribe(&self);
}

/// Periodic activity classification.
pub trait ActivityPollingSource: Send + Sync {
    fn subscribe(&self, interval: Duration, on_sample: ActivityCallback)
        -> Result<(), SourceError>;

    /// Same guarantees as [`LocationSource::unsubscribe`].
    fn unsubscribe(&self);
}

pub type LocationSourceRef = Arc<dyn LocationSource>;
pub type ActivityTransitionSourceRef = Arc<dyn ActivityTransitionSource>;
pub type ActivityPollingSourceRef = Arc<dyn ActivityPollingSource>;
