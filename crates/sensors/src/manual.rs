//! Push-driven sources for tests, replays and hosts that already own a
//! sensor loop.
//!
//! Each source holds at most one subscriber. `emit_*` calls deliver on the
//! caller's thread and are dropped while nobody is subscribed.

use crate::error::{LocationError, SourceError};
use crate::source::{
    ActivityCallback, ActivityPollingSource, ActivityTransitionSource, LocationErrorCallback,
    LocationSource, SpeedCallback, TransitionCallback, TransitionEvent, TransitionSpec,
};
use parkwatch_detector::ActivitySample;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single subscriber slot shared by the manual sources.
struct Slot<T: Clone> {
    name: &'static str,
    subscriber: Mutex<Option<T>>,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
    unavailable: Mutex<Option<String>>,
}

impl<T: Clone> Slot<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            subscriber: Mutex::new(None),
            subscribe_calls: AtomicUsize::new(0),
            unsubscribe_calls: AtomicUsize::new(0),
            unavailable: Mutex::new(None),
        }
    }

    fn subscribe(&self, subscriber: T) -> Result<(), SourceError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = lock(&self.unavailable).clone() {
            return Err(SourceError::Unavailable {
                source_name: self.name,
                reason,
            });
        }

        let mut slot = lock(&self.subscriber);
        if slot.is_some() {
            return Err(SourceError::AlreadySubscribed(self.name));
        }
        *slot = Some(subscriber);
        tracing::debug!(source = self.name, "subscribed");
        Ok(())
    }

    fn unsubscribe(&self) {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        if lock(&self.subscriber).take().is_some() {
            tracing::debug!(source = self.name, "unsubscribed");
        }
    }

    /// Clone the subscriber out so the callback runs without the lock held.
    fn current(&self) -> Option<T> {
        lock(&self.subscriber).clone()
    }

    fn set_unavailable(&self, reason: Option<String>) {
        *lock(&self.unavailable) = reason;
    }
}

// =============================================================================
// Location
// =============================================================================

/// Location source driven by explicit `emit_*` calls.
pub struct ManualLocationSource {
    slot: Slot<(SpeedCallback, LocationErrorCallback)>,
    error_on_subscribe: Mutex<Option<LocationError>>,
}

impl Default for ManualLocationSource {
    fn default() -> Self {
        Self {
            slot: Slot::new("location"),
            error_on_subscribe: Mutex::new(None),
        }
    }
}

impl ManualLocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a speed sample (m/s) to the subscriber.
    pub fn emit_speed(&self, speed: Option<f32>) {
        if let Some((on_sample, _)) = self.slot.current() {
            on_sample(speed);
        }
    }

    /// Deliver an error to the subscriber.
    pub fn emit_error(&self, error: LocationError) {
        if let Some((_, on_error)) = self.slot.current() {
            on_error(error);
        }
    }

    /// Report `error` from inside the next `subscribe` call, the way a
    /// platform source reports a missing permission up front.
    pub fn set_error_on_subscribe(&self, error: Option<LocationError>) {
        *lock(&self.error_on_subscribe) = error;
    }

    /// Make `subscribe` fail outright.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.slot.set_unavailable(reason.map(str::to_string));
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.current().is_some()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.slot.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.slot.unsubscribe_calls.load(Ordering::SeqCst)
    }
}

impl LocationSource for ManualLocationSource {
    fn subscribe(
        &self,
        on_sample: SpeedCallback,
        on_error: LocationErrorCallback,
    ) -> Result<(), SourceError> {
        self.slot.subscribe((on_sample, on_error))?;

        let pending = lock(&self.error_on_subscribe).take();
        if let Some(error) = pending {
            self.emit_error(error);
        }
        Ok(())
    }

    fn unsubscribe(&self) {
        self.slot.unsubscribe();
    }
}

// =============================================================================
// Activity transitions
// =============================================================================

/// Transition source driven by explicit `emit` calls.
///
/// Events are delivered whether or not they match the registered specs,
/// like a recognizer that reports more than it was asked for.
pub struct ManualTransitionSource {
    slot: Slot<TransitionCallback>,
    specs: Mutex<Vec<TransitionSpec>>,
}

impl Default for ManualTransitionSource {
    fn default() -> Self {
        Self {
            slot: Slot::new("activity transition"),
            specs: Mutex::new(Vec::new()),
        }
    }
}

impl ManualTransitionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: TransitionEvent) {
        if let Some(on_event) = self.slot.current() {
            on_event(event);
        }
    }

    /// Specs passed to the most recent successful `subscribe`.
    pub fn specs(&self) -> Vec<TransitionSpec> {
        lock(&self.specs).clone()
    }

    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.slot.set_unavailable(reason.map(str::to_string));
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.current().is_some()
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.slot.unsubscribe_calls.load(Ordering::SeqCst)
    }
}

impl ActivityTransitionSource for ManualTransitionSource {
    fn subscribe(
        &self,
        specs: Vec<TransitionSpec>,
        on_event: TransitionCallback,
    ) -> Result<(), SourceError> {
        self.slot.subscribe(on_event)?;
        *lock(&self.specs) = specs;
        Ok(())
    }

    fn unsubscribe(&self) {
        self.slot.unsubscribe();
    }
}

// =============================================================================
// Activity polling
// =============================================================================

/// Polling source driven by explicit `emit` calls; the interval is recorded
/// but not enforced.
pub struct ManualPollingSource {
    slot: Slot<ActivityCallback>,
    interval: Mutex<Option<Duration>>,
}

impl Default for ManualPollingSource {
    fn default() -> Self {
        Self {
            slot: Slot::new("activity polling"),
            interval: Mutex::new(None),
        }
    }
}

impl ManualPollingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, sample: ActivitySample) {
        if let Some(on_sample) = self.slot.current() {
            on_sample(sample);
        }
    }

    /// Interval requested by the most recent successful `subscribe`.
    pub fn interval(&self) -> Option<Duration> {
        *lock(&self.interval)
    }

    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.slot.set_unavailable(reason.map(str::to_string));
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.current().is_some()
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.slot.unsubscribe_calls.load(Ordering::SeqCst)
    }
}

impl ActivityPollingSource for ManualPollingSource {
    fn subscribe(
        &self,
        interval: Duration,
        on_sample: ActivityCallback,
    ) -> Result<(), SourceError> {
        self.slot.subscribe(on_sample)?;
        *lock(&self.interval) = Some(interval);
        Ok(())
    }

    fn unsubscribe(&self) {
        self.slot.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkwatch_detector::{ActivityKind, VehicleTransition};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_location_delivers_only_while_subscribed() {
        let source = ManualLocationSource::new();
        let speeds = Arc::new(Mutex::new(Vec::new()));
        let speeds_clone = Arc::clone(&speeds);

        source.emit_speed(Some(1.0));

        source
            .subscribe(
                Arc::new(move |speed| speeds_clone.lock().unwrap().push(speed)),
                Arc::new(|_| {}),
            )
            .unwrap();
        assert!(source.is_subscribed());

        source.emit_speed(Some(2.0));
        source.emit_speed(None);
        source.unsubscribe();
        source.emit_speed(Some(3.0));

        assert_eq!(*speeds.lock().unwrap(), vec![Some(2.0), None]);
        assert!(!source.is_subscribed());
        assert_eq!(source.unsubscribe_calls(), 1);
    }

    #[test]
    fn test_location_rejects_second_subscriber() {
        let source = ManualLocationSource::new();
        source.subscribe(Arc::new(|_| {}), Arc::new(|_| {})).unwrap();

        let err = source
            .subscribe(Arc::new(|_| {}), Arc::new(|_| {}))
            .unwrap_err();
        assert_eq!(err, SourceError::AlreadySubscribed("location"));
    }

    #[test]
    fn test_location_error_on_subscribe_is_delivered_once() {
        let source = ManualLocationSource::new();
        source.set_error_on_subscribe(Some(LocationError::PermissionDenied));

        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = Arc::clone(&errors);
        source
            .subscribe(
                Arc::new(|_| {}),
                Arc::new(move |e| errors_clone.lock().unwrap().push(e)),
            )
            .unwrap();

        source.unsubscribe();
        source.subscribe(Arc::new(|_| {}), Arc::new(|_| {})).unwrap();

        assert_eq!(*errors.lock().unwrap(), vec![LocationError::PermissionDenied]);
    }

    #[test]
    fn test_unsubscribe_from_inside_callback() {
        let source = Arc::new(ManualLocationSource::new());
        let weak = Arc::downgrade(&source);
        source
            .subscribe(
                Arc::new(|_| {}),
                Arc::new(move |_| {
                    if let Some(source) = weak.upgrade() {
                        source.unsubscribe();
                    }
                }),
            )
            .unwrap();

        source.emit_error(LocationError::LocationDisabled);
        assert!(!source.is_subscribed());
    }

    #[test]
    fn test_unavailable_source() {
        let source = ManualPollingSource::new();
        source.set_unavailable(Some("no play services"));

        let err = source
            .subscribe(Duration::from_secs(5), Arc::new(|_| {}))
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
        assert!(!source.is_subscribed());
        assert_eq!(source.interval(), None);
    }

    #[test]
    fn test_transition_source_records_specs() {
        let source = ManualTransitionSource::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        source
            .subscribe(
                TransitionSpec::in_vehicle(),
                Arc::new(move |event| seen_clone.lock().unwrap().push(event)),
            )
            .unwrap();

        let event = TransitionEvent::new(ActivityKind::InVehicle, VehicleTransition::Enter);
        source.emit(event);

        assert_eq!(source.specs(), TransitionSpec::in_vehicle());
        assert_eq!(*seen.lock().unwrap(), vec![event]);
    }

    #[test]
    fn test_polling_source_records_interval() {
        let source = ManualPollingSource::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        source
            .subscribe(
                Duration::from_millis(5000),
                Arc::new(move |sample| seen_clone.lock().unwrap().push(sample)),
            )
            .unwrap();
        source.emit(ActivitySample::new(ActivityKind::Walking, 80));

        assert_eq!(source.interval(), Some(Duration::from_millis(5000)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ActivitySample::new(ActivityKind::Walking, 80)]
        );
    }
}
