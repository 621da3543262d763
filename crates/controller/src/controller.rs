//! Controller - binds the detector to sensor sources and output sinks.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use parkwatch_detector::{ActivityKind, ActivitySample, ParkingDetector, ParkingState};
use parkwatch_events::{BroadcastSinkRef, LifecycleSinkRef, LoggerRef, NotificationSinkRef};
use parkwatch_sensors::{
    ActivityCallback, ActivityPollingSourceRef, ActivityTransitionSourceRef, LocationError,
    LocationErrorCallback, LocationSourceRef, SpeedCallback, TransitionCallback, TransitionEvent,
    TransitionSpec,
};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

/// Observer invoked with every new parking state.
pub type StateObserver = Arc<dyn Fn(ParkingState) + Send + Sync + 'static>;

/// Everything the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub location: LocationSourceRef,
    pub transitions: ActivityTransitionSourceRef,
    pub polling: ActivityPollingSourceRef,
    pub notifications: NotificationSinkRef,
    pub broadcast: BroadcastSinkRef,
    pub lifecycle: LifecycleSinkRef,
    pub logger: LoggerRef,
}

/// Runs the parking pipeline.
///
/// All three source callbacks funnel through one mutex around the detector,
/// and the post-transition actions run inside that same critical section.
/// [`Controller::current_state`] reads a snapshot updated before those
/// actions, so an observer may query the controller without deadlocking.
pub struct Controller {
    inner: Arc<Inner>,
}

struct Inner {
    config: ControllerConfig,
    collaborators: Collaborators,
    detector: Mutex<ParkingDetector>,
    snapshot: AtomicU8,
    observer: Mutex<Option<StateObserver>>,
    running: AtomicBool,
    in_foreground: AtomicBool,
    /// Thread currently inside a detector call, if any.
    dispatch_thread: Mutex<Option<ThreadId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Controller {
    /// Build a stopped controller. Fails if `config` does not validate.
    pub fn new(
        config: ControllerConfig,
        collaborators: Collaborators,
    ) -> Result<Self, ControllerError> {
        config.validate()?;

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let detector = ParkingDetector::new(config.thresholds.clone(), move |state| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_state_changed(state);
                }
            });

            Inner {
                config,
                collaborators,
                detector: Mutex::new(detector),
                snapshot: AtomicU8::new(ParkingState::Unknown.as_u8()),
                observer: Mutex::new(None),
                running: AtomicBool::new(false),
                in_foreground: AtomicBool::new(false),
                dispatch_thread: Mutex::new(None),
            }
        });

        Ok(Self { inner })
    }

    /// Enter the foreground and subscribe to every source.
    ///
    /// On failure everything already set up is released and the controller
    /// is left stopped.
    pub fn start(&self) -> Result<(), ControllerError> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Controller already running");
            return Ok(());
        }

        self.inner.collaborators.logger.debug("Starting parking monitor");
        tracing::info!(
            polling_interval = ?self.inner.config.polling_interval,
            "controller starting"
        );

        if let Err(e) = self.inner.start_pipeline() {
            self.inner
                .collaborators
                .logger
                .error("Failed to start parking monitor", Some(&e));
            self.inner.stop();
            return Err(e);
        }
        Ok(())
    }

    /// Unsubscribe every source and leave the foreground. No-op when stopped.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Replace the state observer.
    pub fn set_state_callback<F>(&self, observer: F)
    where
        F: Fn(ParkingState) + Send + Sync + 'static,
    {
        *lock(&self.inner.observer) = Some(Arc::new(observer));
    }

    pub fn clear_state_callback(&self) {
        *lock(&self.inner.observer) = None;
    }

    /// Latest state reported by the detector.
    pub fn current_state(&self) -> ParkingState {
        ParkingState::from_u8(self.inner.snapshot.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if self.is_running() {
            self.inner.stop();
        }
    }
}

impl Inner {
    fn start_pipeline(self: &Arc<Self>) -> Result<(), ControllerError> {
        let c = &self.collaborators;

        c.notifications
            .ensure_channel()
            .map_err(ControllerError::Foreground)?;
        let handle = c
            .notifications
            .render(&self.config.monitoring_message)
            .map_err(ControllerError::Foreground)?;
        c.lifecycle
            .enter_foreground(handle)
            .map_err(ControllerError::Foreground)?;
        self.in_foreground.store(true, Ordering::SeqCst);
        if self.stopped_during_start() {
            return Ok(());
        }

        c.location
            .subscribe(self.speed_callback(), self.location_error_callback())
            .map_err(|source| ControllerError::Subscribe {
                stage: "location",
                source,
            })?;
        if self.stopped_during_start() {
            return Ok(());
        }

        c.transitions
            .subscribe(TransitionSpec::in_vehicle(), self.transition_callback())
            .map_err(|source| ControllerError::Subscribe {
                stage: "activity transitions",
                source,
            })?;
        if self.stopped_during_start() {
            return Ok(());
        }

        c.polling
            .subscribe(self.config.polling_interval, self.activity_callback())
            .map_err(|source| ControllerError::Subscribe {
                stage: "activity polling",
                source,
            })?;
        self.stopped_during_start();
        Ok(())
    }

    /// A fatal error, or a concurrent `stop`, may end the run while `start`
    /// is still setting up. Release anything acquired after that point.
    fn stopped_during_start(&self) -> bool {
        if self.running.load(Ordering::SeqCst) {
            return false;
        }
        tracing::debug!("controller stopped while starting");
        self.release_sources();
        self.release_foreground();
        true
    }

    fn speed_callback(self: &Arc<Self>) -> SpeedCallback {
        let weak = Arc::downgrade(self);
        Arc::new(move |speed| {
            if let Some(inner) = weak.upgrade() {
                inner.with_detector(|detector| detector.on_location(speed));
            }
        })
    }

    fn location_error_callback(self: &Arc<Self>) -> LocationErrorCallback {
        let weak = Arc::downgrade(self);
        Arc::new(move |error| {
            if let Some(inner) = weak.upgrade() {
                inner.on_location_error(error);
            }
        })
    }

    fn transition_callback(self: &Arc<Self>) -> TransitionCallback {
        let weak = Arc::downgrade(self);
        Arc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_transition(event);
            }
        })
    }

    fn activity_callback(self: &Arc<Self>) -> ActivityCallback {
        let weak = Arc::downgrade(self);
        Arc::new(move |sample| {
            if let Some(inner) = weak.upgrade() {
                inner.on_activity(sample);
            }
        })
    }

    /// Run `f` against the detector unless the pipeline has stopped.
    fn with_detector(&self, f: impl FnOnce(&mut ParkingDetector)) {
        let mut detector = lock(&self.detector);
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        let _marker = DispatchMarker::enter(&self.dispatch_thread);
        f(&mut detector);
    }

    fn on_location_error(&self, error: LocationError) {
        self.collaborators
            .logger
            .error("Location error", Some(&error));
        if error.is_fatal() {
            tracing::warn!(%error, "stopping on fatal location error");
            self.stop();
        }
    }

    fn on_transition(&self, event: TransitionEvent) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        self.collaborators.logger.debug(&format!(
            "Transition: {}, type: {}",
            event.kind.label(),
            event.transition.label()
        ));
        if event.kind != ActivityKind::InVehicle {
            return;
        }
        self.with_detector(|detector| detector.on_vehicle_transition(event.transition));
    }

    fn on_activity(&self, sample: ActivitySample) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        self.collaborators.logger.debug(&format!(
            "Activity: {}, confidence: {}",
            sample.kind.label(),
            sample.confidence
        ));
        self.with_detector(|detector| detector.on_activity(sample.kind, sample.confidence));
    }

    /// Runs inside the detector lock.
    fn on_state_changed(&self, state: ParkingState) {
        self.snapshot.store(state.as_u8(), Ordering::SeqCst);

        let c = &self.collaborators;
        c.logger.debug(&format!("Parking state changed: {state}"));

        if let Err(e) = c.broadcast.publish(state.is_parked()) {
            c.logger.error("Failed to broadcast parking state", Some(&e));
        }
        if let Err(e) = c.notifications.update(state.status_message()) {
            c.logger.error("Failed to update notification", Some(&e));
        }

        let observer = lock(&self.observer).clone();
        if let Some(observer) = observer {
            observer(state);
        }
    }

    fn release_sources(&self) {
        let c = &self.collaborators;
        c.location.unsubscribe();
        c.transitions.unsubscribe();
        c.polling.unsubscribe();
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            tracing::debug!("controller already stopped");
            return;
        }

        let c = &self.collaborators;
        c.logger.debug("Stopping parking monitor");
        self.release_sources();

        // Wait out a detector call in flight on another thread. Skipped when
        // stop runs from inside that call, e.g. from the observer.
        let reentrant = *lock(&self.dispatch_thread) == Some(thread::current().id());
        if !reentrant {
            drop(lock(&self.detector));
        }

        self.release_foreground();
        tracing::info!("controller stopped");
    }

    /// Exit the foreground if this run entered it. Safe to race with itself.
    fn release_foreground(&self) {
        if !self.in_foreground.swap(false, Ordering::SeqCst) {
            return;
        }
        let c = &self.collaborators;
        if let Err(e) = c.lifecycle.exit_foreground() {
            c.logger.error("Failed to leave foreground", Some(&e));
        }
    }
}

/// Records the current thread as the detector caller until dropped, so the
/// slot is cleared even if the observer panics.
struct DispatchMarker<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> DispatchMarker<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock(slot) = Some(thread::current().id());
        Self { slot }
    }
}

impl Drop for DispatchMarker<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}
