//! Feeds trace entries into a controller through the manual sources.

use crate::trace::{TraceEntry, TraceEvent};
use parkwatch_controller::{Collaborators, Controller, ControllerConfig, ControllerError};
use parkwatch_detector::ActivitySample;
use parkwatch_events::{
    LoggerRef, RecordingBroadcastSink, RecordingLifecycleSink, RecordingNotificationSink,
};
use parkwatch_sensors::{
    ManualLocationSource, ManualPollingSource, ManualTransitionSource, TransitionEvent,
};
use std::sync::Arc;
use std::time::Duration;

/// A controller wired to manual sources and recording sinks.
pub struct Rig {
    pub location: Arc<ManualLocationSource>,
    pub transitions: Arc<ManualTransitionSource>,
    pub polling: Arc<ManualPollingSource>,
    pub notifications: Arc<RecordingNotificationSink>,
    pub broadcast: Arc<RecordingBroadcastSink>,
    pub lifecycle: Arc<RecordingLifecycleSink>,
    pub controller: Controller,
}

impl Rig {
    pub fn new(config: ControllerConfig, logger: LoggerRef) -> Result<Self, ControllerError> {
        let location = Arc::new(ManualLocationSource::new());
        let transitions = Arc::new(ManualTransitionSource::new());
        let polling = Arc::new(ManualPollingSource::new());
        let notifications = Arc::new(RecordingNotificationSink::new());
        let broadcast = Arc::new(RecordingBroadcastSink::new());
        let lifecycle = Arc::new(RecordingLifecycleSink::new());

        let controller = Controller::new(
            config,
            Collaborators {
                location: location.clone(),
                transitions: transitions.clone(),
                polling: polling.clone(),
                notifications: notifications.clone(),
                broadcast: broadcast.clone(),
                lifecycle: lifecycle.clone(),
                logger,
            },
        )?;

        Ok(Self {
            location,
            transitions,
            polling,
            notifications,
            broadcast,
            lifecycle,
            controller,
        })
    }

    fn deliver(&self, event: &TraceEvent) {
        match event {
            TraceEvent::Location { speed } => self.location.emit_speed(*speed),
            TraceEvent::LocationError { error, message } => {
                self.location.emit_error(error.into_error(message.as_deref()))
            }
            TraceEvent::Transition {
                activity,
                transition,
            } => self
                .transitions
                .emit(TransitionEvent::new(*activity, *transition)),
            TraceEvent::Activity {
                activity,
                confidence,
            } => self
                .polling
                .emit(ActivitySample::new(*activity, *confidence)),
        }
    }
}

/// Play `entries` in order. With `realtime`, sleep for the gap between
/// consecutive `at_ms` offsets. Stops early if the controller stops.
///
/// Returns the number of entries delivered.
pub fn play(rig: &Rig, entries: &[TraceEntry], realtime: bool) -> usize {
    let mut previous_at = entries.first().map(|e| e.at_ms).unwrap_or(0);
    let mut delivered = 0;

    for entry in entries {
        if !rig.controller.is_running() {
            tracing::warn!(
                remaining = entries.len() - delivered,
                "controller stopped, skipping rest of trace"
            );
            break;
        }

        if realtime {
            let gap = entry.at_ms.saturating_sub(previous_at);
            if gap > 0 {
                std::thread::sleep(Duration::from_millis(gap));
            }
        }
        previous_at = entry.at_ms;

        tracing::trace!(at_ms = entry.at_ms, event = ?entry.event, "delivering");
        rig.deliver(&entry.event);
        delivered += 1;
    }

    delivered
}
