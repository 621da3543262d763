//! The parking state machine.
//!
//! Pure domain logic: no I/O, no threads, no locks. Callers that feed it from
//! several sources must serialize access themselves.

use crate::activity::ActivityKind;
use crate::state::{ParkingState, VehicleTransition};
use crate::thresholds::Thresholds;

/// Invoked with the new state on every accepted transition.
pub type StateCallback = Box<dyn FnMut(ParkingState) + Send + 'static>;

/// Decides the current [`ParkingState`] from speed, activity and vehicle
/// transition samples.
///
/// The reactive entry points (`on_location`, `on_vehicle_transition`,
/// `on_activity`) only fire the callback when the resolved state differs
/// from the current one, so repeated identical samples settle silently.
/// [`ParkingDetector::set_state`] always fires.
pub struct ParkingDetector {
    thresholds: Thresholds,
    state: ParkingState,
    on_state_changed: StateCallback,
}

impl ParkingDetector {
    /// Create a detector in [`ParkingState::Unknown`].
    ///
    /// `thresholds` are expected to have passed [`Thresholds::validate`].
    pub fn new<F>(thresholds: Thresholds, on_state_changed: F) -> Self
    where
        F: FnMut(ParkingState) + Send + 'static,
    {
        Self {
            thresholds,
            state: ParkingState::Unknown,
            on_state_changed: Box::new(on_state_changed),
        }
    }

    /// Current state. No side effects.
    pub fn state(&self) -> ParkingState {
        self.state
    }

    /// Feed a GPS speed sample in m/s. `None` means no fix yet and is ignored.
    ///
    /// High speed wins from any state, which also covers recovering from a
    /// tentative stop when the vehicle moves off again. Negative or
    /// non-finite speeds match no rule.
    pub fn on_location(&mut self, speed: Option<f32>) {
        let Some(speed) = speed else {
            return;
        };
        if !speed.is_finite() || speed < 0.0 {
            tracing::debug!(speed, "ignoring invalid speed sample");
            return;
        }

        if speed > self.thresholds.driving_speed {
            self.transition_to(ParkingState::Driving);
        } else if self.state == ParkingState::Driving && speed < self.thresholds.stop_speed {
            self.transition_to(ParkingState::TentativeParked);
        }
    }

    /// Entering a vehicle means driving, whatever came before.
    pub fn on_vehicle_transition(&mut self, transition: VehicleTransition) {
        match transition {
            VehicleTransition::Enter => self.transition_to(ParkingState::Driving),
            // Exit is reserved and must not move the state.
            VehicleTransition::Exit => {}
        }
    }

    /// Feed a polled activity classification.
    ///
    /// `Still` only counts while driving and a locomotion kind only counts
    /// while tentatively parked, so a single stray sample cannot jump
    /// straight to a confirmed stop.
    pub fn on_activity(&mut self, kind: ActivityKind, confidence: i32) {
        if !self.is_confident(confidence) {
            return;
        }

        match self.state {
            ParkingState::Driving if kind == ActivityKind::Still => {
                self.transition_to(ParkingState::TentativeParked);
            }
            ParkingState::TentativeParked if self.thresholds.is_confirm_kind(kind) => {
                self.transition_to(ParkingState::ConfirmedParked);
            }
            _ => {}
        }
    }

    /// Administrative override. Always notifies, even when the state is
    /// unchanged. This is the only way back to `Unknown`.
    pub fn set_state(&mut self, state: ParkingState) {
        let from = self.state;
        self.state = state;
        tracing::debug!(%from, to = %state, "parking state forced");
        (self.on_state_changed)(state);
    }

    fn is_confident(&self, confidence: i32) -> bool {
        (0..=100).contains(&confidence) && confidence > self.thresholds.confidence_threshold
    }

    fn transition_to(&mut self, target: ParkingState) {
        if self.state == target {
            return;
        }
        let from = self.state;
        self.state = target;
        tracing::debug!(%from, to = %target, "parking state changed");
        (self.on_state_changed)(target);
    }
}

impl std::fmt::Debug for ParkingDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingDetector")
            .field("thresholds", &self.thresholds)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type FiredLog = Arc<Mutex<Vec<ParkingState>>>;

    fn recording_detector(thresholds: Thresholds) -> (ParkingDetector, FiredLog) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let fired_clone = Arc::clone(&fired);
        let detector = ParkingDetector::new(thresholds, move |state| {
            fired_clone.lock().unwrap().push(state);
        });
        (detector, fired)
    }

    /// Detector forced into `state`, with the forcing callback cleared.
    fn detector_in(state: ParkingState) -> (ParkingDetector, FiredLog) {
        let (mut detector, fired) = recording_detector(Thresholds::default());
        detector.set_state(state);
        fired.lock().unwrap().clear();
        (detector, fired)
    }

    fn fired(log: &FiredLog) -> Vec<ParkingState> {
        log.lock().unwrap().clone()
    }

    // =========================================================================
    // Location
    // =========================================================================

    #[test]
    fn test_starts_unknown_without_firing() {
        let (detector, log) = recording_detector(Thresholds::default());
        assert_eq!(detector.state(), ParkingState::Unknown);
        assert!(fired(&log).is_empty());
    }

    #[test]
    fn test_high_speed_drives_from_any_state() {
        for start in ParkingState::ALL {
            let (mut detector, log) = detector_in(start);
            detector.on_location(Some(10.0));

            assert_eq!(detector.state(), ParkingState::Driving);
            if start == ParkingState::Driving {
                assert!(fired(&log).is_empty(), "no re-fire from Driving");
            } else {
                assert_eq!(fired(&log), vec![ParkingState::Driving], "from {start}");
            }
        }
    }

    #[test]
    fn test_low_speed_while_driving_is_tentative() {
        let (mut detector, log) = detector_in(ParkingState::Driving);
        detector.on_location(Some(0.05));
        detector.on_location(Some(0.0));

        assert_eq!(detector.state(), ParkingState::TentativeParked);
        assert_eq!(fired(&log), vec![ParkingState::TentativeParked]);
    }

    #[test]
    fn test_low_speed_outside_driving_is_ignored() {
        for start in [
            ParkingState::Unknown,
            ParkingState::TentativeParked,
            ParkingState::ConfirmedParked,
        ] {
            let (mut detector, log) = detector_in(start);
            detector.on_location(Some(0.0));
            assert_eq!(detector.state(), start);
            assert!(fired(&log).is_empty());
        }
    }

    #[test]
    fn test_speed_between_thresholds_is_noop() {
        let (mut detector, log) = detector_in(ParkingState::Driving);
        detector.on_location(Some(0.4));
        // Exactly on a threshold matches neither strict comparison
        detector.on_location(Some(0.1));
        detector.on_location(Some(0.7));

        assert_eq!(detector.state(), ParkingState::Driving);
        assert!(fired(&log).is_empty());
    }

    #[test]
    fn test_tentative_recovers_to_driving() {
        let (mut detector, log) = detector_in(ParkingState::TentativeParked);
        detector.on_location(Some(2.0));
        assert_eq!(detector.state(), ParkingState::Driving);
        assert_eq!(fired(&log), vec![ParkingState::Driving]);
    }

    #[test]
    fn test_absent_and_invalid_speed_ignored() {
        let (mut detector, log) = detector_in(ParkingState::Driving);
        detector.on_location(None);
        detector.on_location(Some(-3.0));
        detector.on_location(Some(f32::NAN));
        detector.on_location(Some(f32::INFINITY));

        assert_eq!(detector.state(), ParkingState::Driving);
        assert!(fired(&log).is_empty());
    }

    #[test]
    fn test_repeated_samples_fire_once() {
        let (mut detector, log) = recording_detector(Thresholds::default());
        detector.on_location(Some(10.0));
        detector.on_location(Some(10.0));
        detector.on_location(Some(12.0));
        assert_eq!(fired(&log), vec![ParkingState::Driving]);
    }

    // =========================================================================
    // Vehicle transitions
    // =========================================================================

    #[test]
    fn test_enter_always_drives() {
        for start in ParkingState::ALL {
            let (mut detector, log) = detector_in(start);
            detector.on_vehicle_transition(VehicleTransition::Enter);

            assert_eq!(detector.state(), ParkingState::Driving);
            let expected = if start == ParkingState::Driving {
                vec![]
            } else {
                vec![ParkingState::Driving]
            };
            assert_eq!(fired(&log), expected, "from {start}");
        }
    }

    #[test]
    fn test_exit_is_noop() {
        for start in ParkingState::ALL {
            let (mut detector, log) = detector_in(start);
            detector.on_vehicle_transition(VehicleTransition::Exit);
            assert_eq!(detector.state(), start);
            assert!(fired(&log).is_empty());
        }
    }

    // =========================================================================
    // Activity
    // =========================================================================

    #[test]
    fn test_confident_still_while_driving_is_tentative() {
        let (mut detector, log) = detector_in(ParkingState::Driving);
        detector.on_activity(ActivityKind::Still, 71);
        assert_eq!(detector.state(), ParkingState::TentativeParked);
        assert_eq!(fired(&log), vec![ParkingState::TentativeParked]);
    }

    #[test]
    fn test_still_at_threshold_is_noop() {
        let (mut detector, log) = detector_in(ParkingState::Driving);
        detector.on_activity(ActivityKind::Still, 70);
        assert_eq!(detector.state(), ParkingState::Driving);
        assert!(fired(&log).is_empty());
    }

    #[test]
    fn test_still_requires_driving() {
        for start in [
            ParkingState::Unknown,
            ParkingState::TentativeParked,
            ParkingState::ConfirmedParked,
        ] {
            let (mut detector, log) = detector_in(start);
            detector.on_activity(ActivityKind::Still, 95);
            assert_eq!(detector.state(), start);
            assert!(fired(&log).is_empty());
        }
    }

    #[test]
    fn test_walking_confirms_tentative() {
        let (mut detector, log) = detector_in(ParkingState::TentativeParked);
        detector.on_activity(ActivityKind::Walking, 71);
        assert_eq!(detector.state(), ParkingState::ConfirmedParked);
        assert_eq!(fired(&log), vec![ParkingState::ConfirmedParked]);
    }

    #[test]
    fn test_every_locomotion_kind_confirms() {
        for kind in ActivityKind::HUMAN_LOCOMOTION {
            let (mut detector, _) = detector_in(ParkingState::TentativeParked);
            detector.on_activity(kind, 90);
            assert_eq!(detector.state(), ParkingState::ConfirmedParked, "{kind}");
        }
    }

    #[test]
    fn test_walking_outside_tentative_is_noop() {
        for start in [ParkingState::Driving, ParkingState::Unknown] {
            let (mut detector, log) = detector_in(start);
            detector.on_activity(ActivityKind::Walking, 71);
            assert_eq!(detector.state(), start);
            assert!(fired(&log).is_empty());
        }
    }

    #[test]
    fn test_non_confirm_kinds_do_not_confirm() {
        for kind in [ActivityKind::InVehicle, ActivityKind::Other, ActivityKind::Still] {
            let (mut detector, log) = detector_in(ParkingState::TentativeParked);
            detector.on_activity(kind, 99);
            assert_eq!(detector.state(), ParkingState::TentativeParked);
            assert!(fired(&log).is_empty());
        }
    }

    #[test]
    fn test_out_of_range_confidence_is_noop() {
        let (mut detector, log) = detector_in(ParkingState::Driving);
        detector.on_activity(ActivityKind::Still, 150);
        detector.on_activity(ActivityKind::Still, -5);
        assert_eq!(detector.state(), ParkingState::Driving);
        assert!(fired(&log).is_empty());
    }

    #[test]
    fn test_custom_confirm_kinds() {
        let thresholds = Thresholds::default()
            .with_confirm_kinds([ActivityKind::OnBicycle])
            .unwrap();
        let (mut detector, _) = recording_detector(thresholds);
        detector.set_state(ParkingState::TentativeParked);

        detector.on_activity(ActivityKind::Walking, 99);
        assert_eq!(detector.state(), ParkingState::TentativeParked);

        detector.on_activity(ActivityKind::OnBicycle, 99);
        assert_eq!(detector.state(), ParkingState::ConfirmedParked);
    }

    // =========================================================================
    // Overrides and scenarios
    // =========================================================================

    #[test]
    fn test_set_state_always_fires() {
        for state in ParkingState::ALL {
            let (mut detector, log) = detector_in(state);
            detector.set_state(state);
            assert_eq!(detector.state(), state);
            assert_eq!(fired(&log), vec![state]);
        }
    }

    #[test]
    fn test_set_state_unknown_resets() {
        let (mut detector, log) = detector_in(ParkingState::ConfirmedParked);
        detector.set_state(ParkingState::Unknown);
        assert_eq!(detector.state(), ParkingState::Unknown);
        assert_eq!(fired(&log), vec![ParkingState::Unknown]);
    }

    #[test]
    fn test_high_speed_after_still_resumes_driving() {
        let (mut detector, log) = detector_in(ParkingState::Driving);
        detector.on_activity(ActivityKind::Still, 90);
        detector.on_location(Some(15.0));
        assert_eq!(detector.state(), ParkingState::Driving);
        assert_eq!(
            fired(&log),
            vec![ParkingState::TentativeParked, ParkingState::Driving]
        );
    }

    #[test]
    fn test_full_park_cycle() {
        let thresholds = Thresholds::new(0.1, 0.7, 70).unwrap();
        let (mut detector, log) = recording_detector(thresholds);

        detector.on_vehicle_transition(VehicleTransition::Enter);
        detector.on_location(Some(0.05));
        detector.on_activity(ActivityKind::Walking, 80);
        detector.on_location(Some(2.0));

        assert_eq!(
            fired(&log),
            vec![
                ParkingState::Driving,
                ParkingState::TentativeParked,
                ParkingState::ConfirmedParked,
                ParkingState::Driving,
            ]
        );
        assert_eq!(detector.state(), ParkingState::Driving);
    }
}
