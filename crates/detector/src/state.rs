//! Parking state and vehicle transition definitions.

use serde::{Deserialize, Serialize};

/// Where the detector believes the vehicle is in its drive/park cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParkingState {
    /// Before any driving or parking signal has been seen.
    #[default]
    Unknown,

    /// Vehicle is moving (high speed or an in-vehicle enter transition).
    Driving,

    /// A stop was detected after driving, not yet corroborated.
    TentativeParked,

    /// The stop was corroborated by the user walking, running or cycling away.
    ConfirmedParked,
}

impl ParkingState {
    pub const ALL: [ParkingState; 4] = [
        ParkingState::Unknown,
        ParkingState::Driving,
        ParkingState::TentativeParked,
        ParkingState::ConfirmedParked,
    ];

    /// Only a confirmed stop counts as parked.
    pub fn is_parked(&self) -> bool {
        matches!(self, ParkingState::ConfirmedParked)
    }

    /// Status line shown in the foreground notification.
    pub fn status_message(&self) -> &'static str {
        match self {
            ParkingState::Driving => "Driving",
            ParkingState::TentativeParked => "Possible parking detected",
            ParkingState::ConfirmedParked => "Parked",
            ParkingState::Unknown => "Unknown",
        }
    }

    /// Upper-snake name used in logs and host events.
    pub fn name(&self) -> &'static str {
        match self {
            ParkingState::Unknown => "UNKNOWN",
            ParkingState::Driving => "DRIVING",
            ParkingState::TentativeParked => "TENTATIVE_PARKED",
            ParkingState::ConfirmedParked => "CONFIRMED_PARKED",
        }
    }

    /// Compact encoding for lock-free snapshots.
    pub fn as_u8(self) -> u8 {
        match self {
            ParkingState::Unknown => 0,
            ParkingState::Driving => 1,
            ParkingState::TentativeParked => 2,
            ParkingState::ConfirmedParked => 3,
        }
    }

    /// Inverse of [`ParkingState::as_u8`]; unrecognised values decode to `Unknown`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ParkingState::Driving,
            2 => ParkingState::TentativeParked,
            3 => ParkingState::ConfirmedParked,
            _ => ParkingState::Unknown,
        }
    }
}

impl std::fmt::Display for ParkingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The device crossing into or out of the "in vehicle" classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleTransition {
    Enter,
    Exit,
}

impl VehicleTransition {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleTransition::Enter => "ENTER",
            VehicleTransition::Exit => "EXIT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_confirmed_is_parked() {
        assert!(ParkingState::ConfirmedParked.is_parked());
        assert!(!ParkingState::TentativeParked.is_parked());
        assert!(!ParkingState::Driving.is_parked());
        assert!(!ParkingState::Unknown.is_parked());
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(ParkingState::Driving.status_message(), "Driving");
        assert_eq!(
            ParkingState::TentativeParked.status_message(),
            "Possible parking detected"
        );
        assert_eq!(ParkingState::ConfirmedParked.status_message(), "Parked");
        assert_eq!(ParkingState::Unknown.status_message(), "Unknown");
    }

    #[test]
    fn test_u8_encoding_covers_all_states() {
        for state in ParkingState::ALL {
            assert_eq!(ParkingState::from_u8(state.as_u8()), state);
        }
        assert_eq!(ParkingState::from_u8(200), ParkingState::Unknown);
    }

    #[test]
    fn test_serializes_as_upper_snake_name() {
        let json = serde_json::to_string(&ParkingState::TentativeParked).unwrap();
        assert_eq!(json, "\"TENTATIVE_PARKED\"");

        let state: ParkingState = serde_json::from_str("\"CONFIRMED_PARKED\"").unwrap();
        assert_eq!(state, ParkingState::ConfirmedParked);
    }
}
