//! # Vehicle arming and mode state machine
//!
//! Tracks what the bridge knows about the vehicle. Transitions are requested by
//! [`VehicleCommand`]s and committed only once the autopilot has accepted the corresponding
//! command.
//!
//! ```text
//!              Arm                Guided
//! Disarmed ──────────▶ Armed ──────────▶ Guided
//!     ▲                  │                  │
//!     └──── Disarm ──────┴───── Disarm ─────┘
//! ```

use std::fmt::{Display, Formatter};

use crate::errors::{Error, ErrorKind, Result};

/// Vehicle state as confirmed by autopilot acknowledgments.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum VehicleState {
    /// Motors are disarmed (initial state).
    #[default]
    Disarmed,
    /// Motors are armed, vehicle is not following external targets.
    Armed,
    /// Vehicle is armed and in guided mode.
    Guided,
}

/// Command that requests a vehicle state transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VehicleCommand {
    /// Arm motors.
    Arm,
    /// Disarm motors.
    Disarm,
    /// Switch to guided mode.
    Guided,
}

impl VehicleState {
    /// Returns the state the vehicle ends up in once `command` is accepted by the autopilot.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidState`] if `command` is not allowed in the current state.
    pub fn transition(self, command: VehicleCommand) -> Result<VehicleState> {
        match (self, command) {
            (VehicleState::Disarmed, VehicleCommand::Arm) => Ok(VehicleState::Armed),
            (VehicleState::Armed, VehicleCommand::Guided) => Ok(VehicleState::Guided),
            (VehicleState::Armed | VehicleState::Guided, VehicleCommand::Disarm) => {
                Ok(VehicleState::Disarmed)
            }
            _ => Err(Error::with_source(
                ErrorKind::InvalidState,
                format!("{command} is not allowed while {self}"),
            )),
        }
    }
}

impl Display for VehicleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleState::Disarmed => f.write_str("disarmed"),
            VehicleState::Armed => f.write_str("armed"),
            VehicleState::Guided => f.write_str("guided"),
        }
    }
}

impl Display for VehicleCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleCommand::Arm => f.write_str("arm"),
            VehicleCommand::Disarm => f.write_str("disarm"),
            VehicleCommand::Guided => f.write_str("guided mode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_transitions() {
        let state = VehicleState::default();
        assert_eq!(state, VehicleState::Disarmed);

        let state = state.transition(VehicleCommand::Arm).unwrap();
        assert_eq!(state, VehicleState::Armed);

        let state = state.transition(VehicleCommand::Guided).unwrap();
        assert_eq!(state, VehicleState::Guided);

        let state = state.transition(VehicleCommand::Disarm).unwrap();
        assert_eq!(state, VehicleState::Disarmed);

        let state = VehicleState::Armed
            .transition(VehicleCommand::Disarm)
            .unwrap();
        assert_eq!(state, VehicleState::Disarmed);
    }

    #[test]
    fn rejected_transitions() {
        let rejected = [
            (VehicleState::Disarmed, VehicleCommand::Disarm),
            (VehicleState::Disarmed, VehicleCommand::Guided),
            (VehicleState::Armed, VehicleCommand::Arm),
            (VehicleState::Guided, VehicleCommand::Arm),
            (VehicleState::Guided, VehicleCommand::Guided),
        ];

        for (state, command) in rejected {
            let err = state.transition(command).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState, "{state} + {command}");
        }
    }
}
