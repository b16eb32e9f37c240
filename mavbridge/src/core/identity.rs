use crate::core::consts::{
    DEFAULT_AUTOPILOT_COMPONENT_ID, DEFAULT_OWN_COMPONENT_ID, DEFAULT_SYSTEM_ID,
};
use crate::protocol::{ComponentId, SystemId};

/// Identity of this process and of the destination autopilot on the MAVLink network.
///
/// The companion computer shares the system `ID` with the autopilot and differs only by
/// component `ID`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerIdentity {
    system_id: SystemId,
    component_id: ComponentId,
    own_component_id: ComponentId,
}

impl PeerIdentity {
    /// Creates identity from MAVLink system `ID`, autopilot component `ID` and component `ID` of
    /// this process.
    pub fn new(
        system_id: SystemId,
        component_id: ComponentId,
        own_component_id: ComponentId,
    ) -> Self {
        Self {
            system_id,
            component_id,
            own_component_id,
        }
    }

    /// MAVLink system `ID` of both the autopilot and this process.
    #[inline(always)]
    pub fn system_id(&self) -> SystemId {
        self.system_id
    }

    /// Autopilot component `ID`. Commands are addressed to it.
    #[inline(always)]
    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }

    /// Component `ID` used as a sender of outgoing frames.
    #[inline(always)]
    pub fn own_component_id(&self) -> ComponentId {
        self.own_component_id
    }
}

impl Default for PeerIdentity {
    fn default() -> Self {
        Self::new(
            DEFAULT_SYSTEM_ID,
            DEFAULT_AUTOPILOT_COMPONENT_ID,
            DEFAULT_OWN_COMPONENT_ID,
        )
    }
}
