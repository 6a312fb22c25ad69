// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller event types.

use crate::controller::OnOffStatus;
use crate::error::CollaboratorError;
use crate::persist::StoreKey;
use crate::types::{CtrlState, TransitionTime};

use super::ControllerId;

/// Events emitted by a light controller.
///
/// These carry what the controller does not return to its callers:
/// transitions, publications and swallowed collaborator failures.
#[derive(Debug, Clone, PartialEq)]
pub enum CtrlEvent {
    /// The controller took ownership of the actuator.
    Enabled {
        /// The controller.
        controller_id: ControllerId,
    },

    /// The controller released the actuator.
    Disabled {
        /// The controller.
        controller_id: ControllerId,
    },

    /// A transition started.
    StateChanged {
        /// The controller.
        controller_id: ControllerId,
        /// State before the transition.
        from: CtrlState,
        /// State after the transition.
        to: CtrlState,
        /// Fade duration.
        fade: TransitionTime,
    },

    /// An on/off status was published.
    StatusPublished {
        /// The controller.
        controller_id: ControllerId,
        /// The published status.
        status: OnOffStatus,
    },

    /// A record was written to storage.
    Stored {
        /// The controller.
        controller_id: ControllerId,
        /// The record written.
        key: StoreKey,
    },

    /// A collaborator call failed; the controller carried on.
    CollaboratorFailed {
        /// The controller.
        controller_id: ControllerId,
        /// The failure.
        error: CollaboratorError,
    },
}

impl CtrlEvent {
    /// Returns the controller ID associated with this event.
    #[must_use]
    pub fn controller_id(&self) -> ControllerId {
        match self {
            Self::Enabled { controller_id }
            | Self::Disabled { controller_id }
            | Self::StateChanged { controller_id, .. }
            | Self::StatusPublished { controller_id, .. }
            | Self::Stored { controller_id, .. }
            | Self::CollaboratorFailed { controller_id, .. } => *controller_id,
        }
    }

    /// Returns `true` for a status publication.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::StatusPublished { .. })
    }

    /// Returns `true` for a collaborator failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::CollaboratorFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_id_is_extracted() {
        let controller_id = ControllerId::new();
        let events = [
            CtrlEvent::Enabled { controller_id },
            CtrlEvent::StatusPublished {
                controller_id,
                status: OnOffStatus::OFF,
            },
            CtrlEvent::CollaboratorFailed {
                controller_id,
                error: CollaboratorError::Actuator("stuck".to_string()),
            },
        ];
        for event in &events {
            assert_eq!(event.controller_id(), controller_id);
        }
        assert!(events[1].is_status());
        assert!(events[2].is_failure());
        assert!(!events[0].is_failure());
    }
}
