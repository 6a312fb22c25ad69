// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller transition table.
//!
//! Pure decision logic: given the current state, flags and configuration,
//! an event maps to the next state and the fade that gets there. Nothing in
//! here touches collaborators or timers.

use crate::config::LightCtrlConfig;
use crate::flags::{Flag, Flags};
use crate::types::{CtrlState, Lightness, TransitionTime};

/// An event the state machine can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    /// User on command.
    On,
    /// User off command.
    Off,
    /// Occupancy sensor report.
    Occupancy,
    /// The on-hold timer ran out.
    HoldExpired,
}

impl Event {
    /// The flag recording this event while a fade is in progress.
    pub(crate) const fn pending_flag(self) -> Option<Flag> {
        match self {
            Self::On => Some(Flag::OnPending),
            Self::Off => Some(Flag::OffPending),
            Self::Occupancy => Some(Flag::OccPending),
            Self::HoldExpired => None,
        }
    }

    /// Whether the event drives the light towards `ON`.
    pub(crate) const fn targets_on(self) -> bool {
        matches!(self, Self::On | Self::Occupancy)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Occupancy => "occupancy",
            Self::HoldExpired => "hold_expired",
        }
    }
}

/// A state change together with the fade that realizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub next: CtrlState,
    pub target: Lightness,
    pub fade: TransitionTime,
    /// New value of the `ON` flag.
    pub on: bool,
    /// New value of the `MANUAL` flag, if the step changes it.
    pub manual: Option<bool>,
    /// Whether the step publishes an on/off status.
    pub publish: bool,
}

impl Step {
    /// The immediate settle into `STANDBY` performed on enable.
    pub(crate) fn enable(config: &LightCtrlConfig) -> Self {
        Self {
            next: CtrlState::Standby,
            target: config.light.get(CtrlState::Standby),
            fade: TransitionTime::ZERO,
            on: false,
            manual: None,
            publish: false,
        }
    }

    fn turn_on(config: &LightCtrlConfig, manual: Option<bool>) -> Self {
        Self {
            next: CtrlState::On,
            target: config.light.get(CtrlState::On),
            fade: config.fade.on,
            on: true,
            manual,
            publish: true,
        }
    }

    fn turn_off(config: &LightCtrlConfig, manual: bool) -> Self {
        Self {
            next: CtrlState::Standby,
            target: config.light.get(CtrlState::Standby),
            fade: if manual {
                config.fade.standby_manual
            } else {
                config.fade.standby_auto
            },
            on: false,
            manual: Some(manual),
            publish: true,
        }
    }
}

/// The outcome of looking an event up in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Start a transition.
    Transition(Step),
    /// Stay on and restart the hold timer.
    ExtendHold,
    /// Nothing to do.
    Ignore,
    /// The event cannot occur in this state.
    Invalid,
}

/// Looks up `event` in the transition table.
///
/// `holding` is `true` while the on-hold timer is armed.
pub(crate) fn decide(
    state: CtrlState,
    event: Event,
    flags: Flags,
    config: &LightCtrlConfig,
    holding: bool,
) -> Decision {
    match (state, event) {
        (CtrlState::Standby, Event::On) => Decision::Transition(Step::turn_on(config, Some(false))),
        (CtrlState::On, Event::Off) => Decision::Transition(Step::turn_off(config, true)),
        (CtrlState::On, Event::On) | (CtrlState::Standby, Event::Off) => Decision::Ignore,
        (_, Event::Occupancy) if !flags.contains(Flag::OccMode) => Decision::Ignore,
        (CtrlState::Standby, Event::Occupancy) => {
            Decision::Transition(Step::turn_on(config, None))
        }
        (CtrlState::On, Event::Occupancy) if holding => Decision::ExtendHold,
        (CtrlState::On, Event::Occupancy) => Decision::Ignore,
        (CtrlState::On, Event::HoldExpired) => Decision::Transition(Step::turn_off(config, false)),
        (CtrlState::Standby, Event::HoldExpired) => Decision::Invalid,
    }
}
