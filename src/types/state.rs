// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discrete controller states.

use std::fmt;

/// The discrete state of a light controller.
///
/// # Examples
///
/// ```
/// use lumictl::types::CtrlState;
///
/// assert!(CtrlState::On.is_on());
/// assert_eq!(CtrlState::default(), CtrlState::Standby);
/// assert_eq!(CtrlState::Standby.as_str(), "STANDBY");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CtrlState {
    /// Idle, fading towards or resting at the standby level.
    #[default]
    Standby,
    /// Lit at the on level.
    On,
}

impl CtrlState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standby => "STANDBY",
            Self::On => "ON",
        }
    }

    /// Returns `true` for the lit state.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for CtrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_state_names() {
        assert_eq!(CtrlState::Standby.to_string(), "STANDBY");
        assert_eq!(CtrlState::On.to_string(), "ON");
    }

    #[test]
    fn ctrl_state_serde() {
        assert_eq!(serde_json::to_string(&CtrlState::On).unwrap(), "\"ON\"");
        let parsed: CtrlState = serde_json::from_str("\"STANDBY\"").unwrap();
        assert_eq!(parsed, CtrlState::Standby);
    }
}
