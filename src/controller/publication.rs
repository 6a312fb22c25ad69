// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off status publication.
//!
//! Every publish-worthy transition produces an [`OnOffStatus`] that goes out
//! on two channels: as a Light OnOff Status message through the
//! [`Transport`], and as a direct update to the [`OnOffServer`] aggregate.
//! Both are fire-and-forget.

use crate::collaborator::{OnOffServer, Transport};
use crate::error::CollaboratorError;
use crate::types::TransitionTime;

/// Opcode of the Light OnOff Status message.
pub const OP_LIGHT_ONOFF_STATUS: u32 = 0x829C;

/// On/off status of a light controller.
///
/// # Examples
///
/// ```
/// use lumictl::controller::OnOffStatus;
/// use lumictl::types::TransitionTime;
///
/// assert_eq!(OnOffStatus::OFF.encode(), vec![0]);
///
/// let fading_on = OnOffStatus {
///     present_on_off: true,
///     target_on_off: true,
///     remaining_time: TransitionTime::from_millis(500).unwrap(),
/// };
/// assert_eq!(fading_on.encode(), vec![1, 1, 0x05]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OnOffStatus {
    /// Whether the light is currently on, or still lit while fading off.
    pub present_on_off: bool,
    /// The on/off value the light is heading for.
    pub target_on_off: bool,
    /// Time left until the target is reached.
    pub remaining_time: TransitionTime,
}

impl OnOffStatus {
    /// Steady off status, published when the controller is disabled.
    pub const OFF: Self = Self::steady(false);

    /// Creates a status with no transition in progress.
    #[must_use]
    pub const fn steady(on: bool) -> Self {
        Self {
            present_on_off: on,
            target_on_off: on,
            remaining_time: TransitionTime::ZERO,
        }
    }

    /// Returns `true` while a transition is in progress.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        !self.remaining_time.is_zero()
    }

    /// Encodes the status message body.
    ///
    /// A steady status is a single byte. A status with a transition in
    /// progress adds the target value and the encoded remaining time.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3);
        buf.push(u8::from(self.present_on_off));
        if self.is_transitioning() {
            buf.push(u8::from(self.target_on_off));
            buf.push(self.remaining_time.encode());
        }
        buf
    }
}

/// Sends `status` on both channels.
///
/// Both channels are always attempted. Failures are returned for logging;
/// they never affect controller state.
pub(crate) fn publish(
    status: &OnOffStatus,
    transport: &mut dyn Transport,
    onoff: &mut dyn OnOffServer,
) -> Vec<CollaboratorError> {
    let mut failures = Vec::new();
    if let Err(e) = transport.send(OP_LIGHT_ONOFF_STATUS, &status.encode()) {
        failures.push(e);
    }
    if let Err(e) = onoff.publish_status(status) {
        failures.push(e);
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sent(Vec<(u32, Vec<u8>)>);

    impl Transport for Sent {
        fn send(&mut self, opcode: u32, payload: &[u8]) -> Result<(), CollaboratorError> {
            self.0.push((opcode, payload.to_vec()));
            Ok(())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn send(&mut self, _: u32, _: &[u8]) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::Transport("radio off".to_string()))
        }
    }

    #[derive(Default)]
    struct Seen(Vec<OnOffStatus>);

    impl OnOffServer for Seen {
        fn publish_status(&mut self, status: &OnOffStatus) -> Result<(), CollaboratorError> {
            self.0.push(*status);
            Ok(())
        }
    }

    fn fading(present: bool, target: bool, millis: u32) -> OnOffStatus {
        OnOffStatus {
            present_on_off: present,
            target_on_off: target,
            remaining_time: TransitionTime::from_millis(millis).unwrap(),
        }
    }

    #[test]
    fn steady_status_is_one_byte() {
        assert_eq!(OnOffStatus::steady(true).encode(), vec![1]);
        assert_eq!(OnOffStatus::OFF.encode(), vec![0]);
    }

    #[test]
    fn transitioning_status_is_three_bytes() {
        assert_eq!(fading(true, false, 500).encode(), vec![1, 0, 0x05]);
        assert_eq!(fading(true, true, 5_000).encode(), vec![1, 1, 0x32]);
    }

    #[test]
    fn publish_uses_both_channels() {
        let mut transport = Sent::default();
        let mut onoff = Seen::default();
        let status = fading(true, true, 500);

        let failures = publish(&status, &mut transport, &mut onoff);

        assert!(failures.is_empty());
        assert_eq!(transport.0, vec![(OP_LIGHT_ONOFF_STATUS, vec![1, 1, 0x05])]);
        assert_eq!(onoff.0, vec![status]);
    }

    #[test]
    fn transport_failure_still_reaches_aggregate() {
        let mut onoff = Seen::default();

        let failures = publish(&OnOffStatus::OFF, &mut Broken, &mut onoff);

        assert_eq!(failures.len(), 1);
        assert_eq!(onoff.0, vec![OnOffStatus::OFF]);
    }
}
