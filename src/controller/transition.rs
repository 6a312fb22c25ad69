// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transition engine.
//!
//! Owns the controller's single timer slot. A slot holds at most one
//! deadline, tagged with what it is for; arming always replaces the previous
//! deadline. The engine never sleeps: the owning worker reads
//! [`TransitionEngine::deadline`] and reports expiry back through
//! [`TransitionEngine::expire`].
//!
//! `TRANSITION` is set exactly while the slot holds a fade deadline.

use tokio::time::Instant;

use crate::collaborator::LightnessActuator;
use crate::error::CollaboratorError;
use crate::flags::{Flag, Flags};
use crate::types::{CtrlState, Lightness, TransitionTime};

/// What an armed timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TimerPurpose {
    /// A fade is animating; expiry settles it.
    Fade,
    /// The light is on; expiry starts the automatic fade to standby.
    Hold,
    /// Restart delay; expiry restores the persisted state.
    Resume,
}

/// Details of the fade in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fade {
    /// State the fade started from.
    pub from: CtrlState,
    pub duration: TransitionTime,
    /// Publish a steady status once the fade settles.
    pub publish_on_settle: bool,
}

/// A timer that ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expired {
    Fade(Fade),
    Hold,
    Resume,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    purpose: TimerPurpose,
    deadline: Instant,
}

#[derive(Debug, Default)]
pub(crate) struct TransitionEngine {
    armed: Option<Armed>,
    fade: Option<Fade>,
}

impl TransitionEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts a fade towards `target`.
    ///
    /// Cancels whatever timer was armed, asks the actuator to animate, arms
    /// the fade deadline and sets `TRANSITION`. The timer is armed even if
    /// the actuator fails; the actuator error is handed back for reporting.
    pub(crate) fn start(
        &mut self,
        actuator: &mut dyn LightnessActuator,
        flags: &mut Flags,
        target: Lightness,
        fade: Fade,
    ) -> Result<(), CollaboratorError> {
        self.cancel(flags);
        let result = actuator.change_level(target, fade.duration, true);
        self.arm(TimerPurpose::Fade, fade.duration);
        self.fade = Some(fade);
        flags.set(Flag::Transition);
        tracing::debug!(
            target_level = target.value(),
            duration = %fade.duration,
            "Fade started"
        );
        result
    }

    /// Arms the slot for a non-fade purpose, replacing any armed timer.
    ///
    /// Arming over a fade ends the fade, so `TRANSITION` is cleared.
    pub(crate) fn arm_timer(&mut self, flags: &mut Flags, purpose: TimerPurpose, delay: TransitionTime) {
        debug_assert_ne!(purpose, TimerPurpose::Fade, "fades are armed by start()");
        self.cancel(flags);
        self.arm(purpose, delay);
        tracing::trace!(?purpose, delay = %delay, "Timer armed");
    }

    fn arm(&mut self, purpose: TimerPurpose, delay: TransitionTime) {
        self.armed = Some(Armed {
            purpose,
            deadline: Instant::now() + delay.as_duration(),
        });
    }

    /// Disarms the slot and clears `TRANSITION`.
    pub(crate) fn cancel(&mut self, flags: &mut Flags) {
        if let Some(armed) = self.armed.take() {
            tracing::trace!(purpose = ?armed.purpose, "Timer cancelled");
        }
        self.fade = None;
        flags.clear(Flag::Transition);
    }

    /// Returns the armed deadline, if any.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.armed.map(|armed| armed.deadline)
    }

    /// Returns the purpose of the armed timer, if any.
    pub(crate) fn purpose(&self) -> Option<TimerPurpose> {
        self.armed.map(|armed| armed.purpose)
    }

    /// Fires the armed timer.
    ///
    /// Disarms the slot and, for a fade, clears `TRANSITION`. Returns `None`
    /// if nothing was armed. Single shot: a second call without re-arming
    /// returns `None`.
    pub(crate) fn expire(&mut self, flags: &mut Flags) -> Option<Expired> {
        let armed = self.armed.take()?;
        let expired = match armed.purpose {
            TimerPurpose::Fade => {
                flags.clear(Flag::Transition);
                let fade = self.fade.take()?;
                Expired::Fade(fade)
            }
            TimerPurpose::Hold => Expired::Hold,
            TimerPurpose::Resume => Expired::Resume,
        };
        Some(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Levels(Vec<(u16, u32)>);

    impl LightnessActuator for Levels {
        fn change_level(
            &mut self,
            target: Lightness,
            transition: TransitionTime,
            publish: bool,
        ) -> Result<(), CollaboratorError> {
            assert!(publish);
            self.0.push((target.value(), transition.as_millis()));
            Ok(())
        }
    }

    fn fade(millis: u32) -> Fade {
        Fade {
            from: CtrlState::Standby,
            duration: TransitionTime::from_millis(millis).unwrap(),
            publish_on_settle: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_arms_fade_and_sets_transition() {
        let mut engine = TransitionEngine::new();
        let mut actuator = Levels::default();
        let mut flags = Flags::EMPTY;

        let before = Instant::now();
        engine
            .start(&mut actuator, &mut flags, Lightness::MAX, fade(500))
            .unwrap();

        assert!(flags.contains(Flag::Transition));
        assert_eq!(engine.purpose(), Some(TimerPurpose::Fade));
        assert_eq!(
            engine.deadline(),
            Some(before + std::time::Duration::from_millis(500))
        );
        assert_eq!(actuator.0, vec![(u16::MAX, 500)]);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_timer() {
        let mut engine = TransitionEngine::new();
        let mut actuator = Levels::default();
        let mut flags = Flags::EMPTY;

        engine
            .start(&mut actuator, &mut flags, Lightness::MAX, fade(5_000))
            .unwrap();
        engine
            .start(&mut actuator, &mut flags, Lightness::OFF, fade(100))
            .unwrap();

        assert_eq!(actuator.0.len(), 2);
        let Some(Expired::Fade(settled)) = engine.expire(&mut flags) else {
            panic!("fade should expire");
        };
        assert_eq!(settled.duration.as_millis(), 100);
        assert!(engine.expire(&mut flags).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expire_clears_transition_once() {
        let mut engine = TransitionEngine::new();
        let mut flags = Flags::EMPTY;

        engine
            .start(&mut Levels::default(), &mut flags, Lightness::MAX, fade(0))
            .unwrap();
        assert!(flags.contains(Flag::Transition));

        assert!(matches!(engine.expire(&mut flags), Some(Expired::Fade(_))));
        assert!(!flags.contains(Flag::Transition));
        assert!(engine.deadline().is_none());
        assert!(engine.purpose().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn hold_timer_does_not_set_transition() {
        let mut engine = TransitionEngine::new();
        let mut flags = Flags::EMPTY;

        engine.arm_timer(
            &mut flags,
            TimerPurpose::Hold,
            TransitionTime::from_secs(10).unwrap(),
        );

        assert!(!flags.contains(Flag::Transition));
        assert_eq!(engine.purpose(), Some(TimerPurpose::Hold));
        assert_eq!(engine.expire(&mut flags), Some(Expired::Hold));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_disarms() {
        let mut engine = TransitionEngine::new();
        let mut flags = Flags::EMPTY;

        engine
            .start(&mut Levels::default(), &mut flags, Lightness::MAX, fade(500))
            .unwrap();
        engine.cancel(&mut flags);

        assert!(engine.deadline().is_none());
        assert!(!flags.contains(Flag::Transition));
        assert!(engine.expire(&mut flags).is_none());
    }
}
