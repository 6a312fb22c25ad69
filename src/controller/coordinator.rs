// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event coordination.
//!
//! The public event operations of [`LightCtrl`]. Each event is either
//! dropped (controller disabled), recorded as pending (fade in progress) or
//! looked up in the transition table and applied.

use crate::config::LightCtrlConfig;
use crate::error::ValueError;
use crate::event::CtrlEvent;
use crate::flags::Flag;

use super::fsm::{self, Decision, Event, Step};
use super::transition::{Fade, TimerPurpose};
use super::{LightCtrl, OnOffStatus};

impl LightCtrl {
    /// Turns the light on.
    ///
    /// Ignored while disabled, deferred while a fade is in progress and
    /// silent if the light is already on.
    pub fn on(&mut self) {
        self.dispatch(Event::On);
    }

    /// Turns the light off.
    ///
    /// Ignored while disabled, deferred while a fade is in progress and
    /// silent if the light is already in standby.
    pub fn off(&mut self) {
        self.dispatch(Event::Off);
    }

    /// Reports occupancy.
    ///
    /// Turns the light on from standby when occupancy mode is set, and
    /// restarts the hold timer when the light is already on.
    pub fn occupancy_detected(&mut self) {
        self.dispatch(Event::Occupancy);
    }

    /// Enables the controller.
    ///
    /// Takes ownership of the actuator and settles into `STANDBY` with an
    /// immediate fade. No-op if already enabled.
    pub fn enable(&mut self) {
        if self.flags.contains(Flag::Enabled) {
            tracing::trace!(controller = %self.id, "Already enabled");
            return;
        }

        tracing::info!(controller = %self.id, "Enabling light control");
        self.flags.clear(Flag::ResumeTimer);
        self.resume_on = false;
        self.flags.set(Flag::Enabled);
        self.link(true);
        self.emit(CtrlEvent::Enabled {
            controller_id: self.id,
        });
        self.run_step(Step::enable(&self.config));
        self.flags.set(Flag::StoreState);
    }

    /// Disables the controller.
    ///
    /// Cancels any timer, drops pending events, releases the actuator and
    /// publishes the off status. The discrete state is left as it was. A
    /// pending resume counts as enabled and is cancelled. No-op if already
    /// disabled.
    pub fn disable(&mut self) {
        if !self.flags.contains(Flag::Enabled) && !self.flags.contains(Flag::ResumeTimer) {
            tracing::trace!(controller = %self.id, "Already disabled");
            return;
        }

        tracing::info!(controller = %self.id, state = %self.state, "Disabling light control");
        self.release();
        self.emit(CtrlEvent::Disabled {
            controller_id: self.id,
        });
        self.flags.set(Flag::StoreState);
    }

    /// Permits or forbids occupancy automation.
    pub fn set_occupancy_mode(&mut self, enabled: bool) {
        if self.flags.contains(Flag::OccMode) == enabled {
            return;
        }
        tracing::debug!(controller = %self.id, enabled, "Occupancy mode changed");
        self.flags.assign(Flag::OccMode, enabled);
        self.flags.set(Flag::StoreCfg);
        self.flags.set(Flag::StoreState);
    }

    /// Replaces the configuration.
    ///
    /// Takes effect from the next transition; a fade in progress keeps its
    /// target and duration.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidConfig` if the configuration does not
    /// validate; the active configuration is kept.
    pub fn set_config(&mut self, config: LightCtrlConfig) -> Result<(), ValueError> {
        config.validate()?;
        if config != self.config {
            tracing::debug!(controller = %self.id, "Configuration updated");
            self.config = config;
            self.flags.set(Flag::StoreCfg);
        }
        Ok(())
    }

    /// Routes an event. Returns `true` if a transition started.
    pub(super) fn dispatch(&mut self, event: Event) -> bool {
        if !self.flags.contains(Flag::Enabled) {
            tracing::trace!(controller = %self.id, event = event.as_str(), "Ignoring event while disabled");
            return false;
        }

        if self.flags.contains(Flag::Transition) {
            let Some(flag) = event.pending_flag() else {
                return false;
            };
            // Last writer wins among pending events
            self.flags.clear_all(&Flag::PENDING);
            if event.targets_on() == self.flags.contains(Flag::On) {
                tracing::trace!(controller = %self.id, event = event.as_str(), "Fade already heads there");
            } else {
                self.flags.set(flag);
                tracing::trace!(controller = %self.id, event = event.as_str(), "Deferring event until fade settles");
            }
            return false;
        }

        self.apply(event)
    }

    /// Looks `event` up in the table and acts on the decision.
    pub(super) fn apply(&mut self, event: Event) -> bool {
        let holding = self.engine.purpose() == Some(TimerPurpose::Hold);
        match fsm::decide(self.state, event, self.flags, &self.config, holding) {
            Decision::Transition(step) => {
                self.run_step(step);
                true
            }
            Decision::ExtendHold => {
                tracing::trace!(controller = %self.id, "Occupancy restarted hold timer");
                self.arm_hold();
                false
            }
            Decision::Ignore => {
                tracing::trace!(controller = %self.id, state = %self.state, event = event.as_str(), "Event has no effect");
                false
            }
            Decision::Invalid => {
                tracing::error!(
                    controller = %self.id,
                    state = %self.state,
                    event = event.as_str(),
                    "Invalid transition"
                );
                false
            }
        }
    }

    /// Takes the pending event, clearing every pending flag.
    pub(super) fn take_pending(&mut self) -> Option<Event> {
        let pending = [
            (Flag::OffPending, Event::Off),
            (Flag::OnPending, Event::On),
            (Flag::OccPending, Event::Occupancy),
        ]
        .into_iter()
        .find(|(flag, _)| self.flags.contains(*flag))
        .map(|(_, event)| event);
        self.flags.clear_all(&Flag::PENDING);
        pending
    }

    /// Applies a step: flags, state, fade and the start publication.
    fn run_step(&mut self, step: Step) {
        let from = self.state;
        let was_on = self.flags.contains(Flag::On);
        let was_manual = self.flags.contains(Flag::Manual);

        self.flags.assign(Flag::On, step.on);
        if let Some(manual) = step.manual {
            self.flags.assign(Flag::Manual, manual);
        }
        self.state = step.next;

        let fade = Fade {
            from,
            duration: step.fade,
            publish_on_settle: step.publish && !step.fade.is_zero(),
        };
        if let Err(e) = self.engine.start(
            self.collaborators.actuator.as_mut(),
            &mut self.flags,
            step.target,
            fade,
        ) {
            self.report_failure(e);
        }

        if from != step.next
            || was_on != step.on
            || was_manual != self.flags.contains(Flag::Manual)
        {
            self.flags.set(Flag::StoreState);
        }

        tracing::debug!(
            controller = %self.id,
            from = %from,
            to = %step.next,
            fade = %step.fade,
            "State transition"
        );
        self.emit(CtrlEvent::StateChanged {
            controller_id: self.id,
            from,
            to: step.next,
            fade: step.fade,
        });

        if step.publish {
            let status = if step.fade.is_zero() {
                OnOffStatus::steady(step.on)
            } else {
                // Lit while fading in either direction
                OnOffStatus {
                    present_on_off: true,
                    target_on_off: step.on,
                    remaining_time: step.fade,
                }
            };
            self.publish(status);

            // Immediate steps settle in place, leaving no timer behind
            if step.fade.is_zero() {
                self.on_timer_expired();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::collaborator::{Collaborators, LightnessActuator, OnOffServer, Transport};
    use crate::config::LightCtrlConfig;
    use crate::controller::{LightCtrl, OnOffStatus};
    use crate::error::CollaboratorError;
    use crate::flags::{Flag, Flags};
    use crate::types::{CtrlState, Lightness, TransitionTime};

    struct Quiet;

    impl LightnessActuator for Quiet {
        fn change_level(
            &mut self,
            _: Lightness,
            _: TransitionTime,
            _: bool,
        ) -> Result<(), CollaboratorError> {
            Ok(())
        }
    }

    impl Transport for Quiet {
        fn send(&mut self, _: u32, _: &[u8]) -> Result<(), CollaboratorError> {
            Ok(())
        }
    }

    impl OnOffServer for Quiet {
        fn publish_status(&mut self, _: &OnOffStatus) -> Result<(), CollaboratorError> {
            Ok(())
        }
    }

    fn settled_ctrl() -> LightCtrl {
        let mut ctrl = LightCtrl::new(
            LightCtrlConfig::default(),
            Collaborators::new(Quiet, Quiet, Quiet),
        );
        ctrl.start();
        ctrl.enable();
        ctrl.on_timer_expired();
        ctrl.flush();
        ctrl
    }

    #[test]
    fn pending_last_writer_wins() {
        let mut ctrl = settled_ctrl();
        ctrl.on();
        assert!(ctrl.flags().contains(Flag::Transition));

        ctrl.off();
        ctrl.on();
        ctrl.off();

        let pending: Flags = ctrl
            .flags()
            .iter()
            .filter(|flag| Flag::PENDING.contains(flag))
            .collect();
        assert_eq!(pending, Flags::of(&[Flag::OffPending]));
    }

    #[test]
    fn take_pending_clears_all_markers() {
        let mut ctrl = settled_ctrl();
        ctrl.on();
        ctrl.off();

        assert_eq!(ctrl.take_pending(), Some(super::Event::Off));
        assert_eq!(ctrl.take_pending(), None);
    }

    #[test]
    fn event_matching_fade_target_leaves_flags_alone() {
        let mut ctrl = settled_ctrl();
        ctrl.on();
        let fading_on = ctrl.flags();

        ctrl.on();
        ctrl.occupancy_detected();
        assert_eq!(ctrl.flags(), fading_on);
        assert_eq!(ctrl.take_pending(), None);
    }

    #[test]
    fn event_matching_fade_target_cancels_earlier_pending() {
        let mut ctrl = settled_ctrl();
        ctrl.on();
        ctrl.off();
        assert!(ctrl.flags().contains(Flag::OffPending));

        ctrl.on();
        assert_eq!(ctrl.take_pending(), None);
    }

    #[test]
    fn occupancy_mode_change_marks_config_dirty() {
        let mut ctrl = settled_ctrl();
        ctrl.set_occupancy_mode(false);
        assert!(ctrl.flags().contains(Flag::StoreCfg));
        assert!(!ctrl.flags().contains(Flag::OccMode));

        ctrl.flush();
        ctrl.set_occupancy_mode(false);
        assert!(!ctrl.flags().contains(Flag::StoreCfg));
    }

    #[test]
    fn occupancy_ignored_without_occupancy_mode() {
        let mut ctrl = settled_ctrl();
        ctrl.set_occupancy_mode(false);
        ctrl.occupancy_detected();
        assert_eq!(ctrl.state(), CtrlState::Standby);
        assert!(!ctrl.flags().contains(Flag::Transition));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut ctrl = settled_ctrl();
        let bad = LightCtrlConfig::default().with_on_hold(TransitionTime::ZERO);
        assert!(ctrl.set_config(bad).is_err());
        assert!(ctrl.config().on_hold.is_none());
        assert!(!ctrl.flags().contains(Flag::StoreCfg));
    }
}
