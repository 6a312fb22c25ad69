// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Luminaire light controller.
//!
//! [`LightCtrl`] is the synchronous core: it holds the discrete state, the
//! flag register, the configuration and the single timer slot, and drives
//! the injected collaborators. It never sleeps. Whoever owns it (normally
//! the [`server`](crate::server) worker) waits for
//! [`LightCtrl::timer_deadline`] and then calls
//! [`LightCtrl::on_timer_expired`].
//!
//! # Lifecycle
//!
//! - [`LightCtrl::new`] initializes the controller: `STANDBY`, flags
//!   `STARTED | OCC_MODE`, disabled.
//! - [`LightCtrl::start`] restores persisted records and either schedules
//!   the resume of an enabled controller or publishes the off baseline.
//! - [`LightCtrl::reset`] disables, clears every flag and erases storage.
//!
//! # Examples
//!
//! ```
//! # use lumictl::collaborator::{Collaborators, LightnessActuator, OnOffServer, Transport};
//! # use lumictl::controller::OnOffStatus;
//! # use lumictl::error::CollaboratorError;
//! # use lumictl::types::{Lightness, TransitionTime};
//! # struct Dimmer;
//! # impl LightnessActuator for Dimmer {
//! #     fn change_level(&mut self, _: Lightness, _: TransitionTime, _: bool) -> Result<(), CollaboratorError> { Ok(()) }
//! # }
//! # struct Radio;
//! # impl Transport for Radio {
//! #     fn send(&mut self, _: u32, _: &[u8]) -> Result<(), CollaboratorError> { Ok(()) }
//! # }
//! # struct OnOff;
//! # impl OnOffServer for OnOff {
//! #     fn publish_status(&mut self, _: &OnOffStatus) -> Result<(), CollaboratorError> { Ok(()) }
//! # }
//! use lumictl::config::LightCtrlConfig;
//! use lumictl::controller::LightCtrl;
//! use lumictl::types::CtrlState;
//!
//! let mut ctrl = LightCtrl::new(
//!     LightCtrlConfig::default(),
//!     Collaborators::new(Dimmer, Radio, OnOff),
//! );
//! ctrl.start();
//! ctrl.enable();
//! ctrl.on_timer_expired();
//!
//! ctrl.on();
//! assert_eq!(ctrl.state(), CtrlState::On);
//! ```

mod coordinator;
mod fsm;
mod publication;
mod transition;

pub use publication::{OP_LIGHT_ONOFF_STATUS, OnOffStatus};
pub use transition::TimerPurpose;

use tokio::time::Instant;

use crate::collaborator::Collaborators;
use crate::config::LightCtrlConfig;
use crate::error::{CollaboratorError, PersistError};
use crate::event::{ControllerId, CtrlEvent, EventBus};
use crate::flags::{Flag, Flags};
use crate::persist::{self, StoreKey, StoredState};
use crate::types::CtrlState;

use fsm::Event;
use transition::{Expired, Fade, TransitionEngine};

/// Point-in-time view of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Discrete state.
    pub state: CtrlState,
    /// Flag register.
    pub flags: Flags,
    /// Whether the controller owns the actuator.
    pub linked: bool,
    /// Purpose of the armed timer, if any.
    pub timer: Option<TimerPurpose>,
}

impl Snapshot {
    /// Returns `true` if the controller is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.flags.contains(Flag::Enabled)
    }

    /// Returns `true` while a fade is in progress.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.flags.contains(Flag::Transition)
    }
}

/// A luminaire light controller.
pub struct LightCtrl {
    id: ControllerId,
    state: CtrlState,
    flags: Flags,
    config: LightCtrlConfig,
    /// Configuration restored by `reset`.
    initial_config: LightCtrlConfig,
    engine: TransitionEngine,
    collaborators: Collaborators,
    linked: bool,
    /// Turn on once the resume timer has re-enabled the controller.
    resume_on: bool,
    events: EventBus,
}

impl LightCtrl {
    /// Creates and initializes a controller.
    ///
    /// The controller starts disabled in `STANDBY`. Call
    /// [`start`](Self::start) once the collaborators are ready.
    #[must_use]
    pub fn new(config: LightCtrlConfig, collaborators: Collaborators) -> Self {
        Self {
            id: ControllerId::new(),
            state: CtrlState::Standby,
            flags: Flags::INITIAL,
            initial_config: config.clone(),
            config,
            engine: TransitionEngine::new(),
            collaborators,
            linked: false,
            resume_on: false,
            events: EventBus::new(),
        }
    }

    /// Uses `events` for event broadcasting instead of a private bus.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Returns the controller's identifier.
    #[must_use]
    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// Returns the discrete state.
    #[must_use]
    pub fn state(&self) -> CtrlState {
        self.state
    }

    /// Returns the flag register.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &LightCtrlConfig {
        &self.config
    }

    /// Returns `true` while the controller owns the actuator.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Returns the event bus the controller reports on.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the deadline of the armed timer, if any.
    #[must_use]
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.engine.deadline()
    }

    /// Returns a snapshot of the controller.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            flags: self.flags,
            linked: self.linked,
            timer: self.engine.purpose(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Re-initializes a controller after [`reset`](Self::reset).
    pub fn init(&mut self) {
        self.engine.cancel(&mut self.flags);
        self.state = CtrlState::Standby;
        self.flags = Flags::INITIAL;
        self.resume_on = false;
    }

    /// Starts the controller.
    ///
    /// Loads the persisted configuration and runtime state. A controller
    /// that was enabled before the restart arms the resume timer;
    /// otherwise the off status is published as a known baseline.
    pub fn start(&mut self) {
        self.load_config();
        let stored = self.load_state();

        if let Some(stored) = stored {
            self.flags.assign(Flag::OccMode, stored.occupancy_mode);
            self.flags.assign(Flag::Manual, stored.manual);
        }

        match stored {
            Some(stored) if stored.enabled => {
                tracing::info!(
                    controller = %self.id,
                    on = stored.on,
                    delay = %self.config.resume_delay,
                    "Resuming enabled controller"
                );
                self.resume_on = stored.on;
                self.flags.set(Flag::ResumeTimer);
                self.engine.arm_timer(
                    &mut self.flags,
                    TimerPurpose::Resume,
                    self.config.resume_delay,
                );
            }
            _ => {
                tracing::info!(controller = %self.id, "Starting disabled");
                self.release();
            }
        }
    }

    /// Resets the controller.
    ///
    /// Forces the disable sequence (publishing the off status), clears every
    /// flag, restores the construction-time configuration and erases the
    /// persisted records.
    pub fn reset(&mut self) {
        tracing::info!(controller = %self.id, "Resetting controller");
        let was_enabled = self.flags.contains(Flag::Enabled);
        self.release();
        if was_enabled {
            self.emit(CtrlEvent::Disabled {
                controller_id: self.id,
            });
        }

        self.flags = Flags::EMPTY;
        self.state = CtrlState::Standby;
        self.resume_on = false;
        self.config = self.initial_config.clone();

        for key in [StoreKey::Config, StoreKey::State] {
            if let Err(e) = self.collaborators.store.erase(key) {
                self.report_failure(e);
            }
        }
    }

    /// Handles expiry of the armed timer.
    ///
    /// Does nothing if no timer is armed.
    pub fn on_timer_expired(&mut self) {
        match self.engine.expire(&mut self.flags) {
            Some(Expired::Fade(fade)) => self.settle(fade),
            Some(Expired::Hold) => {
                tracing::debug!(controller = %self.id, "Hold time elapsed");
                self.apply(Event::HoldExpired);
            }
            Some(Expired::Resume) => self.resume(),
            None => {}
        }
    }

    /// Writes dirty records to storage.
    ///
    /// Consumes `STORE_CFG` and `STORE_STATE`. A record that fails to write
    /// keeps its dirty flag so the next flush retries.
    pub fn flush(&mut self) {
        if self.flags.test_and_clear(Flag::StoreCfg) {
            let encoded = persist::encode_config(&self.config);
            if !self.store_record(StoreKey::Config, encoded) {
                self.flags.set(Flag::StoreCfg);
            }
        }

        if self.flags.test_and_clear(Flag::StoreState) {
            let record = StoredState {
                enabled: self.flags.contains(Flag::Enabled),
                on: self.flags.contains(Flag::On),
                manual: self.flags.contains(Flag::Manual),
                occupancy_mode: self.flags.contains(Flag::OccMode),
            };
            let encoded = persist::encode_state(&record);
            if !self.store_record(StoreKey::State, encoded) {
                self.flags.set(Flag::StoreState);
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Settles a finished fade.
    ///
    /// A pending event gets exactly one chance to run. If it starts a new
    /// transition, that transition publishes instead of this settle.
    fn settle(&mut self, fade: Fade) {
        tracing::debug!(
            controller = %self.id,
            from = %fade.from,
            state = %self.state,
            "Transition settled"
        );

        if let Some(event) = self.take_pending() {
            tracing::trace!(controller = %self.id, event = event.as_str(), "Applying pending event");
            if self.dispatch(event) {
                return;
            }
        }

        if fade.publish_on_settle {
            self.publish(OnOffStatus::steady(self.state.is_on()));
        }
        self.arm_hold();
    }

    /// Re-enables a controller that was enabled before the restart.
    fn resume(&mut self) {
        let restore_on = std::mem::take(&mut self.resume_on);
        tracing::info!(controller = %self.id, on = restore_on, "Resume timer elapsed");
        self.flags.clear(Flag::ResumeTimer);
        self.enable();
        if restore_on {
            self.on();
        }
    }

    /// Arms the hold timer if the light is on and a hold time is configured.
    fn arm_hold(&mut self) {
        if !self.state.is_on() || !self.flags.contains(Flag::Enabled) {
            return;
        }
        if let Some(hold) = self.config.on_hold {
            self.engine
                .arm_timer(&mut self.flags, TimerPurpose::Hold, hold);
        }
    }

    /// Unlinks the actuator and publishes the off status.
    ///
    /// Shared by `disable`, `start` and `reset`; does not mark state dirty.
    fn release(&mut self) {
        self.flags.clear(Flag::Enabled);
        self.flags.clear(Flag::ResumeTimer);
        self.flags.clear_all(&Flag::PENDING);
        self.resume_on = false;
        self.engine.cancel(&mut self.flags);
        self.link(false);
        self.publish(OnOffStatus::OFF);
    }

    fn link(&mut self, linked: bool) {
        if self.linked != linked {
            self.collaborators.actuator.set_controlled(linked);
        }
        self.linked = linked;
    }

    fn publish(&mut self, status: OnOffStatus) {
        let failures = publication::publish(
            &status,
            self.collaborators.transport.as_mut(),
            self.collaborators.onoff.as_mut(),
        );
        for error in failures {
            self.report_failure(error);
        }
        tracing::debug!(
            controller = %self.id,
            present = status.present_on_off,
            target = status.target_on_off,
            remaining = %status.remaining_time,
            "Published on/off status"
        );
        self.emit(CtrlEvent::StatusPublished {
            controller_id: self.id,
            status,
        });
    }

    fn load_config(&mut self) {
        if let Some(config) = self.load_record(StoreKey::Config, persist::decode_config) {
            tracing::debug!(controller = %self.id, "Restored configuration");
            self.config = config;
        }
    }

    fn load_state(&mut self) -> Option<StoredState> {
        self.load_record(StoreKey::State, persist::decode_state)
    }

    fn load_record<T>(
        &mut self,
        key: StoreKey,
        decode: fn(&[u8]) -> Result<T, PersistError>,
    ) -> Option<T> {
        let bytes = match self.collaborators.store.load(key) {
            Ok(bytes) => bytes?,
            Err(e) => {
                self.report_failure(e);
                return None;
            }
        };
        match decode(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(controller = %self.id, key = %key, error = %e, "Discarding unreadable record");
                None
            }
        }
    }

    /// Writes one record. Returns `false` if it has to be retried.
    fn store_record(&mut self, key: StoreKey, encoded: Result<Vec<u8>, PersistError>) -> bool {
        let bytes = match encoded {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(controller = %self.id, key = %key, error = %e, "Failed to encode record");
                return true;
            }
        };
        match self.collaborators.store.store(key, &bytes) {
            Ok(()) => {
                tracing::trace!(controller = %self.id, key = %key, "Stored record");
                self.emit(CtrlEvent::Stored {
                    controller_id: self.id,
                    key,
                });
                true
            }
            Err(e) => {
                self.report_failure(e);
                false
            }
        }
    }

    fn report_failure(&mut self, error: CollaboratorError) {
        tracing::warn!(controller = %self.id, error = %error, "Collaborator call failed");
        self.emit(CtrlEvent::CollaboratorFailed {
            controller_id: self.id,
            error,
        });
    }

    fn emit(&self, event: CtrlEvent) {
        self.events.publish(event);
    }
}

impl std::fmt::Debug for LightCtrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightCtrl")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("flags", &self.flags)
            .field("linked", &self.linked)
            .field("timer", &self.engine.purpose())
            .finish_non_exhaustive()
    }
}
