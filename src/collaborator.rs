// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator interfaces consumed by the light controller.
//!
//! The controller does not drive hardware, encode network frames or touch
//! flash itself. It calls into these traits, which the embedding
//! application implements (and tests replace with recording mocks).
//!
//! Every method is synchronous and must not block: implementations that
//! need I/O should queue the work and return.

use crate::controller::OnOffStatus;
use crate::error::CollaboratorError;
use crate::persist::StoreKey;
use crate::types::{Lightness, TransitionTime};

/// The lightness actuator the controller fades.
pub trait LightnessActuator: Send {
    /// Starts animating towards `target` over `transition`.
    ///
    /// Called exactly once per accepted state-changing event. `publish`
    /// asks the actuator to publish its own lightness status as well.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::Actuator` if the level change was
    /// rejected. The controller logs the failure and carries on.
    fn change_level(
        &mut self,
        target: Lightness,
        transition: TransitionTime,
        publish: bool,
    ) -> Result<(), CollaboratorError>;

    /// Tells the actuator whether the controller currently owns it.
    ///
    /// While controlled, direct user level changes should be routed through
    /// the controller instead of applied.
    fn set_controlled(&mut self, controlled: bool) {
        let _ = controlled;
    }
}

/// The message transport used for status publication.
pub trait Transport: Send {
    /// Publishes `payload` with `opcode` to the configured publish address.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::Transport` if the message could not be
    /// queued for sending.
    fn send(&mut self, opcode: u32, payload: &[u8]) -> Result<(), CollaboratorError>;
}

/// The on/off aggregate that mirrors the controller's on/off status.
pub trait OnOffServer: Send {
    /// Receives every on/off status the controller publishes.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::OnOff` if the aggregate rejected the
    /// update.
    fn publish_status(&mut self, status: &OnOffStatus) -> Result<(), CollaboratorError>;
}

/// Key/value storage for persisted records.
pub trait Persistence: Send {
    /// Writes `data` under `key`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::Storage` if the write failed.
    fn store(&mut self, key: StoreKey, data: &[u8]) -> Result<(), CollaboratorError>;

    /// Reads the record stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::Storage` if the read failed.
    fn load(&mut self, key: StoreKey) -> Result<Option<Vec<u8>>, CollaboratorError>;

    /// Removes the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::Storage` if the erase failed.
    fn erase(&mut self, key: StoreKey) -> Result<(), CollaboratorError>;
}

/// Storage that keeps nothing.
///
/// Used when no persistence backend is attached: flushes succeed and every
/// load comes back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl Persistence for NoPersistence {
    fn store(&mut self, _key: StoreKey, _data: &[u8]) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn load(&mut self, _key: StoreKey) -> Result<Option<Vec<u8>>, CollaboratorError> {
        Ok(None)
    }

    fn erase(&mut self, _key: StoreKey) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// The set of collaborators injected into a controller.
///
/// # Examples
///
/// ```
/// use lumictl::collaborator::{Collaborators, LightnessActuator, OnOffServer, Transport};
/// use lumictl::controller::OnOffStatus;
/// use lumictl::error::CollaboratorError;
/// use lumictl::types::{Lightness, TransitionTime};
///
/// struct Dimmer;
/// impl LightnessActuator for Dimmer {
///     fn change_level(&mut self, _: Lightness, _: TransitionTime, _: bool) -> Result<(), CollaboratorError> {
///         Ok(())
///     }
/// }
///
/// struct Radio;
/// impl Transport for Radio {
///     fn send(&mut self, _: u32, _: &[u8]) -> Result<(), CollaboratorError> {
///         Ok(())
///     }
/// }
///
/// struct OnOff;
/// impl OnOffServer for OnOff {
///     fn publish_status(&mut self, _: &OnOffStatus) -> Result<(), CollaboratorError> {
///         Ok(())
///     }
/// }
///
/// let collaborators = Collaborators::new(Dimmer, Radio, OnOff);
/// ```
pub struct Collaborators {
    pub(crate) actuator: Box<dyn LightnessActuator>,
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) onoff: Box<dyn OnOffServer>,
    pub(crate) store: Box<dyn Persistence>,
}

impl Collaborators {
    /// Bundles the required collaborators, without persistence.
    pub fn new(
        actuator: impl LightnessActuator + 'static,
        transport: impl Transport + 'static,
        onoff: impl OnOffServer + 'static,
    ) -> Self {
        Self {
            actuator: Box::new(actuator),
            transport: Box::new(transport),
            onoff: Box::new(onoff),
            store: Box::new(NoPersistence),
        }
    }

    /// Attaches a persistence backend.
    #[must_use]
    pub fn with_persistence(mut self, store: impl Persistence + 'static) -> Self {
        self.store = Box::new(store);
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
