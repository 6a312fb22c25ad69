// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use lumictl::collaborator::{Collaborators, LightnessActuator, OnOffServer, Persistence, Transport};
use lumictl::controller::{OP_LIGHT_ONOFF_STATUS, OnOffStatus};
use lumictl::error::CollaboratorError;
use lumictl::persist::StoreKey;
use lumictl::types::{Lightness, TransitionTime};
use parking_lot::Mutex;

/// A collaborator call, in the order the controller made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ChangeLevel {
        target: u16,
        transition_ms: u32,
        publish: bool,
    },
    Controlled(bool),
    Send {
        opcode: u32,
        payload: Vec<u8>,
    },
    OnOff(OnOffStatus),
    Store(StoreKey),
    Erase(StoreKey),
}

/// Collaborators to make fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub actuator: bool,
    pub transport: bool,
    pub storage: bool,
}

/// Owns the shared call log, the storage map and the fault switches.
#[derive(Clone, Default)]
pub struct Harness {
    calls: Arc<Mutex<Vec<Call>>>,
    storage: Arc<Mutex<HashMap<StoreKey, Vec<u8>>>>,
    faults: Arc<Mutex<Faults>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds collaborators that record into this harness.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            MockActuator(self.clone()),
            MockTransport(self.clone()),
            MockOnOff(self.clone()),
        )
        .with_persistence(MockStore(self.clone()))
    }

    /// Drains the call log.
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Drains the call log, keeping only transport payloads.
    pub fn take_payloads(&self) -> Vec<Vec<u8>> {
        self.take()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { opcode, payload } => {
                    assert_eq!(opcode, OP_LIGHT_ONOFF_STATUS);
                    Some(payload)
                }
                _ => None,
            })
            .collect()
    }

    /// Drains the call log, keeping only level changes as `(target, ms)`.
    pub fn take_levels(&self) -> Vec<(u16, u32)> {
        self.take()
            .into_iter()
            .filter_map(|call| match call {
                Call::ChangeLevel {
                    target,
                    transition_ms,
                    ..
                } => Some((target, transition_ms)),
                _ => None,
            })
            .collect()
    }

    pub fn stored(&self, key: StoreKey) -> Option<Vec<u8>> {
        self.storage.lock().get(&key).cloned()
    }

    pub fn set_stored(&self, key: StoreKey, data: &[u8]) {
        self.storage.lock().insert(key, data.to_vec());
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock() = faults;
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn faults(&self) -> Faults {
        *self.faults.lock()
    }
}

struct MockActuator(Harness);

impl LightnessActuator for MockActuator {
    fn change_level(
        &mut self,
        target: Lightness,
        transition: TransitionTime,
        publish: bool,
    ) -> Result<(), CollaboratorError> {
        self.0.record(Call::ChangeLevel {
            target: target.value(),
            transition_ms: transition.as_millis(),
            publish,
        });
        if self.0.faults().actuator {
            return Err(CollaboratorError::Actuator("level rejected".to_string()));
        }
        Ok(())
    }

    fn set_controlled(&mut self, controlled: bool) {
        self.0.record(Call::Controlled(controlled));
    }
}

struct MockTransport(Harness);

impl Transport for MockTransport {
    fn send(&mut self, opcode: u32, payload: &[u8]) -> Result<(), CollaboratorError> {
        self.0.record(Call::Send {
            opcode,
            payload: payload.to_vec(),
        });
        if self.0.faults().transport {
            return Err(CollaboratorError::Transport("no route".to_string()));
        }
        Ok(())
    }
}

struct MockOnOff(Harness);

impl OnOffServer for MockOnOff {
    fn publish_status(&mut self, status: &OnOffStatus) -> Result<(), CollaboratorError> {
        self.0.record(Call::OnOff(*status));
        Ok(())
    }
}

struct MockStore(Harness);

impl Persistence for MockStore {
    fn store(&mut self, key: StoreKey, data: &[u8]) -> Result<(), CollaboratorError> {
        if self.0.faults().storage {
            return Err(CollaboratorError::Storage("flash busy".to_string()));
        }
        self.0.record(Call::Store(key));
        self.0.storage.lock().insert(key, data.to_vec());
        Ok(())
    }

    fn load(&mut self, key: StoreKey) -> Result<Option<Vec<u8>>, CollaboratorError> {
        if self.0.faults().storage {
            return Err(CollaboratorError::Storage("flash busy".to_string()));
        }
        Ok(self.0.stored(key))
    }

    fn erase(&mut self, key: StoreKey) -> Result<(), CollaboratorError> {
        self.0.record(Call::Erase(key));
        self.0.storage.lock().remove(&key);
        Ok(())
    }
}
