// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `lumictl` - A luminaire lightness controller.
//!
//! This library drives a dimmable light through a two-state machine
//! (`STANDBY` and `ON`) fed by user on/off commands and occupancy reports.
//! Every state change is realized as a timed fade on a lightness actuator,
//! and the resulting on/off status is published to a network transport.
//!
//! # Supported Features
//!
//! - **On/off control**: Manual commands with per-direction fade durations
//! - **Occupancy automation**: Occupancy turns the light on; an optional hold
//!   time fades it back to standby on its own
//! - **Event coalescing**: Commands received during a fade are deferred,
//!   the most recent one wins
//! - **Persistence**: Configuration and runtime state survive restarts
//! - **Status publication**: Generic `OnOff` status messages with encoded
//!   remaining time
//! - **Events**: Every state change, publication and failure is broadcast
//!
//! # Quick Start
//!
//! The controller itself is synchronous and never sleeps. Run it through
//! [`LightCtrlServer`], which owns it on a tokio task and fires its timers:
//!
//! ```no_run
//! use lumictl::{Collaborators, LightCtrl, LightCtrlConfig, LightCtrlServer, TransitionTime};
//! # use lumictl::{LightnessActuator, OnOffServer, OnOffStatus, Transport, Lightness};
//! # use lumictl::error::CollaboratorError;
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
//!
//! #[tokio::main]
//! async fn main() -> lumictl::Result<()> {
//!     let config = LightCtrlConfig::default()
//!         .with_on_hold(TransitionTime::from_secs(300)?);
//!     let ctrl = LightCtrl::new(config, Collaborators::new(Dimmer, Radio, OnOff));
//!     let server = LightCtrlServer::spawn(ctrl);
//!
//!     server.enable().await?;
//!     server.occupancy_detected().await?;
//!
//!     let snapshot = server.snapshot().await?;
//!     println!("light is {}", snapshot.state);
//!
//!     server.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod collaborator;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod flags;
pub mod persist;
pub mod server;
pub mod types;

pub use collaborator::{
    Collaborators, LightnessActuator, NoPersistence, OnOffServer, Persistence, Transport,
};
pub use config::{FadeTable, LightCtrlConfig, LightTable};
pub use controller::{LightCtrl, OP_LIGHT_ONOFF_STATUS, OnOffStatus, Snapshot, TimerPurpose};
pub use error::{CollaboratorError, Error, PersistError, Result, ValueError};
pub use event::{ControllerId, CtrlEvent, EventBus};
pub use flags::{Flag, Flags};
pub use persist::{StoreKey, StoredState};
pub use server::LightCtrlServer;
pub use types::{CtrlState, Lightness, TRANSITION_TIME_UNKNOWN, TransitionTime};
