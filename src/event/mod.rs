// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller event system.
//!
//! Controllers report what they did on an [`EventBus`], a tokio broadcast
//! channel. Collaborator failures that the state machine swallows surface
//! here as [`CtrlEvent::CollaboratorFailed`].
//!
//! # Examples
//!
//! ```
//! use lumictl::event::{ControllerId, CtrlEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let controller_id = ControllerId::new();
//! bus.publish(CtrlEvent::Disabled { controller_id });
//! ```

mod controller_id;
mod ctrl_event;
mod event_bus;

pub use controller_id::ControllerId;
pub use ctrl_event::CtrlEvent;
pub use event_bus::EventBus;
