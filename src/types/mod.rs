// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for light control.
//!
//! Each type checks its range at construction time, so a value that made it
//! into a configuration or a status message is always valid.
//!
//! # Types
//!
//! - [`Lightness`] - Light output level (0-65535)
//! - [`TransitionTime`] - Fade duration in milliseconds, with its one-byte
//!   wire encoding
//! - [`CtrlState`] - Discrete controller state (`STANDBY` / `ON`)

mod lightness;
mod state;
mod transition_time;

pub use lightness::Lightness;
pub use state::CtrlState;
pub use transition_time::{TRANSITION_TIME_UNKNOWN, TransitionTime};
