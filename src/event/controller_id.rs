// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller identifier type.

use std::fmt;

use uuid::Uuid;

/// Unique identifier of a light controller instance.
///
/// Events from several luminaires can share one bus; the identifier tells
/// them apart.
///
/// # Examples
///
/// ```
/// use lumictl::event::ControllerId;
///
/// let a = ControllerId::new();
/// let b = ControllerId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ControllerId(Uuid);

impl ControllerId {
    /// Creates a new unique controller identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ControllerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = &self.0.to_string()[..8];
        write!(f, "ControllerId({short}...)")
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ControllerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
