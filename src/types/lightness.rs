// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lightness type for luminaire output levels.
//!
//! Lightness is the perceptually uniform output level the actuator fades
//! towards. The full `u16` range is valid: 0 is off, 65535 is full output.

use std::fmt;

use crate::error::ValueError;

/// Perceived lightness level (0-65535).
///
/// # Examples
///
/// ```
/// use lumictl::types::Lightness;
///
/// let half = Lightness::from_percent(50).unwrap();
/// assert_eq!(half.value(), 32768);
///
/// assert_eq!(Lightness::OFF.value(), 0);
/// assert_eq!(Lightness::MAX.value(), 65535);
///
/// assert!(Lightness::from_percent(101).is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Lightness(u16);

impl Lightness {
    /// No light output.
    pub const OFF: Self = Self(0);

    /// Full light output.
    pub const MAX: Self = Self(u16::MAX);

    /// Creates a lightness level from its raw value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Creates a lightness level from a percentage of full output.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `percent` exceeds 100.
    pub fn from_percent(percent: u8) -> Result<Self, ValueError> {
        if percent > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u64::from(percent),
            });
        }
        let scaled = (u32::from(percent) * u32::from(u16::MAX) + 50) / 100;
        // percent <= 100 keeps scaled within u16
        Ok(Self(u16::try_from(scaled).unwrap_or(u16::MAX)))
    }

    /// Returns the raw lightness value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns `true` if this level produces no light.
    #[must_use]
    pub const fn is_off(&self) -> bool {
        self.0 == 0
    }

    /// Returns the value as a fraction of full output between 0.0 and 1.0.
    #[must_use]
    pub fn as_fraction(&self) -> f32 {
        f32::from(self.0) / f32::from(u16::MAX)
    }
}

impl fmt::Display for Lightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for Lightness {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
