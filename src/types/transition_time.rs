// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transition time type for fades and timer delays.
//!
//! Durations are kept in milliseconds and bounded by the largest value the
//! one-byte mesh transition time field can carry, so every configured fade
//! can be reported in a status message.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Number of steps the 6-bit step field can hold (0x3F is reserved).
const STEPS_MAX: u32 = 0x3E;

/// Step resolutions in milliseconds, indexed by the 2-bit resolution field.
const RESOLUTIONS_MS: [u32; 4] = [100, 1_000, 10_000, 600_000];

/// Encoded value meaning "unknown or not representable".
pub const TRANSITION_TIME_UNKNOWN: u8 = 0x3F;

/// A fade or delay duration in milliseconds (0 to 620 minutes).
///
/// # Examples
///
/// ```
/// use lumictl::types::TransitionTime;
///
/// let fade = TransitionTime::from_millis(500).unwrap();
/// assert_eq!(fade.as_millis(), 500);
/// assert_eq!(fade.encode(), 0x05);
///
/// assert!(TransitionTime::ZERO.is_zero());
/// assert!(TransitionTime::from_millis(37_200_001).is_err());
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
#[serde(try_from = "u32", into = "u32")]
pub struct TransitionTime(u32);

impl TransitionTime {
    /// Immediate (no fade).
    pub const ZERO: Self = Self(0);

    /// Longest encodable transition: 62 steps of 10 minutes.
    pub const MAX: Self = Self(STEPS_MAX * RESOLUTIONS_MS[3]);

    /// Creates a transition time from milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `millis` exceeds [`Self::MAX`].
    pub fn from_millis(millis: u32) -> Result<Self, ValueError> {
        if millis > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u64::from(Self::MAX.0),
                actual: u64::from(millis),
            });
        }
        Ok(Self(millis))
    }

    /// Creates a transition time from whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the result exceeds [`Self::MAX`].
    pub fn from_secs(secs: u32) -> Result<Self, ValueError> {
        let millis = secs.checked_mul(1_000).ok_or(ValueError::OutOfRange {
            min: 0,
            max: u64::from(Self::MAX.0),
            actual: u64::from(secs) * 1_000,
        })?;
        Self::from_millis(millis)
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u32 {
        self.0
    }

    /// Returns `true` for an immediate transition.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the value as a [`Duration`].
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }

    /// Quantizes the duration into the one-byte mesh transition time format.
    ///
    /// The low six bits hold a step count, the high two bits select the step
    /// resolution (100 ms, 1 s, 10 s, 10 min). The finest resolution that
    /// fits is used and the step count is rounded to the nearest step; a
    /// non-zero duration never encodes as zero steps.
    #[must_use]
    pub fn encode(&self) -> u8 {
        if self.0 == 0 {
            return 0;
        }

        for (index, resolution) in (0u8..).zip(RESOLUTIONS_MS) {
            let steps = (self.0 + resolution / 2) / resolution;
            if steps <= STEPS_MAX {
                // steps <= 0x3E fits in six bits
                let steps = u8::try_from(steps.max(1)).unwrap_or(0x3E);
                return (index << 6) | steps;
            }
        }

        TRANSITION_TIME_UNKNOWN
    }
}

impl fmt::Display for TransitionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl TryFrom<u32> for TransitionTime {
    type Error = ValueError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_millis(value)
    }
}

impl From<TransitionTime> for u32 {
    fn from(value: TransitionTime) -> Self {
        value.0
    }
}

impl TryFrom<Duration> for TransitionTime {
    type Error = ValueError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        let millis = u32::try_from(value.as_millis()).map_err(|_| ValueError::OutOfRange {
            min: 0,
            max: u64::from(Self::MAX.0),
            actual: u64::try_from(value.as_millis()).unwrap_or(u64::MAX),
        })?;
        Self::from_millis(millis)
    }
}

impl From<TransitionTime> for Duration {
    fn from(value: TransitionTime) -> Self {
        value.as_duration()
    }
}
