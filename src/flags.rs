// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller flag register.
//!
//! A compact set of named boolean facts about a controller. The register
//! carries no behaviour of its own: the controller decides what the flags
//! mean, this module only stores them.
//!
//! The register lives inside the controller, which is owned by exactly one
//! worker. Every mutation goes through `&mut self`, so a test-and-clear is a
//! single indivisible step for the owner and can never race a second writer.

use std::fmt;

/// A single controller flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Logical on intent, independent of the discrete state.
    On,
    /// Occupancy reports may turn the light on.
    OccMode,
    /// The last off transition was user-commanded.
    Manual,
    /// An occupancy report arrived during a fade.
    OccPending,
    /// An on command arrived during a fade.
    OnPending,
    /// An off command arrived during a fade.
    OffPending,
    /// A fade is in progress.
    Transition,
    /// Configuration must be persisted.
    StoreCfg,
    /// Runtime state must be persisted.
    StoreState,
    /// The controller owns the lightness actuator.
    Enabled,
    /// The controller has been initialized.
    Started,
    /// A restart-time timer will restore the persisted state.
    ResumeTimer,
}

impl Flag {
    /// Every flag, in bit order.
    pub const ALL: [Self; 12] = [
        Self::On,
        Self::OccMode,
        Self::Manual,
        Self::OccPending,
        Self::OnPending,
        Self::OffPending,
        Self::Transition,
        Self::StoreCfg,
        Self::StoreState,
        Self::Enabled,
        Self::Started,
        Self::ResumeTimer,
    ];

    /// The pending-event markers.
    pub const PENDING: [Self; 3] = [Self::OccPending, Self::OnPending, Self::OffPending];

    /// Returns the bit mask of this flag.
    #[must_use]
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Returns the flag name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::OccMode => "OCC_MODE",
            Self::Manual => "MANUAL",
            Self::OccPending => "OCC_PENDING",
            Self::OnPending => "ON_PENDING",
            Self::OffPending => "OFF_PENDING",
            Self::Transition => "TRANSITION",
            Self::StoreCfg => "STORE_CFG",
            Self::StoreState => "STORE_STATE",
            Self::Enabled => "ENABLED",
            Self::Started => "STARTED",
            Self::ResumeTimer => "RESUME_TIMER",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Flag`]s.
///
/// # Examples
///
/// ```
/// use lumictl::flags::{Flag, Flags};
///
/// let mut flags = Flags::INITIAL;
/// assert!(flags.contains(Flag::Started));
/// assert!(flags.contains(Flag::OccMode));
///
/// flags.set(Flag::Transition);
/// assert!(flags.test_and_clear(Flag::Transition));
/// assert!(!flags.test_and_clear(Flag::Transition));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u16);

impl Flags {
    /// No flags set.
    pub const EMPTY: Self = Self(0);

    /// The flags of a freshly constructed controller.
    pub const INITIAL: Self = Self(Flag::Started.bit() | Flag::OccMode.bit());

    /// Creates a set from a list of flags.
    #[must_use]
    pub fn of(flags: &[Flag]) -> Self {
        Self(flags.iter().fold(0, |bits, flag| bits | flag.bit()))
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Returns `true` if `flag` is set.
    #[must_use]
    pub const fn contains(&self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Sets `flag`.
    pub fn set(&mut self, flag: Flag) {
        self.0 |= flag.bit();
    }

    /// Clears `flag`.
    pub fn clear(&mut self, flag: Flag) {
        self.0 &= !flag.bit();
    }

    /// Sets or clears `flag`.
    pub fn assign(&mut self, flag: Flag, value: bool) {
        if value {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Clears `flag` and returns whether it was set.
    pub fn test_and_clear(&mut self, flag: Flag) -> bool {
        let was_set = self.contains(flag);
        self.clear(flag);
        was_set
    }

    /// Clears every flag in `flags`.
    pub fn clear_all(&mut self, flags: &[Flag]) {
        for flag in flags {
            self.clear(*flag);
        }
    }

    /// Returns a copy with `flag` set.
    #[must_use]
    pub const fn with(self, flag: Flag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Returns a copy with `flag` cleared.
    #[must_use]
    pub const fn without(self, flag: Flag) -> Self {
        Self(self.0 & !flag.bit())
    }

    /// Iterates over the set flags in bit order.
    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.into_iter().filter(|flag| self.contains(*flag))
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flags(")?;
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{flag}")?;
        }
        write!(f, ")")
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        let mut flags = Self::EMPTY;
        for flag in iter {
            flags.set(flag);
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_distinct() {
        let combined = Flag::ALL.iter().fold(0u16, |acc, flag| {
            assert_eq!(acc & flag.bit(), 0, "{flag} overlaps");
            acc | flag.bit()
        });
        assert_eq!(combined.count_ones(), 12);
    }

    #[test]
    fn initial_flags() {
        let flags = Flags::INITIAL;
        assert_eq!(flags, Flags::of(&[Flag::Started, Flag::OccMode]));
        assert!(!flags.contains(Flag::Enabled));
    }

    #[test]
    fn set_clear_assign() {
        let mut flags = Flags::EMPTY;
        flags.set(Flag::On);
        assert!(flags.contains(Flag::On));
        flags.assign(Flag::On, false);
        assert!(!flags.contains(Flag::On));
        flags.assign(Flag::Manual, true);
        assert_eq!(flags, Flags::EMPTY.with(Flag::Manual));
    }

    #[test]
    fn clear_all_pending() {
        let mut flags = Flags::of(&[Flag::OnPending, Flag::OffPending, Flag::Enabled]);
        flags.clear_all(&Flag::PENDING);
        assert_eq!(flags, Flags::of(&[Flag::Enabled]));
    }

    #[test]
    fn debug_lists_names() {
        let flags = Flags::of(&[Flag::Enabled, Flag::On]);
        assert_eq!(format!("{flags:?}"), "Flags(ON | ENABLED)");
        assert_eq!(format!("{:?}", Flags::EMPTY), "Flags()");
    }

    #[test]
    fn collect_from_iterator() {
        let flags: Flags = [Flag::Transition, Flag::Started].into_iter().collect();
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![
            Flag::Transition,
            Flag::Started
        ]);
    }
}
