// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light controller configuration.
//!
//! The configuration holds the per-state lightness targets, the fade
//! durations for each kind of transition and the timing of the occupancy
//! automation. It is persisted as a whole whenever it changes.

use crate::error::ValueError;
use crate::types::{CtrlState, Lightness, TransitionTime};

/// Target lightness for each controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LightTable {
    /// Level held in `STANDBY`.
    pub standby: Lightness,
    /// Level held in `ON`.
    pub on: Lightness,
}

impl LightTable {
    /// Returns the target lightness for `state`.
    #[must_use]
    pub const fn get(&self, state: CtrlState) -> Lightness {
        match state {
            CtrlState::Standby => self.standby,
            CtrlState::On => self.on,
        }
    }
}

impl Default for LightTable {
    fn default() -> Self {
        Self {
            standby: Lightness::OFF,
            on: Lightness::MAX,
        }
    }
}

/// Fade durations for each transition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FadeTable {
    /// Fade into `ON`.
    pub on: TransitionTime,
    /// Fade into `STANDBY` after a user off command.
    pub standby_manual: TransitionTime,
    /// Fade into `STANDBY` after the hold time ran out.
    pub standby_auto: TransitionTime,
}

impl Default for FadeTable {
    fn default() -> Self {
        Self {
            on: TransitionTime::from_millis(500).unwrap_or(TransitionTime::ZERO),
            standby_manual: TransitionTime::from_millis(500).unwrap_or(TransitionTime::ZERO),
            standby_auto: TransitionTime::from_secs(5).unwrap_or(TransitionTime::ZERO),
        }
    }
}

/// Configuration for a light controller.
///
/// # Examples
///
/// ```
/// use lumictl::config::LightCtrlConfig;
/// use lumictl::types::{Lightness, TransitionTime};
///
/// let config = LightCtrlConfig::default()
///     .with_on_level(Lightness::from_percent(80).unwrap())
///     .with_fade_on(TransitionTime::from_millis(1_000).unwrap())
///     .with_on_hold(TransitionTime::from_secs(60).unwrap());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.fade.on.as_millis(), 1_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LightCtrlConfig {
    /// Target lightness per state.
    pub light: LightTable,
    /// Fade duration per transition kind.
    pub fade: FadeTable,
    /// Delay between an occupancy report and the resulting on transition.
    pub occupancy_delay: TransitionTime,
    /// Time the light stays on before fading to standby on its own.
    ///
    /// `None` keeps the light on until an off command.
    pub on_hold: Option<TransitionTime>,
    /// Delay before a persisted enabled state is restored at start.
    pub resume_delay: TransitionTime,
}

impl LightCtrlConfig {
    /// Sets the `STANDBY` lightness.
    #[must_use]
    pub fn with_standby_level(mut self, level: Lightness) -> Self {
        self.light.standby = level;
        self
    }

    /// Sets the `ON` lightness.
    #[must_use]
    pub fn with_on_level(mut self, level: Lightness) -> Self {
        self.light.on = level;
        self
    }

    /// Sets the fade duration into `ON`.
    #[must_use]
    pub fn with_fade_on(mut self, fade: TransitionTime) -> Self {
        self.fade.on = fade;
        self
    }

    /// Sets the fade duration into `STANDBY` after an off command.
    #[must_use]
    pub fn with_fade_standby_manual(mut self, fade: TransitionTime) -> Self {
        self.fade.standby_manual = fade;
        self
    }

    /// Sets the fade duration into `STANDBY` after the hold time.
    #[must_use]
    pub fn with_fade_standby_auto(mut self, fade: TransitionTime) -> Self {
        self.fade.standby_auto = fade;
        self
    }

    /// Sets the occupancy delay.
    #[must_use]
    pub fn with_occupancy_delay(mut self, delay: TransitionTime) -> Self {
        self.occupancy_delay = delay;
        self
    }

    /// Enables the automatic fade to standby after `hold`.
    #[must_use]
    pub fn with_on_hold(mut self, hold: TransitionTime) -> Self {
        self.on_hold = Some(hold);
        self
    }

    /// Sets the resume delay.
    #[must_use]
    pub fn with_resume_delay(mut self, delay: TransitionTime) -> Self {
        self.resume_delay = delay;
        self
    }

    /// Checks the configuration for inconsistencies.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidConfig` if the hold time is zero, which
    /// would switch the light off the moment it settles.
    pub fn validate(&self) -> Result<(), ValueError> {
        if self.on_hold.is_some_and(|hold| hold.is_zero()) {
            return Err(ValueError::InvalidConfig(
                "on_hold must be non-zero; use None to disable".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables() {
        let config = LightCtrlConfig::default();
        assert_eq!(config.light.get(CtrlState::Standby), Lightness::OFF);
        assert_eq!(config.light.get(CtrlState::On), Lightness::MAX);
        assert_eq!(config.fade.on.as_millis(), 500);
        assert_eq!(config.fade.standby_manual.as_millis(), 500);
        assert_eq!(config.fade.standby_auto.as_millis(), 5_000);
        assert!(config.on_hold.is_none());
        assert!(config.occupancy_delay.is_zero());
    }

    #[test]
    fn builder_sets_fields() {
        let config = LightCtrlConfig::default()
            .with_standby_level(Lightness::new(100))
            .with_fade_standby_manual(TransitionTime::from_millis(250).unwrap())
            .with_fade_standby_auto(TransitionTime::from_secs(10).unwrap())
            .with_occupancy_delay(TransitionTime::from_millis(200).unwrap())
            .with_resume_delay(TransitionTime::from_secs(1).unwrap());

        assert_eq!(config.light.standby.value(), 100);
        assert_eq!(config.fade.standby_manual.as_millis(), 250);
        assert_eq!(config.fade.standby_auto.as_millis(), 10_000);
        assert_eq!(config.occupancy_delay.as_millis(), 200);
        assert_eq!(config.resume_delay.as_millis(), 1_000);
    }

    #[test]
    fn zero_hold_is_rejected() {
        let config = LightCtrlConfig::default().with_on_hold(TransitionTime::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ValueError::InvalidConfig(_))
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: LightCtrlConfig =
            serde_json::from_str(r#"{"light":{"standby":10,"on":40000}}"#).unwrap();
        assert_eq!(config.light.on.value(), 40_000);
        assert_eq!(config.fade, FadeTable::default());
    }

    #[test]
    fn json_round_trip() {
        let config = LightCtrlConfig::default().with_on_hold(TransitionTime::from_secs(30).unwrap());
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LightCtrlConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
