// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted controller records.
//!
//! Two records survive a restart: the configuration and a small runtime
//! state record. Both are JSON-encoded; the storage backend only sees
//! opaque bytes under a [`StoreKey`].

use std::fmt;

use crate::config::LightCtrlConfig;
use crate::error::PersistError;

/// Identifies a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The [`LightCtrlConfig`] record.
    Config,
    /// The [`StoredState`] record.
    State,
}

impl StoreKey {
    /// Returns the storage key name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "lc/cfg",
            Self::State => "lc/state",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime state restored at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct StoredState {
    /// The controller was enabled.
    pub enabled: bool,
    /// The light was on.
    pub on: bool,
    /// The last fade to standby was a user off command.
    #[serde(default)]
    pub manual: bool,
    /// Occupancy automation was permitted.
    pub occupancy_mode: bool,
}

/// Encodes a runtime state record.
///
/// # Errors
///
/// Returns `PersistError::Json` if serialization fails.
pub fn encode_state(state: &StoredState) -> Result<Vec<u8>, PersistError> {
    serde_json::to_vec(state).map_err(Into::into)
}

/// Decodes a runtime state record.
///
/// # Errors
///
/// Returns `PersistError::Json` if the bytes are not a valid record.
pub fn decode_state(data: &[u8]) -> Result<StoredState, PersistError> {
    serde_json::from_slice(data).map_err(Into::into)
}

/// Encodes a configuration record.
///
/// # Errors
///
/// Returns `PersistError::Json` if serialization fails.
pub fn encode_config(config: &LightCtrlConfig) -> Result<Vec<u8>, PersistError> {
    serde_json::to_vec(config).map_err(Into::into)
}

/// Decodes and validates a configuration record.
///
/// # Errors
///
/// Returns `PersistError::Json` for malformed bytes and
/// `PersistError::Invalid` if the decoded configuration fails validation.
pub fn decode_config(data: &[u8]) -> Result<LightCtrlConfig, PersistError> {
    let config: LightCtrlConfig = serde_json::from_slice(data)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransitionTime;

    #[test]
    fn state_record_round_trip() {
        let state = StoredState {
            enabled: true,
            on: true,
            manual: true,
            occupancy_mode: false,
        };
        let bytes = encode_state(&state).unwrap();
        assert_eq!(decode_state(&bytes).unwrap(), state);
    }

    #[test]
    fn state_record_is_json() {
        let bytes = encode_state(&StoredState::default()).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"enabled":false,"on":false,"manual":false,"occupancy_mode":false}"#
        );
    }

    #[test]
    fn missing_manual_defaults_to_false() {
        let state =
            decode_state(br#"{"enabled":true,"on":false,"occupancy_mode":true}"#).unwrap();
        assert!(!state.manual);
        assert!(state.occupancy_mode);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(matches!(decode_state(b"\xff"), Err(PersistError::Json(_))));
    }

    #[test]
    fn invalid_config_record_is_rejected() {
        let config = LightCtrlConfig::default().with_on_hold(TransitionTime::ZERO);
        let bytes = encode_config(&config).unwrap();
        assert!(matches!(
            decode_config(&bytes),
            Err(PersistError::Invalid(_))
        ));
    }

    #[test]
    fn store_key_names() {
        assert_eq!(StoreKey::Config.to_string(), "lc/cfg");
        assert_eq!(StoreKey::State.to_string(), "lc/state");
    }
}
