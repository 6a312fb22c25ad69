// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `lumictl` library.
//!
//! Events ignored while the controller is disabled are not errors, and the
//! state machine never hands a collaborator failure back to its caller. The
//! types here cover value validation, collaborator results, persisted record
//! decoding and the async server handle.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// A collaborator call failed.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// A persisted record could not be encoded or decoded.
    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),

    /// The server worker has stopped and no longer accepts requests.
    #[error("light control server is closed")]
    ServerClosed,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
        /// The actual value that was provided.
        actual: u64,
    },

    /// A configuration is internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures reported by the injected collaborators.
///
/// The controller's own state is authoritative: these are logged and
/// broadcast as events, never used to undo a transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The lightness actuator rejected a level change.
    #[error("actuator failure: {0}")]
    Actuator(String),

    /// The transport could not send a status message.
    #[error("publish failure: {0}")]
    Transport(String),

    /// The on/off aggregate rejected a status update.
    #[error("on/off status failure: {0}")]
    OnOff(String),

    /// The storage backend failed to read, write or erase a record.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Errors related to persisted records.
#[derive(Debug, Error)]
pub enum PersistError {
    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] CollaboratorError),

    /// A decoded record failed validation.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValueError),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 37_200_000,
            actual: 40_000_000,
        };
        assert_eq!(
            err.to_string(),
            "value 40000000 is out of range [0, 37200000]"
        );
    }

    #[test]
    fn error_from_collaborator_error() {
        let err: Error = CollaboratorError::Transport("no route".to_string()).into();
        assert!(matches!(
            err,
            Error::Collaborator(CollaboratorError::Transport(_))
        ));
        assert_eq!(
            err.to_string(),
            "collaborator error: publish failure: no route"
        );
    }

    #[test]
    fn persist_error_from_json() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = PersistError::from(json_err);
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn server_closed_display() {
        assert_eq!(
            Error::ServerClosed.to_string(),
            "light control server is closed"
        );
    }
}
