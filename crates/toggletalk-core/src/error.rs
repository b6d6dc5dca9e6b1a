// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ToggleTalk client core.

use thiserror::Error;

use crate::types::Capability;

/// The primary error type used across the ToggleTalk client components.
///
/// The variants mirror the failure taxonomy the core distinguishes between:
/// deadlines, transport, application-level rejection, malformed data,
/// platform capabilities, and configuration.
#[derive(Debug, Error)]
pub enum ToggleTalkError {
    /// Operation exceeded its class deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Network or HTTP failure (connection error, non-2xx status).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server returned 2xx with an application-level error field.
    #[error("server rejected request: {0}")]
    ServerRejected(String),

    /// Malformed persisted or server JSON.
    #[error("parse error: {message}")]
    Parse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persistent store I/O failure.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A required OS capability was not granted.
    #[error("permission denied: {0}")]
    PermissionDenied(Capability),

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToggleTalkError {
    /// True for failures the polling loop and loading steps absorb
    /// without surfacing: deadline misses and transport faults.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_transport_are_soft() {
        let timeout = ToggleTalkError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        let transport = ToggleTalkError::Transport {
            message: "connection refused".into(),
            source: None,
        };
        assert!(timeout.is_soft());
        assert!(transport.is_soft());
    }

    #[test]
    fn rejection_and_parse_are_not_soft() {
        let rejected = ToggleTalkError::ServerRejected("bad command".into());
        let parse = ToggleTalkError::Parse {
            message: "unexpected token".into(),
            source: None,
        };
        assert!(!rejected.is_soft());
        assert!(!parse.is_soft());
    }

    #[test]
    fn permission_denied_names_the_capability() {
        let err = ToggleTalkError::PermissionDenied(Capability::Microphone);
        assert!(err.to_string().contains("Microphone"));
    }
}
