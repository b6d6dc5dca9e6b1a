// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uniform deadline policy for every operation that may hang.
//!
//! Storage access, permission queries, network I/O, and audio setup all
//! run under an explicit per-class deadline. A miss yields a typed
//! [`ToggleTalkError::Timeout`] and drops the underlying future, so a
//! stalled operation can never keep running unobserved. Callers treat a
//! deadline miss as a soft failure: log, fall back, continue.

use std::future::Future;
use std::time::Duration;

use crate::error::ToggleTalkError;

/// Operation classes, each with its own deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// Persistent store reads and writes.
    Storage,
    /// Checking whether a capability is granted.
    PermissionQuery,
    /// Prompting the user to grant a capability.
    PermissionRequest,
    /// HTTP calls to the server.
    Network,
    /// Audio input initialization.
    AudioSetup,
}

impl OpClass {
    /// The deadline applied to operations of this class.
    pub fn deadline(&self) -> Duration {
        match self {
            OpClass::Storage | OpClass::PermissionQuery => Duration::from_secs(5),
            OpClass::PermissionRequest | OpClass::Network => Duration::from_secs(10),
            OpClass::AudioSetup => Duration::from_secs(15),
        }
    }
}

/// Runs `future` under the deadline of `class`.
///
/// Returns the operation's own result when it completes in time, or
/// [`ToggleTalkError::Timeout`] carrying the missed deadline otherwise.
pub async fn with_deadline<T, F>(class: OpClass, future: F) -> Result<T, ToggleTalkError>
where
    F: Future<Output = Result<T, ToggleTalkError>>,
{
    let duration = class.deadline();
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ToggleTalkError::Timeout { duration }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadlines_by_class() {
        assert_eq!(OpClass::Storage.deadline(), Duration::from_secs(5));
        assert_eq!(OpClass::PermissionQuery.deadline(), Duration::from_secs(5));
        assert_eq!(OpClass::PermissionRequest.deadline(), Duration::from_secs(10));
        assert_eq!(OpClass::Network.deadline(), Duration::from_secs(10));
        assert_eq!(OpClass::AudioSetup.deadline(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn completes_within_deadline() {
        let result = with_deadline(OpClass::Storage, async { Ok::<_, ToggleTalkError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_operation_times_out() {
        let result: Result<(), _> = with_deadline(OpClass::Network, async {
            std::future::pending::<Result<(), ToggleTalkError>>().await
        })
        .await;

        match result {
            Err(ToggleTalkError::Timeout { duration }) => {
                assert_eq!(duration, Duration::from_secs(10));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let result: Result<(), _> = with_deadline(OpClass::Storage, async {
            Err(ToggleTalkError::Internal("boom".into()))
        })
        .await;
        assert!(matches!(result, Err(ToggleTalkError::Internal(_))));
    }
}
