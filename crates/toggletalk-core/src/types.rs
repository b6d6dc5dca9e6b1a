// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the ToggleTalk client components.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageOrigin {
    User,
    Bot,
}

/// A single chat message. Immutable after creation; display order is
/// insertion order, never an `id` sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Monotonic-ish identifier derived from the creation time in
    /// milliseconds, bumped on collision so it stays unique within a
    /// store snapshot.
    pub id: i64,
    pub text: String,
    pub origin: MessageOrigin,
    pub created_at: DateTime<Utc>,
    /// True when the text was produced by voice transcription.
    pub is_audio: bool,
}

static LAST_MESSAGE_ID: AtomicI64 = AtomicI64::new(0);

/// Allocates the next message id: the current epoch-millisecond clock,
/// bumped past the previously issued id when two messages land in the
/// same millisecond.
pub fn next_message_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    LAST_MESSAGE_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now)
}

impl Message {
    /// Creates a user-authored message stamped with the current time.
    pub fn user(text: impl Into<String>, is_audio: bool) -> Self {
        Self {
            id: next_message_id(),
            text: text.into(),
            origin: MessageOrigin::User,
            created_at: Utc::now(),
            is_audio,
        }
    }

    /// Creates a bot-authored message stamped with the current time.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            text: text.into(),
            origin: MessageOrigin::Bot,
            created_at: Utc::now(),
            is_audio: false,
        }
    }
}

/// A persisted notification entry, always bot-origin. Kept in a
/// separate bounded list (50 entries, oldest-first eviction) distinct
/// from the unbounded chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// The three controllable appliances. The display names match the
/// phrasing the server uses in notification text and expects in
/// commands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum Appliance {
    #[strum(to_string = "Light")]
    Light,
    #[strum(to_string = "Air Conditioner")]
    Ac,
    #[strum(to_string = "Washing Machine")]
    WashingMachine,
}

impl Appliance {
    /// Lowercase keyword used when inferring state changes from
    /// free-text notification bodies.
    pub fn keyword(&self) -> &'static str {
        match self {
            Appliance::Light => "light",
            Appliance::Ac => "air conditioner",
            Appliance::WashingMachine => "washing machine",
        }
    }
}

/// Where the current belief about an appliance's state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateSource {
    /// Applied locally before server confirmation.
    LocalOptimistic,
    /// The server acknowledged the command.
    ServerConfirmed,
    /// Derived from a broadcast notification's text.
    InferredFromNotification,
}

/// The reconciler's belief about one appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplianceState {
    pub appliance: Appliance,
    pub is_on: bool,
    pub source: StateSource,
}

/// An appliance toggle in flight between issuing the command and the
/// gateway resolving it. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    pub appliance: Appliance,
    pub desired_on: bool,
    pub issued_at: DateTime<Utc>,
}

/// Startup state machine states, published read-only to the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitState {
    Splash,
    CheckingPermissions,
    AwaitingPermissionGrant,
    LoadingData,
    Ready,
    Failed(String),
}

/// OS capabilities the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Capability {
    Storage,
    Notifications,
    Microphone,
}

/// Outcome of a permission query or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Health reported by the remote server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

/// A notification item as returned by the server's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerNotification {
    pub text: String,
    pub timestamp: String,
}

/// An event log entry as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEvent {
    pub timestamp: String,
    pub event_type: String,
    pub message: String,
    pub user_name: String,
    pub user_id: i64,
}

/// The literal marker the server prefixes onto broadcast notifications,
/// distinguishing them from direct replies.
pub const NOTIFICATION_MARKER: &str = "[NOTIFICATION]";

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn message_ids_are_unique_and_increasing() {
        let a = Message::user("first", false);
        let b = Message::user("second", false);
        let c = Message::bot("third");
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn appliance_display_matches_server_phrasing() {
        assert_eq!(Appliance::Light.to_string(), "Light");
        assert_eq!(Appliance::Ac.to_string(), "Air Conditioner");
        assert_eq!(Appliance::WashingMachine.to_string(), "Washing Machine");
    }

    #[test]
    fn appliance_display_round_trips() {
        for appliance in Appliance::iter() {
            let parsed = Appliance::from_str(&appliance.to_string()).expect("should parse back");
            assert_eq!(appliance, parsed);
        }
    }

    #[test]
    fn appliance_keywords_are_lowercase() {
        for appliance in Appliance::iter() {
            let kw = appliance.keyword();
            assert_eq!(kw, kw.to_lowercase());
        }
    }

    #[test]
    fn server_notification_deserializes_from_feed_shape() {
        let json = r#"{"text":"[NOTIFICATION] 🔔 Amy: Turn on Light at 10:00:00","timestamp":"2025-01-01T10:00:00"}"#;
        let item: ServerNotification = serde_json::from_str(json).expect("should deserialize");
        assert!(item.text.starts_with(NOTIFICATION_MARKER));
        assert_eq!(item.timestamp, "2025-01-01T10:00:00");
    }
}
