// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk document shapes.
//!
//! Three whole-document JSON files: a chat-history array keyed by
//! `id,text,isUser,timestamp,isAudio`, a capped notification array
//! keyed by `id,text,timestamp`, and a small settings object.
//! Timestamps are epoch milliseconds.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use toggletalk_core::types::{Message, MessageOrigin, NotificationRecord};

/// One chat-history entry as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: i64,
    pub text: String,
    pub is_user: bool,
    pub timestamp: i64,
    pub is_audio: bool,
}

impl From<&Message> for StoredMessage {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id,
            text: msg.text.clone(),
            is_user: msg.origin == MessageOrigin::User,
            timestamp: msg.created_at.timestamp_millis(),
            is_audio: msg.is_audio,
        }
    }
}

impl StoredMessage {
    pub fn into_message(self) -> Message {
        Message {
            id: self.id,
            text: self.text,
            origin: if self.is_user {
                MessageOrigin::User
            } else {
                MessageOrigin::Bot
            },
            created_at: millis_to_datetime(self.timestamp),
            is_audio: self.is_audio,
        }
    }
}

/// One notification-list entry as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNotification {
    pub id: i64,
    pub text: String,
    pub timestamp: i64,
}

impl From<&NotificationRecord> for StoredNotification {
    fn from(rec: &NotificationRecord) -> Self {
        Self {
            id: rec.id,
            text: rec.text.clone(),
            timestamp: rec.created_at.timestamp_millis(),
        }
    }
}

impl StoredNotification {
    pub fn into_record(self) -> NotificationRecord {
        NotificationRecord {
            id: self.id,
            text: self.text,
            created_at: millis_to_datetime(self.timestamp),
        }
    }
}

/// The settings document: first-launch flag and cached username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default)]
    pub has_launched_before: bool,
    #[serde(default)]
    pub user_name: Option<String>,
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_message_uses_camel_case_keys() {
        let msg = Message {
            id: 1700000000000,
            text: "hello".into(),
            origin: MessageOrigin::User,
            created_at: Utc.timestamp_millis_opt(1700000000000).single().unwrap(),
            is_audio: true,
        };
        let json = serde_json::to_string(&StoredMessage::from(&msg)).unwrap();
        assert!(json.contains("\"isUser\":true"));
        assert!(json.contains("\"isAudio\":true"));
        assert!(json.contains("\"timestamp\":1700000000000"));
    }

    #[test]
    fn message_round_trips_through_stored_shape() {
        let msg = Message {
            id: 42,
            text: "turn on the light".into(),
            origin: MessageOrigin::Bot,
            created_at: Utc.timestamp_millis_opt(1700000000123).single().unwrap(),
            is_audio: false,
        };
        let back = StoredMessage::from(&msg).into_message();
        assert_eq!(back, msg);
    }

    #[test]
    fn settings_default_is_first_launch() {
        let settings: StoredSettings = serde_json::from_str("{}").unwrap();
        assert!(!settings.has_launched_before);
        assert!(settings.user_name.is_none());
    }
}
