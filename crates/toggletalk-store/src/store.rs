// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-document JSON file store.
//!
//! Every operation is a read-modify-write over one of three documents,
//! serialized through an internal lock and bounded by the storage
//! deadline. Loads degrade to an empty collection on parse failure or
//! timeout: losing local history is preferred over blocking the app.
//! That trade-off is deliberate and logged, never hidden.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::timeout::{with_deadline, OpClass};
use toggletalk_core::types::{Message, NotificationRecord};

use crate::documents::{StoredMessage, StoredNotification, StoredSettings};

/// Maximum entries kept in the notification list; the oldest entry is
/// evicted first.
pub const NOTIFICATION_CAP: usize = 50;

const CHAT_HISTORY_FILE: &str = "chat_history.json";
const NOTIFICATIONS_FILE: &str = "notifications.json";
const SETTINGS_FILE: &str = "settings.json";

/// JSON-document store rooted at a data directory.
///
/// The chat history is unbounded by design (trimming it is the host
/// app's concern); the notification list is capped at
/// [`NOTIFICATION_CAP`] entries.
pub struct FileStore {
    data_dir: PathBuf,
    /// Serializes read-modify-write cycles so overlapping appenders
    /// never interleave on the same document.
    io_lock: Mutex<()>,
}

impl FileStore {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, ToggleTalkError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| ToggleTalkError::Storage {
                message: format!("failed to create data dir {}: {e}", data_dir.display()),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            data_dir,
            io_lock: Mutex::new(()),
        })
    }

    /// Loads the full chat history in insertion order.
    ///
    /// Degrades to an empty list on a missing file, parse failure, or
    /// deadline miss.
    pub async fn load_messages(&self) -> Vec<Message> {
        let path = self.data_dir.join(CHAT_HISTORY_FILE);
        let result = with_deadline(OpClass::Storage, async {
            let _guard = self.io_lock.lock().await;
            read_doc::<Vec<StoredMessage>>(&path).await
        })
        .await;

        match result {
            Ok(Some(stored)) => stored.into_iter().map(StoredMessage::into_message).collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "chat history unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Replaces the persisted chat history with `messages`.
    pub async fn save_messages(&self, messages: &[Message]) -> Result<(), ToggleTalkError> {
        let stored: Vec<StoredMessage> = messages.iter().map(StoredMessage::from).collect();
        let path = self.data_dir.join(CHAT_HISTORY_FILE);
        with_deadline(OpClass::Storage, async {
            let _guard = self.io_lock.lock().await;
            write_doc(&path, &stored).await
        })
        .await
    }

    /// Loads the capped notification list, oldest first.
    pub async fn load_notifications(&self) -> Vec<NotificationRecord> {
        let path = self.data_dir.join(NOTIFICATIONS_FILE);
        let result = with_deadline(OpClass::Storage, async {
            let _guard = self.io_lock.lock().await;
            read_doc::<Vec<StoredNotification>>(&path).await
        })
        .await;

        match result {
            Ok(Some(stored)) => stored
                .into_iter()
                .map(StoredNotification::into_record)
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "notification list unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Appends a notification, evicting the oldest entries past the cap.
    pub async fn append_notification(
        &self,
        record: &NotificationRecord,
    ) -> Result<(), ToggleTalkError> {
        let path = self.data_dir.join(NOTIFICATIONS_FILE);
        with_deadline(OpClass::Storage, async {
            let _guard = self.io_lock.lock().await;
            // Only a corrupt document is replaced wholesale; an I/O
            // failure propagates rather than discarding prior entries.
            let mut stored = match read_doc::<Vec<StoredNotification>>(&path).await {
                Ok(existing) => existing.unwrap_or_default(),
                Err(e @ ToggleTalkError::Parse { .. }) => {
                    warn!(error = %e, "notification list corrupt, replacing");
                    Vec::new()
                }
                Err(e) => return Err(e),
            };

            stored.push(StoredNotification::from(record));
            if stored.len() > NOTIFICATION_CAP {
                let excess = stored.len() - NOTIFICATION_CAP;
                stored.drain(..excess);
            }
            write_doc(&path, &stored).await
        })
        .await
    }

    /// Clears the persisted chat history (the user's "reset
    /// conversation" action). The notification list is untouched.
    pub async fn clear(&self) -> Result<(), ToggleTalkError> {
        self.save_messages(&[]).await
    }

    /// True once [`mark_launched`](Self::mark_launched) has run on this
    /// device. Degrades to `false` (first-launch behavior) when the
    /// settings document is unreadable.
    pub async fn has_launched_before(&self) -> bool {
        self.load_settings().await.has_launched_before
    }

    /// Sets the first-launch flag.
    pub async fn mark_launched(&self) -> Result<(), ToggleTalkError> {
        self.update_settings(|s| s.has_launched_before = true).await
    }

    /// Returns the cached username, if one has been stored.
    pub async fn load_username(&self) -> Option<String> {
        self.load_settings().await.user_name
    }

    /// Caches the username for later launches and foreground refreshes.
    pub async fn save_username(&self, name: &str) -> Result<(), ToggleTalkError> {
        let name = name.to_string();
        self.update_settings(move |s| s.user_name = Some(name)).await
    }

    async fn load_settings(&self) -> StoredSettings {
        let path = self.data_dir.join(SETTINGS_FILE);
        let result = with_deadline(OpClass::Storage, async {
            let _guard = self.io_lock.lock().await;
            read_doc::<StoredSettings>(&path).await
        })
        .await;

        match result {
            Ok(Some(settings)) => settings,
            Ok(None) => StoredSettings::default(),
            Err(e) => {
                warn!(error = %e, "settings unreadable, using defaults");
                StoredSettings::default()
            }
        }
    }

    async fn update_settings(
        &self,
        apply: impl FnOnce(&mut StoredSettings),
    ) -> Result<(), ToggleTalkError> {
        let path = self.data_dir.join(SETTINGS_FILE);
        with_deadline(OpClass::Storage, async {
            let _guard = self.io_lock.lock().await;
            let mut settings = match read_doc::<StoredSettings>(&path).await {
                Ok(existing) => existing.unwrap_or_default(),
                Err(e @ ToggleTalkError::Parse { .. }) => {
                    warn!(error = %e, "settings corrupt, replacing");
                    StoredSettings::default()
                }
                Err(e) => return Err(e),
            };
            apply(&mut settings);
            write_doc(&path, &settings).await
        })
        .await
    }
}

/// Reads and parses one JSON document. `Ok(None)` means the file does
/// not exist yet.
async fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ToggleTalkError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ToggleTalkError::Storage {
                message: format!("failed to read {}: {e}", path.display()),
                source: Some(Box::new(e)),
            });
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ToggleTalkError::Parse {
            message: format!("malformed document {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })
}

/// Writes one JSON document whole, via a temp file and rename so a
/// crash mid-write never leaves a truncated document behind.
async fn write_doc<T: Serialize>(path: &Path, value: &T) -> Result<(), ToggleTalkError> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| ToggleTalkError::Parse {
        message: format!("failed to serialize {}: {e}", path.display()),
        source: Some(Box::new(e)),
    })?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| ToggleTalkError::Storage {
            message: format!("failed to write {}: {e}", tmp.display()),
            source: Some(Box::new(e)),
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| ToggleTalkError::Storage {
            message: format!("failed to replace {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;

    debug!(path = %path.display(), bytes = json.len(), "document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use toggletalk_core::types::{Message, MessageOrigin, NotificationRecord};

    async fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    fn message(id: i64, text: &str, origin: MessageOrigin) -> Message {
        Message {
            id,
            text: text.into(),
            origin,
            created_at: chrono::Utc::now(),
            is_audio: false,
        }
    }

    fn record(id: i64, text: &str) -> NotificationRecord {
        NotificationRecord {
            id,
            text: text.into(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_store_loads_empty_collections() {
        let (_dir, store) = temp_store().await;
        assert!(store.load_messages().await.is_empty());
        assert!(store.load_notifications().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_preserves_insertion_order() {
        let (_dir, store) = temp_store().await;
        let messages = vec![
            message(3, "out of id order on purpose", MessageOrigin::User),
            message(1, "reply", MessageOrigin::Bot),
            message(2, "another", MessageOrigin::User),
        ];
        store.save_messages(&messages).await.unwrap();
        let loaded = store.load_messages().await;
        assert_eq!(loaded.len(), 3);
        // Insertion order survives: the store never sorts by id.
        assert_eq!(loaded[0].id, 3);
        assert_eq!(loaded[1].id, 1);
        assert_eq!(loaded[2].id, 2);
    }

    #[tokio::test]
    async fn save_of_loaded_set_is_idempotent() {
        let (_dir, store) = temp_store().await;
        let messages = vec![
            message(1, "hi", MessageOrigin::User),
            message(2, "hello!", MessageOrigin::Bot),
        ];
        store.save_messages(&messages).await.unwrap();

        let first_load = store.load_messages().await;
        store.save_messages(&first_load).await.unwrap();
        let second_load = store.load_messages().await;
        assert_eq!(first_load, second_load);
    }

    #[tokio::test]
    async fn appending_past_cap_evicts_oldest() {
        let (_dir, store) = temp_store().await;
        for i in 0..51 {
            store
                .append_notification(&record(i, &format!("notification {i}")))
                .await
                .unwrap();
        }
        let loaded = store.load_notifications().await;
        assert_eq!(loaded.len(), NOTIFICATION_CAP);
        // Exactly the oldest entry is gone; newest is last.
        assert_eq!(loaded.first().unwrap().id, 1);
        assert_eq!(loaded.last().unwrap().id, 50);
    }

    #[tokio::test]
    async fn corrupt_history_degrades_to_empty() {
        let (dir, store) = temp_store().await;
        tokio::fs::write(dir.path().join("chat_history.json"), b"{not json")
            .await
            .unwrap();
        assert!(store.load_messages().await.is_empty());
    }

    #[tokio::test]
    async fn clear_resets_history_but_keeps_notifications() {
        let (_dir, store) = temp_store().await;
        store
            .save_messages(&[message(1, "hi", MessageOrigin::User)])
            .await
            .unwrap();
        store.append_notification(&record(1, "ping")).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.load_messages().await.is_empty());
        assert_eq!(store.load_notifications().await.len(), 1);
    }

    #[tokio::test]
    async fn append_over_corrupt_list_replaces_it() {
        let (dir, store) = temp_store().await;
        tokio::fs::write(dir.path().join("notifications.json"), b"{not json")
            .await
            .unwrap();

        store.append_notification(&record(1, "ping")).await.unwrap();
        assert_eq!(store.load_notifications().await.len(), 1);
    }

    #[tokio::test]
    async fn append_propagates_read_io_failures() {
        let (dir, store) = temp_store().await;
        // A directory in the file's place makes the read fail with a
        // real I/O error rather than NotFound or a parse error.
        tokio::fs::create_dir(dir.path().join("notifications.json"))
            .await
            .unwrap();

        let result = store.append_notification(&record(1, "ping")).await;
        assert!(matches!(result, Err(ToggleTalkError::Storage { .. })));
    }

    #[tokio::test]
    async fn settings_update_propagates_read_io_failures() {
        let (dir, store) = temp_store().await;
        tokio::fs::create_dir(dir.path().join("settings.json"))
            .await
            .unwrap();

        assert!(matches!(
            store.mark_launched().await,
            Err(ToggleTalkError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn launch_flag_round_trips() {
        let (_dir, store) = temp_store().await;
        assert!(!store.has_launched_before().await);
        store.mark_launched().await.unwrap();
        assert!(store.has_launched_before().await);
    }

    #[tokio::test]
    async fn username_round_trips_and_survives_flag_update() {
        let (_dir, store) = temp_store().await;
        assert!(store.load_username().await.is_none());
        store.save_username("Amy").await.unwrap();
        store.mark_launched().await.unwrap();
        assert_eq!(store.load_username().await.as_deref(), Some("Amy"));
    }
}
