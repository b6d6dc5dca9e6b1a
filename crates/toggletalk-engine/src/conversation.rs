// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation with write-through persistence.
//!
//! The conversation is the ordered message list the host UI renders.
//! Appends write the whole history back through the store; a failed
//! write is logged and the in-memory view stays authoritative until the
//! next successful write.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::types::Message;
use toggletalk_store::FileStore;

/// Ordered chat history, hydrated from the store at startup.
pub struct Conversation {
    store: Arc<FileStore>,
    messages: Mutex<Vec<Message>>,
}

impl Conversation {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self {
            store,
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the in-memory history with the persisted one.
    pub async fn hydrate(&self) {
        let loaded = self.store.load_messages().await;
        debug!(count = loaded.len(), "conversation hydrated");
        *self.messages.lock().await = loaded;
    }

    /// Appends a message and writes the history through to the store.
    ///
    /// The in-memory append always succeeds; a persistence failure is
    /// soft (logged, retried implicitly by the next write).
    pub async fn push(&self, message: Message) {
        let snapshot = {
            let mut messages = self.messages.lock().await;
            messages.push(message);
            messages.clone()
        };
        if let Err(e) = self.store.save_messages(&snapshot).await {
            warn!(error = %e, "failed to persist chat history");
        }
    }

    /// The current history in insertion order.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }

    /// Drops the whole history, in memory and on disk.
    pub async fn clear(&self) -> Result<(), ToggleTalkError> {
        self.messages.lock().await.clear();
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toggletalk_core::types::MessageOrigin;

    async fn conversation() -> (tempfile::TempDir, Conversation) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
        (dir, Conversation::new(store))
    }

    #[tokio::test]
    async fn push_persists_through_the_store() {
        let (dir, conv) = conversation().await;
        conv.push(Message::user("hello", false)).await;
        conv.push(Message::bot("hi there")).await;

        // A fresh conversation over the same directory sees the history.
        let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
        let fresh = Conversation::new(store);
        fresh.hydrate().await;
        let snapshot = fresh.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].origin, MessageOrigin::User);
        assert_eq!(snapshot[1].text, "hi there");
    }

    #[tokio::test]
    async fn clear_empties_memory_and_disk() {
        let (_dir, conv) = conversation().await;
        conv.push(Message::user("hello", false)).await;
        conv.clear().await.unwrap();
        assert!(conv.is_empty().await);

        conv.hydrate().await;
        assert!(conv.is_empty().await);
    }
}
