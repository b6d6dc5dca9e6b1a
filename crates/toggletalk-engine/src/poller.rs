// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification polling and classification.
//!
//! A fixed-cadence loop pulls the server's notification feed. Items
//! carrying the literal `"[NOTIFICATION]"` marker are broadcast
//! notifications: they land in the capped notification list, surface in
//! chat as bot messages, fire a local device alert, and feed appliance
//! state inference. Items without the marker are ordinary bot replies
//! and only join the chat history.
//!
//! The loop is self-healing: a failed or timed-out poll is logged and
//! the cadence continues. At most one poll is in flight; a tick landing
//! while one is outstanding is skipped, never queued, so a slow network
//! cannot pile up concurrent requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use toggletalk_core::traits::{AlertSink, Gateway};
use toggletalk_core::types::{Message, NotificationRecord, ServerNotification, NOTIFICATION_MARKER};
use toggletalk_store::FileStore;

use crate::conversation::Conversation;
use crate::reconciler::ApplianceReconciler;

/// Title used for local device alerts raised by notifications.
const ALERT_TITLE: &str = "ToggleTalk";

/// The repeating notification poll.
pub struct NotificationPoller {
    gateway: Arc<dyn Gateway>,
    store: Arc<FileStore>,
    conversation: Arc<Conversation>,
    reconciler: Arc<ApplianceReconciler>,
    alerts: Arc<dyn AlertSink>,
    interval: Duration,
    in_flight: AtomicBool,
}

/// Handle to a running poll loop; cancelling it stops the loop.
pub struct PollerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the loop. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Stops the loop and waits for it to finish.
    pub async fn shutdown_and_wait(self) {
        self.token.cancel();
        let _ = self.task.await;
    }
}

impl NotificationPoller {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        store: Arc<FileStore>,
        conversation: Arc<Conversation>,
        reconciler: Arc<ApplianceReconciler>,
        alerts: Arc<dyn AlertSink>,
        interval: Duration,
    ) -> Self {
        Self {
            gateway,
            store,
            conversation,
            reconciler,
            alerts,
            interval,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Starts the repeating loop. Each tick runs as its own task so a
    /// poll outlasting the interval is observed (and skipped over)
    /// rather than delaying the cadence.
    pub fn start(self: &Arc<Self>) -> PollerHandle {
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let poller = Arc::clone(self);

        info!(interval = ?self.interval, "notification polling started");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poller.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first interval tick fires immediately; consume it so
            // polling starts one interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => {
                        debug!("notification polling stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let poller = Arc::clone(&poller);
                        tokio::spawn(async move {
                            poller.tick().await;
                        });
                    }
                }
            }
        });

        PollerHandle { token, task }
    }

    /// Runs one guarded poll. Returns `false` when a previous poll was
    /// still in flight and this tick was skipped.
    pub async fn tick(&self) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("poll already in flight, skipping tick");
            return false;
        }
        self.poll_once().await;
        self.in_flight.store(false, Ordering::SeqCst);
        true
    }

    /// One unguarded poll: pull the feed and process each item in order,
    /// exactly once.
    pub async fn poll_once(&self) {
        let items = match self.gateway.poll_notifications().await {
            Ok(items) => items,
            Err(e) => {
                // Self-healing: one missed poll is never surfaced.
                warn!(error = %e, "notification poll failed");
                return;
            }
        };

        for item in items {
            self.process(item).await;
        }
    }

    async fn process(&self, item: ServerNotification) {
        if item.text.starts_with(NOTIFICATION_MARKER) {
            let record = NotificationRecord::new(&item.text);
            if let Err(e) = self.store.append_notification(&record).await {
                warn!(error = %e, "failed to persist notification");
            }
            self.conversation.push(Message::bot(&item.text)).await;
            if let Err(e) = self.alerts.device_alert(ALERT_TITLE, &item.text).await {
                warn!(error = %e, "failed to raise device alert");
            }
            self.reconciler.apply_inference(&item.text).await;
        } else {
            self.conversation.push(Message::bot(&item.text)).await;
        }
    }
}
