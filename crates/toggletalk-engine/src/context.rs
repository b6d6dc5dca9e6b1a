// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-scoped wiring of the client core.
//!
//! [`SyncContext`] is the one context object constructed at startup and
//! handed to the host shell: it owns the store, conversation,
//! reconciler, poller, and init sequencer, and exposes the user-facing
//! operations. No component reaches for ambient globals; everything is
//! passed in here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use toggletalk_config::ToggleTalkConfig;
use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::traits::{AlertSink, ApplianceDisplay, AudioInput, Gateway, PermissionHost};
use toggletalk_core::types::{
    Appliance, HealthStatus, InitState, Message, NotificationRecord, ServerEvent,
};
use toggletalk_store::FileStore;

use crate::conversation::Conversation;
use crate::init::InitSequencer;
use crate::poller::NotificationPoller;
use crate::reconciler::{ApplianceReconciler, ToggleOutcome};

/// Everything the host shell talks to.
pub struct SyncContext {
    gateway: Arc<dyn Gateway>,
    store: Arc<FileStore>,
    conversation: Arc<Conversation>,
    reconciler: Arc<ApplianceReconciler>,
    init: InitSequencer,
}

impl SyncContext {
    /// Wires the core from its collaborators. The host shell supplies
    /// the platform seams; the config supplies identity and cadence.
    pub fn new(
        config: &ToggleTalkConfig,
        gateway: Arc<dyn Gateway>,
        permissions: Arc<dyn PermissionHost>,
        alerts: Arc<dyn AlertSink>,
        display: Arc<dyn ApplianceDisplay>,
        audio: Arc<dyn AudioInput>,
        store: Arc<FileStore>,
    ) -> Self {
        let conversation = Arc::new(Conversation::new(Arc::clone(&store)));
        let reconciler = Arc::new(ApplianceReconciler::new(Arc::clone(&gateway), display));
        let poller = Arc::new(NotificationPoller::new(
            Arc::clone(&gateway),
            Arc::clone(&store),
            Arc::clone(&conversation),
            Arc::clone(&reconciler),
            alerts,
            Duration::from_secs(config.polling.interval_secs),
        ));
        let init = InitSequencer::new(
            permissions,
            audio,
            Arc::clone(&gateway),
            Arc::clone(&store),
            Arc::clone(&conversation),
            poller,
            config.user.name.clone(),
            config.startup.clone(),
        );

        Self {
            gateway,
            store,
            conversation,
            reconciler,
            init,
        }
    }

    /// Runs the startup sequence to `Ready` or `Failed`.
    pub async fn initialize(&self) {
        self.init.run().await;
    }

    /// The retry action from the `Failed` terminal.
    pub async fn retry_initialization(&self) {
        self.init.retry().await;
    }

    /// Read-only startup state for the host UI.
    pub fn init_state(&self) -> watch::Receiver<InitState> {
        self.init.subscribe()
    }

    /// Sends user text (typed or transcribed — the core does not care)
    /// and appends both sides of the exchange to the conversation.
    ///
    /// Failures never propagate: a rejection or unreachable server
    /// degrades to a bot-origin message describing the problem, so the
    /// conversation stays the single surface the host renders.
    pub async fn send_text(&self, text: &str, is_audio: bool) {
        self.conversation.push(Message::user(text, is_audio)).await;

        match self.gateway.send_message(text).await {
            Ok(reply) => self.conversation.push(Message::bot(reply)).await,
            Err(ToggleTalkError::ServerRejected(reason)) => {
                self.conversation
                    .push(Message::bot(format!(
                        "Sorry, the server couldn't process that: {reason}"
                    )))
                    .await;
            }
            Err(e) => {
                warn!(error = %e, "send failed");
                self.conversation
                    .push(Message::bot(
                        "Sorry, I couldn't reach the server. Please try again.",
                    ))
                    .await;
            }
        }
    }

    /// Toggles an appliance; also the home-screen shortcut entry point.
    pub async fn toggle_appliance(
        &self,
        appliance: Appliance,
        on: bool,
    ) -> Result<ToggleOutcome, ToggleTalkError> {
        self.reconciler.toggle(appliance, on).await
    }

    /// Current appliance beliefs for the UI and the shortcut collaborator.
    pub async fn appliance_states(&self) -> HashMap<Appliance, bool> {
        self.reconciler.get_states().await
    }

    /// The conversation in display order.
    pub async fn messages(&self) -> Vec<Message> {
        self.conversation.snapshot().await
    }

    /// The capped notification list for the notification panel.
    pub async fn notifications(&self) -> Vec<NotificationRecord> {
        self.store.load_notifications().await
    }

    /// User-triggered "reset conversation".
    pub async fn clear_history(&self) -> Result<(), ToggleTalkError> {
        info!("clearing chat history");
        self.conversation.clear().await
    }

    /// Recent server events (most recent last), capped at `limit`.
    pub async fn recent_events(&self, limit: usize) -> Result<Vec<ServerEvent>, ToggleTalkError> {
        let mut events = self.gateway.poll_events().await?;
        if events.len() > limit {
            events.drain(..events.len() - limit);
        }
        Ok(events)
    }

    /// Server health probe for the host's diagnostics surface.
    pub async fn health(&self) -> Result<HealthStatus, ToggleTalkError> {
        self.gateway.health_check().await
    }

    /// Explicit lifecycle event from the host shell: the app returned
    /// to the foreground, so refresh the username the gateway sends.
    pub async fn on_foreground(&self) {
        if let Some(name) = self.store.load_username().await {
            self.gateway.set_user_name(&name);
        }
    }

    /// Stops background work on app teardown.
    pub async fn shutdown(&self) {
        self.init.shutdown().await;
    }
}
