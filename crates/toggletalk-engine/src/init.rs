// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup orchestration.
//!
//! [`InitSequencer`] drives the one-shot startup state machine:
//! splash, permission acquisition (gated on the first-launch flag),
//! data loading, and polling startup. The state is published on a
//! `watch` channel the host UI observes read-only.
//!
//! Every loading step is individually guarded by the timeout policy and
//! soft-fails forward: a missing username, unreadable history, or a
//! broken recorder must never keep the app from reaching `Ready`. Only
//! an error that escapes all per-step guards reaches the `Failed`
//! terminal, which the host renders with a retry action.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use toggletalk_config::model::StartupConfig;
use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::timeout::{with_deadline, OpClass};
use toggletalk_core::traits::{AudioInput, Gateway, PermissionHost};
use toggletalk_core::types::{Capability, InitState, Message, PermissionStatus};
use toggletalk_store::FileStore;

use crate::conversation::Conversation;
use crate::poller::{NotificationPoller, PollerHandle};

const CAPABILITIES: [Capability; 3] = [
    Capability::Storage,
    Capability::Notifications,
    Capability::Microphone,
];

/// Drives the startup state machine and owns the poller's handle.
pub struct InitSequencer {
    permissions: Arc<dyn PermissionHost>,
    audio: Arc<dyn AudioInput>,
    gateway: Arc<dyn Gateway>,
    store: Arc<FileStore>,
    conversation: Arc<Conversation>,
    poller: Arc<NotificationPoller>,
    configured_user_name: String,
    startup: StartupConfig,
    state_tx: watch::Sender<InitState>,
    transitions: std::sync::Mutex<Vec<InitState>>,
    poller_handle: Mutex<Option<PollerHandle>>,
}

impl InitSequencer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        permissions: Arc<dyn PermissionHost>,
        audio: Arc<dyn AudioInput>,
        gateway: Arc<dyn Gateway>,
        store: Arc<FileStore>,
        conversation: Arc<Conversation>,
        poller: Arc<NotificationPoller>,
        configured_user_name: String,
        startup: StartupConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(InitState::Splash);
        Self {
            permissions,
            audio,
            gateway,
            store,
            conversation,
            poller,
            configured_user_name,
            startup,
            state_tx,
            transitions: std::sync::Mutex::new(Vec::new()),
            poller_handle: Mutex::new(None),
        }
    }

    /// Read-only view of the startup state.
    pub fn subscribe(&self) -> watch::Receiver<InitState> {
        self.state_tx.subscribe()
    }

    /// The current state.
    pub fn current_state(&self) -> InitState {
        self.state_tx.borrow().clone()
    }

    /// Every state visited so far, in order. Diagnostic view for the
    /// host shell and for tests; `watch` only retains the latest value.
    pub fn transitions(&self) -> Vec<InitState> {
        self.transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Runs startup once, from the splash screen to `Ready` or `Failed`.
    pub async fn run(&self) {
        self.set_state(InitState::Splash);
        tokio::time::sleep(Duration::from_millis(self.startup.splash_millis)).await;
        self.run_from_permission_check().await;
    }

    /// The host's retry action from the `Failed` terminal: re-enters
    /// the permission check from scratch, skipping the splash.
    pub async fn retry(&self) {
        info!("retrying initialization");
        self.run_from_permission_check().await;
    }

    /// Stops the polling loop on app teardown.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.poller_handle.lock().await.take() {
            handle.shutdown();
        }
    }

    async fn run_from_permission_check(&self) {
        self.set_state(InitState::CheckingPermissions);
        match self.acquire_permissions_and_load().await {
            Ok(()) => self.set_state(InitState::Ready),
            Err(e) => {
                warn!(error = %e, "initialization failed");
                self.set_state(InitState::Failed(e.to_string()));
            }
        }
    }

    async fn acquire_permissions_and_load(&self) -> Result<(), ToggleTalkError> {
        let all_granted = self.query_permissions().await;
        let returning = self.store.has_launched_before().await;

        if !(all_granted && returning) {
            self.set_state(InitState::AwaitingPermissionGrant);
            self.request_permissions().await?;
            if let Err(e) = self.store.mark_launched().await {
                warn!(error = %e, "failed to persist first-launch flag");
            }
        }

        self.set_state(InitState::LoadingData);
        self.load_data().await
    }

    /// Queries every capability without prompting. A query failure or
    /// timeout counts as not granted.
    async fn query_permissions(&self) -> bool {
        let mut all_granted = true;
        for capability in CAPABILITIES {
            let status =
                with_deadline(OpClass::PermissionQuery, self.permissions.query(capability)).await;
            match status {
                Ok(PermissionStatus::Granted) => {}
                Ok(PermissionStatus::Denied) => all_granted = false,
                Err(e) => {
                    warn!(%capability, error = %e, "permission query failed, assuming denied");
                    all_granted = false;
                }
            }
        }
        all_granted
    }

    /// Prompts for every capability. Denials degrade (the microphone
    /// denial gets an actionable message since it blocks voice input);
    /// timeouts are soft; a broken permission service escapes to the
    /// `Failed` terminal.
    async fn request_permissions(&self) -> Result<(), ToggleTalkError> {
        for capability in CAPABILITIES {
            let status =
                with_deadline(OpClass::PermissionRequest, self.permissions.request(capability))
                    .await;
            match status {
                Ok(PermissionStatus::Granted) => debug!(%capability, "permission granted"),
                Ok(PermissionStatus::Denied) => match capability {
                    Capability::Microphone => {
                        info!("microphone denied: voice input disabled until enabled in system settings");
                    }
                    _ => debug!(%capability, "permission denied, degrading silently"),
                },
                Err(e) if e.is_soft() => {
                    warn!(%capability, error = %e, "permission request timed out, continuing");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn load_data(&self) -> Result<(), ToggleTalkError> {
        // Username: cached value wins, configured name is the fallback
        // and gets cached for later launches.
        match self.store.load_username().await {
            Some(name) => self.gateway.set_user_name(&name),
            None => {
                self.gateway.set_user_name(&self.configured_user_name);
                if let Err(e) = self.store.save_username(&self.configured_user_name).await {
                    warn!(error = %e, "failed to cache username");
                }
            }
        }

        self.conversation.hydrate().await;

        let handle = self.poller.start();
        if let Some(old) = self.poller_handle.lock().await.replace(handle) {
            // Retry path: never leave two loops polling.
            old.shutdown();
        }

        if self.conversation.is_empty().await {
            self.conversation
                .push(Message::bot(self.startup.welcome_message.clone()))
                .await;
        }

        match with_deadline(OpClass::AudioSetup, self.audio.initialize()).await {
            Ok(()) => debug!("audio input ready"),
            Err(ToggleTalkError::PermissionDenied(capability)) => {
                info!(%capability, "voice input disabled: grant microphone access in system settings");
            }
            Err(e) => {
                warn!(error = %e, "audio init failed, continuing without voice input");
            }
        }

        Ok(())
    }

    fn set_state(&self, state: InitState) {
        debug!(?state, "init state transition");
        self.transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(state.clone());
        self.state_tx.send_replace(state);
    }
}
