// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock host-shell collaborators: permissions, alerts, the appliance
//! widget, and audio input.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::traits::{AlertSink, ApplianceDisplay, AudioInput, PermissionHost};
use toggletalk_core::types::{Appliance, Capability, PermissionStatus};

/// Permission host with per-capability scripted query results.
///
/// `request()` grants everything when `grant_on_request` is set
/// (the default) and records which capabilities were requested.
pub struct MockPermissions {
    granted: Mutex<HashMap<Capability, PermissionStatus>>,
    requested: Mutex<Vec<Capability>>,
    grant_on_request: AtomicBool,
    fail_requests: AtomicBool,
}

impl Default for MockPermissions {
    fn default() -> Self {
        Self {
            granted: Mutex::new(HashMap::new()),
            requested: Mutex::new(Vec::new()),
            grant_on_request: AtomicBool::new(true),
            fail_requests: AtomicBool::new(false),
        }
    }
}

impl MockPermissions {
    /// All capabilities already granted (a returning user).
    pub fn all_granted() -> Self {
        let mut granted = HashMap::new();
        for cap in [
            Capability::Storage,
            Capability::Notifications,
            Capability::Microphone,
        ] {
            granted.insert(cap, PermissionStatus::Granted);
        }
        Self {
            granted: Mutex::new(granted),
            ..Self::default()
        }
    }

    /// Nothing granted yet (a first launch).
    pub fn none_granted() -> Self {
        Self::default()
    }

    pub fn deny_requests(&self) {
        self.grant_on_request.store(false, Ordering::SeqCst);
    }

    /// Makes `request()` fail outright, as when the platform's
    /// permission service itself is broken.
    pub fn fail_requests(&self) {
        self.fail_requests.store(true, Ordering::SeqCst);
    }

    pub fn allow_requests(&self) {
        self.fail_requests.store(false, Ordering::SeqCst);
        self.grant_on_request.store(true, Ordering::SeqCst);
    }

    pub async fn set_status(&self, capability: Capability, status: PermissionStatus) {
        self.granted.lock().await.insert(capability, status);
    }

    pub async fn requested(&self) -> Vec<Capability> {
        self.requested.lock().await.clone()
    }
}

#[async_trait]
impl PermissionHost for MockPermissions {
    async fn query(&self, capability: Capability) -> Result<PermissionStatus, ToggleTalkError> {
        Ok(*self
            .granted
            .lock()
            .await
            .get(&capability)
            .unwrap_or(&PermissionStatus::Denied))
    }

    async fn request(&self, capability: Capability) -> Result<PermissionStatus, ToggleTalkError> {
        self.requested.lock().await.push(capability);
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(ToggleTalkError::Internal(
                "permission service unavailable".into(),
            ));
        }
        let status = if self.grant_on_request.load(Ordering::SeqCst) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        self.granted.lock().await.insert(capability, status);
        Ok(status)
    }
}

/// Alert sink that captures every alert for assertions.
#[derive(Default)]
pub struct MockAlerts {
    alerts: Mutex<Vec<(String, String)>>,
}

impl MockAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().await.clone()
    }
}

#[async_trait]
impl AlertSink for MockAlerts {
    async fn device_alert(&self, title: &str, body: &str) -> Result<(), ToggleTalkError> {
        self.alerts
            .lock()
            .await
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Widget display that captures every published state snapshot.
#[derive(Default)]
pub struct MockDisplay {
    published: Mutex<Vec<HashMap<Appliance, bool>>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn published(&self) -> Vec<HashMap<Appliance, bool>> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl ApplianceDisplay for MockDisplay {
    async fn publish(&self, states: &HashMap<Appliance, bool>) -> Result<(), ToggleTalkError> {
        self.published.lock().await.push(states.clone());
        Ok(())
    }
}

/// Audio input that can be told to fail initialization.
#[derive(Default)]
pub struct MockAudio {
    fail: AtomicBool,
    init_calls: AtomicUsize,
}

impl MockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let audio = Self::default();
        audio.fail.store(true, Ordering::SeqCst);
        audio
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioInput for MockAudio {
    async fn initialize(&self) -> Result<(), ToggleTalkError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(ToggleTalkError::Internal("recorder setup failed".into()))
        } else {
            Ok(())
        }
    }
}
