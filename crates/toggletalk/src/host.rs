// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Headless host-shell adapters.
//!
//! A desktop terminal has no permission prompts, notification tray
//! integration, home-screen widget, or microphone pipeline, so these
//! adapters satisfy the engine's seams with logging and grants.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::traits::{AlertSink, ApplianceDisplay, AudioInput, PermissionHost};
use toggletalk_core::types::{Appliance, Capability, PermissionStatus};

/// Grants every capability; a terminal process needs no OS prompts.
pub struct GrantAllPermissions;

#[async_trait]
impl PermissionHost for GrantAllPermissions {
    async fn query(&self, _capability: Capability) -> Result<PermissionStatus, ToggleTalkError> {
        Ok(PermissionStatus::Granted)
    }

    async fn request(&self, _capability: Capability) -> Result<PermissionStatus, ToggleTalkError> {
        Ok(PermissionStatus::Granted)
    }
}

/// Surfaces device alerts as log lines.
pub struct LogAlerts;

#[async_trait]
impl AlertSink for LogAlerts {
    async fn device_alert(&self, title: &str, body: &str) -> Result<(), ToggleTalkError> {
        info!(title, body, "device alert");
        Ok(())
    }
}

/// Logs each published appliance snapshot in place of a widget.
pub struct LogDisplay;

#[async_trait]
impl ApplianceDisplay for LogDisplay {
    async fn publish(&self, states: &HashMap<Appliance, bool>) -> Result<(), ToggleTalkError> {
        let mut rendered: Vec<String> = states
            .iter()
            .map(|(appliance, on)| format!("{appliance}={}", if *on { "on" } else { "off" }))
            .collect();
        rendered.sort();
        info!(states = rendered.join(" "), "appliance states");
        Ok(())
    }
}

/// No microphone pipeline; text input only.
pub struct NoAudio;

#[async_trait]
impl AudioInput for NoAudio {
    async fn initialize(&self) -> Result<(), ToggleTalkError> {
        Ok(())
    }
}
