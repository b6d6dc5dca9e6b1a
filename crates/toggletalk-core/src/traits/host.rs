// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for host-shell collaborators.
//!
//! The core never renders anything and never assumes it owns the
//! platform lifecycle. Permission prompts, local device alerts, the
//! home-screen appliance widget, and audio input all live behind these
//! traits; the host shell supplies the implementations at startup.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ToggleTalkError;
use crate::types::{Appliance, Capability, PermissionStatus};

/// Queries and requests OS capabilities on behalf of the core.
#[async_trait]
pub trait PermissionHost: Send + Sync {
    /// Checks whether a capability is currently granted, without prompting.
    async fn query(&self, capability: Capability) -> Result<PermissionStatus, ToggleTalkError>;

    /// Prompts the user to grant a capability.
    async fn request(&self, capability: Capability) -> Result<PermissionStatus, ToggleTalkError>;
}

/// Sink for local device alerts (the host decides how the OS renders them).
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn device_alert(&self, title: &str, body: &str) -> Result<(), ToggleTalkError>;
}

/// The home-screen widget collaborator: receives the full appliance
/// state map whenever the reconciler's beliefs change.
#[async_trait]
pub trait ApplianceDisplay: Send + Sync {
    async fn publish(&self, states: &HashMap<Appliance, bool>) -> Result<(), ToggleTalkError>;
}

/// Black-box voice input capability. The core only initializes it and
/// receives transcribed text through the same path as typed text.
#[async_trait]
pub trait AudioInput: Send + Sync {
    async fn initialize(&self) -> Result<(), ToggleTalkError>;
}
