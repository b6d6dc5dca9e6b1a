// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seam for the remote server transport.

use async_trait::async_trait;

use crate::error::ToggleTalkError;
use crate::types::{Appliance, HealthStatus, ServerEvent, ServerNotification};

/// Stateless transport to the ToggleTalk server.
///
/// This is the only seam through which the client speaks to the remote
/// authority. Implementations own no client state; every method runs
/// under the network deadline so callers inherit the timeout policy.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Sends a user message and returns the bot's reply text.
    async fn send_message(&self, text: &str) -> Result<String, ToggleTalkError>;

    /// Pulls the server's pending notification feed.
    async fn poll_notifications(&self) -> Result<Vec<ServerNotification>, ToggleTalkError>;

    /// Pulls the server's recent event log.
    async fn poll_events(&self) -> Result<Vec<ServerEvent>, ToggleTalkError>;

    /// Probes server health.
    async fn health_check(&self) -> Result<HealthStatus, ToggleTalkError>;

    /// Issues an appliance toggle. The server interprets natural-language
    /// text, so this synthesizes a `"Turn on/off the {appliance}"` message
    /// rather than hitting a structured endpoint.
    async fn send_appliance_command(
        &self,
        appliance: Appliance,
        on: bool,
    ) -> Result<String, ToggleTalkError>;

    /// Updates the display name attached to subsequent requests. Called
    /// when the host shell refreshes the username on foreground.
    fn set_user_name(&self, _name: &str) {}
}
