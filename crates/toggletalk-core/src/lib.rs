// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ToggleTalk client synchronization engine.
//!
//! This crate provides the error taxonomy, shared domain types, the
//! uniform timeout policy, and the trait seams (server transport and
//! host-shell collaborators) used throughout the ToggleTalk workspace.

pub mod error;
pub mod timeout;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ToggleTalkError;
pub use timeout::{with_deadline, OpClass};
pub use traits::{AlertSink, ApplianceDisplay, AudioInput, Gateway, PermissionHost};
pub use types::{
    Appliance, ApplianceState, Capability, HealthStatus, InitState, Message, MessageOrigin,
    NotificationRecord, PendingCommand, PermissionStatus, ServerEvent, ServerNotification,
    StateSource, NOTIFICATION_MARKER,
};
