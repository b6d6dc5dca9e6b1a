// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the core and its collaborators.

pub mod gateway;
pub mod host;

pub use gateway::Gateway;
pub use host::{AlertSink, ApplianceDisplay, AudioInput, PermissionHost};
