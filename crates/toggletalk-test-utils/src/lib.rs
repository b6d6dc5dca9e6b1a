// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the ToggleTalk client core.
//!
//! Provides a scripted [`MockGateway`] plus mock host-shell
//! collaborators for deterministic engine tests.

pub mod mock_gateway;
pub mod mock_host;

pub use mock_gateway::MockGateway;
pub use mock_host::{MockAlerts, MockAudio, MockDisplay, MockPermissions};
