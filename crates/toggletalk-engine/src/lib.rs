// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ToggleTalk client core: conversation state, notification
//! polling, appliance reconciliation, and startup orchestration.
//!
//! Everything here is host-agnostic. The host shell (a desktop binary,
//! a mobile embedding, a test harness) supplies the platform seams —
//! [`Gateway`](toggletalk_core::traits::Gateway),
//! [`PermissionHost`](toggletalk_core::traits::PermissionHost),
//! [`AlertSink`](toggletalk_core::traits::AlertSink),
//! [`ApplianceDisplay`](toggletalk_core::traits::ApplianceDisplay), and
//! [`AudioInput`](toggletalk_core::traits::AudioInput) — and talks to a
//! single [`SyncContext`].

pub mod context;
pub mod conversation;
pub mod init;
pub mod poller;
pub mod reconciler;

pub use context::SyncContext;
pub use conversation::Conversation;
pub use init::InitSequencer;
pub use poller::{NotificationPoller, PollerHandle};
pub use reconciler::{ApplianceReconciler, ToggleOutcome};
