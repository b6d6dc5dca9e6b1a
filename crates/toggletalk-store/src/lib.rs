// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-document persistence layer for the ToggleTalk client.
//!
//! Provides whole-document read-modify-write storage for the unbounded
//! chat history, the 50-entry capped notification list, and a small
//! settings document, all bounded by the storage deadline and degrading
//! to empty collections on corruption.

pub mod documents;
pub mod store;

pub use store::{FileStore, NOTIFICATION_CAP};
