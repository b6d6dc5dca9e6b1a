// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway to the ToggleTalk server.
//!
//! Implements the [`Gateway`](toggletalk_core::traits::Gateway) seam
//! over the server's JSON API: message sending, the notification and
//! event feeds, health probing, and natural-language appliance
//! commands.

pub mod client;
pub mod wire;

pub use client::HttpGateway;
