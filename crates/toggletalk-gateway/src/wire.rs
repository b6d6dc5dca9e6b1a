// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response shapes for the server's JSON API.
//!
//! The server signals application-level failure inside a 2xx body (an
//! `error` field or a non-`success` status), so every response shape
//! keeps both halves optional and lets the client decide.

use serde::{Deserialize, Serialize};

use toggletalk_core::types::{ServerEvent, ServerNotification};

/// Body for `POST /send_message`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub user_name: String,
    pub user_id: i64,
}

/// Body returned by `POST /send_message`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body returned by `GET /get_notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notifications: Vec<ServerNotification>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body returned by `GET /get_events`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub events: Vec<ServerEvent>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body returned by `GET /health`. Extra diagnostic fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_response_parses_success_shape() {
        let json = r#"{"status":"success","response":"✅ Light turned ON.","user_name":"Amy","user_id":1}"#;
        let resp: SendMessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status.as_deref(), Some("success"));
        assert_eq!(resp.response.as_deref(), Some("✅ Light turned ON."));
        assert!(resp.error.is_none());
    }

    #[test]
    fn send_response_parses_error_shape() {
        let json = r#"{"error":"Message is required"}"#;
        let resp: SendMessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.error.as_deref(), Some("Message is required"));
    }

    #[test]
    fn notifications_response_parses_feed() {
        let json = r#"{"status":"success","notifications":[{"text":"[NOTIFICATION] 🔔 Amy: Turn on Light at 10:00:00","timestamp":"2025-01-01T10:00:00"}],"count":1}"#;
        let resp: NotificationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.notifications.len(), 1);
        assert_eq!(resp.count, Some(1));
    }

    #[test]
    fn health_response_tolerates_extra_fields() {
        let json = r#"{"status":"healthy","timestamp":"2025-01-01T10:00:00","uptime":"1:00:00","messages_processed":7}"#;
        let resp: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status.as_deref(), Some("healthy"));
    }
}
