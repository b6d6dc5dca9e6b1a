// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the ToggleTalk server API.
//!
//! [`HttpGateway`] is the only component that talks to the server. It
//! owns no synchronization state; every method runs under the network
//! deadline, maps non-2xx and connection failures to
//! [`ToggleTalkError::Transport`], and maps in-body error fields to
//! [`ToggleTalkError::ServerRejected`].

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use toggletalk_config::ToggleTalkConfig;
use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::timeout::{with_deadline, OpClass};
use toggletalk_core::traits::Gateway;
use toggletalk_core::types::{Appliance, HealthStatus, ServerEvent, ServerNotification};

use crate::wire::{
    EventsResponse, HealthResponse, NotificationsResponse, SendMessageRequest, SendMessageResponse,
};

/// The server truncates messages at 1000 characters; do it client-side
/// so the payload the user sees matches what the server processed.
const MAX_MESSAGE_CHARS: usize = 1000;

/// reqwest-backed implementation of [`Gateway`].
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    user_name: RwLock<String>,
    user_id: i64,
}

impl HttpGateway {
    /// Creates a gateway from the client configuration.
    pub fn new(config: &ToggleTalkConfig) -> Result<Self, ToggleTalkError> {
        // Backstop timeout slightly above the policy deadline, so the
        // typed Timeout from with_deadline fires first.
        let client = reqwest::Client::builder()
            .timeout(OpClass::Network.deadline() + Duration::from_secs(2))
            .build()
            .map_err(|e| ToggleTalkError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            user_name: RwLock::new(config.user.name.clone()),
            user_id: config.user.id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn current_user_name(&self) -> String {
        self.user_name
            .read()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ToggleTalkError> {
        let url = self.url(path);
        with_deadline(OpClass::Network, async {
            let response =
                self.client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| ToggleTalkError::Transport {
                        message: format!("GET {url} failed: {e}"),
                        source: Some(Box::new(e)),
                    })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ToggleTalkError::Transport {
                    message: format!("GET {url} returned {status}"),
                    source: None,
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| ToggleTalkError::Transport {
                    message: format!("failed to read body of GET {url}: {e}"),
                    source: Some(Box::new(e)),
                })?;
            serde_json::from_str(&body).map_err(|e| ToggleTalkError::Parse {
                message: format!("malformed response from GET {url}: {e}"),
                source: Some(Box::new(e)),
            })
        })
        .await
    }

    async fn post_message(&self, text: &str) -> Result<String, ToggleTalkError> {
        let message: String = if text.chars().count() > MAX_MESSAGE_CHARS {
            let truncated: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
            warn!(limit = MAX_MESSAGE_CHARS, "truncating outbound message");
            format!("{truncated}...")
        } else {
            text.to_string()
        };

        let request = SendMessageRequest {
            message,
            user_name: self.current_user_name(),
            user_id: self.user_id,
        };
        let url = self.url("/send_message");

        with_deadline(OpClass::Network, async {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| ToggleTalkError::Transport {
                    message: format!("POST {url} failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ToggleTalkError::Transport {
                    message: format!("failed to read body of POST {url}: {e}"),
                    source: Some(Box::new(e)),
                })?;

            if !status.is_success() {
                // The server attaches an error field to 4xx/5xx bodies;
                // surface it when present.
                if let Ok(parsed) = serde_json::from_str::<SendMessageResponse>(&body)
                    && let Some(error) = parsed.error
                {
                    return Err(ToggleTalkError::Transport {
                        message: format!("POST {url} returned {status}: {error}"),
                        source: None,
                    });
                }
                return Err(ToggleTalkError::Transport {
                    message: format!("POST {url} returned {status}"),
                    source: None,
                });
            }

            let parsed: SendMessageResponse =
                serde_json::from_str(&body).map_err(|e| ToggleTalkError::Parse {
                    message: format!("malformed response from POST {url}: {e}"),
                    source: Some(Box::new(e)),
                })?;

            if let Some(error) = parsed.error {
                return Err(ToggleTalkError::ServerRejected(error));
            }
            match parsed.status.as_deref() {
                Some("success") => {}
                other => {
                    return Err(ToggleTalkError::ServerRejected(format!(
                        "unexpected status {other:?}"
                    )));
                }
            }
            parsed
                .response
                .ok_or_else(|| ToggleTalkError::ServerRejected("missing response text".into()))
        })
        .await
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send_message(&self, text: &str) -> Result<String, ToggleTalkError> {
        debug!(chars = text.chars().count(), "sending user message");
        self.post_message(text).await
    }

    async fn poll_notifications(&self) -> Result<Vec<ServerNotification>, ToggleTalkError> {
        let response: NotificationsResponse = self.get_json("/get_notifications").await?;
        if let Some(error) = response.error {
            return Err(ToggleTalkError::ServerRejected(error));
        }
        debug!(count = response.notifications.len(), "notification feed pulled");
        Ok(response.notifications)
    }

    async fn poll_events(&self) -> Result<Vec<ServerEvent>, ToggleTalkError> {
        let response: EventsResponse = self.get_json("/get_events").await?;
        if let Some(error) = response.error {
            return Err(ToggleTalkError::ServerRejected(error));
        }
        Ok(response.events)
    }

    async fn health_check(&self) -> Result<HealthStatus, ToggleTalkError> {
        let response: HealthResponse = self.get_json("/health").await?;
        match response.status.as_deref() {
            Some("healthy") => Ok(HealthStatus::Healthy),
            Some(other) => Ok(HealthStatus::Unhealthy(other.to_string())),
            None => Ok(HealthStatus::Unhealthy(
                response.error.unwrap_or_else(|| "no status reported".into()),
            )),
        }
    }

    async fn send_appliance_command(
        &self,
        appliance: Appliance,
        on: bool,
    ) -> Result<String, ToggleTalkError> {
        // The server understands natural language, not a command schema.
        let verb = if on { "on" } else { "off" };
        let text = format!("Turn {verb} the {appliance}");
        debug!(%appliance, on, "sending appliance command");
        self.post_message(&text).await
    }

    fn set_user_name(&self, name: &str) {
        if let Ok(mut current) = self.user_name.write() {
            *current = name.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_gateway(base_url: &str) -> HttpGateway {
        let toml = format!(
            r#"
            [server]
            base_url = "{base_url}"

            [user]
            name = "Amy"
            id = 7
        "#
        );
        let config = toggletalk_config::load_and_validate_str(&toml).unwrap();
        HttpGateway::new(&config).unwrap()
    }

    #[tokio::test]
    async fn send_message_returns_bot_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .and(body_partial_json(serde_json::json!({
                "message": "Turn on the light",
                "user_name": "Amy",
                "user_id": 7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "response": "✅ Light turned ON.",
                "user_name": "Amy",
                "user_id": 7
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        let reply = gateway.send_message("Turn on the light").await.unwrap();
        assert_eq!(reply, "✅ Light turned ON.");
    }

    #[tokio::test]
    async fn in_body_error_maps_to_server_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "error": "Message is required"
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        let result = gateway.send_message("hi").await;
        match result {
            Err(ToggleTalkError::ServerRejected(msg)) => {
                assert_eq!(msg, "Message is required");
            }
            other => panic!("expected ServerRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_500_maps_to_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Internal server error"
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        let result = gateway.send_message("hi").await;
        assert!(matches!(result, Err(ToggleTalkError::Transport { .. })));
    }

    #[tokio::test]
    async fn poll_notifications_parses_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_notifications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "notifications": [
                    {"text": "[NOTIFICATION] 🔔 Amy: Turn on Light at 10:00:00",
                     "timestamp": "2025-01-01T10:00:00"}
                ],
                "count": 1
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        let feed = gateway.poll_notifications().await.unwrap();
        assert_eq!(feed.len(), 1);
        assert!(feed[0].text.starts_with("[NOTIFICATION]"));
    }

    #[tokio::test]
    async fn poll_events_parses_log() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "events": [
                    {"timestamp": "2025-01-01T10:00:00", "event_type": "device_control",
                     "message": "Light turned ON", "user_name": "Amy", "user_id": 7}
                ],
                "count": 1
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        let events = gateway.poll_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "device_control");
    }

    #[tokio::test]
    async fn health_check_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "healthy",
                "timestamp": "2025-01-01T10:00:00",
                "uptime": "1:00:00"
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        assert_eq!(gateway.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn appliance_command_synthesizes_natural_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .and(body_partial_json(serde_json::json!({
                "message": "Turn off the Air Conditioner"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "response": "✅ Air Conditioner turned OFF."
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        let reply = gateway
            .send_appliance_command(Appliance::Ac, false)
            .await
            .unwrap();
        assert_eq!(reply, "✅ Air Conditioner turned OFF.");
    }

    #[tokio::test]
    async fn set_user_name_applies_to_subsequent_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send_message"))
            .and(body_partial_json(serde_json::json!({"user_name": "Benoit"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "response": "Hello Benoit!"
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        gateway.set_user_name("Benoit");
        let reply = gateway.send_message("hello").await.unwrap();
        assert_eq!(reply, "Hello Benoit!");
    }

    #[tokio::test]
    async fn oversized_message_is_truncated() {
        let server = MockServer::start().await;
        let long = "x".repeat(1500);
        let expected = format!("{}...", "x".repeat(1000));

        Mock::given(method("POST"))
            .and(path("/send_message"))
            .and(body_partial_json(serde_json::json!({"message": expected})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "response": "ok"
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        assert_eq!(gateway.send_message(&long).await.unwrap(), "ok");
    }
}
