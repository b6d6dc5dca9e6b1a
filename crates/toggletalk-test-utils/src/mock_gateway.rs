// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock gateway for deterministic testing.
//!
//! `MockGateway` implements `Gateway` with scripted responses and
//! captured requests. Notification batches and send replies are queues:
//! each poll or send consumes the next scripted entry, falling back to
//! an empty feed / echo reply when the queue is empty.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::traits::Gateway;
use toggletalk_core::types::{Appliance, HealthStatus, ServerEvent, ServerNotification};

type ScriptedResult<T> = Result<T, ToggleTalkError>;

/// A scripted in-memory `Gateway`.
#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<VecDeque<ScriptedResult<String>>>,
    notification_batches: Mutex<VecDeque<ScriptedResult<Vec<ServerNotification>>>>,
    events: Mutex<Vec<ServerEvent>>,
    sent_texts: Mutex<Vec<String>>,
    commands: Mutex<Vec<(Appliance, bool)>>,
    user_names: std::sync::Mutex<Vec<String>>,
    poll_delay: std::sync::Mutex<Option<Duration>>,
    send_delay: std::sync::Mutex<Option<Duration>>,
    polls_started: AtomicUsize,
    polls_in_flight: AtomicUsize,
    max_polls_in_flight: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the result of the next `send_message` /
    /// `send_appliance_command` call.
    pub async fn push_reply(&self, reply: ScriptedResult<String>) {
        self.replies.lock().await.push_back(reply);
    }

    /// Scripts the result of the next `poll_notifications` call.
    pub async fn push_notification_batch(&self, batch: ScriptedResult<Vec<ServerNotification>>) {
        self.notification_batches.lock().await.push_back(batch);
    }

    /// Sets the event log returned by `poll_events`.
    pub async fn set_events(&self, events: Vec<ServerEvent>) {
        *self.events.lock().await = events;
    }

    /// Makes every poll take `delay` before resolving, for testing the
    /// at-most-one-in-flight invariant.
    pub fn set_poll_delay(&self, delay: Duration) {
        *self.poll_delay.lock().unwrap() = Some(delay);
    }

    /// Makes every send take `delay` before resolving, for testing
    /// behavior while a command is in flight.
    pub fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = Some(delay);
    }

    /// All texts that went through `send_message` or an appliance command.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent_texts.lock().await.clone()
    }

    /// All appliance commands issued, in order.
    pub async fn commands(&self) -> Vec<(Appliance, bool)> {
        self.commands.lock().await.clone()
    }

    /// Usernames passed to `set_user_name`, in order.
    pub fn user_names(&self) -> Vec<String> {
        self.user_names.lock().unwrap().clone()
    }

    /// Number of polls that were started.
    pub fn polls_started(&self) -> usize {
        self.polls_started.load(Ordering::SeqCst)
    }

    /// Highest number of polls that were ever in flight at once.
    pub fn max_polls_in_flight(&self) -> usize {
        self.max_polls_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn send_message(&self, text: &str) -> Result<String, ToggleTalkError> {
        self.sent_texts.lock().await.push(text.to_string());
        let delay = *self.send_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.replies.lock().await.pop_front() {
            Some(scripted) => scripted,
            None => Ok(format!("echo: {text}")),
        }
    }

    async fn poll_notifications(&self) -> Result<Vec<ServerNotification>, ToggleTalkError> {
        self.polls_started.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.polls_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_polls_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.poll_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = match self.notification_batches.lock().await.pop_front() {
            Some(scripted) => scripted,
            None => Ok(Vec::new()),
        };

        self.polls_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn poll_events(&self) -> Result<Vec<ServerEvent>, ToggleTalkError> {
        Ok(self.events.lock().await.clone())
    }

    async fn health_check(&self) -> Result<HealthStatus, ToggleTalkError> {
        Ok(HealthStatus::Healthy)
    }

    async fn send_appliance_command(
        &self,
        appliance: Appliance,
        on: bool,
    ) -> Result<String, ToggleTalkError> {
        self.commands.lock().await.push((appliance, on));
        let verb = if on { "on" } else { "off" };
        let text = format!("Turn {verb} the {appliance}");
        self.send_message(&text).await
    }

    fn set_user_name(&self, name: &str) {
        self.user_names.lock().unwrap().push(name.to_string());
    }
}
