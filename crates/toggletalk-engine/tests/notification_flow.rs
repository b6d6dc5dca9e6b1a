// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end flow through [`SyncContext`] with mocked collaborators:
//! startup, a relayed broadcast notification, and the chat round trip.

use std::sync::Arc;
use std::time::Duration;

use toggletalk_config::ToggleTalkConfig;
use toggletalk_core::traits::{AlertSink, ApplianceDisplay, AudioInput, Gateway, PermissionHost};
use toggletalk_core::types::{Appliance, InitState, MessageOrigin, ServerNotification};
use toggletalk_engine::SyncContext;
use toggletalk_store::FileStore;
use toggletalk_test_utils::{MockAlerts, MockAudio, MockDisplay, MockGateway, MockPermissions};

struct Harness {
    _dir: tempfile::TempDir,
    gateway: Arc<MockGateway>,
    alerts: Arc<MockAlerts>,
    context: SyncContext,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ToggleTalkConfig::default();
    config.startup.splash_millis = 0;

    let gateway = Arc::new(MockGateway::new());
    let alerts = Arc::new(MockAlerts::new());
    let store = Arc::new(FileStore::open(dir.path()).await.unwrap());

    let context = SyncContext::new(
        &config,
        Arc::clone(&gateway) as Arc<dyn Gateway>,
        Arc::new(MockPermissions::all_granted()) as Arc<dyn PermissionHost>,
        Arc::clone(&alerts) as Arc<dyn AlertSink>,
        Arc::new(MockDisplay::new()) as Arc<dyn ApplianceDisplay>,
        Arc::new(MockAudio::new()) as Arc<dyn AudioInput>,
        store,
    );
    Harness {
        _dir: dir,
        gateway,
        alerts,
        context,
    }
}

#[tokio::test(start_paused = true)]
async fn relayed_broadcast_reaches_chat_list_alert_and_state() {
    let h = harness().await;
    h.context.initialize().await;
    assert_eq!(*h.context.init_state().borrow(), InitState::Ready);

    // Another user's command comes back through the notification feed.
    h.gateway
        .push_notification_batch(Ok(vec![ServerNotification {
            text: "[NOTIFICATION] 🔔 Amy: Turn on Light at 10:00:00".to_string(),
            timestamp: "10:00:00".to_string(),
        }]))
        .await;

    // Advance past the poll interval in small steps so the spawned poll
    // task gets room to finish its file writes under simulated time.
    // Inference is the last step of the fan-out, so once the light state
    // lands every earlier effect has happened too.
    let mut fanned_out = false;
    for _ in 0..2000 {
        if h.context.appliance_states().await.get(&Appliance::Light) == Some(&true) {
            fanned_out = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(fanned_out, "notification never fanned out");

    let messages = h.context.messages().await;
    let broadcast: Vec<_> = messages
        .iter()
        .filter(|m| m.text.contains("Turn on Light"))
        .collect();
    assert_eq!(broadcast.len(), 1);
    assert_eq!(broadcast[0].origin, MessageOrigin::Bot);

    let notifications = h.context.notifications().await;
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].text.contains("Amy"));

    assert_eq!(h.alerts.alerts().await.len(), 1);

    assert_eq!(
        h.context.appliance_states().await.get(&Appliance::Light),
        Some(&true)
    );

    h.context.shutdown().await;
}

#[tokio::test]
async fn chat_round_trip_appends_both_sides() {
    let h = harness().await;
    h.context.initialize().await;

    h.gateway
        .push_reply(Ok("✅ Light turned ON.".to_string()))
        .await;
    h.context.send_text("Turn on the light", false).await;

    let messages = h.context.messages().await;
    // Welcome seed, then the user text, then the reply.
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].origin, MessageOrigin::User);
    assert_eq!(messages[1].text, "Turn on the light");
    assert_eq!(messages[2].origin, MessageOrigin::Bot);
    assert_eq!(messages[2].text, "✅ Light turned ON.");

    h.context.shutdown().await;
}

#[tokio::test]
async fn rejected_send_degrades_to_an_apology_in_chat() {
    let h = harness().await;
    h.context.initialize().await;

    h.gateway
        .push_reply(Err(
            toggletalk_core::error::ToggleTalkError::ServerRejected("empty message".into()),
        ))
        .await;
    h.context.send_text("", false).await;

    let messages = h.context.messages().await;
    let last = messages.last().unwrap();
    assert_eq!(last.origin, MessageOrigin::Bot);
    assert!(last.text.contains("empty message"));

    h.context.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn clear_history_keeps_the_notification_list() {
    let h = harness().await;
    h.context.initialize().await;

    h.gateway
        .push_notification_batch(Ok(vec![ServerNotification {
            text: "[NOTIFICATION] 🔔 Bert: Turn off AC at 11:00:00".to_string(),
            timestamp: "11:00:00".to_string(),
        }]))
        .await;
    // Inference runs last in the fan-out; once the AC state lands the
    // notification record and chat message are already persisted.
    let mut polled = false;
    for _ in 0..2000 {
        if h.context.appliance_states().await.get(&Appliance::Ac) == Some(&false) {
            polled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(polled, "notification never polled");

    h.context.clear_history().await.unwrap();

    assert!(h.context.messages().await.is_empty());
    assert_eq!(h.context.notifications().await.len(), 1);

    h.context.shutdown().await;
}
