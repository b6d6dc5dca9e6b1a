// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interactive chat session: wires the engine to the headless host
//! adapters and bridges stdin lines into the conversation.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use toggletalk_config::ToggleTalkConfig;
use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::types::{Appliance, InitState, MessageOrigin};
use toggletalk_engine::SyncContext;
use toggletalk_gateway::HttpGateway;
use toggletalk_store::FileStore;

use crate::host::{GrantAllPermissions, LogAlerts, LogDisplay, NoAudio};

pub async fn run(config: ToggleTalkConfig) -> Result<(), ToggleTalkError> {
    let context = build_context(&config).await?;
    context.initialize().await;

    match context.init_state().borrow().clone() {
        InitState::Ready => {}
        InitState::Failed(reason) => {
            return Err(ToggleTalkError::Internal(format!(
                "initialization failed: {reason}"
            )));
        }
        other => {
            return Err(ToggleTalkError::Internal(format!(
                "initialization ended in unexpected state {other:?}"
            )));
        }
    }

    for message in context.messages().await {
        print_message(&message.origin, &message.text);
    }
    println!("(/lights, /ac, /washer toggle appliances; /states, /clear, /quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = context.messages().await.len();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if !handle_line(&context, line).await {
                    break;
                }
                // Print whatever the exchange appended.
                let messages = context.messages().await;
                for message in &messages[shown.min(messages.len())..] {
                    print_message(&message.origin, &message.text);
                }
                shown = messages.len();
            }
        }
    }

    context.shutdown().await;
    Ok(())
}

/// Handles one input line; returns `false` to end the session.
async fn handle_line(context: &Arc<SyncContext>, line: &str) -> bool {
    match line {
        "/quit" | "/exit" => return false,
        "/lights" => toggle(context, Appliance::Light).await,
        "/ac" => toggle(context, Appliance::Ac).await,
        "/washer" => toggle(context, Appliance::WashingMachine).await,
        "/states" => {
            let states = context.appliance_states().await;
            if states.is_empty() {
                println!("(no appliance state known yet)");
            }
            for (appliance, on) in states {
                println!("{appliance}: {}", if on { "on" } else { "off" });
            }
        }
        "/clear" => {
            if let Err(e) = context.clear_history().await {
                eprintln!("failed to clear history: {e}");
            } else {
                println!("(history cleared)");
            }
        }
        text => context.send_text(text, false).await,
    }
    true
}

/// Flips an appliance relative to its last known state (unknown counts
/// as off, matching what the widget would show).
async fn toggle(context: &Arc<SyncContext>, appliance: Appliance) {
    let current = context
        .appliance_states()
        .await
        .get(&appliance)
        .copied()
        .unwrap_or(false);
    match context.toggle_appliance(appliance, !current).await {
        Ok(outcome) => info!(%appliance, on = !current, ?outcome, "toggle issued"),
        Err(e) => eprintln!("toggle failed: {e}"),
    }
}

async fn build_context(config: &ToggleTalkConfig) -> Result<Arc<SyncContext>, ToggleTalkError> {
    let gateway = Arc::new(HttpGateway::new(config)?);
    let store = Arc::new(FileStore::open(config.storage.data_dir.clone()).await?);
    Ok(Arc::new(SyncContext::new(
        config,
        gateway,
        Arc::new(GrantAllPermissions),
        Arc::new(LogAlerts),
        Arc::new(LogDisplay),
        Arc::new(NoAudio),
        store,
    )))
}

fn print_message(origin: &MessageOrigin, text: &str) {
    match origin {
        MessageOrigin::User => println!("you> {text}"),
        MessageOrigin::Bot => println!("bot> {text}"),
    }
}
