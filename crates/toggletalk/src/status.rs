// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server health and recent-activity report.

use toggletalk_config::ToggleTalkConfig;
use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::traits::Gateway;
use toggletalk_core::types::HealthStatus;
use toggletalk_gateway::HttpGateway;

const EVENT_LIMIT: usize = 10;

pub async fn status(config: ToggleTalkConfig) -> Result<(), ToggleTalkError> {
    let gateway = HttpGateway::new(&config)?;

    match gateway.health_check().await {
        Ok(HealthStatus::Healthy) => println!("server: healthy ({})", config.server.base_url),
        Ok(HealthStatus::Unhealthy(detail)) => println!("server: unhealthy: {detail}"),
        Err(e) => {
            println!("server: unreachable: {e}");
            return Err(e);
        }
    }

    let mut events = gateway.poll_events().await?;
    if events.len() > EVENT_LIMIT {
        events.drain(..events.len() - EVENT_LIMIT);
    }
    if events.is_empty() {
        println!("no recent activity");
    } else {
        println!("recent activity:");
        for event in events {
            println!(
                "  [{}] {} {}: {}",
                event.timestamp, event.event_type, event.user_name, event.message
            );
        }
    }
    Ok(())
}
