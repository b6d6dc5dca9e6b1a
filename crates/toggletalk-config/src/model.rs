// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the ToggleTalk client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject
//! unrecognized config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level ToggleTalk client configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to
/// sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleTalkConfig {
    /// Remote server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Local user identity (externally supplied, never computed here).
    #[serde(default)]
    pub user: UserConfig,

    /// Notification polling settings.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Persistent store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Startup sequence settings.
    #[serde(default)]
    pub startup: StartupConfig,
}

/// Remote server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL all endpoint paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:7850/api".to_string()
}

/// Local user identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Display name sent with every message.
    #[serde(default = "default_user_name")]
    pub name: String,

    /// Authorized account identifier the server tracks clients by.
    #[serde(default)]
    pub id: i64,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: default_user_name(),
            id: 0,
        }
    }
}

fn default_user_name() -> String {
    "MobileUser".to_string()
}

/// Notification polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Seconds between notification polls.
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

/// Persistent store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the JSON document files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("toggletalk").display().to_string())
        .unwrap_or_else(|| ".toggletalk".to_string())
}

/// Startup sequence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StartupConfig {
    /// Milliseconds the splash state lasts before permission checks.
    #[serde(default = "default_splash_millis")]
    pub splash_millis: u64,

    /// Message seeded into an empty chat history on first load.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            splash_millis: default_splash_millis(),
            welcome_message: default_welcome_message(),
        }
    }
}

fn default_splash_millis() -> u64 {
    3000
}

fn default_welcome_message() -> String {
    "Hello! I can help you control your home appliances. Try 'Turn on the light'.".to_string()
}
