// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./toggletalk.toml` >
//! `~/.config/toggletalk/toggletalk.toml` > `/etc/toggletalk/toggletalk.toml`
//! with environment variable overrides via the `TOGGLETALK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ToggleTalkConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/toggletalk/toggletalk.toml` (system-wide)
/// 3. `~/.config/toggletalk/toggletalk.toml` (user XDG config)
/// 4. `./toggletalk.toml` (local directory)
/// 5. `TOGGLETALK_*` environment variables
pub fn load_config() -> Result<ToggleTalkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToggleTalkConfig::default()))
        .merge(Toml::file("/etc/toggletalk/toggletalk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("toggletalk/toggletalk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("toggletalk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ToggleTalkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToggleTalkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ToggleTalkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToggleTalkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity
/// with underscore-containing key names: `TOGGLETALK_SERVER_BASE_URL`
/// must map to `server.base_url`, not `server.base.url`.
fn env_provider() -> Env {
    Env::prefixed("TOGGLETALK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("user_", "user.", 1)
            .replacen("polling_", "polling.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("startup_", "startup.", 1);
        mapped.into()
    })
}
