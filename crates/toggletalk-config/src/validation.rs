// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of the configuration model.

use thiserror::Error;

use crate::model::ToggleTalkConfig;

/// A configuration value that deserialized fine but is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("server.base_url must start with http:// or https:// (got {0:?})")]
    InvalidBaseUrl(String),

    #[error("polling.interval_secs must be at least 1")]
    ZeroPollInterval,

    #[error("user.name must not be empty")]
    EmptyUserName,

    #[error("storage.data_dir must not be empty")]
    EmptyDataDir,
}

/// Validates constraints Figment cannot express in the type system.
///
/// Collects every violation rather than stopping at the first, so the
/// user can fix a broken config in one pass.
pub fn validate_config(config: &ToggleTalkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let url = config.server.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::InvalidBaseUrl(config.server.base_url.clone()));
    }

    if config.polling.interval_secs == 0 {
        errors.push(ConfigError::ZeroPollInterval);
    }

    if config.user.name.trim().is_empty() {
        errors.push(ConfigError::EmptyUserName);
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::EmptyDataDir);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
