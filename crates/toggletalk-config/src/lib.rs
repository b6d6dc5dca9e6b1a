// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the ToggleTalk client.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! use toggletalk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("server: {}", config.server.base_url);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ToggleTalkConfig;
pub use validation::ConfigError;

/// Errors from either the Figment layer or post-deserialization validation.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration:\n{}", format_errors(.0))]
    Invalid(Vec<ConfigError>),
}

fn format_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point: loads config from TOML files and
/// env vars via Figment, then runs post-deserialization validation.
pub fn load_and_validate() -> Result<ToggleTalkConfig, LoadError> {
    let config = loader::load_config().map_err(Box::new)?;
    validation::validate_config(&config).map_err(LoadError::Invalid)?;
    Ok(config)
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<ToggleTalkConfig, LoadError> {
    let config = loader::load_config_from_str(toml_content).map_err(Box::new)?;
    validation::validate_config(&config).map_err(LoadError::Invalid)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_and_validate_str("").expect("defaults should be valid");
        assert_eq!(config.user.name, "MobileUser");
        assert_eq!(config.polling.interval_secs, 5);
        assert_eq!(config.startup.splash_millis, 3000);
        assert!(config.server.base_url.starts_with("http://"));
    }

    #[test]
    fn toml_overrides_defaults() {
        let toml = r#"
            [server]
            base_url = "https://home.example.com/api"

            [user]
            name = "Amy"
            id = 1767023771

            [polling]
            interval_secs = 2
        "#;
        let config = load_and_validate_str(toml).expect("should parse");
        assert_eq!(config.server.base_url, "https://home.example.com/api");
        assert_eq!(config.user.name, "Amy");
        assert_eq!(config.user.id, 1767023771);
        assert_eq!(config.polling.interval_secs, 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
            [server]
            base_url = "http://localhost:7850/api"
            bas_url = "typo"
        "#;
        assert!(load_and_validate_str(toml).is_err());
    }

    #[test]
    fn invalid_values_are_reported_together() {
        let toml = r#"
            [server]
            base_url = "localhost:7850"

            [polling]
            interval_secs = 0
        "#;
        match load_and_validate_str(toml) {
            Err(LoadError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }
}
