//! Service Configuration
//!
//! Settings for the orchestration layer, read from JSON or from the
//! environment:
//! - `QR_STUDIO_DEBUG` enables debug logging
//! - `QR_STUDIO_HISTORY` toggles history persistence (`0`/`false`/`off`)
//! - `QR_STUDIO_PAGE_SIZE` sets the default history page size

use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

pub const ENV_DEBUG: &str = "QR_STUDIO_DEBUG";
pub const ENV_HISTORY: &str = "QR_STUDIO_HISTORY";
pub const ENV_PAGE_SIZE: &str = "QR_STUDIO_PAGE_SIZE";

/// Largest history page a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

/// Orchestration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub debug_logging: bool,
    pub history_enabled: bool,
    pub history_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            history_enabled: true,
            history_page_size: 10,
        }
    }
}

impl ServiceConfig {
    /// Read settings from process environment
    pub fn from_env() -> StudioResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> StudioResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DEBUG) {
            config.debug_logging = parse_flag(&value);
        }

        if let Some(value) = lookup(ENV_HISTORY) {
            config.history_enabled = parse_flag(&value);
        }

        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            config.history_page_size = value.trim().parse().map_err(|_| {
                StudioError::config_error(format!("{} must be a number", ENV_PAGE_SIZE))
                    .with_details(value.clone())
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> StudioResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StudioResult<()> {
        if self.history_page_size == 0 || self.history_page_size > MAX_PAGE_SIZE {
            return Err(StudioError::config_error(format!(
                "history_page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert!(config.history_enabled);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_DEBUG, "1"),
            (ENV_HISTORY, "off"),
            (ENV_PAGE_SIZE, " 25 "),
        ]))
        .unwrap();
        assert!(config.debug_logging);
        assert!(!config.history_enabled);
        assert_eq!(config.history_page_size, 25);
    }

    #[test]
    fn test_invalid_values() {
        let err = ServiceConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "lots")])).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);

        assert!(ServiceConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "0")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "101")])).is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn test_from_json() {
        let config = ServiceConfig::from_json(r#"{"history_page_size": 5}"#).unwrap();
        assert_eq!(config.history_page_size, 5);
        assert!(config.history_enabled);
        assert!(ServiceConfig::from_json(r#"{"history_page_size": 500}"#).is_err());
    }
}
