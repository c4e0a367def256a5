//! Configuration management for `argscrub-core`.
//!
//! A `GuardConfig` bundles the feature flags, the sanitizer options, the
//! telemetry labels and the user-facing messages. It is read from YAML; any
//! section missing from a user file falls back to the built-in defaults, and
//! the three feature flags can be overridden from the environment.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::SanitizeOptions;
use crate::policy::{FeatureFlags, PolicyMode};

/// Environment variable overriding `feature_flags.audit`.
pub const ENV_AUDIT: &str = "ARGSCRUB_AUDIT";
/// Environment variable overriding `feature_flags.activate`.
pub const ENV_ACTIVATE: &str = "ARGSCRUB_ACTIVATE";
/// Environment variable overriding `feature_flags.telemetry`.
pub const ENV_TELEMETRY: &str = "ARGSCRUB_TELEMETRY";

const DEFAULT_CONFIG_YAML: &str = include_str!("../config/default_config.yaml");

/// Labels attached to every telemetry event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub area: String,
    pub feature: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            area: "TaskHub".to_string(),
            feature: "PowerShellV2".to_string(),
        }
    }
}

/// User-facing messages. Replace these to localize the output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Shown when the sanitizer changed the expanded arguments.
    pub args_sanitized: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            args_sanitized: "Detected characters in arguments that may not be executed correctly by the shell. \
                Please escape special characters using backtick (`)."
                .to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardConfig {
    pub feature_flags: FeatureFlags,
    pub sanitizer: SanitizeOptions,
    pub telemetry: TelemetryConfig,
    pub messages: MessagesConfig,
}

impl GuardConfig {
    /// Loads the configuration embedded in the library.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default configuration from embedded string...");
        let config: GuardConfig =
            serde_yml::from_str(DEFAULT_CONFIG_YAML).context("Failed to parse default configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GuardConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/argscrub/config.yaml`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("argscrub").join("config.yaml"))
    }

    /// Loads the user configuration if present, the defaults otherwise, and
    /// then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::user_config_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path)?,
            _ => Self::load_default()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn policy_mode(&self) -> PolicyMode {
        PolicyMode::from_flags(self.feature_flags)
    }

    /// Applies `ARGSCRUB_*` flag overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies flag overrides using `lookup` to read variables.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags = &mut self.feature_flags;
        for (key, slot) in [
            (ENV_AUDIT, &mut flags.audit),
            (ENV_ACTIVATE, &mut flags.activate),
            (ENV_TELEMETRY, &mut flags.telemetry),
        ] {
            let Some(raw) = lookup(key) else { continue };
            match parse_flag(&raw) {
                Some(value) => {
                    debug!("Overriding {} from environment: {}", key, value);
                    *slot = value;
                }
                None => warn!("Ignoring {}: '{}' is not a boolean.", key, raw),
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.telemetry.area.trim().is_empty() {
            errors.push("`telemetry.area` must not be empty.");
        }
        if self.telemetry.feature.trim().is_empty() {
            errors.push("`telemetry.feature` must not be empty.");
        }
        if self.messages.args_sanitized.trim().is_empty() {
            errors.push("`messages.args_sanitized` must not be empty.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")))
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_embedded_defaults_match_code_defaults() {
        let embedded = GuardConfig::load_default().unwrap();
        assert_eq!(embedded, GuardConfig::default());
        assert_eq!(embedded.sanitizer.split_symbols, "``");
        assert!(embedded.policy_mode().is_disabled());
    }

    #[test]
    fn test_parse_flag_values() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" on "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [(ENV_ACTIVATE, "true"), (ENV_AUDIT, "bogus")].into_iter().collect();
        let mut config = GuardConfig::default();
        config.feature_flags.audit = true;
        config.apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()));

        assert!(config.feature_flags.activate);
        // Unparseable values leave the flag alone.
        assert!(config.feature_flags.audit);
        assert!(!config.feature_flags.telemetry);
        assert_eq!(config.policy_mode(), PolicyMode::Enforcing { telemetry: false });
    }

    #[test]
    fn test_validate_rejects_empty_labels() {
        let mut config = GuardConfig::default();
        config.telemetry.area = " ".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("telemetry.area"));
    }
}
