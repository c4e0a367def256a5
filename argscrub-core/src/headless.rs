// argscrub-core/src/headless.rs
//! One-shot convenience wrapper for validating a script's arguments.
//!
//! This is the entry point a task runner calls right before it writes the
//! script invocation. Only a block escapes as an error; any other failure is
//! reported through telemetry and the arguments are allowed through.

use log::warn;
use serde_json::{Map, Value};

use crate::config::GuardConfig;
use crate::engine::ArgsSanitizer;
use crate::environment::EnvSnapshot;
use crate::errors::ArgscrubError;
use crate::sanitizers::symbol_sanitizer::SymbolSanitizer;
use crate::telemetry::{LogTelemetrySink, TelemetrySink};
use crate::validation::{ArgsValidator, ValidationDecision};

/// Validates `line` against the process environment with the default
/// sanitizer and a logging telemetry sink.
pub fn headless_validate_args(config: &GuardConfig, line: &str) -> Result<ValidationDecision, ArgscrubError> {
    guard_args(
        config,
        line,
        &EnvSnapshot::capture(),
        Box::new(SymbolSanitizer::new()),
        Box::new(LogTelemetrySink),
    )
}

/// Like [`headless_validate_args`] with every collaborator supplied by the caller.
pub fn guard_args(
    config: &GuardConfig,
    line: &str,
    env: &EnvSnapshot,
    sanitizer: Box<dyn ArgsSanitizer>,
    sink: Box<dyn TelemetrySink>,
) -> Result<ValidationDecision, ArgscrubError> {
    let validator = ArgsValidator::from_config(sanitizer, config).with_sink(sink);

    match validator.validate(line, env) {
        Err(e) if !e.is_blocked() => {
            warn!("Argument validation failed unexpectedly; allowing arguments: {}", e);
            let mut properties = Map::new();
            properties.insert("UnexpectedError".to_string(), Value::String(e.to_string()));
            validator.report(properties);
            Ok(ValidationDecision::Allowed)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_disabled_config_allows_anything() {
        let config = GuardConfig::default();
        let decision = headless_validate_args(&config, "a; rm -rf /").unwrap();
        assert_eq!(decision, ValidationDecision::Allowed);
    }

    #[test]
    fn test_headless_enforcing_blocks_injection() {
        let mut config = GuardConfig::default();
        config.feature_flags.activate = true;
        let err = headless_validate_args(&config, "a; whoami").unwrap_err();
        assert!(err.is_blocked());
        assert_eq!(err.to_string(), config.messages.args_sanitized);
    }
}
