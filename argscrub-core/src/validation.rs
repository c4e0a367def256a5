// argscrub-core/src/validation.rs
//! The validation orchestrator.
//!
//! Compares three states of an argument line (original, expanded, sanitized)
//! and decides whether the line may be handed to the interpreter. The
//! decision table itself is the pure function [`decide`]; [`ArgsValidator`]
//! wires it to the expansion engine, a sanitizer and a telemetry sink.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};

use crate::config::GuardConfig;
use crate::engine::{ArgsSanitizer, SanitizeOptions};
use crate::environment::EnvSnapshot;
use crate::errors::ArgscrubError;
use crate::expansion::expand_env_variables;
use crate::policy::PolicyMode;
use crate::redaction::loggable;
use crate::telemetry::{has_telemetry, merge_telemetry, TelemetryEvent, TelemetrySink};

/// Outcome of validating one argument line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationDecision {
    Allowed,
    WarnedAndAllowed { message: String },
    Blocked { message: String },
}

impl ValidationDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, ValidationDecision::Blocked { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationDecision::Allowed => None,
            ValidationDecision::WarnedAndAllowed { message } | ValidationDecision::Blocked { message } => {
                Some(message)
            }
        }
    }
}

/// The decision table.
///
/// `message` is only used when the sanitizer changed something beyond
/// variable expansion.
pub fn decide(original: &str, expanded: &str, sanitized: &str, mode: PolicyMode, message: &str) -> ValidationDecision {
    if sanitized == original || sanitized == expanded {
        return ValidationDecision::Allowed;
    }
    match mode {
        PolicyMode::Enforcing { .. } => ValidationDecision::Blocked { message: message.to_string() },
        PolicyMode::Audit { .. } => ValidationDecision::WarnedAndAllowed { message: message.to_string() },
        PolicyMode::TelemetryOnly | PolicyMode::Disabled => ValidationDecision::Allowed,
    }
}

/// Validates argument lines against a sanitizer under a fixed policy.
pub struct ArgsValidator {
    sanitizer: Box<dyn ArgsSanitizer>,
    sink: Option<Box<dyn TelemetrySink>>,
    mode: PolicyMode,
    options: SanitizeOptions,
    area: String,
    feature: String,
    message: String,
}

impl ArgsValidator {
    pub fn new(sanitizer: Box<dyn ArgsSanitizer>, mode: PolicyMode) -> Self {
        let config = GuardConfig::default();
        Self {
            sanitizer,
            sink: None,
            mode,
            options: config.sanitizer,
            area: config.telemetry.area,
            feature: config.telemetry.feature,
            message: config.messages.args_sanitized,
        }
    }

    /// Builds a validator whose mode, options, labels and messages come from `config`.
    pub fn from_config(sanitizer: Box<dyn ArgsSanitizer>, config: &GuardConfig) -> Self {
        Self {
            sanitizer,
            sink: None,
            mode: config.policy_mode(),
            options: config.sanitizer.clone(),
            area: config.telemetry.area.clone(),
            feature: config.telemetry.feature.clone(),
            message: config.messages.args_sanitized.clone(),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn TelemetrySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Emits an event to the sink, if any. Failures are logged and swallowed.
    pub fn report(&self, properties: serde_json::Map<String, serde_json::Value>) {
        let Some(sink) = &self.sink else { return };
        let event = TelemetryEvent::new(self.area.as_str(), self.feature.as_str(), properties);
        if let Err(e) = sink.emit(&event) {
            warn!("Failed to emit telemetry for {}/{}: {:#}", self.area, self.feature, e);
        }
    }

    /// Computes the decision without raising on a block.
    ///
    /// Errors are internal failures only (the sanitizer failing); a block is
    /// returned as `ValidationDecision::Blocked`.
    pub fn evaluate(&self, original: &str, env: &EnvSnapshot) -> Result<ValidationDecision, ArgscrubError> {
        if self.mode.is_disabled() {
            debug!("Argument validation disabled; skipping.");
            return Ok(ValidationDecision::Allowed);
        }

        let (expanded, expansion_telemetry) = expand_env_variables(original, env).into_parts();
        let sanitized = self
            .sanitizer
            .sanitize(&expanded, &self.options)
            .map_err(|e| ArgscrubError::SanitizerFailure(format!("{} sanitizer: {:#}", self.sanitizer.name(), e)))?;

        if sanitized.text == original {
            return Ok(ValidationDecision::Allowed);
        }

        debug!(
            "Arguments changed during validation (mode: {}). Original: {}, expanded: {}, sanitized: {}",
            self.mode,
            loggable(original),
            loggable(&expanded),
            loggable(&sanitized.text)
        );

        if self.mode.collects_telemetry() && has_telemetry(&expansion_telemetry, &sanitized) {
            match merge_telemetry(&expansion_telemetry, &sanitized) {
                Ok(properties) => self.report(properties),
                Err(e) => warn!("Failed to build telemetry event: {}", e),
            }
        }

        Ok(decide(original, &expanded, &sanitized.text, self.mode, &self.message))
    }

    /// Validates `original`, raising `ArgscrubError::ArgumentsBlocked` on a block.
    ///
    /// A warning decision is logged at warn level and returned.
    pub fn validate(&self, original: &str, env: &EnvSnapshot) -> Result<ValidationDecision, ArgscrubError> {
        match self.evaluate(original, env)? {
            ValidationDecision::Blocked { message } => Err(ArgscrubError::ArgumentsBlocked { message }),
            ValidationDecision::WarnedAndAllowed { message } => {
                warn!("{}", message);
                Ok(ValidationDecision::WarnedAndAllowed { message })
            }
            ValidationDecision::Allowed => Ok(ValidationDecision::Allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MSG: &str = "changed";

    #[test]
    fn test_decide_unchanged_is_allowed_in_every_mode() {
        for mode in [
            PolicyMode::Disabled,
            PolicyMode::TelemetryOnly,
            PolicyMode::Audit { telemetry: true },
            PolicyMode::Enforcing { telemetry: true },
        ] {
            assert_eq!(decide("a", "a", "a", mode, MSG), ValidationDecision::Allowed);
        }
    }

    #[test]
    fn test_decide_pure_expansion_is_allowed() {
        let mode = PolicyMode::Enforcing { telemetry: false };
        assert_eq!(decide("$env:A", "x", "x", mode, MSG), ValidationDecision::Allowed);
    }

    #[test]
    fn test_decide_mismatch_per_mode() {
        let mismatch = |mode| decide("$env:A", "x;y", "x_#removed#_y", mode, MSG);
        assert_eq!(
            mismatch(PolicyMode::Enforcing { telemetry: false }),
            ValidationDecision::Blocked { message: MSG.to_string() }
        );
        assert_eq!(
            mismatch(PolicyMode::Audit { telemetry: true }),
            ValidationDecision::WarnedAndAllowed { message: MSG.to_string() }
        );
        assert_eq!(mismatch(PolicyMode::TelemetryOnly), ValidationDecision::Allowed);
    }

    #[test]
    fn test_decision_helpers() {
        let blocked = ValidationDecision::Blocked { message: MSG.to_string() };
        assert!(!blocked.is_allowed());
        assert_eq!(blocked.message(), Some(MSG));
        assert!(ValidationDecision::Allowed.is_allowed());
        assert_eq!(ValidationDecision::Allowed.message(), None);
    }
}
