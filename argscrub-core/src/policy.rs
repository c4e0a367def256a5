// argscrub-core/src/policy.rs
//! Feature flags and the policy mode derived from them.
//!
//! The three flags are stored independently (that is how flag stores hand
//! them over), but the validator only ever branches on `PolicyMode`, which
//! collapses the eight flag combinations into the four behaviours that
//! actually differ.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw feature flags as read from configuration or a flag store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Warn (but allow) when the sanitizer changes the expanded arguments.
    pub audit: bool,
    /// Block when the sanitizer changes the expanded arguments.
    pub activate: bool,
    /// Emit merged expansion and sanitization telemetry.
    pub telemetry: bool,
}

impl FeatureFlags {
    pub fn new(audit: bool, activate: bool, telemetry: bool) -> Self {
        Self { audit, activate, telemetry }
    }

    pub fn any(&self) -> bool {
        self.audit || self.activate || self.telemetry
    }
}

/// How a sanitization mismatch is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyMode {
    /// No flag set: validation is skipped entirely.
    Disabled,
    /// Only telemetry is collected; mismatches are allowed silently.
    TelemetryOnly,
    /// Mismatches are allowed with a warning.
    Audit { telemetry: bool },
    /// Mismatches are blocked. Takes precedence over audit.
    Enforcing { telemetry: bool },
}

impl PolicyMode {
    pub fn from_flags(flags: FeatureFlags) -> Self {
        let FeatureFlags { audit, activate, telemetry } = flags;
        match (activate, audit, telemetry) {
            (true, _, telemetry) => PolicyMode::Enforcing { telemetry },
            (false, true, telemetry) => PolicyMode::Audit { telemetry },
            (false, false, true) => PolicyMode::TelemetryOnly,
            (false, false, false) => PolicyMode::Disabled,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, PolicyMode::Disabled)
    }

    pub fn collects_telemetry(&self) -> bool {
        match self {
            PolicyMode::Disabled => false,
            PolicyMode::TelemetryOnly => true,
            PolicyMode::Audit { telemetry } | PolicyMode::Enforcing { telemetry } => *telemetry,
        }
    }
}

impl From<FeatureFlags> for PolicyMode {
    fn from(flags: FeatureFlags) -> Self {
        PolicyMode::from_flags(flags)
    }
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PolicyMode::Disabled => "disabled",
            PolicyMode::TelemetryOnly => "telemetry-only",
            PolicyMode::Audit { telemetry: false } => "audit",
            PolicyMode::Audit { telemetry: true } => "audit+telemetry",
            PolicyMode::Enforcing { telemetry: false } => "enforcing",
            PolicyMode::Enforcing { telemetry: true } => "enforcing+telemetry",
        };
        f.write_str(name)
    }
}
