// argscrub-core/src/engine.rs
//! Defines the `ArgsSanitizer` trait: the seam to the independent injection
//! sanitizer that the validator compares expanded arguments against.
//!
//! The validator treats implementations as black boxes. They must be pure
//! from its point of view: same text and options in, same output out.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options passed to a sanitizer on every call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Symbols the text is split on before sanitizing; each chunk is
    /// sanitized on its own and the chunks re-joined with these symbols.
    pub split_symbols: String,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self { split_symbols: "``".to_string() }
    }
}

/// The output of a sanitizer run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedArgs {
    pub text: String,
    /// Sanitizer-specific counters. Opaque to the validator, merged into the
    /// telemetry event only for reporting.
    pub telemetry: Option<Map<String, Value>>,
}

impl SanitizedArgs {
    pub fn unchanged(text: &str) -> Self {
        Self { text: text.to_string(), telemetry: None }
    }

    pub fn has_telemetry(&self) -> bool {
        self.telemetry.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// A pluggable argument sanitizer.
pub trait ArgsSanitizer: Send + Sync {
    /// Neutralizes shell-injection-capable constructs in `text`.
    fn sanitize(&self, text: &str, options: &SanitizeOptions) -> Result<SanitizedArgs>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

impl<F> ArgsSanitizer for F
where
    F: Fn(&str, &SanitizeOptions) -> Result<SanitizedArgs> + Send + Sync,
{
    fn sanitize(&self, text: &str, options: &SanitizeOptions) -> Result<SanitizedArgs> {
        self(text, options)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closures_act_as_sanitizers() -> Result<()> {
        let upper = |text: &str, _: &SanitizeOptions| -> Result<SanitizedArgs> {
            Ok(SanitizedArgs { text: text.to_uppercase(), telemetry: None })
        };
        let out = upper.sanitize("abc", &SanitizeOptions::default())?;
        assert_eq!(out.text, "ABC");
        assert!(!out.has_telemetry());
        assert_eq!(ArgsSanitizer::name(&upper), "closure");
        Ok(())
    }

    #[test]
    fn test_empty_telemetry_map_counts_as_none() {
        let out = SanitizedArgs { text: String::new(), telemetry: Some(Map::new()) };
        assert!(!out.has_telemetry());
    }
}
