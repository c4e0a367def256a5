// argscrub-core/src/telemetry.rs
//! Telemetry events and the sink they are handed to.
//!
//! Transport is owned by the caller. The library only builds the event and
//! passes it to a `TelemetrySink`; a failing sink never changes a validation
//! decision.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::engine::SanitizedArgs;
use crate::errors::ArgscrubError;
use crate::expansion::ExpansionTelemetry;

/// A single telemetry event: `(area, feature, properties)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub area: String,
    pub feature: String,
    pub properties: Map<String, Value>,
}

impl TelemetryEvent {
    pub fn new(area: impl Into<String>, feature: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self { area: area.into(), feature: feature.into(), properties }
    }
}

/// Receives telemetry events.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: &TelemetryEvent) -> Result<()>;
}

/// A sink that writes each event as one JSON line at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetrySink;

impl TelemetrySink for LogTelemetrySink {
    fn emit(&self, event: &TelemetryEvent) -> Result<()> {
        let body = serde_json::to_string(&event.properties)?;
        info!("telemetry area={} feature={} {}", event.area, event.feature, body);
        Ok(())
    }
}

/// Merges expansion counters and sanitizer telemetry into one property map.
///
/// Sanitizer keys win on collision; the two sets are disjoint in practice.
pub fn merge_telemetry(
    expansion: &ExpansionTelemetry,
    sanitized: &SanitizedArgs,
) -> Result<Map<String, Value>, ArgscrubError> {
    let mut properties = match serde_json::to_value(expansion)? {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("expansion".to_string(), other);
            map
        }
    };
    if let Some(extra) = &sanitized.telemetry {
        properties.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Ok(properties)
}

/// Whether either pass produced anything worth reporting.
pub fn has_telemetry(expansion: &ExpansionTelemetry, sanitized: &SanitizedArgs) -> bool {
    !expansion.is_empty() || sanitized.has_telemetry()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_includes_both_sources() -> Result<()> {
        let expansion = ExpansionTelemetry { variables_expanded: 1, ..Default::default() };
        let mut extra = Map::new();
        extra.insert("removedSymbolsCount".to_string(), Value::from(2));
        let sanitized = SanitizedArgs { text: String::new(), telemetry: Some(extra) };

        let merged = merge_telemetry(&expansion, &sanitized)?;
        assert_eq!(merged["variablesExpanded"], 1);
        assert_eq!(merged["removedSymbolsCount"], 2);
        assert!(has_telemetry(&expansion, &sanitized));
        Ok(())
    }

    #[test]
    fn test_no_telemetry_when_both_empty() {
        let sanitized = SanitizedArgs::unchanged("x");
        assert!(!has_telemetry(&ExpansionTelemetry::default(), &sanitized));
    }

    #[test]
    fn test_log_sink_accepts_events() {
        let event = TelemetryEvent::new("TaskHub", "PowerShellV2", Map::new());
        assert!(LogTelemetrySink.emit(&event).is_ok());
    }
}
