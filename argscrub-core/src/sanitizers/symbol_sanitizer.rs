// argscrub-core/src/sanitizers/symbol_sanitizer.rs
//! Allow-list sanitizer for script arguments.
//!
//! Every character outside a conservative allow-list is replaced with
//! `REMOVED_SYMBOL_SIGN`, unless it is escaped with a backtick. The text is
//! first split on the configured split symbols (a doubled backtick by default)
//! so that an escaped escape character never protects the symbol after it.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::engine::{ArgsSanitizer, SanitizeOptions, SanitizedArgs};
use crate::expansion::ESCAPE_CHAR;

/// Replacement written in place of each removed symbol.
pub const REMOVED_SYMBOL_SIGN: &str = "_#removed#_";

static UNSAFE_SYMBOL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^a-zA-Z0-9\\` _'"\-=/:.*,+~?%\n#]"#).expect("unsafe symbol pattern is valid")
});

/// The default `ArgsSanitizer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymbolSanitizer;

impl SymbolSanitizer {
    pub fn new() -> Self {
        Self
    }

    fn sanitize_chunk(chunk: &str, removed: &mut BTreeMap<String, u64>) -> String {
        let mut out = String::with_capacity(chunk.len());
        let mut last_end = 0;
        for m in UNSAFE_SYMBOL.find_iter(chunk) {
            if chunk[..m.start()].ends_with(ESCAPE_CHAR) {
                continue;
            }
            out.push_str(&chunk[last_end..m.start()]);
            out.push_str(REMOVED_SYMBOL_SIGN);
            *removed.entry(m.as_str().to_string()).or_default() += 1;
            last_end = m.end();
        }
        out.push_str(&chunk[last_end..]);
        out
    }
}

impl ArgsSanitizer for SymbolSanitizer {
    fn sanitize(&self, text: &str, options: &SanitizeOptions) -> Result<SanitizedArgs> {
        let mut removed: BTreeMap<String, u64> = BTreeMap::new();
        let split = options.split_symbols.as_str();

        let sanitized = if split.is_empty() {
            Self::sanitize_chunk(text, &mut removed)
        } else {
            text.split(split)
                .map(|chunk| Self::sanitize_chunk(chunk, &mut removed))
                .collect::<Vec<_>>()
                .join(split)
        };

        if removed.is_empty() {
            return Ok(SanitizedArgs { text: sanitized, telemetry: None });
        }

        let total: u64 = removed.values().sum();
        debug!("SymbolSanitizer removed {} symbol(s) of {} kind(s).", total, removed.len());

        let mut telemetry = Map::new();
        telemetry.insert("removedSymbols".to_string(), serde_json::to_value(&removed)?);
        telemetry.insert("removedSymbolsCount".to_string(), Value::from(total));

        Ok(SanitizedArgs { text: sanitized, telemetry: Some(telemetry) })
    }

    fn name(&self) -> &str {
        "symbol"
    }
}
