// argscrub-core/src/args_parser.rs
//! Splits an expanded argument line into the argument vector PowerShell
//! would pass to a script.
//!
//! Text that came from a substituted variable value is taken literally: the
//! interpreter does not re-tokenize variable contents, so quotes, spaces and
//! backticks inside a value never open quotes or split arguments.
//!
//! License: MIT OR APACHE 2.0

use serde::Serialize;
use serde_json::{Map, Value};

use crate::environment::EnvSnapshot;
use crate::errors::ArgscrubError;
use crate::expansion::{expand_env_variables, Expansion, ExpansionTelemetry, ESCAPE_CHAR};

/// Arguments consisting of exactly one of these are counted in telemetry.
const SPECIAL_CHARACTERS: [char; 4] = ['$', ';', '@', '&'];

/// Counters for the tokenizer pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentsTelemetry {
    pub nested_quotes: u32,
    pub closed_quote_pairs: u32,
    pub escaped_quotes: u32,
    pub backticks: u32,
    pub escaped_backticks: u32,
    pub backticks_in_single_quotes: u32,
    pub special_characters: u32,
    /// `"1 '2"` or `'1 "2'`: a nested quote of the other kind left open.
    pub unbalanced_quotes: u32,
    pub unmatched_quotes: u32,
    pub last_char_meaningful_backtick: u32,
}

/// The argument vector together with telemetry from both passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArguments {
    pub args: Vec<String>,
    pub telemetry: ArgumentsTelemetry,
    pub expansion_telemetry: ExpansionTelemetry,
}

impl ParsedArguments {
    /// Both telemetry records flattened into one property map.
    pub fn telemetry_properties(&self) -> Result<Map<String, Value>, ArgscrubError> {
        let mut properties = Map::new();
        for value in [serde_json::to_value(self.expansion_telemetry)?, serde_json::to_value(self.telemetry)?] {
            if let Value::Object(map) = value {
                properties.extend(map);
            }
        }
        Ok(properties)
    }
}

/// Expands `line` with `env` and splits the result into arguments.
pub fn parse_arguments(line: &str, env: &EnvSnapshot) -> ParsedArguments {
    let expansion = expand_env_variables(line, env);
    let (args, telemetry) = split_expanded(&expansion);
    ParsedArguments {
        args,
        telemetry,
        expansion_telemetry: expansion.telemetry,
    }
}

/// Splits an already expanded line into arguments.
pub fn split_expanded(expansion: &Expansion) -> (Vec<String>, ArgumentsTelemetry) {
    let mut telemetry = ArgumentsTelemetry::default();
    let mut args = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    let mut active_quote: Option<char> = None;
    let mut passive_quote: Option<char> = None;
    let mut ranges = expansion.substitutions.iter().peekable();

    for (index, ch) in expansion.line.char_indices() {
        while ranges.next_if(|range| range.end <= index).is_some() {}
        if ranges.peek().is_some_and(|range| range.contains(&index)) {
            current.push(ch);
            continue;
        }

        match ch {
            ' ' => {
                if active_quote.is_some() {
                    current.push(ch);
                } else {
                    if !current.is_empty() {
                        args.push(std::mem::take(&mut current));
                    }
                    if escaped {
                        telemetry.last_char_meaningful_backtick += 1;
                    }
                }
                escaped = false;
            }
            ESCAPE_CHAR => {
                telemetry.backticks += 1;
                if escaped {
                    current.push(ch);
                    escaped = false;
                    telemetry.escaped_backticks += 1;
                } else if active_quote == Some('\'') {
                    current.push(ch);
                    telemetry.backticks_in_single_quotes += 1;
                } else {
                    escaped = true;
                }
            }
            '\'' | '"' => {
                if escaped {
                    current.push(ch);
                    escaped = false;
                    telemetry.escaped_quotes += 1;
                } else if active_quote == Some(ch) {
                    active_quote = None;
                    telemetry.closed_quote_pairs += 1;
                    if passive_quote.take().is_some() {
                        telemetry.unbalanced_quotes += 1;
                    }
                } else if active_quote.is_some() {
                    current.push(ch);
                    telemetry.nested_quotes += 1;
                    passive_quote = match passive_quote {
                        Some(_) => None,
                        None => Some(ch),
                    };
                } else {
                    active_quote = Some(ch);
                }
            }
            _ => {
                current.push(ch);
                escaped = false;
                if SPECIAL_CHARACTERS.contains(&ch) && current.chars().count() == 1 {
                    telemetry.special_characters += 1;
                }
            }
        }
    }

    if !current.is_empty() {
        args.push(current);
    }
    if escaped {
        telemetry.last_char_meaningful_backtick += 1;
    }
    if active_quote.is_some() {
        telemetry.unmatched_quotes = 1;
    }

    (args, telemetry)
}
