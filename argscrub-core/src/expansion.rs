// argscrub-core/src/expansion.rs
//! Single-pass expansion of PowerShell `$env:NAME` references.
//!
//! The scanner walks an immutable input with a cursor and appends to an output
//! buffer. At each step it looks for the earliest of three trigger classes
//! (a single quote, a `$(` sub-expression, or an `$env:`-style prefix) and
//! consumes the region that trigger owns. Anything it cannot parse with
//! certainty is copied through unexpanded: an unmatched quote or parenthesis
//! and the unsupported `${env:...}` form all stop the scan.
//!
//! Substituted values are never re-scanned, so a value containing `$env:` is
//! emitted literally.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde::Serialize;
use std::ops::Range;

use crate::environment::EnvSnapshot;

/// PowerShell's escape character.
pub const ESCAPE_CHAR: char = '`';

const ESCAPE_BYTE: u8 = b'`';
const ENV_PREFIX: &str = "$env:";
/// Characters that terminate a variable name.
const NAME_TERMINATORS: &[u8] = b" \"';$";

/// Counters for the lexical features seen during one expansion pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionTelemetry {
    pub found_prefixes: u32,
    pub variables_expanded: u32,
    pub escaped_variables: u32,
    pub escaped_escaping_symbols: u32,
    pub variable_starts_from_backtick: u32,
    pub variables_with_backtick_inside: u32,
    pub env_quoted_blocks: u32,
    pub braced_env_syntax: u32,
    pub expansion_syntax: u32,
    pub unmatched_expansion_syntax: u32,
    pub unmatched_quotes: u32,
}

impl ExpansionTelemetry {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `true` when scanning stopped before reaching the end of the input.
    pub fn halted_early(&self) -> bool {
        self.unmatched_quotes > 0 || self.unmatched_expansion_syntax > 0 || self.braced_env_syntax > 0
    }
}

/// The result of expanding one argument line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The expanded line.
    pub line: String,
    pub telemetry: ExpansionTelemetry,
    /// Byte ranges in `line` occupied by substituted values.
    pub substitutions: Vec<Range<usize>>,
}

impl Expansion {
    pub fn into_parts(self) -> (String, ExpansionTelemetry) {
        (self.line, self.telemetry)
    }

    /// Whether the byte at `index` of the expanded line came from a variable value.
    pub fn is_substituted(&self, index: usize) -> bool {
        self.substitutions.iter().any(|range| range.contains(&index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    SingleQuote,
    SubExpression,
    EnvPrefix,
    BracedEnvPrefix,
}

/// Expands every `$env:NAME` reference in `line` using `env`.
///
/// Never fails. Unknown variables resolve to the empty string.
pub fn expand_env_variables(line: &str, env: &EnvSnapshot) -> Expansion {
    let mut scanner = Scanner::new(line, env);
    scanner.run();
    let expansion = scanner.finish();
    debug!(
        "Expanded {} of {} env prefixes ({} bytes -> {} bytes), telemetry: {:?}",
        expansion.telemetry.variables_expanded,
        expansion.telemetry.found_prefixes,
        line.len(),
        expansion.line.len(),
        expansion.telemetry
    );
    expansion
}

struct Scanner<'a> {
    line: &'a str,
    env: &'a EnvSnapshot,
    cursor: usize,
    out: String,
    telemetry: ExpansionTelemetry,
    substitutions: Vec<Range<usize>>,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str, env: &'a EnvSnapshot) -> Self {
        Self {
            line,
            env,
            cursor: 0,
            out: String::with_capacity(line.len()),
            telemetry: ExpansionTelemetry::default(),
            substitutions: Vec::new(),
        }
    }

    fn run(&mut self) {
        while let Some((at, trigger)) = next_trigger(self.line.as_bytes(), self.cursor) {
            let keep_going = match trigger {
                Trigger::SingleQuote => self.skip_quoted(at),
                Trigger::SubExpression => self.skip_sub_expression(at),
                Trigger::EnvPrefix => {
                    self.expand_variable(at);
                    true
                }
                Trigger::BracedEnvPrefix => {
                    self.telemetry.braced_env_syntax += 1;
                    false
                }
            };
            if !keep_going {
                break;
            }
        }
    }

    fn finish(mut self) -> Expansion {
        self.out.push_str(&self.line[self.cursor..]);
        Expansion {
            line: self.out,
            telemetry: self.telemetry,
            substitutions: self.substitutions,
        }
    }

    /// Copies `[cursor, end)` to the output and moves the cursor to `end`.
    fn copy_through(&mut self, end: usize) {
        self.out.push_str(&self.line[self.cursor..end]);
        self.cursor = end;
    }

    fn skip_quoted(&mut self, open: usize) -> bool {
        let bytes = self.line.as_bytes();
        match find_byte(bytes, open + 1, b'\'') {
            Some(close) => {
                self.copy_through(close + 1);
                self.telemetry.env_quoted_blocks += 1;
                true
            }
            None => {
                self.telemetry.unmatched_quotes += 1;
                false
            }
        }
    }

    fn skip_sub_expression(&mut self, open: usize) -> bool {
        match find_closing_paren(self.line.as_bytes(), open + 2) {
            Some(close) => {
                self.copy_through(close + 1);
                self.telemetry.expansion_syntax += 1;
                true
            }
            None => {
                self.telemetry.unmatched_expansion_syntax += 1;
                false
            }
        }
    }

    /// Number of escape characters (0, 1 or 2) directly before `at` that
    /// have not been consumed yet.
    fn preceding_escapes(&self, at: usize) -> usize {
        self.line.as_bytes()[self.cursor..at]
            .iter()
            .rev()
            .take(2)
            .take_while(|&&b| b == ESCAPE_BYTE)
            .count()
    }

    fn expand_variable(&mut self, at: usize) {
        let line = self.line;
        let prefix_end = at + ENV_PREFIX.len();
        self.telemetry.found_prefixes += 1;

        match self.preceding_escapes(at) {
            1 => {
                // `$env:NAME: drop the escape, keep the prefix as written.
                self.out.push_str(&line[self.cursor..at - 1]);
                self.out.push_str(&line[at..prefix_end]);
                self.cursor = prefix_end;
                self.telemetry.escaped_variables += 1;
                return;
            }
            2 => self.telemetry.escaped_escaping_symbols += 1,
            _ => {}
        }

        let name_end = line.as_bytes()[prefix_end..]
            .iter()
            .position(|b| NAME_TERMINATORS.contains(b))
            .map_or(line.len(), |offset| prefix_end + offset);
        let name = &line[prefix_end..name_end];

        self.copy_through(at);
        self.cursor = name_end;

        if let Some(rest) = name.strip_prefix(ESCAPE_CHAR) {
            self.out.push_str(ENV_PREFIX);
            self.out.push_str(rest);
            self.telemetry.variable_starts_from_backtick += 1;
            return;
        }

        // Only the text before the first backtick is looked up; the rest is
        // re-appended literally after the value.
        let (lookup, suffix) = match name.split_once(ESCAPE_CHAR) {
            Some((lookup, suffix)) => {
                self.telemetry.variables_with_backtick_inside += 1;
                (lookup, suffix)
            }
            None => (name, ""),
        };

        let value = self.env.get(lookup).unwrap_or_default();
        let start = self.out.len();
        self.out.push_str(value);
        self.substitutions.push(start..self.out.len());
        self.out.push_str(suffix);
        self.telemetry.variables_expanded += 1;
    }
}

fn next_trigger(bytes: &[u8], from: usize) -> Option<(usize, Trigger)> {
    for (offset, &b) in bytes.get(from..)?.iter().enumerate() {
        let at = from + offset;
        match b {
            b'\'' => return Some((at, Trigger::SingleQuote)),
            b'$' => {
                let rest = &bytes[at + 1..];
                if rest.first() == Some(&b'(') {
                    return Some((at, Trigger::SubExpression));
                }
                if starts_with_ignore_case(rest, b"env:") {
                    return Some((at, Trigger::EnvPrefix));
                }
                if starts_with_ignore_case(rest, b"{env:") {
                    return Some((at, Trigger::BracedEnvPrefix));
                }
            }
            _ => {}
        }
    }
    None
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes.get(from..)?.iter().position(|&b| b == needle).map(|offset| from + offset)
}

/// Finds the `)` closing a sub-expression whose body starts at `from`,
/// accounting for nested parentheses.
fn find_closing_paren(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes.get(from..)?.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' if depth == 0 => return Some(from + offset),
            b')' => depth -= 1,
            _ => {}
        }
    }
    None
}
