// argscrub-core/src/environment.rs
//! Read-only environment snapshots used by the expansion engine.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;

/// An immutable copy of environment variables taken at call entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped, since
    /// they cannot be referenced from an argument string anyway.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Resolves a variable name. On Windows a case-insensitive match is used
    /// when no exact match exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.as_str());
        }
        if cfg!(windows) {
            return self
                .vars
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str());
        }
        None
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<HashMap<String, String>> for EnvSnapshot {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}
