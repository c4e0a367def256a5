// argscrub-core/src/redaction.rs
//! Redaction of argument text before it reaches the logs.
//!
//! Expanded arguments can contain secret variable values, so debug output
//! shows only a length marker unless `ARGSCRUB_ALLOW_DEBUG_PII=true`.

use lazy_static::lazy_static;

lazy_static! {
    /// Read once per process.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("ARGSCRUB_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

/// Returns `s` itself when PII debugging is enabled, a redacted marker otherwise.
pub fn loggable(s: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        s.to_string()
    } else {
        redact_sensitive(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]");
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]");
    }
}
