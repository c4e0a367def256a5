// argscrub-core/src/lib.rs
//! # argscrub Core Library
//!
//! `argscrub-core` checks a user-authored argument line before a CI task hands
//! it to PowerShell. It expands `$env:NAME` references the way the interpreter
//! would, runs an injection sanitizer over the result, and decides whether the
//! line is allowed, allowed with a warning, or blocked.
//!
//! ## Modules
//!
//! * `expansion`: the single-pass `$env:` expansion engine and its telemetry.
//! * `environment`: read-only environment snapshots.
//! * `engine`: the `ArgsSanitizer` trait, the seam to the injection sanitizer.
//! * `sanitizers`: the default allow-list sanitizer.
//! * `policy`: feature flags and the `PolicyMode` derived from them.
//! * `validation`: the orchestrator and its decision table.
//! * `telemetry`: telemetry events and sinks.
//! * `args_parser`: splits an expanded line into PowerShell arguments.
//! * `config`: YAML configuration with environment overrides.
//! * `headless`: one-shot guard for task runners.
//!
//! ## Usage Example
//!
//! ```rust
//! use argscrub_core::{ArgsValidator, EnvSnapshot, FeatureFlags, PolicyMode, SymbolSanitizer, ValidationDecision};
//!
//! let env: EnvSnapshot = [("TARGET", "release")].into_iter().collect();
//! let mode = PolicyMode::from_flags(FeatureFlags::new(false, true, false));
//! let validator = ArgsValidator::new(Box::new(SymbolSanitizer::new()), mode);
//!
//! // Pure variable substitution is expected and allowed.
//! assert_eq!(validator.validate("-Config $env:TARGET", &env).unwrap(), ValidationDecision::Allowed);
//!
//! // A command separator is not.
//! assert!(validator.validate("-Config x; whoami", &env).unwrap_err().is_blocked());
//! ```
//!
//! ## Error Handling
//!
//! Expansion never fails. `ArgscrubError::ArgumentsBlocked` is the only error
//! that carries a verdict; other variants are internal failures that the
//! headless guard reports and then ignores.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod args_parser;
pub mod config;
pub mod engine;
pub mod environment;
pub mod errors;
pub mod expansion;
pub mod headless;
pub mod policy;
pub mod redaction;
pub mod sanitizers;
pub mod telemetry;
pub mod validation;

pub use args_parser::{parse_arguments, split_expanded, ArgumentsTelemetry, ParsedArguments};
pub use config::{GuardConfig, MessagesConfig, TelemetryConfig};
pub use engine::{ArgsSanitizer, SanitizeOptions, SanitizedArgs};
pub use environment::EnvSnapshot;
pub use errors::ArgscrubError;
pub use expansion::{expand_env_variables, Expansion, ExpansionTelemetry};
pub use headless::{guard_args, headless_validate_args};
pub use policy::{FeatureFlags, PolicyMode};
pub use sanitizers::symbol_sanitizer::{SymbolSanitizer, REMOVED_SYMBOL_SIGN};
pub use telemetry::{merge_telemetry, LogTelemetrySink, TelemetryEvent, TelemetrySink};
pub use validation::{decide, ArgsValidator, ValidationDecision};
