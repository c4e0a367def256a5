// argscrub-core/src/sanitizers/mod.rs
//! Concrete `ArgsSanitizer` implementations.
//!
//! `symbol_sanitizer` is the default used by the headless guard. Callers with
//! their own sanitizer plug it in through the `ArgsSanitizer` trait instead.

pub mod symbol_sanitizer;
