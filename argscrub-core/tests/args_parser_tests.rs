// argscrub-core/tests/args_parser_tests.rs
//! Tokenizing expanded argument lines the way PowerShell passes them to a script.

use argscrub_core::{parse_arguments, EnvSnapshot};
use test_log::test;

#[test]
fn test_script_style_argument_line() {
    let env: EnvSnapshot = [("BUILD_DIR", "C:\\agent\\_work\\1\\s")].into_iter().collect();
    let parsed = parse_arguments("-Path $env:BUILD_DIR -Name 'My App' -Verbose", &env);
    assert_eq!(
        parsed.args,
        vec!["-Path", "C:\\agent\\_work\\1\\s", "-Name", "My App", "-Verbose"]
    );
    assert_eq!(parsed.expansion_telemetry.variables_expanded, 1);
    assert_eq!(parsed.expansion_telemetry.env_quoted_blocks, 1);
}

#[test]
fn test_values_with_quotes_stay_single_argument() {
    let env: EnvSnapshot = [("MSG", "say \"hi\" now")].into_iter().collect();
    let parsed = parse_arguments("-Message $env:MSG", &env);
    assert_eq!(parsed.args, vec!["-Message", "say \"hi\" now"]);
    assert_eq!(parsed.telemetry.closed_quote_pairs, 0);
}

#[test]
fn test_value_inside_double_quotes_joins_surrounding_text() {
    let env: EnvSnapshot = [("USER", "ci bot")].into_iter().collect();
    let parsed = parse_arguments("\"hello $env:USER\" done", &env);
    assert_eq!(parsed.args, vec!["hello ci bot", "done"]);
}

#[test]
fn test_escaped_reference_stays_literal_argument() {
    let env: EnvSnapshot = [("SECRET", "s3cr3t")].into_iter().collect();
    let parsed = parse_arguments("`$env:SECRET", &env);
    assert_eq!(parsed.args, vec!["$env:SECRET"]);
    assert_eq!(parsed.expansion_telemetry.escaped_variables, 1);
}
