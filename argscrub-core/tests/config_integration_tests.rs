// argscrub-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use test_log::test;

use argscrub_core::config::{GuardConfig, ENV_AUDIT, ENV_TELEMETRY};
use argscrub_core::PolicyMode;

fn write_config(yaml: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml.as_bytes())?;
    Ok(file)
}

#[test]
fn test_load_full_config_from_file() -> Result<()> {
    let file = write_config(
        r#"
feature_flags:
  audit: true
  activate: false
  telemetry: true
sanitizer:
  split_symbols: "||"
telemetry:
  area: Pipelines
  feature: ScriptArgs
messages:
  args_sanitized: "Argumente enthalten unsichere Zeichen."
"#,
    )?;

    let config = GuardConfig::load_from_file(file.path())?;
    assert_eq!(config.policy_mode(), PolicyMode::Audit { telemetry: true });
    assert_eq!(config.sanitizer.split_symbols, "||");
    assert_eq!(config.telemetry.area, "Pipelines");
    assert_eq!(config.telemetry.feature, "ScriptArgs");
    assert_eq!(config.messages.args_sanitized, "Argumente enthalten unsichere Zeichen.");
    Ok(())
}

#[test]
fn test_partial_config_falls_back_to_defaults() -> Result<()> {
    let file = write_config(
        r#"
feature_flags:
  activate: true
"#,
    )?;

    let config = GuardConfig::load_from_file(file.path())?;
    let defaults = GuardConfig::load_default()?;
    assert_eq!(config.policy_mode(), PolicyMode::Enforcing { telemetry: false });
    assert_eq!(config.sanitizer, defaults.sanitizer);
    assert_eq!(config.telemetry, defaults.telemetry);
    assert_eq!(config.messages, defaults.messages);
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> Result<()> {
    let file = write_config(
        r#"
telemetry:
  area: ""
"#,
    )?;
    let err = GuardConfig::load_from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("telemetry.area"));
    Ok(())
}

#[test]
fn test_malformed_yaml_reports_path() -> Result<()> {
    let file = write_config("feature_flags: [not, a, map")?;
    let err = GuardConfig::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let err = GuardConfig::load_from_file("/definitely/not/here/argscrub.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_environment_style_overrides() -> Result<()> {
    let mut config = GuardConfig::load_default()?;
    config.apply_overrides_from(|key| match key {
        k if k == ENV_AUDIT => Some("yes".to_string()),
        k if k == ENV_TELEMETRY => Some("1".to_string()),
        _ => None,
    });
    assert_eq!(config.policy_mode(), PolicyMode::Audit { telemetry: true });
    Ok(())
}

#[test]
fn test_user_config_path_is_namespaced() {
    if let Some(path) = GuardConfig::user_config_path() {
        assert!(path.ends_with("argscrub/config.yaml"));
    }
}
