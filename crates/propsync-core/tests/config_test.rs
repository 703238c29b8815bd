//! Tests for the propsync configuration system.

use std::sync::Mutex;

use propsync_core::config::{CliOverrides, LogFormat, PropsyncConfig};
use propsync_core::errors::ConfigError;
use propsync_core::{PropertyPath, PropertyValue};

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all PROPSYNC_ env vars and point HOME at an empty directory so the
/// developer's own `~/.propsync/config.toml` never leaks into a test.
fn isolate_env(home: &std::path::Path) {
    for key in [
        "PROPSYNC_LOG_LEVEL",
        "PROPSYNC_LOG_FORMAT",
        "PROPSYNC_REJECT_UNVERSIONED",
        "PROPSYNC_VALIDATE_SNAPSHOT",
    ] {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", home);
    std::env::remove_var("USERPROFILE");
}

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = PropsyncConfig::from_toml("").unwrap();

    assert!(!config.applier.effective_reject_unversioned());
    assert!(!config.applier.effective_validate_snapshot());
    assert_eq!(config.logging.effective_level(), "info");
    assert_eq!(config.logging.effective_format(), LogFormat::Pretty);
    assert!(config.schema.effective_builtin());
    assert!(config.schema.properties.is_empty());
}

#[test]
fn layered_resolution_cli_over_env_over_project() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate_env(home.path());

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("propsync.toml"),
        r#"
[applier]
reject_unversioned = true

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    std::env::set_var("PROPSYNC_LOG_LEVEL", "warn");

    let cli = CliOverrides {
        log_format: Some("pretty".into()),
        ..Default::default()
    };
    let config = PropsyncConfig::load(dir.path(), Some(&cli)).unwrap();

    // Project file only
    assert!(config.applier.effective_reject_unversioned());
    // Env beats project
    assert_eq!(config.logging.effective_level(), "warn");
    // CLI beats project
    assert_eq!(config.logging.effective_format(), LogFormat::Pretty);

    isolate_env(home.path());
}

#[test]
fn user_config_is_lowest_file_layer() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate_env(home.path());

    let user_dir = home.path().join(".propsync");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(
        user_dir.join("config.toml"),
        "[logging]\nlevel = \"trace\"\n\n[applier]\nvalidate_snapshot = true\n",
    )
    .unwrap();

    let project = tempfile::tempdir().unwrap();
    std::fs::write(
        project.path().join("propsync.toml"),
        "[logging]\nlevel = \"error\"\n",
    )
    .unwrap();

    let config = PropsyncConfig::load(project.path(), None).unwrap();
    assert_eq!(config.logging.effective_level(), "error");
    assert!(config.applier.effective_validate_snapshot());
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate_env(home.path());

    let dir = tempfile::tempdir().unwrap();
    let config = PropsyncConfig::load(dir.path(), None).unwrap();
    assert_eq!(config, PropsyncConfig::default());
}

#[test]
fn env_bool_that_does_not_parse_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate_env(home.path());

    std::env::set_var("PROPSYNC_REJECT_UNVERSIONED", "sometimes");
    let dir = tempfile::tempdir().unwrap();
    let config = PropsyncConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.applier.reject_unversioned, None);

    isolate_env(home.path());
}

#[test]
fn invalid_toml_syntax_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate_env(home.path());

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("propsync.toml"), "this is not valid toml {{{{").unwrap();

    match PropsyncConfig::load(dir.path(), None) {
        Err(ConfigError::ParseError { path, .. }) => assert!(path.ends_with("propsync.toml")),
        other => panic!("Expected ParseError, got: {:?}", other),
    }
}

#[test]
fn unknown_log_format_fails_validation() {
    let config = PropsyncConfig::from_toml("[logging]\nformat = \"xml\"\n").unwrap();
    match PropsyncConfig::validate(&config) {
        Err(ConfigError::ValidationFailed { field, .. }) => assert_eq!(field, "logging.format"),
        other => panic!("Expected ValidationFailed, got: {:?}", other),
    }
}

#[test]
fn schema_entries_extend_builtin_schema() {
    let config = PropsyncConfig::from_toml(
        r#"
[[schema.properties]]
path = "settings.interface.font_size"
kind = "one_of"
values = ["s", "m", "l"]
default = "m"

[[schema.properties]]
path = "settings.sound.alerts"
kind = "string"
"#,
    )
    .unwrap();
    PropsyncConfig::validate(&config).unwrap();

    let schema = config.build_schema().unwrap();
    let font_size = PropertyPath::parse("settings.interface.font_size").unwrap();
    assert_eq!(schema.default_for(&font_size), Some(PropertyValue::from("m")));
    assert!(schema.check(&font_size, &"xl".into()).is_err());

    // Redeclared built-in now accepts any string.
    let alerts = PropertyPath::parse("settings.sound.alerts").unwrap();
    assert!(schema.check(&alerts, &"chime".into()).is_ok());
    assert_eq!(schema.default_for(&alerts), None);

    // Built-ins are still there.
    assert!(schema.contains(&PropertyPath::parse("privacy.receipt_mode").unwrap()));
}

#[test]
fn builtin_schema_can_be_disabled() {
    let config = PropsyncConfig::from_toml(
        "[schema]\nbuiltin = false\n\n[[schema.properties]]\npath = \"a.b\"\nkind = \"bool\"\n",
    )
    .unwrap();
    let schema = config.build_schema().unwrap();
    assert_eq!(schema.len(), 1);
}

#[test]
fn bad_schema_entries_are_rejected() {
    let cases = [
        ("path = \"a..b\"\nkind = \"bool\"", "schema.properties[0].path"),
        ("path = \"a.b\"\nkind = \"colour\"", "schema.properties[0].kind"),
        ("path = \"a.b\"\nkind = \"one_of\"", "schema.properties[0].values"),
        ("path = \"a.b\"\nkind = \"bool\"\ndefault = \"yes\"", "schema.properties[0].default"),
        ("path = \"a.b\"\nkind = \"one_of\"\nvalues = [[1]]", "schema.properties[0].values"),
    ];
    for (entry, expected_field) in cases {
        let toml = format!("[[schema.properties]]\n{entry}\n");
        let config = PropsyncConfig::from_toml(&toml).unwrap();
        match PropsyncConfig::validate(&config) {
            Err(ConfigError::ValidationFailed { field, .. }) => {
                assert_eq!(field, expected_field, "for entry {entry:?}")
            }
            other => panic!("Expected ValidationFailed for {entry:?}, got: {other:?}"),
        }
    }
}

#[test]
fn overlapping_schema_paths_are_rejected() {
    let cases = [
        // Two config entries, one nested inside the other.
        (
            "[schema]\nbuiltin = false\n\n[[schema.properties]]\npath = \"a\"\nkind = \"bool\"\n\n[[schema.properties]]\npath = \"a.b\"\nkind = \"bool\"\n",
            "schema.properties[0].path",
        ),
        // A config entry above built-in leaves.
        (
            "[[schema.properties]]\npath = \"settings.sound\"\nkind = \"string\"\n",
            "schema.properties[0].path",
        ),
        // A config entry below a built-in leaf.
        (
            "[[schema.properties]]\npath = \"privacy.receipt_mode.extra\"\nkind = \"bool\"\n",
            "schema.properties[0].path",
        ),
    ];
    for (toml, expected_field) in cases {
        let config = PropsyncConfig::from_toml(toml).unwrap();
        match PropsyncConfig::validate(&config) {
            Err(ConfigError::ValidationFailed { field, message }) => {
                assert_eq!(field, expected_field, "for config {toml:?}");
                assert!(message.contains("overlaps"), "message: {message}");
            }
            other => panic!("Expected ValidationFailed for {toml:?}, got: {other:?}"),
        }
        assert!(config.build_schema().is_err());
    }

    // Without the built-ins, `settings.sound` is an ordinary leaf.
    let config = PropsyncConfig::from_toml(
        "[schema]\nbuiltin = false\n\n[[schema.properties]]\npath = \"settings.sound\"\nkind = \"string\"\n",
    )
    .unwrap();
    PropsyncConfig::validate(&config).unwrap();
}

#[test]
fn config_toml_roundtrip() {
    let config = PropsyncConfig::from_toml(
        r#"
[applier]
reject_unversioned = true

[logging]
level = "debug"

[[schema.properties]]
path = "settings.interface.font_size"
kind = "integer"
default = 12
"#,
    )
    .unwrap();
    let toml_str = config.to_toml().unwrap();
    let roundtripped = PropsyncConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped, config);
}
