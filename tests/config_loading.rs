// tests/config_loading.rs

mod common;
use crate::common::{ConfigFileBuilder, init_tracing};

use std::error::Error;
use std::fs;
use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use bootwatch::apply_overrides;
use bootwatch::cli::CliArgs;
use bootwatch::config::{load_and_validate, load_or_default, parse_duration};
use bootwatch::errors::BootwatchError;
use bootwatch::types::{DeploymentMode, MarkerStreams};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn empty_file_yields_defaults() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("Bootwatch.toml");
    fs::write(&path, "")?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.server.name, "Uvicorn");
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 8008);
    assert_eq!(cfg.server.marker_streams, MarkerStreams::Any);
    assert!(cfg.server.readiness_pattern.is_none());
    assert_eq!(cfg.executable.name, "deepread_ai_server");
    assert_eq!(cfg.executable.mode, DeploymentMode::Development);
    assert_eq!(cfg.launch.startup_timeout, Duration::from_secs(15));
    assert_eq!(cfg.launch.grace_period, Duration::from_secs(3));

    Ok(())
}

#[test]
fn full_file_is_parsed() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Bootwatch.toml");
    fs::write(
        &path,
        r#"
[server]
name = "Hypercorn"
host = "0.0.0.0"
port = 9000
marker_streams = "stdout"

[executable]
name = "api"
mode = "packaged"
resources_dir = "Contents/Resources"

[frontend]
packaged_index = "web/index.html"

[launch]
startup_timeout = "30s"
grace_period = "500ms"
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.server.name, "Hypercorn");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.marker_streams, MarkerStreams::Stdout);
    assert_eq!(cfg.executable.name, "api");
    assert_eq!(cfg.executable.mode, DeploymentMode::Packaged);
    assert_eq!(cfg.executable.resources_dir, "Contents/Resources");
    assert_eq!(cfg.executable.development_dir, "backend/dist");
    assert_eq!(cfg.frontend.packaged_index, "web/index.html");
    assert_eq!(cfg.launch.startup_timeout, Duration::from_secs(30));
    assert_eq!(cfg.launch.grace_period, Duration::from_millis(500));

    Ok(())
}

#[test]
fn unknown_mode_is_a_toml_error() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Bootwatch.toml");
    fs::write(&path, "[executable]\nmode = \"staging\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, BootwatchError::TomlError(_)), "got {err:?}");

    Ok(())
}

#[test]
fn zero_durations_are_rejected() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Bootwatch.toml");
    fs::write(&path, "[launch]\nstartup_timeout = \"0s\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    match err {
        BootwatchError::ConfigError(msg) => assert!(msg.contains("startup_timeout"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }

    Ok(())
}

#[test]
fn malformed_duration_names_the_field() {
    let raw = ConfigFileBuilder::new().grace_period("soon").build_raw();
    let err = bootwatch::config::ConfigFile::try_from(raw).unwrap_err();
    match err {
        BootwatchError::ConfigError(msg) => assert!(msg.contains("[launch].grace_period"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn invalid_server_settings_are_rejected() {
    let cases = [
        ConfigFileBuilder::new().server("", "127.0.0.1", 8008).build_raw(),
        ConfigFileBuilder::new().server("Uvicorn", " ", 8008).build_raw(),
        ConfigFileBuilder::new().server("Uvicorn", "127.0.0.1", 0).build_raw(),
        ConfigFileBuilder::new().readiness_pattern("running on (").build_raw(),
        ConfigFileBuilder::new().executable("bin/server").build_raw(),
        ConfigFileBuilder::new().executable("").build_raw(),
    ];

    for raw in cases {
        let debug = format!("{raw:?}");
        let res = bootwatch::config::ConfigFile::try_from(raw);
        assert!(
            matches!(res, Err(BootwatchError::ConfigError(_))),
            "expected ConfigError for {debug}"
        );
    }
}

#[test]
fn bad_readiness_pattern_names_the_field() {
    let raw = ConfigFileBuilder::new().readiness_pattern("running on (").build_raw();
    match bootwatch::config::ConfigFile::try_from(raw) {
        Err(BootwatchError::ConfigError(msg)) => {
            assert!(msg.contains("[server].readiness_pattern"), "{msg}")
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn missing_file_uses_defaults_only_when_allowed() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("absent.toml");

    let cfg = load_or_default(&path, true)?;
    assert_eq!(cfg.server.port, 8008);

    let err = load_or_default(&path, false).unwrap_err();
    assert!(matches!(err, BootwatchError::IoError(_)), "got {err:?}");

    Ok(())
}

#[test]
fn parse_duration_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration("15s"), Ok(Duration::from_secs(15)));
    assert_eq!(parse_duration(" 3 S "), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));

    assert!(parse_duration("").is_err());
    assert!(parse_duration("15").is_err());
    assert!(parse_duration("s").is_err());
    assert!(parse_duration("3d").is_err());
    assert!(parse_duration("18446744073709551615h").is_err());
}

#[test]
fn cli_overrides_replace_launch_timings() -> TestResult {
    let cfg = ConfigFileBuilder::new().build();
    let args = CliArgs::try_parse_from([
        "bootwatch",
        "--startup-timeout",
        "500ms",
        "--grace-period",
        "1s",
    ])?;

    let cfg = apply_overrides(cfg, &args)?;

    assert_eq!(cfg.launch.startup_timeout, Duration::from_millis(500));
    assert_eq!(cfg.launch.grace_period, Duration::from_secs(1));

    Ok(())
}

#[test]
fn cli_override_of_zero_is_rejected() -> TestResult {
    let cfg = ConfigFileBuilder::new().build();
    let args = CliArgs::try_parse_from(["bootwatch", "--grace-period", "0ms"])?;

    let err = apply_overrides(cfg, &args).unwrap_err();
    match err {
        BootwatchError::ConfigError(msg) => assert!(msg.contains("--grace-period"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }

    Ok(())
}
