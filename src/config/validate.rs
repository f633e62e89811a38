// src/config/validate.rs

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, LaunchSection, LaunchTimings, RawConfigFile};
use crate::engine::ReadinessMarker;
use crate::errors::{BootwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BootwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let launch = parse_launch_timings(&raw.launch)?;
        let readiness = ReadinessMarker::from_config(&raw.server)?;
        Ok(ConfigFile::new_unchecked(
            raw.server,
            raw.executable,
            raw.frontend,
            launch,
            readiness,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_server(cfg)?;
    validate_executable(cfg)?;
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    let server = &cfg.server;

    if server.name.trim().is_empty() {
        return Err(BootwatchError::ConfigError(
            "[server].name must not be empty".to_string(),
        ));
    }
    if server.host.trim().is_empty() {
        return Err(BootwatchError::ConfigError(
            "[server].host must not be empty".to_string(),
        ));
    }
    if server.port == 0 {
        return Err(BootwatchError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_executable(cfg: &RawConfigFile) -> Result<()> {
    let name = cfg.executable.name.trim();
    if name.is_empty() {
        return Err(BootwatchError::ConfigError(
            "[executable].name must not be empty".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(BootwatchError::ConfigError(format!(
            "[executable].name must be a bare file name, got '{}'",
            name
        )));
    }
    Ok(())
}

/// Parse `[launch]` durations; both must be non-zero.
pub fn parse_launch_timings(launch: &LaunchSection) -> Result<LaunchTimings> {
    let startup_timeout = parse_positive("startup_timeout", &launch.startup_timeout)?;
    let grace_period = parse_positive("grace_period", &launch.grace_period)?;
    Ok(LaunchTimings {
        startup_timeout,
        grace_period,
    })
}

fn parse_positive(field: &str, value: &str) -> Result<std::time::Duration> {
    let dur = parse_duration(value).map_err(|e| {
        BootwatchError::ConfigError(format!("[launch].{field}: {e}"))
    })?;
    if dur.is_zero() {
        return Err(BootwatchError::ConfigError(format!(
            "[launch].{field} must be greater than zero (got '{value}')"
        )));
    }
    Ok(dur)
}
