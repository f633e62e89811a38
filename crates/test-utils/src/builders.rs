#![allow(dead_code)]

use std::time::Duration;

use bootwatch::config::{ConfigFile, RawConfigFile};
use bootwatch::engine::{LaunchSettings, ReadinessMarker};
use bootwatch::types::{DeploymentMode, MarkerStreams};

use crate::DEFAULT_MARKER;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn server(mut self, name: &str, host: &str, port: u16) -> Self {
        self.config.server.name = name.to_string();
        self.config.server.host = host.to_string();
        self.config.server.port = port;
        self
    }

    pub fn readiness_pattern(mut self, pattern: &str) -> Self {
        self.config.server.readiness_pattern = Some(pattern.to_string());
        self
    }

    pub fn marker_streams(mut self, streams: MarkerStreams) -> Self {
        self.config.server.marker_streams = streams;
        self
    }

    pub fn executable(mut self, name: &str) -> Self {
        self.config.executable.name = name.to_string();
        self
    }

    pub fn mode(mut self, mode: DeploymentMode) -> Self {
        self.config.executable.mode = mode;
        self
    }

    pub fn resources_dir(mut self, dir: &str) -> Self {
        self.config.executable.resources_dir = dir.to_string();
        self
    }

    pub fn development_dir(mut self, dir: &str) -> Self {
        self.config.executable.development_dir = dir.to_string();
        self
    }

    pub fn startup_timeout(mut self, value: &str) -> Self {
        self.config.launch.startup_timeout = value.to_string();
        self
    }

    pub fn grace_period(mut self, value: &str) -> Self {
        self.config.launch.grace_period = value.to_string();
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Launch settings with the default literal marker.
pub fn launch_settings(startup_timeout: Duration) -> LaunchSettings {
    LaunchSettings {
        marker: ReadinessMarker::Literal(DEFAULT_MARKER.to_string()),
        marker_streams: MarkerStreams::Any,
        startup_timeout,
    }
}
