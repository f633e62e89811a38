// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::engine::ReadinessMarker;
use crate::types::{DeploymentMode, MarkerStreams};

/// Configuration exactly as read from a TOML file.
///
/// ```toml
/// [server]
/// name = "Uvicorn"
/// host = "127.0.0.1"
/// port = 8008
///
/// [executable]
/// name = "deepread_ai_server"
/// mode = "packaged"
///
/// [launch]
/// startup_timeout = "15s"
/// grace_period = "3s"
/// ```
///
/// All sections are optional. Nothing here has been validated; convert into
/// [`ConfigFile`] with `ConfigFile::try_from` before use.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub executable: ExecutableSection,

    #[serde(default)]
    pub frontend: FrontendSection,

    #[serde(default)]
    pub launch: LaunchSection,
}

/// `[server]` section: where the backend listens and how it announces it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Server name printed at the start of the readiness line
    /// (`"<name> running on http://<host>:<port>"`).
    #[serde(default = "default_server_name")]
    pub name: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Optional regex replacing the literal readiness marker.
    #[serde(default)]
    pub readiness_pattern: Option<String>,

    #[serde(default)]
    pub marker_streams: MarkerStreams,
}

fn default_server_name() -> String {
    "Uvicorn".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8008
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            host: default_host(),
            port: default_port(),
            readiness_pattern: None,
            marker_streams: MarkerStreams::default(),
        }
    }
}

/// `[executable]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutableSection {
    /// File stem of the backend executable; the platform suffix is added
    /// during resolution.
    #[serde(default = "default_executable_name")]
    pub name: String,

    #[serde(default)]
    pub mode: DeploymentMode,

    /// Bundled resources root used in packaged mode.
    #[serde(default = "default_resources_dir")]
    pub resources_dir: String,

    /// Build output directory used in development mode.
    #[serde(default = "default_development_dir")]
    pub development_dir: String,
}

fn default_executable_name() -> String {
    "deepread_ai_server".to_string()
}

fn default_resources_dir() -> String {
    "resources".to_string()
}

fn default_development_dir() -> String {
    "backend/dist".to_string()
}

impl Default for ExecutableSection {
    fn default() -> Self {
        Self {
            name: default_executable_name(),
            mode: DeploymentMode::default(),
            resources_dir: default_resources_dir(),
            development_dir: default_development_dir(),
        }
    }
}

/// `[frontend]` section: entry point handed to the UI surface.
#[derive(Debug, Clone, Deserialize)]
pub struct FrontendSection {
    /// Relative to `executable.resources_dir`.
    #[serde(default = "default_packaged_index")]
    pub packaged_index: String,

    /// Relative to the application root.
    #[serde(default = "default_development_index")]
    pub development_index: String,
}

fn default_packaged_index() -> String {
    "frontend_dist/index.html".to_string()
}

fn default_development_index() -> String {
    "frontend/deepread-ui/dist/index.html".to_string()
}

impl Default for FrontendSection {
    fn default() -> Self {
        Self {
            packaged_index: default_packaged_index(),
            development_index: default_development_index(),
        }
    }
}

/// `[launch]` section, durations as written in the file (e.g. `"15s"`).
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchSection {
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout: String,

    #[serde(default = "default_grace_period")]
    pub grace_period: String,
}

fn default_startup_timeout() -> String {
    "15s".to_string()
}

fn default_grace_period() -> String {
    "3s".to_string()
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            startup_timeout: default_startup_timeout(),
            grace_period: default_grace_period(),
        }
    }
}

/// Parsed launch timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchTimings {
    /// How long to wait for the readiness marker.
    pub startup_timeout: Duration,
    /// How long to wait after the graceful signal before forcing termination.
    pub grace_period: Duration,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so holders can rely on durations being parsed and non-zero and on the
/// readiness marker being compiled.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub executable: ExecutableSection,
    pub frontend: FrontendSection,
    pub launch: LaunchTimings,
    /// Built from `[server]`; a `readiness_pattern` is compiled once, here.
    pub readiness: ReadinessMarker,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        server: ServerSection,
        executable: ExecutableSection,
        frontend: FrontendSection,
        launch: LaunchTimings,
        readiness: ReadinessMarker,
    ) -> Self {
        Self {
            server,
            executable,
            frontend,
            launch,
            readiness,
        }
    }
}
