use std::fmt;

use serde::Deserialize;

/// Where the backend executable comes from.
///
/// - `Packaged`: shipped inside the application's bundled resources directory.
/// - `Development`: taken from the local build output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Packaged,
    Development,
}

impl Default for DeploymentMode {
    fn default() -> Self {
        DeploymentMode::Development
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Packaged => f.write_str("packaged"),
            DeploymentMode::Development => f.write_str("development"),
        }
    }
}

/// Host platform, as far as executable naming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// Suffix appended to executable file names.
    pub fn executable_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::MacOs | Platform::Linux | Platform::Other => "",
        }
    }
}

/// Which output streams may carry the readiness marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStreams {
    /// Marker accepted on stdout or stderr (some servers log to stderr).
    Any,
    /// Marker accepted on stdout only.
    Stdout,
}

impl Default for MarkerStreams {
    fn default() -> Self {
        MarkerStreams::Any
    }
}
