// src/errors.rs

//! Crate-wide error types.
//!
//! [`BootwatchError`] is what the public entry points return. Launch failures
//! are described by [`LaunchError`], which always carries whatever output the
//! backend produced so the operator gets something actionable.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::engine::CapturedOutput;

#[derive(Error, Debug)]
pub enum BootwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Backend launch failed: {0}")]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Terminal failure of a single launch attempt.
///
/// None of these are retried automatically.
#[derive(Error, Debug, Clone)]
pub enum LaunchError {
    /// The resolved executable does not exist (checked before spawning).
    #[error("backend executable not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The OS refused to create the process.
    #[error("failed to spawn backend process {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// No readiness marker was seen before the deadline.
    #[error(
        "timed out after {after:?} waiting for the backend to become ready; \
         the port might be in use or the backend failed silently\n{output}"
    )]
    Timeout {
        after: Duration,
        output: CapturedOutput,
    },

    /// The process exited before the readiness marker was seen.
    #[error("backend exited prematurely with {}\n{output}", describe_code(*code))]
    PrematureExit {
        code: Option<i32>,
        output: CapturedOutput,
    },

    /// The OS reported an error on the already-spawned process.
    #[error("backend process error: {message}\n{output}")]
    RuntimeProcess {
        message: String,
        output: CapturedOutput,
    },
}

impl LaunchError {
    /// Short title used when presenting the failure.
    pub fn title(&self) -> &'static str {
        match self {
            LaunchError::NotFound { .. } => "Backend Not Found",
            LaunchError::Spawn { .. } => "Backend Spawn Error",
            LaunchError::Timeout { .. } => "Backend Timeout",
            LaunchError::PrematureExit { .. } | LaunchError::RuntimeProcess { .. } => {
                "Backend Error"
            }
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, BootwatchError>;
