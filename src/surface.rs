// src/surface.rs

//! The UI surface that consumes the supervisor's result.
//!
//! The real application opens a window on the frontend once the backend is
//! up; here that collaborator is a trait so the runtime does not care what
//! is on the other side.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::errors::LaunchError;

/// Host/port the backend serves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    pub host: String,
    pub port: u16,
}

impl BackendEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for BackendEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Whatever presents the application once its backend is running.
pub trait Surface: Send {
    /// Present the UI against a ready backend. May be called again on
    /// re-activation.
    fn open(&mut self, endpoint: &BackendEndpoint, frontend_index: &Path) -> Result<()>;

    /// Tell the operator why the backend did not come up.
    fn report_failure(&mut self, error: &LaunchError);
}

/// Surface for terminal use: prints where the backend and frontend are.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Surface for ConsoleSurface {
    fn open(&mut self, endpoint: &BackendEndpoint, frontend_index: &Path) -> Result<()> {
        if !frontend_index.exists() {
            warn!(path = %frontend_index.display(), "frontend entry point not found");
        }
        println!("backend ready at {endpoint}");
        println!("frontend: {}", frontend_index.display());
        Ok(())
    }

    fn report_failure(&mut self, error: &LaunchError) {
        eprintln!("{}: {error}", error.title());
    }
}
