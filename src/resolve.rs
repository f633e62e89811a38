// src/resolve.rs

//! Executable and working-directory resolution.
//!
//! Pure path arithmetic: nothing here touches the filesystem. Whether the
//! executable actually exists is checked by the launcher right before it
//! spawns.

use std::path::{Path, PathBuf};

use crate::config::ConfigFile;
use crate::types::{DeploymentMode, Platform};

/// Directory below the resources root that holds the packaged backend.
pub const PACKAGED_BACKEND_DIR: &str = "backend_exe";

/// Where things live for one installation of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLayout {
    /// Application root; relative entries below are joined onto it.
    pub app_root: PathBuf,
    /// Bundled resources directory (packaged mode).
    pub resources_dir: PathBuf,
    /// Build output directory (development mode).
    pub development_dir: PathBuf,
    /// Executable file stem, without platform suffix.
    pub executable_name: String,
    /// Frontend entry point, relative to `resources_dir`.
    pub packaged_index: PathBuf,
    /// Frontend entry point, relative to `app_root`.
    pub development_index: PathBuf,
}

impl AppLayout {
    pub fn from_config(cfg: &ConfigFile, app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            resources_dir: PathBuf::from(&cfg.executable.resources_dir),
            development_dir: PathBuf::from(&cfg.executable.development_dir),
            executable_name: cfg.executable.name.clone(),
            packaged_index: PathBuf::from(&cfg.frontend.packaged_index),
            development_index: PathBuf::from(&cfg.frontend.development_index),
        }
    }

    fn rooted(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.app_root.join(path)
        }
    }
}

/// Result of resolution for a given mode and platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExecutable {
    pub path: PathBuf,
    pub working_dir: PathBuf,
    /// Frontend entry point handed to the UI surface once the backend is up.
    pub frontend_index: PathBuf,
}

/// Compute the backend executable path, its working directory and the
/// frontend entry point.
///
/// - Packaged: `<resources>/backend_exe/<name><suffix>`, working directory
///   `<resources>/backend_exe`.
/// - Development: `<development_dir>/<name><suffix>`, working directory
///   `<development_dir>`.
pub fn resolve_executable(
    mode: DeploymentMode,
    platform: Platform,
    layout: &AppLayout,
) -> ResolvedExecutable {
    let file_name = format!("{}{}", layout.executable_name, platform.executable_suffix());

    let (working_dir, frontend_index) = match mode {
        DeploymentMode::Packaged => {
            let resources = layout.rooted(&layout.resources_dir);
            (
                resources.join(PACKAGED_BACKEND_DIR),
                resources.join(&layout.packaged_index),
            )
        }
        DeploymentMode::Development => (
            layout.rooted(&layout.development_dir),
            layout.rooted(&layout.development_index),
        ),
    };

    ResolvedExecutable {
        path: working_dir.join(file_name),
        working_dir,
        frontend_index,
    }
}
