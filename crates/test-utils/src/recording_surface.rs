#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bootwatch::errors::LaunchError;
use bootwatch::surface::{BackendEndpoint, Surface};

/// What the runtime asked the surface to do.
#[derive(Debug, Clone)]
pub enum SurfaceCall {
    Opened {
        url: String,
        frontend_index: PathBuf,
    },
    Failed(LaunchError),
}

/// A `Surface` that records every call instead of showing anything.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Opened { .. }))
            .count()
    }

    pub fn failures(&self) -> Vec<LaunchError> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Failed(err) => Some(err),
                SurfaceCall::Opened { .. } => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn open(&mut self, endpoint: &BackendEndpoint, frontend_index: &Path) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(SurfaceCall::Opened {
            url: endpoint.url(),
            frontend_index: frontend_index.to_path_buf(),
        });
        Ok(())
    }

    fn report_failure(&mut self, error: &LaunchError) {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Failed(error.clone()));
    }
}
