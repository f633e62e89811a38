// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The runtime launches the backend through a [`ProcessBackend`] rather than
//! calling `tokio::process` directly, so tests can swap in a fake process
//! whose output, exit and signal handling they script.
//!
//! - [`TokioProcessBackend`] is the production implementation.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::errors::LaunchError;
use crate::exec::output::spawn_chunk_reader;
use crate::exec::process::{
    ExitState, OUTPUT_CHANNEL_CAPACITY, ProcessHandle, StreamKind, TermSignal,
};
use crate::exec::signal::{self, ChildControl};
use crate::fs::{FileSystem, RealFileSystem};
use crate::resolve::ResolvedExecutable;

/// Trait abstracting how the backend process is started.
pub trait ProcessBackend: Send + Sync {
    /// Start the executable described by `target`.
    ///
    /// Must fail with [`LaunchError::NotFound`] when the executable does not
    /// exist (checked before spawning) and with [`LaunchError::Spawn`] when
    /// the OS refuses to create the process.
    fn launch(&self, target: &ResolvedExecutable) -> Result<ProcessHandle, LaunchError>;
}

/// Real backend: `tokio::process` with both output streams piped.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessBackend<F: FileSystem = RealFileSystem> {
    fs: F,
}

impl TokioProcessBackend<RealFileSystem> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FileSystem> TokioProcessBackend<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> ProcessBackend for TokioProcessBackend<F> {
    fn launch(&self, target: &ResolvedExecutable) -> Result<ProcessHandle, LaunchError> {
        info!(
            path = %target.path.display(),
            working_dir = %target.working_dir.display(),
            "starting backend process"
        );

        if !self.fs.exists(&target.path) {
            return Err(LaunchError::NotFound {
                path: target.path.clone(),
            });
        }
        if !self.fs.is_dir(&target.working_dir) {
            warn!(
                working_dir = %target.working_dir.display(),
                "backend working directory does not exist; spawn will likely fail"
            );
        }

        let mut cmd = Command::new(&target.path);
        cmd.current_dir(&target.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| LaunchError::Spawn {
            path: target.path.clone(),
            source: Arc::new(e),
        })?;

        let pid = child.id();
        info!(?pid, "backend process spawned");

        let stdout = child.stdout.take().map(|out| {
            let (tx, rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
            spawn_chunk_reader(out, StreamKind::Stdout, pid, tx);
            rx
        });
        let stderr = child.stderr.take().map(|err| {
            let (tx, rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
            spawn_chunk_reader(err, StreamKind::Stderr, pid, tx);
            rx
        });

        let (exit_tx, exit_rx) = watch::channel(ExitState::Running);
        let (signal_tx, signal_rx) = mpsc::channel(2);
        spawn_reaper(child, pid, exit_tx, signal_rx);

        let control = Arc::new(ChildControl::new(signal_tx));
        Ok(ProcessHandle::new(pid, stdout, stderr, exit_rx, control))
    }
}

/// Own the child until it exits, publishing the result exactly once.
///
/// Signal requests arrive over `signal_rx` and are delivered here, so they
/// can never race with the child being reaped.
fn spawn_reaper(
    mut child: Child,
    pid: Option<u32>,
    exit_tx: watch::Sender<ExitState>,
    mut signal_rx: mpsc::Receiver<TermSignal>,
) {
    tokio::spawn(async move {
        let state = loop {
            tokio::select! {
                status = child.wait() => {
                    break match status {
                        Ok(status) => ExitState::Exited(status.code()),
                        Err(e) => ExitState::Errored(e.to_string()),
                    };
                }
                Some(request) = signal_rx.recv() => {
                    info!(?pid, signal = ?request, "signalling backend process");
                    if let Err(e) = signal::deliver(&mut child, request) {
                        signal::log_failure(pid, request, &e);
                    }
                }
            }
        };

        let _ = exit_tx.send(state.clone());
        info!(?pid, ?state, "backend process exited");
    });
}
