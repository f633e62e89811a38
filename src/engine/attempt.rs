// src/engine/attempt.rs

//! Async shell around [`LaunchCore`]: races the output streams, the
//! readiness deadline and the exit notification of one launched process.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::engine::launch::{LaunchCore, LaunchEvent, LaunchSettings, LaunchVerdict};
use crate::errors::LaunchError;
use crate::exec::{ExitState, ProcessHandle, ProcessOutput, ProcessRef, StreamKind};

/// How long to keep collecting output once the process has exited.
///
/// The exit notification can overtake the last chunks still sitting in the
/// pipes; failure diagnostics should include them.
pub const EXIT_DRAIN_WINDOW: Duration = Duration::from_millis(500);

/// Supervises a single launch attempt from `Starting` to `Running` or
/// `Failed`.
#[derive(Debug)]
pub struct LaunchSupervisor {
    core: LaunchCore,
    attempt: u64,
}

enum Next {
    Chunk(StreamKind, Option<String>),
    Deadline,
    Exit(ExitState),
}

impl LaunchSupervisor {
    pub fn new(settings: LaunchSettings, attempt: u64) -> Self {
        Self {
            core: LaunchCore::new(settings),
            attempt,
        }
    }

    /// Wait for `handle` to become ready.
    ///
    /// Resolves exactly once. On success the remaining output is drained in
    /// the background and the process reference is returned. On failure the
    /// process may still be alive (e.g. after a timeout); stopping it is the
    /// caller's job.
    pub async fn supervise(mut self, handle: ProcessHandle) -> Result<ProcessRef, LaunchError> {
        let (output, process) = handle.into_parts();
        let ProcessOutput {
            mut stdout,
            mut stderr,
        } = output;

        let started = Instant::now();
        let timeout = self.core.settings().startup_timeout;
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        info!(
            attempt = self.attempt,
            pid = ?process.pid(),
            ?timeout,
            marker = %self.core.settings().marker,
            "waiting for backend readiness"
        );

        let verdict = loop {
            let next = tokio::select! {
                chunk = next_chunk(&mut stdout) => Next::Chunk(StreamKind::Stdout, chunk),
                chunk = next_chunk(&mut stderr) => Next::Chunk(StreamKind::Stderr, chunk),
                _ = &mut deadline => Next::Deadline,
                state = process.wait_exit() => Next::Exit(state),
            };

            let event = match next {
                Next::Chunk(stream, Some(chunk)) => LaunchEvent::Output { stream, chunk },
                Next::Chunk(stream, None) => {
                    debug!(attempt = self.attempt, %stream, "output stream closed");
                    close(stream, &mut stdout, &mut stderr);
                    continue;
                }
                Next::Deadline => LaunchEvent::DeadlineElapsed,
                Next::Exit(state) => {
                    if let Some(verdict) = self.drain_after_exit(&mut stdout, &mut stderr).await {
                        break verdict;
                    }
                    exit_event(state)
                }
            };

            if let Some(verdict) = self.core.step(event) {
                break verdict;
            }
        };

        match verdict {
            LaunchVerdict::Ready => {
                info!(
                    attempt = self.attempt,
                    pid = ?process.pid(),
                    elapsed = ?started.elapsed(),
                    "backend is ready"
                );
                ProcessOutput { stdout, stderr }.spawn_drain();
                Ok(process)
            }
            LaunchVerdict::Failed(err) => {
                error!(
                    attempt = self.attempt,
                    pid = ?process.pid(),
                    elapsed = ?started.elapsed(),
                    error = %err,
                    "backend failed to start"
                );
                Err(err)
            }
        }
    }

    /// Feed output still in flight after exit into the core, for at most
    /// [`EXIT_DRAIN_WINDOW`]. Returns a verdict if that output settles the
    /// attempt (a marker printed just before exiting).
    async fn drain_after_exit(
        &mut self,
        stdout: &mut Option<mpsc::Receiver<String>>,
        stderr: &mut Option<mpsc::Receiver<String>>,
    ) -> Option<LaunchVerdict> {
        let window = tokio::time::sleep(EXIT_DRAIN_WINDOW);
        tokio::pin!(window);

        while stdout.is_some() || stderr.is_some() {
            let (stream, chunk) = tokio::select! {
                chunk = next_chunk(stdout) => (StreamKind::Stdout, chunk),
                chunk = next_chunk(stderr) => (StreamKind::Stderr, chunk),
                _ = &mut window => {
                    debug!(attempt = self.attempt, "output still open after exit; not waiting any longer");
                    break;
                }
            };

            match chunk {
                Some(chunk) => {
                    if let Some(verdict) = self.core.step(LaunchEvent::Output { stream, chunk }) {
                        return Some(verdict);
                    }
                }
                None => close(stream, stdout, stderr),
            }
        }

        None
    }
}

/// Receive from an optional stream; a missing stream never yields.
async fn next_chunk(rx: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn close(
    stream: StreamKind,
    stdout: &mut Option<mpsc::Receiver<String>>,
    stderr: &mut Option<mpsc::Receiver<String>>,
) {
    match stream {
        StreamKind::Stdout => *stdout = None,
        StreamKind::Stderr => *stderr = None,
    }
}

fn exit_event(state: ExitState) -> LaunchEvent {
    match state {
        ExitState::Exited(code) => LaunchEvent::Exited { code },
        ExitState::Errored(message) => LaunchEvent::ProcessError { message },
        // `wait_exit` never yields `Running`.
        ExitState::Running => LaunchEvent::ProcessError {
            message: "exit notification reported a running process".to_string(),
        },
    }
}
