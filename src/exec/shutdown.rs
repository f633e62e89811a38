// src/exec/shutdown.rs

//! Graceful-then-forceful termination of the backend.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::exec::process::{ExitState, ProcessRef, TermSignal};

/// Phase of the shutdown sub-machine.
///
/// `Graceful` sends the cooperative signal and arms the grace timer;
/// `Forceful` sends the unconditional signal and finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPhase {
    Graceful,
    Forceful,
}

/// How a shutdown ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// No process, or it had already exited. Nothing was sent.
    NotRunning,
    /// Exited before the grace period elapsed.
    Exited(ExitState),
    /// Grace period elapsed; forceful termination was requested.
    Forced,
}

/// Sends the graceful signal, waits up to `grace_period` for exit, then
/// escalates.
#[derive(Debug, Clone, Copy)]
pub struct ShutdownSequencer {
    grace_period: Duration,
}

impl ShutdownSequencer {
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// Terminate `process`.
    ///
    /// Safe to call repeatedly and from several places at once: signals are
    /// deduplicated through the shared [`ProcessRef`], and a process that has
    /// already exited is left alone.
    pub async fn shutdown(&self, process: Option<&ProcessRef>) -> ShutdownOutcome {
        let Some(process) = process else {
            debug!("shutdown requested but no backend process is attached");
            return ShutdownOutcome::NotRunning;
        };
        if process.has_exited() {
            debug!(pid = ?process.pid(), "backend already exited; nothing to stop");
            return ShutdownOutcome::NotRunning;
        }

        let mut phase = StopPhase::Graceful;
        loop {
            match phase {
                StopPhase::Graceful => {
                    info!(pid = ?process.pid(), "terminating backend process");
                    send(process, TermSignal::Graceful);

                    let grace = tokio::time::sleep(self.grace_period);
                    tokio::pin!(grace);

                    tokio::select! {
                        state = process.wait_exit() => {
                            info!(pid = ?process.pid(), ?state, "backend stopped within grace period");
                            return ShutdownOutcome::Exited(state);
                        }
                        _ = &mut grace => {
                            phase = StopPhase::Forceful;
                        }
                    }
                }
                StopPhase::Forceful => {
                    if process.has_exited() {
                        return ShutdownOutcome::Exited(process.exit_state());
                    }
                    info!(
                        pid = ?process.pid(),
                        grace_period = ?self.grace_period,
                        "backend did not stop after graceful signal; forcing termination"
                    );
                    send(process, TermSignal::Forceful);
                    return ShutdownOutcome::Forced;
                }
            }
        }
    }
}

/// Shutdown-path signal errors are logged, never propagated.
fn send(process: &ProcessRef, signal: TermSignal) {
    match process.send_signal(signal) {
        Ok(true) => debug!(pid = ?process.pid(), %signal, "signal sent"),
        Ok(false) => debug!(pid = ?process.pid(), %signal, "signal already sent or process gone"),
        Err(e) => warn!(pid = ?process.pid(), %signal, error = %e, "failed to signal backend"),
    }
}
