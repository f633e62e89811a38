// src/exec/signal.rs

//! Signal delivery to a real child process.

use anyhow::{Result, anyhow};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::exec::process::{ProcessControl, TermSignal};

/// Control for a child spawned by [`crate::exec::TokioProcessBackend`].
///
/// Requests are forwarded to the reaper task, which owns the `Child` and
/// is the only place that reaps it. A signal is therefore only ever sent
/// to a pid that still belongs to our child.
#[derive(Debug)]
pub struct ChildControl {
    signal_tx: mpsc::Sender<TermSignal>,
}

impl ChildControl {
    pub fn new(signal_tx: mpsc::Sender<TermSignal>) -> Self {
        Self { signal_tx }
    }
}

impl ProcessControl for ChildControl {
    fn signal(&self, signal: TermSignal) -> Result<()> {
        match self.signal_tx.try_send(signal) {
            // Each signal is sent at most once, so a full queue means a
            // request is already pending.
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Closed(_)) => {
                Err(anyhow!("backend process reaper has already finished"))
            }
        }
    }
}

/// Deliver `signal` to `child`, which has not been reaped yet.
///
/// - Graceful: `SIGTERM` via `nix` on Unix. Other platforms have no
///   cooperative signal, so it falls back to the forceful path.
/// - Forceful: `Child::start_kill`.
pub(crate) fn deliver(child: &mut Child, signal: TermSignal) -> Result<()> {
    match signal {
        TermSignal::Graceful => graceful(child),
        TermSignal::Forceful => Ok(child.start_kill()?),
    }
}

#[cfg(unix)]
fn graceful(child: &mut Child) -> Result<()> {
    use anyhow::Context;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    // `id()` is `None` once the child has been reaped.
    let pid = child
        .id()
        .ok_or_else(|| anyhow!("backend process has already been reaped"))?;
    let raw = i32::try_from(pid).with_context(|| format!("pid {pid} out of range"))?;
    kill(Pid::from_raw(raw), Signal::SIGTERM)
        .with_context(|| format!("sending SIGTERM to pid {pid}"))
}

#[cfg(not(unix))]
fn graceful(child: &mut Child) -> Result<()> {
    warn!(
        pid = ?child.id(),
        "no graceful termination signal on this platform; terminating directly"
    );
    Ok(child.start_kill()?)
}

/// Log a failed delivery; the shutdown sequence escalates on its own.
pub(crate) fn log_failure(pid: Option<u32>, signal: TermSignal, err: &anyhow::Error) {
    warn!(?pid, ?signal, error = %err, "failed to signal backend process");
}
