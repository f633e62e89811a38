// src/exec/process.rs

//! Handle types for a spawned backend process.
//!
//! A freshly launched process is a [`ProcessHandle`]: its two output streams
//! ([`ProcessOutput`]) plus a [`ProcessRef`] for exit observation and
//! signalling. The launch supervisor takes the output for itself; the
//! `ProcessRef` is cheap to clone and is what the runtime and the shutdown
//! sequencer hold on to.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tokio::sync::{mpsc, watch};

/// Capacity of the per-stream output channels.
pub const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Which output stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Published by whoever owns the child once it is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitState {
    Running,
    /// Exit code, `None` when terminated by a signal.
    Exited(Option<i32>),
    /// The OS reported an error while waiting on the process.
    Errored(String),
}

impl ExitState {
    pub fn is_running(&self) -> bool {
        matches!(self, ExitState::Running)
    }
}

/// Termination signals, by intent rather than by OS number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    /// Cooperative shutdown request (`SIGTERM`).
    Graceful,
    /// Unconditional termination (`SIGKILL`).
    Forceful,
}

impl fmt::Display for TermSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSignal::Graceful => f.write_str("graceful"),
            TermSignal::Forceful => f.write_str("forceful"),
        }
    }
}

/// Signal delivery for one process.
///
/// Production uses [`crate::exec::signal::ChildControl`]; tests provide
/// fakes that record what was sent.
pub trait ProcessControl: Send + Sync + fmt::Debug {
    fn signal(&self, signal: TermSignal) -> Result<()>;
}

/// The two output streams of a process, as independent chunk sequences.
///
/// Chunks are arbitrary text fragments, not lines. A stream is `None` if
/// it was never piped.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: Option<mpsc::Receiver<String>>,
    pub stderr: Option<mpsc::Receiver<String>>,
}

impl ProcessOutput {
    /// Consume and drop everything still arriving on both streams.
    ///
    /// The readers log each chunk themselves; this only keeps the channels
    /// (and therefore the OS pipes) flowing once nobody scans them anymore.
    pub fn spawn_drain(self) -> tokio::task::JoinHandle<()> {
        let ProcessOutput { stdout, stderr } = self;
        tokio::spawn(async move {
            let out = async {
                if let Some(mut rx) = stdout {
                    while rx.recv().await.is_some() {}
                }
            };
            let err = async {
                if let Some(mut rx) = stderr {
                    while rx.recv().await.is_some() {}
                }
            };
            tokio::join!(out, err);
        })
    }
}

/// A just-launched process: output streams plus the shareable reference.
#[derive(Debug)]
pub struct ProcessHandle {
    pub output: ProcessOutput,
    pub process: ProcessRef,
}

impl ProcessHandle {
    pub fn new(
        pid: Option<u32>,
        stdout: Option<mpsc::Receiver<String>>,
        stderr: Option<mpsc::Receiver<String>>,
        exit: watch::Receiver<ExitState>,
        control: Arc<dyn ProcessControl>,
    ) -> Self {
        Self {
            output: ProcessOutput { stdout, stderr },
            process: ProcessRef {
                pid,
                exit,
                control,
                sent: Arc::new(SentSignals::default()),
            },
        }
    }

    pub fn into_parts(self) -> (ProcessOutput, ProcessRef) {
        (self.output, self.process)
    }
}

#[derive(Debug, Default)]
struct SentSignals {
    graceful: AtomicBool,
    forceful: AtomicBool,
}

impl SentSignals {
    fn flag(&self, signal: TermSignal) -> &AtomicBool {
        match signal {
            TermSignal::Graceful => &self.graceful,
            TermSignal::Forceful => &self.forceful,
        }
    }
}

/// Exit observation and signalling for a process.
///
/// Clones share the record of which signals were already sent, so each
/// signal reaches the process at most once however many holders try.
#[derive(Debug, Clone)]
pub struct ProcessRef {
    pid: Option<u32>,
    exit: watch::Receiver<ExitState>,
    control: Arc<dyn ProcessControl>,
    sent: Arc<SentSignals>,
}

impl ProcessRef {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn exit_state(&self) -> ExitState {
        self.exit.borrow().clone()
    }

    pub fn has_exited(&self) -> bool {
        !self.exit.borrow().is_running()
    }

    /// Wait until the exit notification has been published.
    pub async fn wait_exit(&self) -> ExitState {
        let mut rx = self.exit.clone();
        match rx.wait_for(|state| !state.is_running()).await {
            Ok(state) => (*state).clone(),
            Err(_) => ExitState::Errored("exit notifier closed without a result".to_string()),
        }
    }

    /// Send `signal` unless the process already exited or this signal was
    /// already sent through any clone.
    ///
    /// Returns whether the signal was actually delivered to the control.
    pub fn send_signal(&self, signal: TermSignal) -> Result<bool> {
        if self.has_exited() {
            return Ok(false);
        }
        if self.sent.flag(signal).swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        self.control.signal(signal)?;
        Ok(true)
    }

    pub fn signal_sent(&self, signal: TermSignal) -> bool {
        self.sent.flag(signal).load(Ordering::SeqCst)
    }
}
