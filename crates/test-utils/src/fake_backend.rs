#![allow(dead_code)]

//! Scriptable stand-in for a backend process.
//!
//! The test keeps a [`FakeProcess`] and decides what the "backend" prints,
//! when it exits and how it reacts to termination signals; the code under
//! test sees an ordinary `ProcessHandle`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use bootwatch::errors::LaunchError;
use bootwatch::exec::{ExitState, ProcessBackend, ProcessControl, ProcessHandle, TermSignal};
use bootwatch::resolve::ResolvedExecutable;

/// What the fake does when asked to terminate gracefully.
#[derive(Debug, Clone, Copy)]
pub enum OnGraceful {
    /// Exit with code 0 after the given delay.
    ExitAfter(Duration),
    /// Keep running; only a forceful signal stops it.
    Ignore,
}

type SignalLog = Arc<Mutex<Vec<(TermSignal, Instant)>>>;

#[derive(Debug)]
struct FakeControl {
    on_graceful: OnGraceful,
    exit: Arc<watch::Sender<ExitState>>,
    signals: SignalLog,
}

impl ProcessControl for FakeControl {
    fn signal(&self, signal: TermSignal) -> anyhow::Result<()> {
        self.signals
            .lock()
            .unwrap()
            .push((signal, Instant::now()));

        match (signal, self.on_graceful) {
            (TermSignal::Graceful, OnGraceful::ExitAfter(delay)) => {
                let exit = Arc::clone(&self.exit);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    publish_exit(&exit, ExitState::Exited(Some(0)));
                });
            }
            (TermSignal::Graceful, OnGraceful::Ignore) => {}
            (TermSignal::Forceful, _) => publish_exit(&self.exit, ExitState::Exited(None)),
        }
        Ok(())
    }
}

/// First exit wins, like a real process.
fn publish_exit(exit: &watch::Sender<ExitState>, state: ExitState) {
    exit.send_if_modified(|current| {
        if current.is_running() {
            *current = state;
            true
        } else {
            false
        }
    });
}

/// Test-side controls for one fake process.
#[derive(Debug, Clone)]
pub struct FakeProcess {
    stdout: mpsc::Sender<String>,
    stderr: mpsc::Sender<String>,
    exit: Arc<watch::Sender<ExitState>>,
    signals: SignalLog,
}

impl FakeProcess {
    /// Create a fake process and the handle the code under test consumes.
    pub fn spawn(on_graceful: OnGraceful) -> (ProcessHandle, FakeProcess) {
        let (stdout_tx, stdout_rx) = mpsc::channel(64);
        let (stderr_tx, stderr_rx) = mpsc::channel(64);
        let (exit_tx, exit_rx) = watch::channel(ExitState::Running);
        let exit = Arc::new(exit_tx);
        let signals: SignalLog = Arc::new(Mutex::new(Vec::new()));

        let control = Arc::new(FakeControl {
            on_graceful,
            exit: Arc::clone(&exit),
            signals: Arc::clone(&signals),
        });
        let handle = ProcessHandle::new(Some(4242), Some(stdout_rx), Some(stderr_rx), exit_rx, control);

        let fake = FakeProcess {
            stdout: stdout_tx,
            stderr: stderr_tx,
            exit,
            signals,
        };
        (handle, fake)
    }

    pub async fn write_stdout(&self, chunk: &str) {
        let _ = self.stdout.send(chunk.to_string()).await;
    }

    pub async fn write_stderr(&self, chunk: &str) {
        let _ = self.stderr.send(chunk.to_string()).await;
    }

    /// Exit on its own with `code`.
    pub fn exit(&self, code: Option<i32>) {
        publish_exit(&self.exit, ExitState::Exited(code));
    }

    /// Report an OS-level error instead of an exit status.
    pub fn fail(&self, message: &str) {
        publish_exit(&self.exit, ExitState::Errored(message.to_string()));
    }

    pub fn exit_state(&self) -> ExitState {
        self.exit.borrow().clone()
    }

    pub fn signals(&self) -> Vec<TermSignal> {
        self.signals.lock().unwrap().iter().map(|(s, _)| *s).collect()
    }

    /// Signals with the (virtual) time they were received.
    pub fn signal_log(&self) -> Vec<(TermSignal, Instant)> {
        self.signals.lock().unwrap().clone()
    }
}

/// `ProcessBackend` handing out [`FakeProcess`]es.
///
/// Every successful launch sends the new process's controls on the
/// receiver returned by [`FakeBackend::new`].
#[derive(Debug, Clone)]
pub struct FakeBackend {
    on_graceful: OnGraceful,
    fail_with: Option<LaunchError>,
    launched: mpsc::UnboundedSender<FakeProcess>,
    launches: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn new(on_graceful: OnGraceful) -> (Self, mpsc::UnboundedReceiver<FakeProcess>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Self {
            on_graceful,
            fail_with: None,
            launched: tx,
            launches: Arc::new(AtomicUsize::new(0)),
        };
        (backend, rx)
    }

    /// Every launch fails with `err`.
    pub fn failing(err: LaunchError) -> Self {
        let (mut backend, _rx) = Self::new(OnGraceful::Ignore);
        backend.fail_with = Some(err);
        backend
    }

    /// Number of launch calls so far, failed ones included.
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl ProcessBackend for FakeBackend {
    fn launch(&self, _target: &ResolvedExecutable) -> Result<ProcessHandle, LaunchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if let Some(ref err) = self.fail_with {
            return Err(err.clone());
        }
        let (handle, fake) = FakeProcess::spawn(self.on_graceful);
        let _ = self.launched.send(fake);
        Ok(handle)
    }
}
