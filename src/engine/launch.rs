// src/engine/launch.rs

//! Pure state machine for one launch attempt.
//!
//! [`LaunchCore`] consumes [`LaunchEvent`]s in arrival order and settles the
//! attempt exactly once: the first of readiness, deadline, exit or process
//! error wins, and everything after that is ignored. It has no channels,
//! timers or processes; the async shell in [`super::attempt`] feeds it.

use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ConfigFile;
use crate::engine::SupervisorState;
use crate::engine::accumulator::CapturedOutput;
use crate::engine::readiness::{ReadinessMarker, scan_appended};
use crate::engine::settle::SettlementGuard;
use crate::errors::LaunchError;
use crate::exec::StreamKind;
use crate::types::MarkerStreams;

/// What an attempt needs to know to decide readiness.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub marker: ReadinessMarker,
    pub marker_streams: MarkerStreams,
    pub startup_timeout: Duration,
}

impl LaunchSettings {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            marker: cfg.readiness.clone(),
            marker_streams: cfg.server.marker_streams,
            startup_timeout: cfg.launch.startup_timeout,
        }
    }
}

/// One input to the launch state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    /// A new chunk arrived on one of the output streams.
    Output { stream: StreamKind, chunk: String },
    /// The readiness deadline fired.
    DeadlineElapsed,
    /// The process exited.
    Exited { code: Option<i32> },
    /// The OS reported an error on the running process.
    ProcessError { message: String },
}

/// Which trigger settled the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettledAs {
    Ready,
    TimedOut,
    ExitedEarly,
    ProcessError,
}

/// Terminal result of an attempt, produced exactly once.
#[derive(Debug, Clone)]
pub enum LaunchVerdict {
    Ready,
    Failed(LaunchError),
}

#[derive(Debug)]
pub struct LaunchCore {
    settings: LaunchSettings,
    output: CapturedOutput,
    guard: SettlementGuard<SettledAs>,
}

impl LaunchCore {
    pub fn new(settings: LaunchSettings) -> Self {
        Self {
            settings,
            output: CapturedOutput::default(),
            guard: SettlementGuard::new(),
        }
    }

    pub fn settings(&self) -> &LaunchSettings {
        &self.settings
    }

    /// Output accumulated so far (emptied once the attempt settles).
    pub fn output(&self) -> &CapturedOutput {
        &self.output
    }

    pub fn settled(&self) -> Option<SettledAs> {
        self.guard.outcome()
    }

    pub fn state(&self) -> SupervisorState {
        match self.guard.outcome() {
            None => SupervisorState::Starting,
            Some(SettledAs::Ready) => SupervisorState::Running,
            Some(_) => SupervisorState::Failed,
        }
    }

    /// Apply one event. Returns the verdict only for the event that settles
    /// the attempt; `None` before and forever after.
    pub fn step(&mut self, event: LaunchEvent) -> Option<LaunchVerdict> {
        if let Some(settled) = self.guard.outcome() {
            match event {
                LaunchEvent::Output { stream, .. } => {
                    trace!(%stream, ?settled, "launch settled; chunk not scanned");
                }
                other => debug!(event = ?other, ?settled, "launch already settled; ignoring event"),
            }
            return None;
        }

        match event {
            LaunchEvent::Output { stream, chunk } => self.handle_output(stream, &chunk),
            LaunchEvent::DeadlineElapsed => {
                let after = self.settings.startup_timeout;
                self.fail(SettledAs::TimedOut, |output| LaunchError::Timeout {
                    after,
                    output,
                })
            }
            LaunchEvent::Exited { code } => {
                self.fail(SettledAs::ExitedEarly, |output| LaunchError::PrematureExit {
                    code,
                    output,
                })
            }
            LaunchEvent::ProcessError { message } => {
                self.fail(SettledAs::ProcessError, |output| {
                    LaunchError::RuntimeProcess { message, output }
                })
            }
        }
    }

    fn handle_output(&mut self, stream: StreamKind, chunk: &str) -> Option<LaunchVerdict> {
        let at = self.output.append(stream, chunk);

        if !self.scans(stream) {
            return None;
        }
        if !scan_appended(self.output.buffer(stream), at, &self.settings.marker) {
            return None;
        }

        debug!(%stream, marker = %self.settings.marker, "readiness marker detected");
        if self.guard.settle(SettledAs::Ready) {
            self.output = CapturedOutput::default();
            Some(LaunchVerdict::Ready)
        } else {
            None
        }
    }

    fn scans(&self, stream: StreamKind) -> bool {
        match self.settings.marker_streams {
            MarkerStreams::Any => true,
            MarkerStreams::Stdout => stream == StreamKind::Stdout,
        }
    }

    fn fail(
        &mut self,
        settled: SettledAs,
        error: impl FnOnce(CapturedOutput) -> LaunchError,
    ) -> Option<LaunchVerdict> {
        if !self.guard.settle(settled) {
            return None;
        }
        let output = std::mem::take(&mut self.output);
        Some(LaunchVerdict::Failed(error(output)))
    }
}
