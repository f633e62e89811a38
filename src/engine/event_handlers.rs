// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, info, warn};

use crate::engine::activation::{ActivationDecision, decide_activation};
use crate::engine::{RuntimeOptions, SupervisorState};
use crate::errors::LaunchError;
use crate::exec::{ExitState, ShutdownOutcome};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Launch the backend as attempt number `attempt`.
    StartLaunch { attempt: u64 },
    /// Present the UI surface against the running backend.
    OpenSurface,
    /// Show the operator why the launch failed.
    ReportFailure(LaunchError),
    /// Stop whatever is left of a failed attempt's process.
    DiscardProcess,
    /// Run the graceful-then-forceful shutdown of the backend.
    BeginShutdown,
    /// Leave the event loop.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn run(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn idle() -> Self {
        Self::run(Vec::new())
    }

    fn exit(mut commands: Vec<CoreCommand>) -> Self {
        commands.push(CoreCommand::RequestExit);
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Mutable lifecycle bookkeeping owned by `CoreRuntime`.
#[derive(Debug)]
pub struct Lifecycle {
    pub state: SupervisorState,
    /// Number of the most recent launch attempt (1-based; 0 = none yet).
    pub attempt: u64,
    pub shutting_down: bool,
    /// The current attempt's process exited before the attempt settled.
    pub exited_while_starting: bool,
    /// Failure of the initial attempt, returned as the application's error.
    pub fatal: Option<LaunchError>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: SupervisorState::Idle,
            attempt: 0,
            shutting_down: false,
            exited_while_starting: false,
            fatal: None,
        }
    }
}

impl Lifecycle {
    fn transition(&mut self, to: SupervisorState) {
        if self.state != to {
            info!(from = ?self.state, ?to, attempt = self.attempt, "backend state changed");
            self.state = to;
        }
    }
}

/// Handle a request for the UI surface.
///
/// Never starts a second attempt while one is still starting.
pub fn handle_activate(lc: &mut Lifecycle) -> CoreStep {
    if lc.shutting_down {
        debug!("activation during shutdown; ignoring");
        return CoreStep::idle();
    }

    match decide_activation(lc.state) {
        ActivationDecision::Launch => {
            lc.attempt += 1;
            lc.exited_while_starting = false;
            if lc.attempt > 1 {
                info!(attempt = lc.attempt, previous = ?lc.state, "backend not running on activation; restarting");
            }
            lc.transition(SupervisorState::Starting);
            CoreStep::run(vec![CoreCommand::StartLaunch {
                attempt: lc.attempt,
            }])
        }
        ActivationDecision::Present => CoreStep::run(vec![CoreCommand::OpenSurface]),
        ActivationDecision::AlreadyStarting => {
            debug!(attempt = lc.attempt, "launch already in flight; activation deduplicated");
            CoreStep::idle()
        }
        ActivationDecision::Ignore => CoreStep::idle(),
    }
}

/// Handle the terminal outcome of a launch attempt.
///
/// - Outcomes of attempts other than the current one, or arriving when we
///   are no longer `Starting` (e.g. shutdown began mid-launch), are stale.
/// - Failure of the very first attempt ends the application: there is no
///   backend to present. A failed restart leaves it running in `Failed`.
pub fn handle_launch_settled(
    lc: &mut Lifecycle,
    options: &RuntimeOptions,
    attempt: u64,
    result: Result<(), LaunchError>,
) -> CoreStep {
    if attempt != lc.attempt || lc.state != SupervisorState::Starting {
        debug!(
            attempt,
            current = lc.attempt,
            state = ?lc.state,
            ok = result.is_ok(),
            "stale launch outcome; ignoring"
        );
        return CoreStep::idle();
    }

    match result {
        Ok(()) if lc.exited_while_starting => {
            // Marker read from output drained after the process was gone.
            warn!(attempt, "backend reported readiness but has already exited");
            lc.transition(SupervisorState::Stopped);
            if options.exit_when_ready {
                lc.shutting_down = true;
                CoreStep::exit(Vec::new())
            } else {
                CoreStep::idle()
            }
        }
        Ok(()) => {
            lc.transition(SupervisorState::Running);
            if options.exit_when_ready {
                info!("backend ready; shutting down as requested");
                lc.shutting_down = true;
                lc.transition(SupervisorState::Stopping);
                CoreStep::run(vec![CoreCommand::BeginShutdown])
            } else {
                CoreStep::run(vec![CoreCommand::OpenSurface])
            }
        }
        Err(err) => {
            lc.transition(SupervisorState::Failed);
            let commands = vec![
                CoreCommand::ReportFailure(err.clone()),
                CoreCommand::DiscardProcess,
            ];
            if attempt == 1 {
                lc.fatal = Some(err);
                lc.shutting_down = true;
                CoreStep::exit(commands)
            } else {
                CoreStep::run(commands)
            }
        }
    }
}

/// Handle the backend process exiting.
///
/// While starting, the attempt itself reports failure; the exit is only
/// remembered so that a late readiness outcome is not taken as `Running`.
/// While stopping, shutdown completion reports it.
pub fn handle_backend_exited(lc: &mut Lifecycle, attempt: u64, state: ExitState) -> CoreStep {
    if attempt != lc.attempt {
        debug!(attempt, current = lc.attempt, "exit of an earlier attempt's process");
        return CoreStep::idle();
    }

    match lc.state {
        SupervisorState::Running => {
            warn!(attempt, ?state, "backend exited while running");
            lc.transition(SupervisorState::Stopped);
        }
        SupervisorState::Starting => {
            debug!(attempt, ?state, "backend exited before the attempt settled");
            lc.exited_while_starting = true;
        }
        _ => {}
    }
    CoreStep::idle()
}

/// Handle a request to terminate the application. Repeats are ignored.
pub fn handle_shutdown_requested(lc: &mut Lifecycle) -> CoreStep {
    if lc.shutting_down {
        debug!("shutdown already in progress");
        return CoreStep::idle();
    }
    lc.shutting_down = true;

    match lc.state {
        SupervisorState::Starting | SupervisorState::Running => {
            lc.transition(SupervisorState::Stopping);
            CoreStep::run(vec![CoreCommand::BeginShutdown])
        }
        SupervisorState::Idle | SupervisorState::Stopped | SupervisorState::Failed => {
            CoreStep::exit(Vec::new())
        }
        SupervisorState::Stopping => CoreStep::idle(),
    }
}

pub fn handle_shutdown_finished(lc: &mut Lifecycle, outcome: ShutdownOutcome) -> CoreStep {
    info!(?outcome, "backend shutdown finished");
    lc.transition(SupervisorState::Stopped);
    CoreStep::exit(Vec::new())
}
