// tests/lifecycle_core.rs

use std::path::PathBuf;

use bootwatch::engine::{
    ActivationDecision, CoreCommand, CoreRuntime, RuntimeEvent, RuntimeOptions, SupervisorState,
    decide_activation,
};
use bootwatch::errors::LaunchError;
use bootwatch::exec::{ExitState, ShutdownOutcome};

fn not_found() -> LaunchError {
    LaunchError::NotFound {
        path: PathBuf::from("/missing/backend"),
    }
}

fn settled(attempt: u64, result: Result<(), LaunchError>) -> RuntimeEvent {
    RuntimeEvent::LaunchSettled { attempt, result }
}

fn names(commands: &[CoreCommand]) -> Vec<&'static str> {
    commands
        .iter()
        .map(|c| match c {
            CoreCommand::StartLaunch { .. } => "start",
            CoreCommand::OpenSurface => "open",
            CoreCommand::ReportFailure(_) => "report",
            CoreCommand::DiscardProcess => "discard",
            CoreCommand::BeginShutdown => "shutdown",
            CoreCommand::RequestExit => "exit",
        })
        .collect()
}

#[test]
fn activation_decisions_per_state() {
    assert_eq!(decide_activation(SupervisorState::Idle), ActivationDecision::Launch);
    assert_eq!(decide_activation(SupervisorState::Stopped), ActivationDecision::Launch);
    assert_eq!(decide_activation(SupervisorState::Failed), ActivationDecision::Launch);
    assert_eq!(decide_activation(SupervisorState::Running), ActivationDecision::Present);
    assert_eq!(
        decide_activation(SupervisorState::Starting),
        ActivationDecision::AlreadyStarting
    );
    assert_eq!(decide_activation(SupervisorState::Stopping), ActivationDecision::Ignore);
}

#[test]
fn repeated_activation_while_starting_launches_once() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());

    let step = core.step(RuntimeEvent::Activate);
    assert!(matches!(
        step.commands.as_slice(),
        [CoreCommand::StartLaunch { attempt: 1 }]
    ));
    assert_eq!(core.state(), SupervisorState::Starting);

    for _ in 0..3 {
        let step = core.step(RuntimeEvent::Activate);
        assert!(step.commands.is_empty());
        assert!(step.keep_running);
    }
    assert_eq!(core.attempts(), 1);

    let step = core.step(settled(1, Ok(())));
    assert_eq!(names(&step.commands), vec!["open"]);
    assert_eq!(core.state(), SupervisorState::Running);

    let step = core.step(RuntimeEvent::Activate);
    assert_eq!(names(&step.commands), vec!["open"]);
    assert_eq!(core.attempts(), 1);
}

#[test]
fn initial_failure_ends_the_application() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    core.step(RuntimeEvent::Activate);

    let step = core.step(settled(1, Err(not_found())));

    assert_eq!(names(&step.commands), vec!["report", "discard", "exit"]);
    assert!(!step.keep_running);
    assert_eq!(core.state(), SupervisorState::Failed);
    assert!(matches!(core.fatal_error(), Some(LaunchError::NotFound { .. })));
}

#[test]
fn backend_exit_allows_restart_on_activation() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    core.step(RuntimeEvent::Activate);
    core.step(settled(1, Ok(())));

    let step = core.step(RuntimeEvent::BackendExited {
        attempt: 1,
        state: ExitState::Exited(Some(0)),
    });
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), SupervisorState::Stopped);

    let step = core.step(RuntimeEvent::Activate);
    assert!(matches!(
        step.commands.as_slice(),
        [CoreCommand::StartLaunch { attempt: 2 }]
    ));

    // A failed restart is reported but keeps the application alive.
    let step = core.step(settled(2, Err(not_found())));
    assert_eq!(names(&step.commands), vec!["report", "discard"]);
    assert!(step.keep_running);
    assert!(core.fatal_error().is_none());
    assert_eq!(core.state(), SupervisorState::Failed);

    let step = core.step(RuntimeEvent::Activate);
    assert!(matches!(
        step.commands.as_slice(),
        [CoreCommand::StartLaunch { attempt: 3 }]
    ));
}

#[test]
fn stale_outcomes_are_ignored() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    core.step(RuntimeEvent::Activate);
    core.step(settled(1, Ok(())));
    core.step(RuntimeEvent::BackendExited {
        attempt: 1,
        state: ExitState::Exited(Some(0)),
    });
    core.step(RuntimeEvent::Activate);

    // Late news about attempt 1 must not touch attempt 2.
    let step = core.step(settled(1, Err(not_found())));
    assert!(step.commands.is_empty());
    let step = core.step(RuntimeEvent::BackendExited {
        attempt: 1,
        state: ExitState::Exited(None),
    });
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), SupervisorState::Starting);
}

#[test]
fn shutdown_is_idempotent() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    core.step(RuntimeEvent::Activate);
    core.step(settled(1, Ok(())));

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert_eq!(names(&step.commands), vec!["shutdown"]);
    assert_eq!(core.state(), SupervisorState::Stopping);

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(step.commands.is_empty());
    assert!(step.keep_running);

    // Activation during shutdown does nothing.
    let step = core.step(RuntimeEvent::Activate);
    assert!(step.commands.is_empty());

    let step = core.step(RuntimeEvent::ShutdownFinished {
        outcome: ShutdownOutcome::Exited(ExitState::Exited(Some(0))),
    });
    assert!(!step.keep_running);
    assert_eq!(core.state(), SupervisorState::Stopped);
}

#[test]
fn shutdown_while_starting_stops_the_attempt() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    core.step(RuntimeEvent::Activate);

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert_eq!(names(&step.commands), vec!["shutdown"]);

    // The attempt's own failure arrives after shutdown began: ignored.
    let step = core.step(settled(1, Err(not_found())));
    assert!(step.commands.is_empty());
    assert!(core.fatal_error().is_none());
}

#[test]
fn shutdown_with_nothing_running_exits_directly() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert_eq!(names(&step.commands), vec!["exit"]);
    assert!(!step.keep_running);
}

#[test]
fn exit_when_ready_shuts_down_instead_of_presenting() {
    let mut core = CoreRuntime::new(RuntimeOptions {
        exit_when_ready: true,
    });
    core.step(RuntimeEvent::Activate);

    let step = core.step(settled(1, Ok(())));
    assert_eq!(names(&step.commands), vec!["shutdown"]);
    assert_eq!(core.state(), SupervisorState::Stopping);
}

#[test]
fn readiness_after_exit_leaves_backend_stopped() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    core.step(RuntimeEvent::Activate);

    let step = core.step(RuntimeEvent::BackendExited {
        attempt: 1,
        state: ExitState::Exited(Some(1)),
    });
    assert!(step.commands.is_empty());
    assert_eq!(core.state(), SupervisorState::Starting);

    // The marker was read from output drained after the exit.
    let step = core.step(settled(1, Ok(())));
    assert!(step.commands.is_empty());
    assert!(step.keep_running);
    assert_eq!(core.state(), SupervisorState::Stopped);

    let step = core.step(RuntimeEvent::Activate);
    assert!(matches!(
        step.commands.as_slice(),
        [CoreCommand::StartLaunch { attempt: 2 }]
    ));

    // The flag belongs to attempt 1 only.
    let step = core.step(settled(2, Ok(())));
    assert_eq!(names(&step.commands), vec!["open"]);
    assert_eq!(core.state(), SupervisorState::Running);
}
