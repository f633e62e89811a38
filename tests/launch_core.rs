// tests/launch_core.rs

mod common;
use crate::common::{DEFAULT_MARKER, launch_settings};

use std::time::Duration;

use proptest::prelude::*;

use bootwatch::engine::{
    LaunchCore, LaunchEvent, LaunchVerdict, SettledAs, SettlementGuard, SupervisorState,
};
use bootwatch::errors::LaunchError;
use bootwatch::exec::StreamKind;
use bootwatch::types::MarkerStreams;

fn core() -> LaunchCore {
    LaunchCore::new(launch_settings(Duration::from_secs(15)))
}

fn out(stream: StreamKind, chunk: &str) -> LaunchEvent {
    LaunchEvent::Output {
        stream,
        chunk: chunk.to_string(),
    }
}

#[test]
fn marker_settles_ready_and_discards_output() {
    let mut core = core();

    assert!(core.step(out(StreamKind::Stdout, "INFO: Started server process\n")).is_none());
    assert_eq!(core.state(), SupervisorState::Starting);

    let verdict = core.step(out(StreamKind::Stdout, &format!("INFO: {DEFAULT_MARKER}\n")));

    assert!(matches!(verdict, Some(LaunchVerdict::Ready)));
    assert_eq!(core.settled(), Some(SettledAs::Ready));
    assert_eq!(core.state(), SupervisorState::Running);
    assert!(core.output().is_empty());
}

#[test]
fn marker_on_stderr_counts_by_default() {
    let mut core = core();
    let verdict = core.step(out(StreamKind::Stderr, DEFAULT_MARKER));
    assert!(matches!(verdict, Some(LaunchVerdict::Ready)));
}

#[test]
fn stdout_only_ignores_marker_on_stderr() {
    let mut settings = launch_settings(Duration::from_secs(15));
    settings.marker_streams = MarkerStreams::Stdout;
    let mut core = LaunchCore::new(settings);

    assert!(core.step(out(StreamKind::Stderr, DEFAULT_MARKER)).is_none());
    assert!(core.output().stderr.contains(DEFAULT_MARKER));

    let verdict = core.step(LaunchEvent::DeadlineElapsed);
    match verdict {
        Some(LaunchVerdict::Failed(LaunchError::Timeout { output, .. })) => {
            assert!(output.stderr.contains(DEFAULT_MARKER));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn marker_split_between_streams_does_not_count() {
    let mut core = core();
    let (head, tail) = DEFAULT_MARKER.split_at(10);

    assert!(core.step(out(StreamKind::Stdout, head)).is_none());
    assert!(core.step(out(StreamKind::Stderr, tail)).is_none());
    assert_eq!(core.state(), SupervisorState::Starting);
}

#[test]
fn deadline_failure_carries_output_and_timeout() {
    let mut core = core();
    core.step(out(StreamKind::Stdout, "loading models...\n"));
    core.step(out(StreamKind::Stderr, "WARNING: slow disk\n"));

    match core.step(LaunchEvent::DeadlineElapsed) {
        Some(LaunchVerdict::Failed(LaunchError::Timeout { after, output })) => {
            assert_eq!(after, Duration::from_secs(15));
            assert_eq!(output.stdout, "loading models...\n");
            assert_eq!(output.stderr, "WARNING: slow disk\n");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(core.state(), SupervisorState::Failed);
}

#[test]
fn exit_before_marker_is_premature() {
    let mut core = core();
    core.step(out(
        StreamKind::Stderr,
        "ImportError: No module named 'fastapi'\n",
    ));

    match core.step(LaunchEvent::Exited { code: Some(1) }) {
        Some(LaunchVerdict::Failed(err @ LaunchError::PrematureExit { .. })) => {
            let text = err.to_string();
            assert!(text.contains("code 1"), "{text}");
            assert!(text.contains("ImportError"), "{text}");
            assert_eq!(err.title(), "Backend Error");
        }
        other => panic!("expected premature exit, got {other:?}"),
    }
}

#[test]
fn process_error_is_reported_with_message() {
    let mut core = core();
    match core.step(LaunchEvent::ProcessError {
        message: "wait failed".to_string(),
    }) {
        Some(LaunchVerdict::Failed(LaunchError::RuntimeProcess { message, .. })) => {
            assert_eq!(message, "wait failed");
        }
        other => panic!("expected process error, got {other:?}"),
    }
    assert_eq!(core.settled(), Some(SettledAs::ProcessError));
}

#[test]
fn nothing_changes_after_settlement() {
    let mut core = core();
    assert!(matches!(
        core.step(out(StreamKind::Stdout, DEFAULT_MARKER)),
        Some(LaunchVerdict::Ready)
    ));

    assert!(core.step(LaunchEvent::DeadlineElapsed).is_none());
    assert!(core.step(LaunchEvent::Exited { code: Some(0) }).is_none());
    assert!(core.step(out(StreamKind::Stdout, DEFAULT_MARKER)).is_none());
    assert!(core.output().is_empty());
    assert_eq!(core.settled(), Some(SettledAs::Ready));
}

#[test]
fn late_marker_after_timeout_is_ignored() {
    let mut core = core();
    assert!(matches!(
        core.step(LaunchEvent::DeadlineElapsed),
        Some(LaunchVerdict::Failed(LaunchError::Timeout { .. }))
    ));
    assert!(core.step(out(StreamKind::Stdout, DEFAULT_MARKER)).is_none());
    assert_eq!(core.state(), SupervisorState::Failed);
}

#[test]
fn settlement_guard_keeps_first_outcome() {
    let mut guard = SettlementGuard::new();
    assert!(!guard.is_settled());
    assert!(guard.settle(SettledAs::TimedOut));
    assert!(!guard.settle(SettledAs::Ready));
    assert!(!guard.settle(SettledAs::ExitedEarly));
    assert_eq!(guard.outcome(), Some(SettledAs::TimedOut));
}

#[derive(Debug, Clone)]
enum Ev {
    Noise(StreamKind),
    Marker(StreamKind),
    Deadline,
    Exit(Option<i32>),
    Error,
}

fn stream() -> impl Strategy<Value = StreamKind> {
    prop_oneof![Just(StreamKind::Stdout), Just(StreamKind::Stderr)]
}

fn ev() -> impl Strategy<Value = Ev> {
    prop_oneof![
        4 => stream().prop_map(Ev::Noise),
        1 => stream().prop_map(Ev::Marker),
        1 => Just(Ev::Deadline),
        1 => proptest::option::of(0..3i32).prop_map(Ev::Exit),
        1 => Just(Ev::Error),
    ]
}

fn expected(ev: &Ev) -> Option<SettledAs> {
    match ev {
        Ev::Noise(_) => None,
        Ev::Marker(_) => Some(SettledAs::Ready),
        Ev::Deadline => Some(SettledAs::TimedOut),
        Ev::Exit(_) => Some(SettledAs::ExitedEarly),
        Ev::Error => Some(SettledAs::ProcessError),
    }
}

fn to_event(ev: &Ev) -> LaunchEvent {
    match ev {
        Ev::Noise(s) => out(*s, "INFO: still booting\n"),
        Ev::Marker(s) => out(*s, &format!("INFO: {DEFAULT_MARKER} (Press CTRL+C to quit)\n")),
        Ev::Deadline => LaunchEvent::DeadlineElapsed,
        Ev::Exit(code) => LaunchEvent::Exited { code: *code },
        Ev::Error => LaunchEvent::ProcessError {
            message: "boom".to_string(),
        },
    }
}

proptest! {
    /// Whatever the interleaving, the first decisive event settles the
    /// attempt, exactly one verdict is produced, and it never changes.
    #[test]
    fn first_decisive_event_wins(events in proptest::collection::vec(ev(), 0..40)) {
        let mut core = core();
        let mut verdicts = Vec::new();

        for e in &events {
            if let Some(v) = core.step(to_event(e)) {
                verdicts.push(v);
            }
        }

        let first = events.iter().find_map(expected);
        prop_assert_eq!(core.settled(), first);
        prop_assert_eq!(verdicts.len(), usize::from(first.is_some()));

        if let Some(v) = verdicts.first() {
            prop_assert_eq!(matches!(v, LaunchVerdict::Ready), first == Some(SettledAs::Ready));
        }
        if first.is_some() {
            prop_assert!(core.output().is_empty());
        }
    }
}
