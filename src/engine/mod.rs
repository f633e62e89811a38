// src/engine/mod.rs

//! Supervision engine for bootwatch.
//!
//! Two layers, each split into a pure core and an async shell:
//!
//! - one launch attempt: [`launch`] decides readiness/failure from events,
//!   [`attempt`] races output, deadline and exit to feed it;
//! - the application lifecycle: [`core`] and [`event_handlers`] decide what
//!   to do on activation, settlement, backend exit and shutdown, while
//!   [`runtime`] performs it (launching, surfacing, signalling).
//!
//! The pure parts have no Tokio types and are unit-testable in isolation.

use crate::errors::LaunchError;
use crate::exec::{ExitState, ShutdownOutcome};

/// Lifecycle state of the backend.
///
/// There is exactly one of these per application; it is the single source
/// of truth for whether a backend is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Shut down as soon as the backend is ready instead of presenting it
    /// (used for `--check`).
    pub exit_when_ready: bool,
}

/// Events flowing into the runtime from signal listeners, launch attempts
/// and the shutdown sequencer.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The UI surface was requested (initial start or re-activation).
    Activate,
    /// A launch attempt reached its terminal outcome.
    LaunchSettled {
        attempt: u64,
        result: Result<(), LaunchError>,
    },
    /// The process of `attempt` exited.
    BackendExited { attempt: u64, state: ExitState },
    /// Application termination requested (e.g. Ctrl-C).
    ShutdownRequested,
    /// The shutdown sequence finished.
    ShutdownFinished { outcome: ShutdownOutcome },
}

pub mod accumulator;
pub mod activation;
pub mod attempt;
pub mod core;
pub mod event_handlers;
pub mod launch;
pub mod readiness;
pub mod runtime;
pub mod settle;

pub use accumulator::CapturedOutput;
pub use activation::{ActivationDecision, decide_activation};
pub use attempt::LaunchSupervisor;
pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use launch::{LaunchCore, LaunchEvent, LaunchSettings, LaunchVerdict, SettledAs};
pub use readiness::{ReadinessMarker, scan, scan_appended};
pub use runtime::{LaunchPlan, Runtime};
pub use settle::SettlementGuard;
