// src/exec/mod.rs

//! Process execution layer.
//!
//! This module starts the backend with `tokio::process`, exposes its output
//! and exit to the supervisor, and stops it again.
//!
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `TokioProcessBackend`; tests replace it with a fake.
//! - [`process`] holds the handle types shared by everything downstream.
//! - [`output`] reads raw stdout/stderr chunks.
//! - [`signal`] delivers termination signals to a real child.
//! - [`shutdown`] escalates from graceful to forceful termination.

pub mod backend;
pub mod output;
pub mod process;
pub mod shutdown;
pub mod signal;

pub use backend::{ProcessBackend, TokioProcessBackend};
pub use process::{
    ExitState, ProcessControl, ProcessHandle, ProcessOutput, ProcessRef, StreamKind, TermSignal,
};
pub use shutdown::{ShutdownOutcome, ShutdownSequencer, StopPhase};
