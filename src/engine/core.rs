// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated lifecycle state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - launching and supervising the backend process
//! - presenting the UI surface and running the shutdown sequence
//!
//! The core is intended to be unit tested without any Tokio, channels or
//! processes.

use crate::engine::event_handlers::{
    CoreStep, Lifecycle, handle_activate, handle_backend_exited, handle_launch_settled,
    handle_shutdown_finished, handle_shutdown_requested,
};
use crate::engine::{RuntimeEvent, RuntimeOptions, SupervisorState};
use crate::errors::LaunchError;

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    lifecycle: Lifecycle,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            options,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.lifecycle.state
    }

    /// Number of launch attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.lifecycle.attempt
    }

    /// The initial launch failure that ended the application, if any.
    pub fn fatal_error(&self) -> Option<&LaunchError> {
        self.lifecycle.fatal.as_ref()
    }

    pub fn take_fatal_error(&mut self) -> Option<LaunchError> {
        self.lifecycle.fatal.take()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let lc = &mut self.lifecycle;
        match event {
            RuntimeEvent::Activate => handle_activate(lc),
            RuntimeEvent::LaunchSettled { attempt, result } => {
                handle_launch_settled(lc, &self.options, attempt, result)
            }
            RuntimeEvent::BackendExited { attempt, state } => {
                handle_backend_exited(lc, attempt, state)
            }
            RuntimeEvent::ShutdownRequested => handle_shutdown_requested(lc),
            RuntimeEvent::ShutdownFinished { outcome } => handle_shutdown_finished(lc, outcome),
        }
    }
}
