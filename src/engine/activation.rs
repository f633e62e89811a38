// src/engine/activation.rs

//! What to do when the UI surface is requested.

use crate::engine::SupervisorState;

/// Decision for an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationDecision {
    /// No usable backend: start a new launch attempt.
    Launch,
    /// Backend is running: just present the surface again.
    Present,
    /// An attempt is already in flight; this request joins it instead of
    /// starting a second process.
    AlreadyStarting,
    /// Shutting down; activations are meaningless now.
    Ignore,
}

pub fn decide_activation(state: SupervisorState) -> ActivationDecision {
    match state {
        SupervisorState::Idle | SupervisorState::Stopped | SupervisorState::Failed => {
            ActivationDecision::Launch
        }
        SupervisorState::Running => ActivationDecision::Present,
        SupervisorState::Starting => ActivationDecision::AlreadyStarting,
        SupervisorState::Stopping => ActivationDecision::Ignore,
    }
}
