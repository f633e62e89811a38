// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::attempt::LaunchSupervisor;
use crate::engine::launch::LaunchSettings;
use crate::errors::{BootwatchError, Result};
use crate::exec::{ProcessBackend, ProcessRef, ShutdownSequencer};
use crate::resolve::ResolvedExecutable;
use crate::surface::{BackendEndpoint, Surface};

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Everything needed to (re)launch the backend.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub target: ResolvedExecutable,
    pub settings: LaunchSettings,
    pub endpoint: BackendEndpoint,
    pub sequencer: ShutdownSequencer,
}

/// Drives the lifecycle core in response to `RuntimeEvent`s and performs
/// what it decides through a `ProcessBackend` and a `Surface`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// lifecycle semantics. It owns the current backend process reference;
/// nothing else signals the process.
pub struct Runtime<B: ProcessBackend, S: Surface> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    /// Events produced by the shell itself, handled before new input.
    pending: VecDeque<RuntimeEvent>,
    backend: B,
    surface: S,
    plan: LaunchPlan,
    process: Option<ProcessRef>,
    cleanup: Vec<JoinHandle<()>>,
}

impl<B: ProcessBackend, S: Surface> fmt::Debug for Runtime<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("plan", &self.plan)
            .field("process", &self.process)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend, S: Surface> Runtime<B, S> {
    /// `event_tx` must be a sender for `event_rx`; spawned attempts and the
    /// shutdown sequence report back through it.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        backend: B,
        surface: S,
        plan: LaunchPlan,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            pending: VecDeque::new(),
            backend,
            surface,
            plan,
            process: None,
            cleanup: Vec::new(),
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core.
    ///
    /// On exit any backend still attached is stopped. Returns the initial
    /// launch failure as an error, if that is why we are exiting.
    pub async fn run(mut self) -> Result<()> {
        info!("bootwatch runtime started");

        loop {
            let event = match self.pending.pop_front() {
                Some(e) => e,
                None => match self.event_rx.recv().await {
                    Some(e) => e,
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                },
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        self.finish().await;

        match self.core.take_fatal_error() {
            Some(err) => Err(BootwatchError::Launch(err)),
            None => Ok(()),
        }
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartLaunch { attempt } => self.start_launch(attempt),
            CoreCommand::OpenSurface => {
                self.surface
                    .open(&self.plan.endpoint, &self.plan.target.frontend_index)?;
            }
            CoreCommand::ReportFailure(err) => self.surface.report_failure(&err),
            CoreCommand::DiscardProcess => {
                if let Some(process) = self.process.take() {
                    let sequencer = self.plan.sequencer;
                    self.cleanup.retain(|h| !h.is_finished());
                    self.cleanup.push(tokio::spawn(async move {
                        sequencer.shutdown(Some(&process)).await;
                    }));
                }
            }
            CoreCommand::BeginShutdown => {
                let process = self.process.clone();
                let sequencer = self.plan.sequencer;
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let outcome = sequencer.shutdown(process.as_ref()).await;
                    let _ = tx.send(RuntimeEvent::ShutdownFinished { outcome }).await;
                });
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    /// Launch attempt `attempt`: spawn the process, then supervise it in the
    /// background. Spawn-time failures settle the attempt immediately.
    fn start_launch(&mut self, attempt: u64) {
        let handle = match self.backend.launch(&self.plan.target) {
            Ok(handle) => handle,
            Err(err) => {
                self.pending.push_back(RuntimeEvent::LaunchSettled {
                    attempt,
                    result: Err(err),
                });
                return;
            }
        };

        let process = handle.process.clone();
        self.process = Some(process.clone());

        let supervisor = LaunchSupervisor::new(self.plan.settings.clone(), attempt);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = supervisor.supervise(handle).await.map(|_| ());
            let _ = tx.send(RuntimeEvent::LaunchSettled { attempt, result }).await;
        });

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let state = process.wait_exit().await;
            let _ = tx.send(RuntimeEvent::BackendExited { attempt, state }).await;
        });
    }

    async fn finish(&mut self) {
        for handle in self.cleanup.drain(..) {
            let _ = handle.await;
        }
        if let Some(process) = self.process.take() {
            self.plan.sequencer.shutdown(Some(&process)).await;
        }
        info!("runtime exiting");
    }
}
