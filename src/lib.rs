// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod resolve;
pub mod surface;
pub mod types;

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_or_default, parse_duration};
use crate::engine::{CoreRuntime, LaunchPlan, LaunchSettings, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::{BootwatchError, Result};
use crate::exec::{ShutdownSequencer, TokioProcessBackend};
use crate::resolve::{AppLayout, ResolvedExecutable, resolve_executable};
use crate::surface::{BackendEndpoint, ConsoleSurface};
use crate::types::{DeploymentMode, Platform};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - executable resolution
/// - the lifecycle runtime with the real process backend
/// - OS signal handling (termination and re-activation)
pub async fn run(args: CliArgs) -> Result<()> {
    let (config_path, allow_missing) = match args.config {
        Some(ref path) => (PathBuf::from(path), false),
        None => (default_config_path(), true),
    };
    let cfg = load_or_default(&config_path, allow_missing)?;
    let cfg = apply_overrides(cfg, &args)?;

    let mode = if args.packaged {
        DeploymentMode::Packaged
    } else {
        cfg.executable.mode
    };
    let layout = AppLayout::from_config(&cfg, config_root_dir(&config_path));
    let target = resolve_executable(mode, Platform::current(), &layout);
    let settings = LaunchSettings::from_config(&cfg);

    if args.dry_run {
        print_dry_run(&cfg, mode, &target, &settings);
        return Ok(());
    }

    let plan = LaunchPlan {
        target,
        settings,
        endpoint: BackendEndpoint::new(cfg.server.host.clone(), cfg.server.port),
        sequencer: ShutdownSequencer::new(cfg.launch.grace_period),
    };

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    spawn_signal_listeners(rt_tx.clone());

    // The initial start is just the first activation.
    info!(%mode, "requesting initial backend launch");
    rt_tx
        .send(RuntimeEvent::Activate)
        .await
        .map_err(anyhow::Error::from)?;

    let options = RuntimeOptions {
        exit_when_ready: args.check,
    };
    let core = CoreRuntime::new(options);
    let runtime = Runtime::new(
        core,
        rt_rx,
        rt_tx,
        TokioProcessBackend::new(),
        ConsoleSurface::new(),
        plan,
    );
    runtime.run().await
}

/// Apply `--startup-timeout` / `--grace-period` on top of the file.
pub fn apply_overrides(mut cfg: ConfigFile, args: &CliArgs) -> Result<ConfigFile> {
    if let Some(ref s) = args.startup_timeout {
        cfg.launch.startup_timeout = parse_override("--startup-timeout", s)?;
    }
    if let Some(ref s) = args.grace_period {
        cfg.launch.grace_period = parse_override("--grace-period", s)?;
    }
    Ok(cfg)
}

fn parse_override(flag: &str, value: &str) -> Result<std::time::Duration> {
    let dur = parse_duration(value)
        .map_err(|e| BootwatchError::ConfigError(format!("{flag}: {e}")))?;
    if dur.is_zero() {
        return Err(BootwatchError::ConfigError(format!(
            "{flag} must be greater than zero"
        )));
    }
    Ok(dur)
}

/// Figure out the application root that relative paths hang off.
///
/// - If the config path has a non-empty parent (e.g. "app/Bootwatch.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Bootwatch.toml" (parent = ""),
///   we fall back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if root.is_absolute() {
        return root;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(root),
        Err(_) => root,
    }
}

/// Ctrl-C / SIGTERM → shutdown; SIGHUP → re-activation.
fn spawn_signal_listeners(tx: mpsc::Sender<RuntimeEvent>) {
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let term_tx = tx.clone();
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::spawn(async move {
                    if term.recv().await.is_some() {
                        let _ = term_tx.send(RuntimeEvent::ShutdownRequested).await;
                    }
                });
            }
            Err(e) => warn!(error = %e, "failed to listen for SIGTERM"),
        }

        match signal(SignalKind::hangup()) {
            Ok(mut hup) => {
                tokio::spawn(async move {
                    while hup.recv().await.is_some() {
                        debug!("SIGHUP received; treating as activation");
                        if tx.send(RuntimeEvent::Activate).await.is_err() {
                            break;
                        }
                    }
                });
            }
            Err(e) => warn!(error = %e, "failed to listen for SIGHUP"),
        }
    }
}

/// Print what would be launched, without launching it.
fn print_dry_run(
    cfg: &ConfigFile,
    mode: DeploymentMode,
    target: &ResolvedExecutable,
    settings: &LaunchSettings,
) {
    println!("bootwatch dry-run");
    println!("  mode = {mode}");
    println!("  executable = {}", target.path.display());
    println!("  working_dir = {}", target.working_dir.display());
    println!("  executable exists = {}", target.path.exists());
    println!("  frontend_index = {}", target.frontend_index.display());
    println!();
    println!("  readiness marker = {}", settings.marker);
    println!("  marker_streams = {:?}", settings.marker_streams);
    println!("  startup_timeout = {:?}", cfg.launch.startup_timeout);
    println!("  grace_period = {:?}", cfg.launch.grace_period);

    debug!("dry-run complete (no launch)");
}
