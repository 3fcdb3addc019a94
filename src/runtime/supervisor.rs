use super::subscriber::{self, WorkerRunContext, RESUBSCRIBE_BACKOFF};
use super::worker_registry::{apply_worker_event, WorkerEvent, WorkerHealth, WorkerState};
use crate::bus::{BusError, RedisBus};
use crate::config::{ConfigError, Secrets, Settings};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long in-flight handlers get to finish once stop is raised.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("redis unavailable at startup: {0}")]
    Bus(#[from] BusError),
    #[error("failed to spawn worker {worker_id}: {source}")]
    Spawn {
        worker_id: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupervisorReport {
    pub workers: BTreeMap<String, WorkerHealth>,
    /// Workers that had not reported `Stopped` when the grace period ran out.
    pub unfinished: Vec<String>,
}

/// Runs one subscriber thread per inbound channel until `stop` is raised,
/// then waits up to [`SHUTDOWN_GRACE_PERIOD`] for them to finish.
pub fn run_supervisor(
    settings: Settings,
    secrets: &Secrets,
    stop: Arc<AtomicBool>,
) -> Result<SupervisorReport, RuntimeError> {
    let slack_bot_token = secrets.require_slack_bot_token()?.to_string();
    let bus = RedisBus::open(&settings.redis.addr, secrets.redis_password.as_deref())?;
    bus.ping()?;
    tracing::info!(addr = %bus.addr(), "connected to redis");

    let specs = subscriber::build_worker_specs(&settings);
    let mut workers = BTreeMap::new();
    for spec in &specs {
        workers.insert(spec.id.clone(), WorkerHealth::default());
    }
    tracing::info!(
        pid = std::process::id(),
        workers = specs.len(),
        "supervisor started"
    );

    let (events_tx, events_rx) = mpsc::channel::<WorkerEvent>();
    let mut handles = Vec::new();
    let mut active = BTreeSet::new();

    for spec in specs {
        let worker_id = spec.id.clone();
        let ctx = WorkerRunContext {
            settings: settings.clone(),
            bus: bus.clone(),
            slack_bot_token: slack_bot_token.clone(),
            stop: Arc::clone(&stop),
            events: events_tx.clone(),
            backoff: RESUBSCRIBE_BACKOFF,
        };
        let handle = thread::Builder::new()
            .name(worker_id.clone())
            .spawn(move || subscriber::run_worker(spec, ctx));
        match handle {
            Ok(handle) => {
                active.insert(worker_id);
                handles.push(handle);
            }
            Err(source) => {
                stop.store(true, Ordering::Relaxed);
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(RuntimeError::Spawn { worker_id, source });
            }
        }
    }
    drop(events_tx);

    while !stop.load(Ordering::Relaxed) {
        match events_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => apply_worker_event(&mut workers, &mut active, event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::info!("shutting down");

    let deadline = Instant::now() + SHUTDOWN_GRACE_PERIOD;
    while !active.is_empty() && Instant::now() < deadline {
        match events_rx.recv_timeout(Duration::from_millis(25)) {
            Ok(event) => apply_worker_event(&mut workers, &mut active, event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let unfinished = active.iter().cloned().collect::<Vec<_>>();
    if unfinished.is_empty() {
        for handle in handles {
            let _ = handle.join();
        }
        tracing::info!("supervisor stopped cleanly");
    } else {
        for worker_id in &unfinished {
            if let Some(worker) = workers.get_mut(worker_id) {
                worker.state = WorkerState::Error;
                worker.last_error = Some("shutdown timeout".to_string());
            }
        }
        // Stragglers are detached; process exit reclaims them.
        tracing::warn!(
            workers = %unfinished.join(","),
            "shutdown grace period elapsed with workers still running"
        );
    }

    Ok(SupervisorReport {
        workers,
        unfinished,
    })
}
