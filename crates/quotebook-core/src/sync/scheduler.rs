//! Background sync scheduler
//!
//! Runs a first pass shortly after start, then one pass per interval while
//! online. Losing connectivity cancels the timer; getting it back runs a pass
//! right away and restarts the timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::engine::{SyncEngine, SyncReport};
use crate::config::Config;

/// Timing for scheduled passes
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Delay before the first pass
    pub initial_delay: Duration,
    /// Time between passes
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            interval: Duration::from_secs(30),
        }
    }
}

impl SchedulerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            initial_delay: Duration::from_secs(config.initial_sync_delay_secs),
            interval: Duration::from_secs(config.sync_interval_secs.max(1)),
        }
    }
}

/// Commands sent to the scheduler task
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Run a pass now and send back its report
    SyncNow(oneshot::Sender<SyncReport>),
    /// Stop the scheduler
    Shutdown,
}

/// Handle to a running scheduler task
pub struct Scheduler {
    command_tx: mpsc::Sender<SchedulerCommand>,
    task: JoinHandle<()>,
}

impl Scheduler {
    /// Spawn the scheduler on the current runtime
    pub fn spawn(engine: Arc<SyncEngine>, config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        let task = tokio::spawn(scheduler_loop(engine, config, command_rx));
        Self { command_tx, task }
    }

    /// Run a pass outside the timer
    ///
    /// Goes through the same engine, so connectivity and mutual exclusion
    /// still apply. Returns `None` if the scheduler has stopped.
    pub async fn sync_now(&self) -> Option<SyncReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(SchedulerCommand::SyncNow(reply_tx))
            .await
            .ok()?;
        reply_rx.await.ok()
    }

    /// Stop the scheduler and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.command_tx.send(SchedulerCommand::Shutdown).await;
        let _ = self.task.await;
    }
}

async fn scheduler_loop(
    engine: Arc<SyncEngine>,
    config: SchedulerConfig,
    mut command_rx: mpsc::Receiver<SchedulerCommand>,
) {
    let mut online_rx = engine.connectivity().subscribe();
    let mut next_pass = if *online_rx.borrow_and_update() {
        Some(Instant::now() + config.initial_delay)
    } else {
        info!("Offline at start, waiting for connectivity");
        None
    };

    loop {
        let timer = async move {
            match next_pass {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = timer => {
                debug!("Scheduled sync");
                engine.sync_once().await;
                next_pass = Some(Instant::now() + config.interval);
            }
            changed = online_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if *online_rx.borrow_and_update() {
                    info!("Back online, resuming sync");
                    next_pass = Some(Instant::now());
                } else {
                    info!("Offline, pausing sync");
                    next_pass = None;
                }
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SchedulerCommand::SyncNow(reply)) => {
                        let report = engine.sync_once().await;
                        let _ = reply.send(report);
                    }
                    Some(SchedulerCommand::Shutdown) | None => break,
                }
            }
        }
    }

    debug!("Scheduler stopped");
}
