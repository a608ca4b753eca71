//! Watch command handler
//!
//! Keeps the scheduler running in the foreground. Lines typed on stdin
//! control it:
//!
//! - `sync` runs a pass right away
//! - `offline` / `online` toggle connectivity
//! - `quit` stops (as does Ctrl-C)

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use quotebook_core::sync::{Scheduler, SchedulerConfig, SyncEngine};
use quotebook_core::Config;

use super::sync::require_sync;
use crate::output::Output;

/// A line of watch input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchInput {
    Sync,
    Online,
    Offline,
    Quit,
    Unknown,
}

impl WatchInput {
    fn parse(line: &str) -> Option<Self> {
        let command = match line.trim().to_lowercase().as_str() {
            "" => return None,
            "s" | "sync" => Self::Sync,
            "on" | "online" => Self::Online,
            "off" | "offline" => Self::Offline,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Unknown,
        };
        Some(command)
    }
}

/// Run scheduled sync until interrupted
pub async fn watch(engine: Arc<SyncEngine>, config: &Config, output: &Output) -> Result<()> {
    require_sync(config)?;

    let timing = SchedulerConfig::from_config(config);
    output.message(&format!(
        "Syncing with {} every {}s. Type sync, online, offline or quit. Ctrl-C stops.",
        config.remote_url,
        timing.interval.as_secs()
    ));

    let scheduler = Scheduler::spawn(engine.clone(), timing);
    let connectivity = engine.connectivity().clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    // Detached stdin; keep running until Ctrl-C
                    stdin_open = false;
                    continue;
                };
                match WatchInput::parse(&line) {
                    Some(WatchInput::Sync) => {
                        if scheduler.sync_now().await.is_none() {
                            break;
                        }
                    }
                    Some(WatchInput::Online) => {
                        if !connectivity.set_online(true) {
                            output.message("Already online.");
                        }
                    }
                    Some(WatchInput::Offline) => {
                        if connectivity.set_online(false) {
                            output.warning("Offline. Scheduled sync is paused.");
                        } else {
                            output.message("Already offline.");
                        }
                    }
                    Some(WatchInput::Quit) => break,
                    Some(WatchInput::Unknown) => {
                        output.warning("Unknown input. Type sync, online, offline or quit.");
                    }
                    None => {}
                }
            }
        }
    }

    scheduler.shutdown().await;
    output.message("Stopped.");
    Ok(())
}
