//! Sync command handler

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex;

use quotebook_core::sync::{Connectivity, HttpRemote, SyncEngine, SyncOutcome, SyncReport};
use quotebook_core::{Config, Notifier, QuoteStore};

use crate::output::Output;

/// Build the engine shared by `add`, `sync` and `watch`
pub fn engine(
    config: &Config,
    store: Arc<Mutex<QuoteStore>>,
    online: bool,
    notifier: Arc<dyn Notifier>,
) -> Result<Arc<SyncEngine>> {
    let remote = HttpRemote::new(config.remote_url.clone())
        .with_context(|| format!("Failed to create client for {}", config.remote_url))?;

    let engine = SyncEngine::new(store, Arc::new(remote), Connectivity::new(online), notifier)
        .with_fetch_limit(config.fetch_limit);

    Ok(Arc::new(engine))
}

/// Fail early when sync is switched off
pub fn require_sync(config: &Config) -> Result<()> {
    if !config.sync_enabled {
        bail!(
            "Sync is not enabled. Enable it with:\n  \
             quotebook config set sync_enabled true"
        );
    }
    if config.remote_url.is_empty() {
        bail!(
            "Remote URL not configured. Set it with:\n  \
             quotebook config set remote_url https://example.com/posts"
        );
    }
    Ok(())
}

/// Output used as the engine notifier for a manual pass
///
/// In JSON mode the report is the only document printed.
pub fn pass_output(output: Output) -> Output {
    if output.is_json() {
        output.without_notices()
    } else {
        output
    }
}

/// Run one sync pass
///
/// The engine reports the outcome through the output notifier; a failed
/// pass also fails the command.
pub async fn sync(engine: &SyncEngine, config: &Config, json: bool) -> Result<()> {
    require_sync(config)?;

    let report = engine.sync_once().await;

    if json {
        println!("{}", report_json(&report));
    }

    if let SyncOutcome::Failed(_) = report.outcome {
        bail!("Sync did not complete");
    }

    Ok(())
}

/// Machine-readable summary of a pass
pub fn report_json(report: &SyncReport) -> serde_json::Value {
    let outcome = match &report.outcome {
        SyncOutcome::Offline => "offline",
        SyncOutcome::Skipped => "skipped",
        SyncOutcome::Failed(_) => "failed",
        SyncOutcome::Discarded => "discarded",
        SyncOutcome::UpToDate => "up_to_date",
        SyncOutcome::Updated => "updated",
    };
    let error = match &report.outcome {
        SyncOutcome::Failed(e) => Some(e.as_str()),
        _ => None,
    };

    serde_json::json!({
        "outcome": outcome,
        "error": error,
        "added": report.added,
        "updated": report.updated,
        "conflicts": report.conflicts,
        "at": report.at.to_rfc3339(),
    })
}
