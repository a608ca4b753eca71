//! Sync engine
//!
//! Runs sync passes against a [`RemoteSource`]: fetch a batch, merge it into
//! the store (server wins), persist, and report. At most one pass runs at a
//! time; a pass requested while another is in flight is skipped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::connectivity::Connectivity;
use super::remote::{quote_from_remote, PushPayload, RemoteSource};
use crate::error::{QuoteError, QuoteResult};
use crate::models::{ConflictRecord, Quote};
use crate::notify::{Notifier, Severity};
use crate::store::QuoteStore;

/// Default number of items requested per pass
pub const DEFAULT_FETCH_LIMIT: usize = 10;

/// Engine status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No pass running
    Idle,
    /// A pass is fetching or merging
    Syncing,
}

/// How a pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Connectivity was down; nothing was attempted
    Offline,
    /// Another pass was already running
    Skipped,
    /// Fetch or persist failed; the store is unchanged
    Failed(String),
    /// Connectivity dropped while fetching; results were thrown away
    Discarded,
    /// The fetched batch matched the store
    UpToDate,
    /// Quotes were added or replaced
    Updated,
}

/// Result of one sync pass
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub added: usize,
    pub updated: usize,
    pub conflicts: Vec<ConflictRecord>,
    /// When the pass ran
    pub at: DateTime<Utc>,
}

impl SyncReport {
    fn new(outcome: SyncOutcome) -> Self {
        Self {
            outcome,
            added: 0,
            updated: 0,
            conflicts: Vec::new(),
            at: Utc::now(),
        }
    }

    /// Whether the pass reached the remote (successfully or not)
    pub fn attempted(&self) -> bool {
        !matches!(self.outcome, SyncOutcome::Offline | SyncOutcome::Skipped)
    }
}

/// Coordinates sync passes and pushes for a shared store
pub struct SyncEngine {
    store: Arc<Mutex<QuoteStore>>,
    remote: Arc<dyn RemoteSource>,
    connectivity: Connectivity,
    notifier: Arc<dyn Notifier>,
    fetch_limit: usize,
    /// Held for the duration of a pass
    pass_lock: Mutex<()>,
    status: watch::Sender<SyncStatus>,
    status_rx: watch::Receiver<SyncStatus>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<Mutex<QuoteStore>>,
        remote: Arc<dyn RemoteSource>,
        connectivity: Connectivity,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (status, status_rx) = watch::channel(SyncStatus::Idle);
        Self {
            store,
            remote,
            connectivity,
            notifier,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            pass_lock: Mutex::new(()),
            status,
            status_rx,
        }
    }

    /// Set the number of items requested per pass
    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// Get the current status
    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    pub fn store(&self) -> &Arc<Mutex<QuoteStore>> {
        &self.store
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Run one sync pass and report its outcome through the notifier
    pub async fn sync_once(&self) -> SyncReport {
        let Ok(_pass) = self.pass_lock.try_lock() else {
            debug!("Sync already in progress, skipping");
            let report = SyncReport::new(SyncOutcome::Skipped);
            self.report(&report);
            return report;
        };

        if !self.connectivity.is_online() {
            let report = SyncReport::new(SyncOutcome::Offline);
            self.report(&report);
            return report;
        }

        self.set_status(SyncStatus::Syncing);
        let report = self.run_pass().await;
        self.set_status(SyncStatus::Idle);

        match &report.outcome {
            SyncOutcome::Failed(e) => warn!("Sync failed: {}", e),
            outcome => info!(
                "Sync complete: {:?}, added={}, updated={}, conflicts={}",
                outcome,
                report.added,
                report.updated,
                report.conflicts.len()
            ),
        }

        if let Err(e) = self.store.lock().await.record_sync(report.at) {
            warn!("Could not record sync time: {}", e);
        }

        self.report(&report);
        report
    }

    async fn run_pass(&self) -> SyncReport {
        let items = match self.remote.fetch(self.fetch_limit).await {
            Ok(items) => items,
            Err(e) => return SyncReport::new(SyncOutcome::Failed(e.to_string())),
        };
        debug!("Fetched {} items", items.len());

        // The fetch may have outlived the connection
        if !self.connectivity.is_online() {
            return SyncReport::new(SyncOutcome::Discarded);
        }

        let batch: Vec<Quote> = items.iter().map(quote_from_remote).collect();

        let mut store = self.store.lock().await;
        match store.apply_server_batch(batch) {
            Ok(merge) => {
                let outcome = if merge.has_changes() {
                    SyncOutcome::Updated
                } else {
                    SyncOutcome::UpToDate
                };
                SyncReport {
                    added: merge.added,
                    updated: merge.updated,
                    conflicts: merge.conflicts,
                    ..SyncReport::new(outcome)
                }
            }
            Err(e) => SyncReport::new(SyncOutcome::Failed(e.to_string())),
        }
    }

    /// Push a freshly added local quote to the remote
    ///
    /// Best effort: the caller keeps the quote whatever happens here.
    pub async fn push_quote(&self, quote: &Quote) -> QuoteResult<()> {
        if !self.connectivity.is_online() {
            return Err(QuoteError::Transport("offline".to_string()));
        }

        match self.remote.push(&PushPayload::for_quote(quote)).await {
            Ok(_) => {
                debug!("Pushed quote to server");
                Ok(())
            }
            Err(e) => {
                warn!("Push failed: {}", e);
                Err(e)
            }
        }
    }

    fn report(&self, report: &SyncReport) {
        let (message, severity) = match &report.outcome {
            SyncOutcome::Offline => (
                "You are offline. Sync will resume when the connection returns.".to_string(),
                Severity::Warning,
            ),
            SyncOutcome::Skipped => ("Sync already in progress.".to_string(), Severity::Info),
            SyncOutcome::Failed(e) => (format!("Sync failed: {}", e), Severity::Error),
            SyncOutcome::Discarded => (
                "Connection lost during sync; fetched quotes were discarded.".to_string(),
                Severity::Warning,
            ),
            SyncOutcome::UpToDate => ("Quotes are up to date.".to_string(), Severity::Info),
            SyncOutcome::Updated => (
                format!(
                    "Synced with server: {} new, {} updated.",
                    report.added, report.updated
                ),
                Severity::Success,
            ),
        };
        self.notifier.notify(&message, severity);

        if !report.conflicts.is_empty() {
            self.notifier
                .notify(&conflict_summary(&report.conflicts), Severity::Warning);
        }
    }

    fn set_status(&self, status: SyncStatus) {
        let _ = self.status.send(status);
    }
}

/// One advisory message for a batch of conflicts
pub fn conflict_summary(conflicts: &[ConflictRecord]) -> String {
    let details: Vec<String> = conflicts
        .iter()
        .map(|c| format!("#{}: \"{}\" -> \"{}\"", c.id, c.local.text, c.server.text))
        .collect();
    format!(
        "{} conflict(s) resolved with the server version: {}",
        conflicts.len(),
        details.join("; ")
    )
}
