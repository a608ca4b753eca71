//! Server sync
//!
//! Keeps the local store in step with a remote quote source.
//!
//! ## Pass
//!
//! 1. Skip if offline or another pass is running
//! 2. Fetch a batch of remote items and map them to quotes
//! 3. Merge by id; on a content mismatch the server version wins
//! 4. Persist, report counts and conflicts, record the pass time
//!
//! ## Usage
//!
//! ```ignore
//! let engine = Arc::new(SyncEngine::new(store, remote, connectivity, notifier));
//! let scheduler = Scheduler::spawn(engine.clone(), SchedulerConfig::default());
//! let report = scheduler.sync_now().await;
//! ```

mod connectivity;
mod engine;
pub mod merge;
mod remote;
mod scheduler;

pub use connectivity::Connectivity;
pub use engine::{
    conflict_summary, SyncEngine, SyncOutcome, SyncReport, SyncStatus, DEFAULT_FETCH_LIMIT,
};
pub use merge::{merge_server_batch, MergeOutcome};
pub use remote::{
    quote_from_remote, HttpRemote, PushPayload, RemoteItem, RemoteSource, SERVER_CATEGORIES,
};
pub use scheduler::{Scheduler, SchedulerCommand, SchedulerConfig};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::Notify;

    use super::{Connectivity, PushPayload, RemoteItem, RemoteSource};
    use crate::error::{QuoteError, QuoteResult};

    /// In-memory remote with hooks for failure and timing
    #[derive(Default)]
    pub struct FakeRemote {
        items: Vec<RemoteItem>,
        fail: bool,
        fetches: AtomicUsize,
        last_limit: Mutex<Option<usize>>,
        pushed: Mutex<Vec<PushPayload>>,
        gate: Mutex<Option<Arc<Notify>>>,
        drop_connection: Mutex<Option<Connectivity>>,
    }

    impl FakeRemote {
        pub fn with_titles(items: &[(u64, &str)]) -> Self {
            Self {
                items: items
                    .iter()
                    .map(|(id, title)| RemoteItem {
                        id: *id,
                        title: title.to_string(),
                    })
                    .collect(),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Make fetches wait until the returned gate is notified
        pub fn hold_fetches(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.gate.lock().unwrap() = Some(gate.clone());
            gate
        }

        /// Flip `connectivity` offline while a fetch is in flight
        pub fn drop_connection_on_fetch(&self, connectivity: Connectivity) {
            *self.drop_connection.lock().unwrap() = Some(connectivity);
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        pub fn last_limit(&self) -> Option<usize> {
            *self.last_limit.lock().unwrap()
        }

        pub fn pushed(&self) -> Vec<PushPayload> {
            self.pushed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteSource for FakeRemote {
        async fn fetch(&self, limit: usize) -> QuoteResult<Vec<RemoteItem>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            *self.last_limit.lock().unwrap() = Some(limit);

            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if let Some(connectivity) = self.drop_connection.lock().unwrap().as_ref() {
                connectivity.set_online(false);
            }

            if self.fail {
                return Err(QuoteError::Transport("GET returned 503".to_string()));
            }
            Ok(self.items.iter().take(limit).cloned().collect())
        }

        async fn push(&self, payload: &PushPayload) -> QuoteResult<Value> {
            if self.fail {
                return Err(QuoteError::Transport("POST returned 503".to_string()));
            }
            self.pushed.lock().unwrap().push(payload.clone());
            Ok(serde_json::json!({ "id": 101 }))
        }
    }
}
