//! Quotebook Core Library
//!
//! This crate provides the core functionality for Quotebook, a local-first
//! quote collection that opportunistically syncs with a remote source.
//!
//! # Architecture
//!
//! - **QuoteStore**: single source of truth, persisted to a key-value store
//!   after every mutation
//! - **SyncEngine**: fetches remote quotes and merges them in; the server
//!   version wins on conflict
//! - **Scheduler**: runs sync passes on an interval while online
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = QuoteStore::open(&config);
//!
//! store.add("Simplicity is prerequisite for reliability.", "wisdom")?;
//!
//! match store.random_quote("wisdom", &mut rand::thread_rng()) {
//!     Selection::Quote(q) => println!("{}", q.text),
//!     Selection::Empty { category } => println!("{}", Selection::empty_message(&category)),
//! }
//! ```
//!
//! # Modules
//!
//! - `store`: quote collection, categories and selection (main entry point)
//! - `models`: Quote and ConflictRecord
//! - `selector`: random selection
//! - `storage`: key-value persistence
//! - `sync`: remote source, merge, engine and scheduler
//! - `notify`: user-facing notification sink
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod selector;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{QuoteError, QuoteResult};
pub use models::{ConflictRecord, Quote, QuoteSource, ALL_CATEGORIES};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use selector::Selection;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::QuoteStore;
