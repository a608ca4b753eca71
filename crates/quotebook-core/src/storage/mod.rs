//! Storage layer
//!
//! Persists opaque text values under string keys.
//!
//! ## Keys
//!
//! - `quotes`: JSON array holding the full quote collection
//! - `lastSelectedCategory`: the category filter last chosen by the user
//! - `lastSyncTime`: RFC 3339 instant of the last sync pass

pub mod error;
pub mod persistence;

pub use error::{IoFailure, StorageError, StorageResult};
pub use persistence::{FileStore, KeyValueStore, MemoryStore};

/// Key holding the serialized quote collection
pub const QUOTES_KEY: &str = "quotes";

/// Key holding the last-selected category filter
pub const SELECTED_CATEGORY_KEY: &str = "lastSelectedCategory";

/// Key holding the instant of the last sync pass
pub const LAST_SYNC_KEY: &str = "lastSyncTime";
