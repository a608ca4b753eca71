//! Quote store
//!
//! The `QuoteStore` owns the in-memory quote collection and the persisted
//! category filter. Every mutation (add, import, merge, reset) writes the
//! whole collection back to the key-value store.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = QuoteStore::open(&config);
//!
//! store.add("Stay hungry, stay foolish.", "Motivation")?;
//!
//! for category in store.categories() {
//!     println!("{}", category);
//! }
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{QuoteError, QuoteResult};
use crate::models::{default_quotes, normalize_category, Quote, ALL_CATEGORIES};
use crate::selector::{pick_random, Selection};
use crate::storage::{
    FileStore, KeyValueStore, StorageError, LAST_SYNC_KEY, QUOTES_KEY, SELECTED_CATEGORY_KEY,
};
use crate::sync::merge::{merge_server_batch, MergeOutcome};

/// The quote collection and its persistence
pub struct QuoteStore {
    quotes: Vec<Quote>,
    persistence: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for QuoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteStore")
            .field("quotes", &self.quotes.len())
            .finish_non_exhaustive()
    }
}

impl QuoteStore {
    /// Open the file-backed store in the configured data directory
    pub fn open(config: &Config) -> Self {
        Self::with_persistence(FileStore::new(&config.data_dir))
    }

    /// Open a store on any key-value backend
    ///
    /// Starts from the built-in quotes and then loads the saved snapshot,
    /// if there is one.
    pub fn with_persistence(persistence: impl KeyValueStore + 'static) -> Self {
        let mut store = Self {
            quotes: default_quotes(),
            persistence: Box::new(persistence),
        };
        store.load();
        store
    }

    // ==================== Persistence ====================

    /// Replace the collection with the persisted snapshot
    ///
    /// Keeps the current collection when nothing was saved yet or when the
    /// saved payload cannot be read or parsed.
    pub fn load(&mut self) {
        let raw = match self.persistence.get(QUOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved quotes, keeping built-in set");
                return;
            }
            Err(e) => {
                warn!("Could not read saved quotes, keeping current set: {}", e);
                return;
            }
        };

        match serde_json::from_str::<Vec<Quote>>(&raw) {
            Ok(quotes) => {
                debug!("Loaded {} quotes", quotes.len());
                self.quotes = quotes;
            }
            Err(e) => warn!("Saved quotes are malformed, keeping current set: {}", e),
        }
    }

    /// Write the full collection to persistence
    pub fn save(&self) -> QuoteResult<()> {
        self.write_snapshot(&self.quotes)
    }

    fn write_snapshot(&self, quotes: &[Quote]) -> QuoteResult<()> {
        let json = serde_json::to_string(quotes).map_err(|e| StorageError::Serialize {
            key: QUOTES_KEY.to_string(),
            source: e,
        })?;
        self.persistence.set(QUOTES_KEY, &json)?;
        Ok(())
    }

    /// Persist `quotes` and make them the current collection
    ///
    /// The in-memory collection only changes once the write succeeded.
    fn commit(&mut self, quotes: Vec<Quote>) -> QuoteResult<()> {
        self.write_snapshot(&quotes)?;
        self.quotes = quotes;
        Ok(())
    }

    // ==================== Mutations ====================

    /// Add a local quote
    ///
    /// Text is trimmed and the category trimmed and lower-cased. Fails with
    /// `QuoteError::Validation` (leaving the store untouched) if either ends
    /// up empty.
    pub fn add(&mut self, text: &str, category: &str) -> QuoteResult<Quote> {
        if text.trim().is_empty() {
            return Err(QuoteError::Validation { field: "text" });
        }
        let quote =
            Quote::local(text, category).ok_or(QuoteError::Validation { field: "category" })?;

        let mut next = self.quotes.clone();
        next.push(quote.clone());
        self.commit(next)?;
        info!("Added quote in category '{}'", quote.category);
        Ok(quote)
    }

    /// Import quotes from the contents of a JSON file
    pub fn import_json(&mut self, payload: &str) -> QuoteResult<usize> {
        let raw: Value = serde_json::from_str(payload)
            .map_err(|e| QuoteError::Format(format!("not valid JSON ({})", e)))?;
        self.import_many(raw)
    }

    /// Import a parsed payload
    ///
    /// The payload must be an array of objects. Items are trusted: fields are
    /// not validated or normalized, and missing or mistyped ones take their
    /// defaults. An item whose `id` is already present replaces that quote in
    /// place.
    /// Returns the number of items imported.
    pub fn import_many(&mut self, raw: Value) -> QuoteResult<usize> {
        let Value::Array(items) = raw else {
            return Err(QuoteError::Format("expected a JSON array of quotes".into()));
        };

        let mut imported = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Value::Object(fields) = item else {
                return Err(QuoteError::Format(format!(
                    "item {} is not a quote object",
                    index
                )));
            };
            imported.push(Quote::from_import(fields));
        }

        let count = imported.len();
        let mut next = self.quotes.clone();
        for quote in imported {
            match quote.id.and_then(|id| next.iter().position(|q| q.id == Some(id))) {
                Some(pos) => next[pos] = quote,
                None => next.push(quote),
            }
        }

        self.commit(next)?;
        info!("Imported {} quotes", count);
        Ok(count)
    }

    /// Discard everything and go back to the built-in quotes
    ///
    /// Also clears the saved category filter.
    pub fn reset(&mut self) -> QuoteResult<()> {
        self.persistence.remove(QUOTES_KEY)?;
        self.persistence.remove(SELECTED_CATEGORY_KEY)?;
        self.commit(default_quotes())?;
        info!("Store reset to {} built-in quotes", self.quotes.len());
        Ok(())
    }

    /// Merge a batch of server quotes by id (server wins on conflict)
    ///
    /// Persists only if something was added or replaced.
    pub fn apply_server_batch(&mut self, batch: Vec<Quote>) -> QuoteResult<MergeOutcome> {
        let mut next = self.quotes.clone();
        let outcome = merge_server_batch(&mut next, batch);
        if outcome.has_changes() {
            self.commit(next)?;
        }
        Ok(outcome)
    }

    // ==================== Queries ====================

    /// All quotes in insertion order
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Find a quote by server id
    pub fn find_by_id(&self, id: u64) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == Some(id))
    }

    /// Pretty-printed JSON array of the whole collection
    pub fn export_json(&self) -> QuoteResult<String> {
        serde_json::to_string_pretty(&self.quotes)
            .map_err(|e| {
                StorageError::Serialize {
                    key: QUOTES_KEY.to_string(),
                    source: e,
                }
                .into()
            })
    }

    // ==================== Categories ====================

    /// Distinct categories in first-seen order
    ///
    /// The iterator is lazy; call again to start over.
    pub fn categories(&self) -> Categories<'_> {
        Categories {
            quotes: self.quotes.iter(),
            seen: HashSet::new(),
        }
    }

    /// The remembered category filter, `"all"` when none was chosen
    pub fn selected_category(&self) -> String {
        match self.persistence.get(SELECTED_CATEGORY_KEY) {
            Ok(Some(category)) if !category.trim().is_empty() => category,
            Ok(_) => ALL_CATEGORIES.to_string(),
            Err(e) => {
                warn!("Could not read selected category: {}", e);
                ALL_CATEGORIES.to_string()
            }
        }
    }

    /// Remember a category filter
    ///
    /// The value is normalized like a quote category; empty means `"all"`.
    /// Returns the value stored.
    pub fn set_selected_category(&mut self, category: &str) -> QuoteResult<String> {
        let mut category = normalize_category(category);
        if category.is_empty() {
            category = ALL_CATEGORIES.to_string();
        }
        self.persistence.set(SELECTED_CATEGORY_KEY, &category)?;
        Ok(category)
    }

    // ==================== Selection ====================

    /// Quotes in `category`, or every quote for `"all"`
    pub fn filtered_pool(&self, category: &str) -> Vec<&Quote> {
        if category == ALL_CATEGORIES {
            return self.quotes.iter().collect();
        }
        self.quotes
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }

    /// Pick a random quote from `category` (or everything for `"all"`)
    pub fn random_quote<R: Rng + ?Sized>(&self, category: &str, rng: &mut R) -> Selection<'_> {
        let pool = self.filtered_pool(category);
        match pick_random(&pool, rng) {
            Some(quote) => Selection::Quote(quote),
            None => Selection::Empty {
                category: category.to_string(),
            },
        }
    }

    // ==================== Sync bookkeeping ====================

    /// Instant of the last sync pass, if any was recorded
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        let raw = self.persistence.get(LAST_SYNC_KEY).ok().flatten()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|t| t.with_timezone(&Utc))
            .ok()
    }

    /// Record the instant of a sync pass
    pub fn record_sync(&self, at: DateTime<Utc>) -> QuoteResult<()> {
        self.persistence.set(LAST_SYNC_KEY, &at.to_rfc3339())?;
        Ok(())
    }
}

/// Iterator over distinct categories, see [`QuoteStore::categories`]
pub struct Categories<'a> {
    quotes: std::slice::Iter<'a, Quote>,
    seen: HashSet<&'a str>,
}

impl<'a> Iterator for Categories<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for quote in self.quotes.by_ref() {
            let category = quote.category.as_str();
            // Imported items may lack a category; they are not a filter option
            if category.is_empty() {
                continue;
            }
            if self.seen.insert(category) {
                return Some(category);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteSource;
    use crate::storage::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use tempfile::TempDir;

    fn memory_store() -> (QuoteStore, MemoryStore) {
        let backend = MemoryStore::new();
        (QuoteStore::with_persistence(backend.clone()), backend)
    }

    #[test]
    fn test_new_store_has_defaults() {
        let (store, backend) = memory_store();
        assert_eq!(store.quotes(), default_quotes().as_slice());
        // Nothing persisted until the first mutation
        assert!(backend.get(QUOTES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_add_normalizes_and_persists() {
        let (mut store, backend) = memory_store();

        let quote = store.add("  Keep going. ", " Grit ").unwrap();
        assert_eq!(quote.text, "Keep going.");
        assert_eq!(quote.category, "grit");
        assert_eq!(quote.source, QuoteSource::Local);
        assert!(quote.id.is_none());
        assert_eq!(store.len(), 9);

        let saved = backend.get(QUOTES_KEY).unwrap().unwrap();
        let saved: Vec<Quote> = serde_json::from_str(&saved).unwrap();
        assert_eq!(saved.last(), Some(&quote));
    }

    #[test]
    fn test_add_validation_leaves_store_unchanged() {
        let (mut store, backend) = memory_store();

        let err = store.add("", "x").unwrap_err();
        assert!(matches!(err, QuoteError::Validation { field: "text" }));

        let err = store.add("hello", "").unwrap_err();
        assert!(matches!(err, QuoteError::Validation { field: "category" }));

        let err = store.add("   ", "   ").unwrap_err();
        assert!(matches!(err, QuoteError::Validation { .. }));

        assert_eq!(store.quotes(), default_quotes().as_slice());
        assert!(backend.get(QUOTES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (mut store, backend) = memory_store();
        store.add("First.", "one").unwrap();
        store.add("Second.", "two").unwrap();
        store
            .apply_server_batch(vec![Quote::server(3, "Third.", "wisdom")])
            .unwrap();

        let reopened = QuoteStore::with_persistence(backend);
        assert_eq!(reopened.quotes(), store.quotes());
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::for_data_dir(temp_dir.path());

        let original = {
            let mut store = QuoteStore::open(&config);
            store.add("Persist me.", "memory").unwrap();
            store.quotes().to_vec()
        };

        let store = QuoteStore::open(&config);
        assert_eq!(store.quotes(), original.as_slice());
    }

    #[test]
    fn test_load_malformed_snapshot_keeps_defaults() {
        let backend = MemoryStore::new();
        backend.set(QUOTES_KEY, "{ not json").unwrap();

        let store = QuoteStore::with_persistence(backend.clone());
        assert_eq!(store.quotes(), default_quotes().as_slice());

        // A JSON object is valid JSON but not a snapshot
        backend.set(QUOTES_KEY, r#"{"text": "x"}"#).unwrap();
        let store = QuoteStore::with_persistence(backend);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_load_legacy_snapshot() {
        let backend = MemoryStore::new();
        backend
            .set(QUOTES_KEY, r#"[{"text": "Only one.", "category": "solo"}]"#)
            .unwrap();

        let store = QuoteStore::with_persistence(backend);
        assert_eq!(store.len(), 1);
        assert_eq!(store.quotes()[0].category, "solo");
    }

    #[test]
    fn test_import_appends_and_counts() {
        let (mut store, backend) = memory_store();

        let payload = r#"[
            {"text": "Imported one.", "category": "import"},
            {"text": "Imported two.", "category": "import", "source": "server", "id": 50}
        ]"#;
        let count = store.import_json(payload).unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.len(), 10);
        assert_eq!(store.find_by_id(50).unwrap().text, "Imported two.");
        assert!(backend.get(QUOTES_KEY).unwrap().is_some());
    }

    #[test]
    fn test_import_is_permissive_about_fields() {
        let (mut store, _) = memory_store();

        let count = store.import_many(json!([{}, {"text": "No category"}])).unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.quotes()[8].text, "");
        assert_eq!(store.quotes()[9].category, "");
        // Empty categories are not offered as filters
        assert!(store.categories().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_import_accepts_mistyped_fields() {
        let (mut store, backend) = memory_store();

        let count = store
            .import_json(
                r#"[{"text": 42, "category": "x"},
                    {"text": "ok", "category": "y", "timestamp": "yesterday"}]"#,
            )
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.len(), 10);
        assert_eq!(store.quotes()[8].text, "");
        assert_eq!(store.quotes()[8].category, "x");
        assert_eq!(store.quotes()[9].text, "ok");
        assert_eq!(store.quotes()[9].timestamp, 0);
        assert!(backend.get(QUOTES_KEY).unwrap().is_some());
    }

    #[test]
    fn test_import_rejects_non_arrays() {
        let (mut store, backend) = memory_store();

        for payload in [r#"{"text": "x"}"#, "42", "\"quotes\"", "not json at all"] {
            let err = store.import_json(payload).unwrap_err();
            assert!(matches!(err, QuoteError::Format(_)), "payload: {}", payload);
        }
        let err = store.import_many(json!([{"text": "ok"}, 7])).unwrap_err();
        assert!(matches!(err, QuoteError::Format(_)));

        assert_eq!(store.len(), 8);
        assert!(backend.get(QUOTES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_import_keeps_ids_unique() {
        let (mut store, _) = memory_store();
        store
            .apply_server_batch(vec![Quote::server(1, "Server.", "wisdom")])
            .unwrap();

        store
            .import_many(json!([{"id": 1, "text": "Imported.", "category": "wisdom"}]))
            .unwrap();

        let with_id: Vec<_> = store.quotes().iter().filter(|q| q.id == Some(1)).collect();
        assert_eq!(with_id.len(), 1);
        assert_eq!(with_id[0].text, "Imported.");
    }

    #[test]
    fn test_quotes_without_id_are_not_deduplicated() {
        let (mut store, _) = memory_store();
        store.add("Same.", "dup").unwrap();
        store.add("Same.", "dup").unwrap();
        assert_eq!(store.filtered_pool("dup").len(), 2);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (mut store, backend) = memory_store();
        store.add("Temporary.", "temp").unwrap();
        store.set_selected_category("temp").unwrap();

        store.reset().unwrap();

        assert_eq!(store.quotes(), default_quotes().as_slice());
        assert_eq!(store.selected_category(), "all");

        let reopened = QuoteStore::with_persistence(backend);
        assert_eq!(reopened.quotes(), default_quotes().as_slice());
    }

    #[test]
    fn test_export_is_pretty_json_array() {
        let (store, _) = memory_store();
        let exported = store.export_json().unwrap();

        assert!(exported.starts_with("[\n"));
        let parsed: Vec<Quote> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, store.quotes());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let (store, _) = memory_store();
        let categories: Vec<&str> = store.categories().collect();
        assert_eq!(
            categories,
            vec![
                "motivation",
                "life",
                "dreams",
                "inspiration",
                "friendship",
                "success",
                "action"
            ]
        );

        // Restartable
        assert_eq!(store.categories().count(), categories.len());
    }

    #[test]
    fn test_selected_category_round_trip() {
        let (mut store, backend) = memory_store();
        assert_eq!(store.selected_category(), "all");

        let stored = store.set_selected_category("  Life ").unwrap();
        assert_eq!(stored, "life");

        let reopened = QuoteStore::with_persistence(backend);
        assert_eq!(reopened.selected_category(), "life");

        store.set_selected_category("").unwrap();
        assert_eq!(store.selected_category(), "all");
    }

    #[test]
    fn test_filtered_pool() {
        let (store, _) = memory_store();

        let all = store.filtered_pool("all");
        assert_eq!(all.len(), store.len());

        for category in store.categories() {
            let pool = store.filtered_pool(category);
            assert!(!pool.is_empty());
            assert!(pool.iter().all(|q| q.category == category));
        }

        assert_eq!(store.filtered_pool("motivation").len(), 2);
        assert!(store.filtered_pool("missing").is_empty());
    }

    #[test]
    fn test_random_quote_respects_filter() {
        let (store, _) = memory_store();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            match store.random_quote("motivation", &mut rng) {
                Selection::Quote(q) => assert_eq!(q.category, "motivation"),
                Selection::Empty { .. } => panic!("motivation has quotes"),
            }
        }

        assert_eq!(
            store.random_quote("missing", &mut rng),
            Selection::Empty {
                category: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_random_quote_on_empty_store() {
        let backend = MemoryStore::new();
        backend.set(QUOTES_KEY, "[]").unwrap();
        let store = QuoteStore::with_persistence(backend);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(matches!(
            store.random_quote("all", &mut rng),
            Selection::Empty { .. }
        ));
    }

    #[test]
    fn test_last_sync_round_trip() {
        let (store, _) = memory_store();
        assert!(store.last_sync().is_none());

        let now = Utc::now();
        store.record_sync(now).unwrap();
        let recorded = store.last_sync().unwrap();
        assert_eq!(recorded.timestamp_millis(), now.timestamp_millis());
    }
}
