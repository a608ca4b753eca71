//! Data models for Quotebook
//!
//! Defines the core data structures: Quote, QuoteSource and ConflictRecord.
//! Quotes are plain value records; changing one means replacing it in the
//! store.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filter value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "all";

/// Where a quote came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Created on this device (added or imported)
    #[default]
    Local,
    /// Fetched from the remote quote source
    Server,
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteSource::Local => write!(f, "local"),
            QuoteSource::Server => write!(f, "server"),
        }
    }
}

/// A quote with its category
///
/// Missing fields default when deserializing so that snapshots written by
/// older versions (text and category only) and permissive imports still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    /// Server-assigned identifier; `None` for quotes never seen by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// The quote itself
    #[serde(default)]
    pub text: String,
    /// Lower-cased category
    #[serde(default)]
    pub category: String,
    /// Origin of the quote
    #[serde(default)]
    pub source: QuoteSource,
    /// Creation/modification instant in milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl Quote {
    /// Create a local quote, normalizing text and category
    ///
    /// Returns `None` if either is empty after trimming.
    pub fn local(text: &str, category: &str) -> Option<Self> {
        let text = text.trim();
        let category = normalize_category(category);
        if text.is_empty() || category.is_empty() {
            return None;
        }

        Some(Self {
            id: None,
            text: text.to_string(),
            category,
            source: QuoteSource::Local,
            timestamp: now_millis(),
        })
    }

    /// Create a server quote with the given id
    pub fn server(id: u64, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
            category: category.into(),
            source: QuoteSource::Server,
            timestamp: now_millis(),
        }
    }

    /// Build a quote from an imported JSON object
    ///
    /// Imported items are trusted as-is: a field that is missing or has the
    /// wrong type takes its default instead of failing the import.
    pub fn from_import(item: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            item.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };

        Self {
            id: item.get("id").and_then(Value::as_u64),
            text: text("text"),
            category: text("category"),
            source: item
                .get("source")
                .and_then(|v| QuoteSource::deserialize(v).ok())
                .unwrap_or_default(),
            timestamp: item
                .get("timestamp")
                .and_then(Value::as_i64)
                .unwrap_or_default(),
        }
    }

    /// Whether text and category are the same as another quote's
    ///
    /// Source and timestamp are bookkeeping and do not count as content.
    pub fn same_content(&self, other: &Quote) -> bool {
        self.text == other.text && self.category == other.category
    }
}

/// A same-id mismatch between a local quote and a server quote
///
/// Only produced during a sync pass; the server value has already replaced
/// the local one by the time the record is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub id: u64,
    pub local: Quote,
    pub server: Quote,
}

/// Normalize a category: trimmed and lower-cased
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

/// The built-in quote set used on first run and after a reset
pub fn default_quotes() -> Vec<Quote> {
    const SEED: [(&str, &str); 8] = [
        ("The only way to do great work is to love what you do.", "motivation"),
        ("Life is what happens to you while you're busy making other plans.", "life"),
        ("The future belongs to those who believe in the beauty of their dreams.", "dreams"),
        ("It is during our darkest moments that we must focus to see the light.", "inspiration"),
        ("The only impossible journey is the one you never begin.", "motivation"),
        (
            "In the end, we will remember not the words of our enemies, but the silence of our friends.",
            "friendship",
        ),
        (
            "Success is not final, failure is not fatal: it is the courage to continue that counts.",
            "success",
        ),
        ("The way to get started is to quit talking and begin doing.", "action"),
    ];

    // Seeds carry a zero timestamp so that two default sets compare equal.
    SEED.iter()
        .map(|(text, category)| Quote {
            id: None,
            text: (*text).to_string(),
            category: (*category).to_string(),
            source: QuoteSource::Local,
            timestamp: 0,
        })
        .collect()
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
