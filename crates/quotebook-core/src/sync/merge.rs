//! Server-wins merge of a fetched batch into the local collection

use crate::models::{ConflictRecord, Quote};

/// What a merge changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Server quotes appended because no local quote had their id
    pub added: usize,
    /// Local quotes replaced by a differing server quote
    pub updated: usize,
    /// One record per replaced quote
    pub conflicts: Vec<ConflictRecord>,
}

impl MergeOutcome {
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.updated > 0
    }
}

/// Merge server quotes into `local` by id
///
/// - no local quote with that id: append
/// - same id, same text and category: nothing
/// - same id, different content: record a conflict and replace the local
///   quote with the server one
///
/// Merging the same batch twice leaves the collection as merging it once.
pub fn merge_server_batch(local: &mut Vec<Quote>, batch: Vec<Quote>) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for server in batch {
        let Some(id) = server.id else {
            continue;
        };

        match local.iter().position(|q| q.id == Some(id)) {
            None => {
                local.push(server);
                outcome.added += 1;
            }
            Some(pos) if local[pos].same_content(&server) => {}
            Some(pos) => {
                let previous = std::mem::replace(&mut local[pos], server.clone());
                outcome.conflicts.push(ConflictRecord {
                    id,
                    local: previous,
                    server,
                });
                outcome.updated += 1;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteSource;

    fn local_with_id(id: u64, text: &str, category: &str) -> Quote {
        let mut quote = Quote::local(text, category).unwrap();
        quote.id = Some(id);
        quote
    }

    #[test]
    fn test_new_ids_are_appended() {
        let mut local = vec![Quote::local("Mine.", "life").unwrap()];
        let batch = vec![Quote::server(1, "A.", "wisdom"), Quote::server(2, "B.", "life")];

        let outcome = merge_server_batch(&mut local, batch);

        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.updated, 0);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(local.len(), 3);
        assert_eq!(local[1].id, Some(1));
        assert_eq!(local[2].source, QuoteSource::Server);
    }

    #[test]
    fn test_matching_content_is_noop() {
        let mut local = vec![Quote::server(1, "A.", "wisdom")];
        let before = local.clone();

        let outcome = merge_server_batch(&mut local, vec![Quote::server(1, "A.", "wisdom")]);

        assert!(!outcome.has_changes());
        assert_eq!(local, before);
    }

    #[test]
    fn test_conflict_server_wins() {
        let mut local = vec![local_with_id(1, "A", "x")];

        let outcome = merge_server_batch(&mut local, vec![Quote::server(1, "B", "x")]);

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.conflicts.len(), 1);
        let conflict = &outcome.conflicts[0];
        assert_eq!(conflict.id, 1);
        assert_eq!(conflict.local.text, "A");
        assert_eq!(conflict.server.text, "B");

        assert_eq!(local.len(), 1);
        assert_eq!(local[0].id, Some(1));
        assert_eq!(local[0].text, "B");
        assert_eq!(local[0].category, "x");
    }

    #[test]
    fn test_category_difference_is_a_conflict() {
        let mut local = vec![local_with_id(4, "Same.", "life")];

        let outcome = merge_server_batch(&mut local, vec![Quote::server(4, "Same.", "wisdom")]);

        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(local[0].category, "wisdom");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = vec![
            Quote::server(1, "A.", "wisdom"),
            Quote::server(2, "B.", "life"),
            Quote::server(3, "C.", "success"),
        ];
        let mut local = vec![local_with_id(2, "Old.", "life")];

        merge_server_batch(&mut local, batch.clone());
        let once: Vec<(Option<u64>, String, String)> = local
            .iter()
            .map(|q| (q.id, q.text.clone(), q.category.clone()))
            .collect();

        let second = merge_server_batch(&mut local, batch);
        let twice: Vec<(Option<u64>, String, String)> = local
            .iter()
            .map(|q| (q.id, q.text.clone(), q.category.clone()))
            .collect();

        assert!(!second.has_changes());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_local_quotes_without_id_are_untouched() {
        let mine = Quote::local("A.", "wisdom").unwrap();
        let mut local = vec![mine.clone()];

        merge_server_batch(&mut local, vec![Quote::server(1, "A.", "wisdom")]);

        assert_eq!(local[0], mine);
        assert_eq!(local.len(), 2);
    }
}
