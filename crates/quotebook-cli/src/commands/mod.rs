//! Command handlers

pub mod category;
pub mod config;
pub mod quote;
pub mod status;
pub mod sync;
pub mod watch;

use quotebook_core::{QuoteError, StorageError};

/// Find a recovery hint anywhere in an error chain
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<QuoteError>() {
            e.hint()
        } else {
            cause.downcast_ref::<StorageError>().and_then(StorageError::hint)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Output, OutputFormat};
    use anyhow::Context;
    use quotebook_core::{FileStore, QuoteStore};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hint_found_through_context() {
        let err = StorageError::Write {
            path: "/data/quotes.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let err = Err::<(), _>(QuoteError::from(err))
            .context("Failed to reset quotes")
            .unwrap_err();

        assert!(recovery_hint(&err).is_some());
    }

    #[test]
    fn test_no_hint_for_validation() {
        let err = anyhow::Error::new(QuoteError::Validation { field: "text" });
        assert!(recovery_hint(&err).is_none());
    }

    #[test]
    fn test_failed_import_carries_hint() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let import_path = temp_dir.path().join("import.json");
        fs::write(&import_path, r#"[{"text": "t", "category": "c"}]"#).unwrap();

        let mut store = QuoteStore::with_persistence(FileStore::new(blocker.join("data")));
        let output = Output::new(OutputFormat::Quiet);
        let err = quote::import(&mut store, &import_path, &output).unwrap_err();

        assert!(recovery_hint(&err).is_some());
    }
}
