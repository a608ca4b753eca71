//! Storage errors
//!
//! Each variant names the step that failed. [`StorageError::hint`] turns the
//! underlying I/O failure into something the user can act on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing persisted values
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot create data directory '{path}': {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temp file was written but could not replace the target
    #[error("Cannot replace '{path}' with the new snapshot: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot encode value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What kind of I/O failure sits under a storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoFailure {
    Denied,
    NoSpace,
    Other,
}

impl IoFailure {
    fn classify(error: &io::Error) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return IoFailure::Denied;
        }
        let msg = error.to_string().to_lowercase();
        if msg.contains("no space left") || msg.contains("quota exceeded") {
            IoFailure::NoSpace
        } else {
            IoFailure::Other
        }
    }
}

impl StorageError {
    fn io_source(&self) -> Option<&io::Error> {
        match self {
            StorageError::DataDir { source, .. }
            | StorageError::Read { source, .. }
            | StorageError::Write { source, .. }
            | StorageError::Replace { source, .. } => Some(source),
            StorageError::Serialize { .. } => None,
        }
    }

    /// Classify the underlying I/O failure, if any
    pub fn io_failure(&self) -> Option<IoFailure> {
        self.io_source().map(IoFailure::classify)
    }

    /// What the user can do about it
    pub fn hint(&self) -> Option<&'static str> {
        match (self.io_failure(), self) {
            (Some(IoFailure::Denied), _) => {
                Some("Check permissions on the data directory, or set data_dir to a writable path.")
            }
            (Some(IoFailure::NoSpace), _) => Some("Free up disk space and try again."),
            (Some(IoFailure::Other), StorageError::DataDir { .. }) => {
                Some("Set data_dir to a directory you can create, e.g. `quotebook config set data_dir <path>`.")
            }
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn write_error(kind: io::ErrorKind, msg: &str) -> StorageError {
        StorageError::Write {
            path: PathBuf::from("/data/quotes.json"),
            source: io::Error::new(kind, msg.to_string()),
        }
    }

    #[test]
    fn test_permission_denied_has_hint() {
        let err = write_error(io::ErrorKind::PermissionDenied, "access denied");
        assert_eq!(err.io_failure(), Some(IoFailure::Denied));
        assert!(err.hint().unwrap().contains("data_dir"));
    }

    #[test]
    fn test_no_space_has_hint() {
        let err = write_error(io::ErrorKind::Other, "No space left on device");
        assert_eq!(err.io_failure(), Some(IoFailure::NoSpace));
        assert!(err.hint().unwrap().contains("disk space"));
    }

    #[test]
    fn test_unclassified_write_has_no_hint() {
        let err = write_error(io::ErrorKind::Other, "something odd");
        assert_eq!(err.io_failure(), Some(IoFailure::Other));
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_data_dir_failure_always_hints() {
        let err = StorageError::DataDir {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing parent"),
        };
        assert!(err.hint().is_some());
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn test_serialize_error_has_no_io_failure() {
        let err = StorageError::Serialize {
            key: "quotes".to_string(),
            source: serde_json::from_str::<u8>("x").unwrap_err(),
        };
        assert!(err.io_failure().is_none());
        assert!(err.hint().is_none());
    }
}
