//! Errors surfaced by quote operations

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while working with quotes
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Text or category was empty after trimming
    #[error("Please fill in both quote text and category ({field} is empty)")]
    Validation { field: &'static str },

    /// Import payload was not a JSON array of objects
    #[error("Invalid file format: {0}")]
    Format(String),

    /// Fetch or push to the remote source failed
    #[error("Server request failed: {0}")]
    Transport(String),

    /// Persisting a value failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<reqwest::Error> for QuoteError {
    fn from(error: reqwest::Error) -> Self {
        QuoteError::Transport(error.to_string())
    }
}

impl QuoteError {
    /// A recovery hint for failures the user can fix
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            QuoteError::Storage(e) => e.hint(),
            _ => None,
        }
    }
}

/// Result type for quote operations
pub type QuoteResult<T> = Result<T, QuoteError>;
