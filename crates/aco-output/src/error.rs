//! Error types for aco-output.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Errors that can occur when writing colony output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;

/// Shared holder for the first write error.
///
/// The observer is moved into the colony, so the error is read through a
/// clone of this handle taken beforehand.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot(Arc<Mutex<Option<OutputError>>>);

impl ErrorSlot {
    /// Keep `error` unless an earlier one is already stored.
    pub(crate) fn store(&self, error: OutputError) {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    /// Take the stored error, if any.
    pub fn take(&self) -> Option<OutputError> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
