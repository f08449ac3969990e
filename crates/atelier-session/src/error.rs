//! Session error types

use thiserror::Error;

/// A "shown" signal named a document other than the one awaited
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tab mismatch: waiting for {expected}, got {actual}")]
pub struct TabMismatch {
    pub expected: String,
    pub actual: String,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Operation cancelled by user")]
    Cancelled,

    #[error(transparent)]
    TabMismatch(#[from] TabMismatch),

    #[error("Showing document {0} was aborted")]
    ShowAborted(String),

    #[error("no last tab")]
    NoLastTab,

    #[error("Document already open: {0}")]
    AlreadyOpen(String),

    #[error("Document not open: {0}")]
    NotOpen(String),

    #[error("Invalid response to {action}: {reason}")]
    InvalidResponse { action: String, reason: String },

    #[error("Document error: {0}")]
    Document(#[from] atelier_documents::DocumentError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl SessionError {
    /// The user backed out of a dialog
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled)
    }
}
