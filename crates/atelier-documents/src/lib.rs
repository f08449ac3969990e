//! Atelier Documents
//!
//! An open document is a diagram of some notation backed by a file.
//! Documents keep their identity for as long as they are open: a save swaps the
//! backing file but never the id.

mod document;
mod error;
mod state;
mod view;

pub use document::{Document, DocumentType, File, EMPTY_DOCUMENT_ID};
pub use error::DocumentError;
pub use state::DocumentPhase;
pub use view::{LogCategory, LogEntry, ViewState};

pub type Result<T> = std::result::Result<T, DocumentError>;
