//! Atelier Storage Layer
//!
//! SQLite-based persistence for shell state that outlives a run:
//! settings and the workspace (open files, active file, panel layout).

mod database;
mod error;
mod migrations;
mod workspace;

pub use database::Database;
pub use error::StorageError;
pub use workspace::WorkspaceRecord;

pub type Result<T> = std::result::Result<T, StorageError>;
