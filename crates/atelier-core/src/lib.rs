//! Atelier Core
//!
//! Composition root of the modeler shell. Wires configuration, storage and the
//! document session together; editors, dialogs and the file system are plugged in
//! by the host through `Services`.

mod config;
mod error;
mod shell;
mod workspace;

pub use config::Config;
pub use error::CoreError;
pub use shell::{Services, Shell};
pub use workspace::SqliteWorkspaceStore;

// Re-export core components
pub use atelier_documents::{
    Document, DocumentError, DocumentPhase, DocumentType, File, LogCategory, LogEntry,
    ViewState, EMPTY_DOCUMENT_ID,
};
pub use atelier_navigation::{Direction, NavigationHistory};
pub use atelier_session::{
    ChangedProps, Collaborators, CreateOptions, Dialog, DocumentCache, ErrorReporter,
    FileFilter, FileSystem, OpenedFiles, PromptButton, PromptOptions, Renderer, RendererEvent,
    RendererFault, SaveChoice, SaveOptions, SaveOutcome, SessionConfig, SessionError,
    SessionManager, TabMismatch, TypeProvider, WorkspaceLayout, WorkspaceStore, WriteOptions,
};
pub use atelier_storage::{Database, StorageError, WorkspaceRecord};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
