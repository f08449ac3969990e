//! Atelier Session Management
//!
//! The session owns everything about the set of open documents:
//! - The open list (tab order) and the single active document
//! - Dirty tracking, saving and the interactive save protocol
//! - Back / forward navigation and recall of closed documents
//! - The persisted workspace handed to the workspace store
//!
//! Editors, dialogs and the file system are collaborators behind traits.

mod close;
mod collaborators;
mod error;
mod events;
mod manager;
mod renderers;
mod save;
mod shown;

#[cfg(test)]
mod testing;

pub use collaborators::{
    Collaborators, CreateOptions, Dialog, DocumentCache, ErrorReporter, FileFilter, FileSystem,
    PromptButton, PromptOptions, Renderer, RendererFault, SaveChoice, TypeProvider,
    WorkspaceLayout, WorkspaceStore, WriteOptions,
};
pub use error::{SessionError, TabMismatch};
pub use events::{ChangedProps, RendererEvent};
pub use manager::{OpenedFiles, SessionConfig, SessionManager};
pub use renderers::RendererCache;
pub use save::{SaveOptions, SaveOutcome};

pub use atelier_navigation::Direction;

pub type Result<T> = std::result::Result<T, SessionError>;
