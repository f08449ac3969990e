//! External collaborators
//!
//! The session only calls into these; none of them is handed session state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use atelier_documents::{Document, DocumentType, File};

/// Options passed to the type provider when creating a new diagram
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOptions {
    /// File name, the provider picks one when absent
    pub name: Option<String>,
    /// Notation specific template parameters
    #[serde(default)]
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// Answer to "save changes before closing?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveChoice {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptButton {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOptions {
    pub title: String,
    pub message: String,
    pub buttons: Vec<PromptButton>,
    pub default_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    pub encoding: String,
    /// Target path was picked interactively
    pub save_as: bool,
    pub file_type: Option<String>,
}

/// Error raised by the renderer of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererFault {
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl RendererFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Workspace handed to the workspace store on every relevant change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceLayout {
    pub files: Vec<PathBuf>,
    pub active_file: Option<PathBuf>,
    /// Panel layout of the shell
    pub layout: serde_json::Value,
}

/// Registry of notations: templates, detection and renderers
#[async_trait]
pub trait TypeProvider: Send + Sync {
    /// Materialize the backing file of a new diagram
    fn create_file(&self, doc_type: &DocumentType, options: &CreateOptions) -> anyhow::Result<File>;

    /// Notation of an opened file, `None` when unrecognized
    fn detect_type(&self, file: &File) -> Option<DocumentType>;

    /// Filters offered by the save dialog
    fn file_filters(&self, _doc_type: &DocumentType) -> Vec<FileFilter> {
        Vec::new()
    }

    /// Renderer handle for a notation. May load lazily.
    async fn resolve_renderer(&self, doc_type: &DocumentType) -> anyhow::Result<Arc<dyn Renderer>>;
}

/// Surface of the renderer that edits the active document
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Run an action (`save`, `export-as`, notation specific ones)
    async fn request_action(
        &self,
        document: &Document,
        action: &str,
        payload: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value>;
}

#[async_trait]
pub trait Dialog: Send + Sync {
    async fn confirm_save(&self, file: &File) -> SaveChoice;

    /// Target path for a save, `None` when dismissed
    async fn prompt_save_path(&self, file: &File, filters: &[FileFilter]) -> Option<PathBuf>;

    /// Id of the chosen button, `None` when dismissed
    async fn prompt(&self, options: PromptOptions) -> Option<String>;
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read_file(&self, path: &Path) -> anyhow::Result<File>;

    /// The written file, `None` when the write was abandoned
    async fn write_file(
        &self,
        path: &Path,
        file: &File,
        options: &WriteOptions,
    ) -> anyhow::Result<Option<File>>;
}

/// Resources kept per document outside the session (editor caches)
pub trait DocumentCache: Send + Sync {
    fn release(&self, document_id: &str);
}

pub trait ErrorReporter: Send + Sync {
    fn report(&self, document: &Document, fault: &RendererFault);
}

pub trait WorkspaceStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<WorkspaceLayout>>;

    fn save(&self, layout: &WorkspaceLayout) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct Collaborators {
    pub types: Arc<dyn TypeProvider>,
    pub dialog: Arc<dyn Dialog>,
    pub fs: Arc<dyn FileSystem>,
    pub cache: Arc<dyn DocumentCache>,
    pub errors: Arc<dyn ErrorReporter>,
    pub workspace: Arc<dyn WorkspaceStore>,
}
