//! Scripted collaborators for session tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use atelier_documents::{Document, DocumentType, File};

use crate::collaborators::{
    Collaborators, CreateOptions, Dialog, DocumentCache, ErrorReporter, FileFilter, FileSystem,
    PromptOptions, Renderer, RendererFault, SaveChoice, TypeProvider, WorkspaceLayout,
    WorkspaceStore, WriteOptions,
};
use crate::manager::{SessionConfig, SessionManager};

pub(crate) fn bpmn() -> DocumentType {
    DocumentType::new("bpmn")
}

/// Answers every activation with a shown signal, like a mounted editor would
pub(crate) fn auto_show(manager: &SessionManager) -> JoinHandle<()> {
    let mut activations = manager.subscribe();
    let manager = manager.clone();

    tokio::spawn(async move {
        while activations.changed().await.is_ok() {
            let document = activations.borrow_and_update().clone();
            manager.on_shown(&document);
        }
    })
}

#[derive(Default)]
pub(crate) struct FakeRenderer {
    actions: Mutex<Vec<(String, String)>>,
}

impl FakeRenderer {
    pub(crate) fn actions(&self) -> Vec<(String, String)> {
        self.actions.lock().clone()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn request_action(
        &self,
        document: &Document,
        action: &str,
        payload: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        self.actions
            .lock()
            .push((document.id.clone(), action.to_string()));

        match action {
            "save" => Ok(serde_json::Value::String(format!(
                "<definitions id=\"{}\"/>",
                document.id
            ))),
            "export-as" => Ok(serde_json::json!({
                "contents": format!("<svg format=\"{}\"/>", payload["format"].as_str().unwrap_or(""))
            })),
            other => anyhow::bail!("unsupported action {}", other),
        }
    }
}

pub(crate) struct FakeTypes {
    renderer: Arc<FakeRenderer>,
    resolutions: AtomicUsize,
    fail: AtomicBool,
}

impl FakeTypes {
    pub(crate) fn new() -> Self {
        Self {
            renderer: Arc::new(FakeRenderer::default()),
            resolutions: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub(crate) fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_resolution(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn renderer(&self) -> &FakeRenderer {
        &self.renderer
    }
}

#[async_trait]
impl TypeProvider for FakeTypes {
    fn create_file(&self, doc_type: &DocumentType, options: &CreateOptions) -> anyhow::Result<File> {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| format!("diagram.{}", doc_type));
        Ok(File::unsaved(name, "")?)
    }

    fn detect_type(&self, file: &File) -> Option<DocumentType> {
        match file.extension()?.as_str() {
            ext @ ("bpmn" | "dmn" | "form") => Some(DocumentType::new(ext)),
            _ => None,
        }
    }

    fn file_filters(&self, doc_type: &DocumentType) -> Vec<FileFilter> {
        vec![FileFilter::new(doc_type.as_str().to_uppercase(), &[doc_type.as_str()])]
    }

    async fn resolve_renderer(&self, doc_type: &DocumentType) -> anyhow::Result<Arc<dyn Renderer>> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("no renderer for {}", doc_type);
        }

        self.resolutions.fetch_add(1, Ordering::SeqCst);
        Ok(self.renderer.clone())
    }
}

/// Dialog answering from scripted queues. Unscripted questions are answered
/// with Save, a dismissed path dialog and a dismissed prompt.
#[derive(Default)]
pub(crate) struct FakeDialog {
    confirms: Mutex<VecDeque<SaveChoice>>,
    paths: Mutex<VecDeque<Option<PathBuf>>>,
    prompts: Mutex<VecDeque<Option<String>>>,
    confirm_calls: AtomicUsize,
    path_calls: AtomicUsize,
}

impl FakeDialog {
    pub(crate) fn answer_confirm(&self, choice: SaveChoice) {
        self.confirms.lock().push_back(choice);
    }

    pub(crate) fn answer_path(&self, path: Option<&str>) {
        self.paths.lock().push_back(path.map(PathBuf::from));
    }

    pub(crate) fn answer_prompt(&self, button: Option<&str>) {
        self.prompts.lock().push_back(button.map(str::to_string));
    }

    pub(crate) fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn path_calls(&self) -> usize {
        self.path_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dialog for FakeDialog {
    async fn confirm_save(&self, _file: &File) -> SaveChoice {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.confirms.lock().pop_front().unwrap_or(SaveChoice::Save)
    }

    async fn prompt_save_path(&self, _file: &File, _filters: &[FileFilter]) -> Option<PathBuf> {
        self.path_calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().pop_front().flatten()
    }

    async fn prompt(&self, _options: PromptOptions) -> Option<String> {
        self.prompts.lock().pop_front().flatten()
    }
}

#[derive(Default)]
pub(crate) struct FakeFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<Vec<PathBuf>>,
    failures: AtomicUsize,
    abandon: AtomicBool,
}

impl FakeFileSystem {
    pub(crate) fn add_file(&self, path: &str, contents: &str) {
        self.files
            .lock()
            .insert(PathBuf::from(path), contents.to_string());
    }

    pub(crate) fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().clone()
    }

    pub(crate) fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().get(Path::new(path)).cloned()
    }

    /// Fail the next `count` writes with an IO error
    pub(crate) fn fail_writes(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Report every write as abandoned
    pub(crate) fn abandon_writes(&self, abandon: bool) {
        self.abandon.store(abandon, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileSystem for FakeFileSystem {
    async fn read_file(&self, path: &Path) -> anyhow::Result<File> {
        match self.files.lock().get(path) {
            Some(contents) => Ok(File::at_path(path, contents.clone())),
            None => anyhow::bail!("no such file: {}", path.display()),
        }
    }

    async fn write_file(
        &self,
        path: &Path,
        file: &File,
        _options: &WriteOptions,
    ) -> anyhow::Result<Option<File>> {
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            anyhow::bail!("disk full");
        }

        if self.abandon.load(Ordering::SeqCst) {
            return Ok(None);
        }

        self.writes.lock().push(path.to_path_buf());
        self.files
            .lock()
            .insert(path.to_path_buf(), file.contents.clone());

        Ok(Some(File::at_path(path, file.contents.clone())))
    }
}

#[derive(Default)]
pub(crate) struct FakeCache {
    released: Mutex<Vec<String>>,
}

impl FakeCache {
    pub(crate) fn released(&self) -> Vec<String> {
        self.released.lock().clone()
    }
}

impl DocumentCache for FakeCache {
    fn release(&self, document_id: &str) {
        self.released.lock().push(document_id.to_string());
    }
}

#[derive(Default)]
pub(crate) struct FakeErrors {
    reports: Mutex<Vec<(String, String)>>,
}

impl FakeErrors {
    pub(crate) fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().clone()
    }
}

impl ErrorReporter for FakeErrors {
    fn report(&self, document: &Document, fault: &RendererFault) {
        self.reports
            .lock()
            .push((document.id.clone(), fault.message.clone()));
    }
}

#[derive(Default)]
pub(crate) struct FakeWorkspace {
    stored: Mutex<Option<WorkspaceLayout>>,
}

impl FakeWorkspace {
    pub(crate) fn last_saved(&self) -> Option<WorkspaceLayout> {
        self.stored.lock().clone()
    }
}

impl WorkspaceStore for FakeWorkspace {
    fn load(&self) -> anyhow::Result<Option<WorkspaceLayout>> {
        Ok(self.stored.lock().clone())
    }

    fn save(&self, layout: &WorkspaceLayout) -> anyhow::Result<()> {
        *self.stored.lock() = Some(layout.clone());
        Ok(())
    }
}

pub(crate) struct Harness {
    pub(crate) manager: SessionManager,
    pub(crate) types: Arc<FakeTypes>,
    pub(crate) dialog: Arc<FakeDialog>,
    pub(crate) fs: Arc<FakeFileSystem>,
    pub(crate) cache: Arc<FakeCache>,
    pub(crate) errors: Arc<FakeErrors>,
    pub(crate) workspace: Arc<FakeWorkspace>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::build(FakeWorkspace::default(), SessionConfig::default())
    }

    pub(crate) fn with_workspace(layout: WorkspaceLayout) -> Self {
        let workspace = FakeWorkspace {
            stored: Mutex::new(Some(layout)),
        };
        Self::build(workspace, SessionConfig::default())
    }

    pub(crate) fn with_config(config: SessionConfig) -> Self {
        Self::build(FakeWorkspace::default(), config)
    }

    fn build(workspace: FakeWorkspace, config: SessionConfig) -> Self {
        let types = Arc::new(FakeTypes::new());
        let dialog = Arc::new(FakeDialog::default());
        let fs = Arc::new(FakeFileSystem::default());
        let cache = Arc::new(FakeCache::default());
        let errors = Arc::new(FakeErrors::default());
        let workspace = Arc::new(workspace);

        let manager = SessionManager::new(
            Collaborators {
                types: types.clone(),
                dialog: dialog.clone(),
                fs: fs.clone(),
                cache: cache.clone(),
                errors: errors.clone(),
                workspace: workspace.clone(),
            },
            config,
        );

        Self {
            manager,
            types,
            dialog,
            fs,
            cache,
            errors,
            workspace,
        }
    }
}
