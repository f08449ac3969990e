//! Session Manager
//!
//! Owns the open list, the active document and both histories, and sequences
//! activation against the renderer's "shown" signal.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

use atelier_documents::{
    Document, DocumentPhase, DocumentType, File, LogCategory, ViewState,
};
use atelier_navigation::{Direction, NavigationHistory};

use crate::collaborators::{
    Collaborators, CreateOptions, Renderer, RendererFault, WorkspaceLayout,
};
use crate::error::SessionError;
use crate::events::{ChangedProps, RendererEvent};
use crate::renderers::RendererCache;
use crate::shown::{ShownOutcome, ShownSignal};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Closed documents remembered for reopening
    pub closed_history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            closed_history_limit: 20,
        }
    }
}

/// Result of opening a batch of files
#[derive(Debug, Clone, Default)]
pub struct OpenedFiles {
    /// Opened or already open documents, in request order
    pub documents: Vec<Document>,
    /// Files no notation claimed
    pub unrecognized: Vec<File>,
}

pub(crate) struct SessionState {
    pub(crate) documents: Vec<Document>,
    pub(crate) active: Document,
    pub(crate) dirty: HashMap<String, bool>,
    pub(crate) view: ViewState,
    /// `None` while the renderer of the active document is being resolved
    pub(crate) renderer: Option<Arc<dyn Renderer>>,
    pub(crate) shown: Option<ShownSignal>,
    pub(crate) navigation: NavigationHistory<Document>,
    pub(crate) closed: NavigationHistory<Document>,
    pub(crate) layout: serde_json::Value,
}

impl SessionState {
    fn new() -> Self {
        let active = Document::empty();
        Self {
            view: ViewState::new(active.id.clone()),
            active,
            documents: Vec::new(),
            dirty: HashMap::new(),
            renderer: None,
            shown: None,
            navigation: NavigationHistory::new(),
            closed: NavigationHistory::new(),
            layout: serde_json::Value::Null,
        }
    }

    /// Latest snapshot of an open document
    pub(crate) fn find(&self, document: &Document) -> Option<&Document> {
        self.documents.iter().find(|d| *d == document)
    }

    pub(crate) fn find_by_path(&self, path: &Path) -> Option<&Document> {
        self.documents.iter().find(|d| d.path() == Some(path))
    }

    pub(crate) fn is_dirty(&self, document: &Document) -> bool {
        let document = self.find(document).unwrap_or(document);
        document.is_unsaved() || self.dirty.get(&document.id).copied().unwrap_or(false)
    }

    /// Insert right after `anchor`, or at the end when the anchor is not open
    pub(crate) fn insert_after(&mut self, anchor: &Document, document: Document) -> Result<()> {
        if self.documents.contains(&document) {
            return Err(SessionError::AlreadyOpen(document.id));
        }

        let index = self
            .documents
            .iter()
            .position(|d| d == anchor)
            .map_or(self.documents.len(), |i| i + 1);
        self.documents.insert(index, document);

        Ok(())
    }

    pub(crate) fn insert_after_active(&mut self, document: Document) -> Result<()> {
        let anchor = self.active.clone();
        self.insert_after(&anchor, document)
    }

    /// Neighbour of the active document in the open list, wrapping around
    fn adjacent(&self, direction: Direction) -> Option<Document> {
        let len = self.documents.len() as isize;
        if len == 0 {
            return None;
        }

        let index = match self.documents.iter().position(|d| *d == self.active) {
            Some(index) => (index as isize + direction.delta()).rem_euclid(len),
            None if direction == Direction::Forward => 0,
            None => len - 1,
        };

        self.documents.get(index as usize).cloned()
    }

    /// Complete the pending activation of the active document
    fn mark_shown(&mut self) -> Result<()> {
        self.view.shown_pending = false;
        self.view.transition_to(DocumentPhase::Shown)?;

        if let Some(signal) = self.shown.as_mut() {
            signal.resolve();
        }

        Ok(())
    }

    fn workspace_layout(&self) -> WorkspaceLayout {
        WorkspaceLayout {
            files: self
                .documents
                .iter()
                .filter_map(|d| d.path().map(Path::to_path_buf))
                .collect(),
            active_file: self.active.path().map(Path::to_path_buf),
            layout: self.layout.clone(),
        }
    }
}

/// Outcome of swapping the active pointer
pub(crate) enum Activation {
    /// The document was already active
    Current(Option<ShownOutcome>),
    /// The document just became active
    Started(ShownOutcome),
}

pub struct SessionManager {
    pub(crate) state: Arc<Mutex<SessionState>>,
    pub(crate) collaborators: Collaborators,
    pub(crate) renderers: Arc<RendererCache>,
    activations: Arc<watch::Sender<Document>>,
    pub(crate) config: SessionConfig,
}

impl SessionManager {
    pub fn new(collaborators: Collaborators, config: SessionConfig) -> Self {
        let (activations, _) = watch::channel(Document::empty());

        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            collaborators,
            renderers: Arc::new(RendererCache::new()),
            activations: Arc::new(activations),
            config,
        }
    }

    /// Open documents in tab order
    pub fn documents(&self) -> Vec<Document> {
        self.state.lock().documents.clone()
    }

    /// Latest snapshot of an open document
    pub fn document(&self, document_id: &str) -> Option<Document> {
        self.state
            .lock()
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .cloned()
    }

    pub fn find_by_path(&self, path: &Path) -> Option<Document> {
        self.state.lock().find_by_path(path).cloned()
    }

    /// The active document, `Document::empty()` when nothing is shown
    pub fn active_document(&self) -> Document {
        self.state.lock().active.clone()
    }

    pub fn view_state(&self) -> ViewState {
        self.state.lock().view.clone()
    }

    pub fn is_dirty(&self, document: &Document) -> bool {
        self.state.lock().is_dirty(document)
    }

    /// Documents currently remembered for `reopen_last_closed`
    pub fn closed_count(&self) -> usize {
        self.state.lock().closed.len()
    }

    /// Documents in the live navigation history, oldest first
    pub fn navigation_entries(&self) -> Vec<Document> {
        self.state.lock().navigation.iter().cloned().collect()
    }

    /// Every change of the active document. The composition layer renders the
    /// new document and answers with `on_shown`.
    pub fn subscribe(&self) -> watch::Receiver<Document> {
        self.activations.subscribe()
    }

    /// Create a diagram of `doc_type` right after the active document.
    /// The new document is not activated.
    pub fn create_document(
        &self,
        doc_type: &DocumentType,
        options: &CreateOptions,
    ) -> Result<Document> {
        let file = self.collaborators.types.create_file(doc_type, options)?;
        let document = Document::new(doc_type.clone(), file);

        self.state.lock().insert_after_active(document.clone())?;

        tracing::info!(
            document_id = %document.id,
            doc_type = %document.doc_type,
            name = %document.name(),
            "Created document"
        );

        Ok(document)
    }

    /// Create a diagram and show it
    pub async fn new_document(&self, doc_type: &DocumentType) -> Result<Document> {
        let document = self.create_document(doc_type, &CreateOptions::default())?;
        self.show_document(&document).await?;
        Ok(document)
    }

    /// Open files, reusing documents already open from the same path, and show
    /// the last of them
    pub async fn open_files(&self, files: Vec<File>) -> Result<OpenedFiles> {
        let opened = self.insert_files(files)?;

        if let Some(last) = opened.documents.last() {
            self.persist_workspace();
            self.show_document(last).await?;
        }

        Ok(opened)
    }

    /// Read `path` through the file system and open it
    pub async fn open_path(&self, path: &Path) -> Result<OpenedFiles> {
        let file = self.collaborators.fs.read_file(path).await?;
        self.open_files(vec![file]).await
    }

    fn insert_files(&self, files: Vec<File>) -> Result<OpenedFiles> {
        let mut opened = OpenedFiles::default();
        let mut state = self.state.lock();
        let mut anchor = state.active.clone();

        for file in files {
            let existing = file
                .path
                .as_deref()
                .and_then(|path| state.find_by_path(path))
                .cloned();

            if let Some(document) = existing {
                tracing::debug!(document_id = %document.id, "File already open");
                opened.documents.push(document);
                continue;
            }

            let Some(doc_type) = self.collaborators.types.detect_type(&file) else {
                tracing::warn!(name = %file.name, "Unrecognized file type");
                opened.unrecognized.push(file);
                continue;
            };

            let document = Document::new(doc_type, file);
            state.insert_after(&anchor, document.clone())?;
            anchor = document.clone();

            tracing::info!(
                document_id = %document.id,
                doc_type = %document.doc_type,
                path = ?document.path(),
                "Opened document"
            );

            opened.documents.push(document);
        }

        Ok(opened)
    }

    /// Show `document`. Requests for the document already being shown share
    /// the pending outcome.
    pub async fn show_document(&self, document: &Document) -> Result<()> {
        self.set_active_document(document).await
    }

    /// Make `document` the active one and wait until it is shown
    pub async fn set_active_document(&self, document: &Document) -> Result<()> {
        let outcome = match self.activate(document)? {
            Activation::Current(None) => return Ok(()),
            Activation::Current(Some(outcome)) => outcome,
            Activation::Started(outcome) => {
                self.load_renderer(document).await?;
                outcome
            }
        };

        Ok(outcome.await?)
    }

    /// Activate without waiting for the shown signal
    pub(crate) async fn switch_to(&self, document: &Document) -> Result<()> {
        if let Activation::Started(_) = self.activate(document)? {
            self.load_renderer(document).await?;
        }
        Ok(())
    }

    pub(crate) fn activate(&self, document: &Document) -> Result<Activation> {
        let mut state = self.state.lock();

        if state.active == *document {
            // a failed renderer resolution leaves nothing to wait on, start over
            let failed =
                !document.is_empty() && state.shown.is_none() && !state.view.renderer_ready;
            if !failed {
                return Ok(Activation::Current(
                    state.shown.as_ref().map(ShownSignal::outcome),
                ));
            }
        }

        let document = if document.is_empty() {
            Document::empty()
        } else {
            state
                .find(document)
                .cloned()
                .ok_or_else(|| SessionError::NotOpen(document.id.clone()))?
        };

        if !document.is_empty() && state.navigation.get() != Some(&document) {
            state.navigation.push(document.clone());
        }

        if let Some(mut previous) = state.shown.take() {
            if !previous.is_settled() {
                tracing::debug!(
                    superseded = %previous.document_id(),
                    document_id = %document.id,
                    "Pending show superseded"
                );
            }
            previous.reject(document.id.clone());
        }

        state.active = document.clone();
        state.renderer = None;
        state.view = ViewState::loading(document.id.clone());
        // The sentinel has nothing to resolve
        state.view.renderer_ready = document.is_empty();

        let signal = ShownSignal::new(document.id.clone());
        let outcome = signal.outcome();
        state.shown = Some(signal);
        drop(state);

        tracing::debug!(document_id = %document.id, "Activated document");

        self.activations.send_replace(document);
        self.persist_workspace();

        Ok(Activation::Started(outcome))
    }

    async fn load_renderer(&self, document: &Document) -> Result<()> {
        if document.is_empty() {
            return Ok(());
        }

        let resolved = self
            .renderers
            .resolve(self.collaborators.types.as_ref(), &document.doc_type)
            .await;

        let mut state = self.state.lock();
        if state.active != *document {
            // superseded while resolving, the outcome is already rejected
            return Ok(());
        }

        let renderer = match resolved {
            Ok(renderer) => renderer,
            Err(err) => {
                if let Some(mut signal) = state.shown.take() {
                    signal.abort();
                }
                tracing::error!(
                    document_id = %document.id,
                    doc_type = %document.doc_type,
                    error = %err,
                    "Failed to resolve renderer"
                );
                return Err(err.into());
            }
        };

        state.renderer = Some(renderer);
        state.view.renderer_ready = true;

        if state.view.shown_pending {
            state.mark_shown()?;
        }

        Ok(())
    }

    /// Renderer of the active document, resolving it when still pending
    pub(crate) async fn active_renderer(&self, document: &Document) -> Result<Arc<dyn Renderer>> {
        let current = {
            let state = self.state.lock();
            if state.active == *document {
                state.renderer.clone()
            } else {
                None
            }
        };

        match current {
            Some(renderer) => Ok(renderer),
            None => Ok(self
                .renderers
                .resolve(self.collaborators.types.as_ref(), &document.doc_type)
                .await?),
        }
    }

    /// Step back or forward through visited documents. Walking off either end
    /// of the history picks the neighbour in the open list.
    pub async fn navigate(&self, direction: Direction) -> Result<()> {
        let target = {
            let mut state = self.state.lock();
            let fallback = state.adjacent(direction);
            state.navigation.navigate(direction, |_| fallback).cloned()
        };

        tracing::debug!(direction = %direction, target = ?target.as_ref().map(|d| &d.id), "Navigate");

        match target {
            Some(document) => self.set_active_document(&document).await,
            None => Ok(()),
        }
    }

    /// The renderer finished showing `document`
    pub fn on_shown(&self, document: &Document) {
        let mut state = self.state.lock();

        if state.active != *document {
            let state = &mut *state;
            if let Some(signal) = state.shown.as_mut().filter(|s| !s.is_settled()) {
                tracing::warn!(
                    expected = %signal.document_id(),
                    actual = %document.id,
                    "Shown signal for inactive document"
                );
                signal.reject(document.id.clone());
                // later requests wait for the real signal
                *signal = ShownSignal::new(state.active.id.clone());
            }
            return;
        }

        if !state.view.renderer_ready {
            state.view.shown_pending = true;
            return;
        }

        if let Err(err) = state.mark_shown() {
            tracing::warn!(document_id = %document.id, error = %err, "Ignoring shown signal");
        }
    }

    pub fn on_changed(&self, document: &Document, props: ChangedProps) {
        let mut state = self.state.lock();

        if state.find(document).is_none() {
            tracing::debug!(document_id = %document.id, "Change for closed document ignored");
            return;
        }

        if let Some(dirty) = props.dirty {
            state.dirty.insert(document.id.clone(), dirty);
        }

        if let Some(layout) = props.layout {
            if state.active == *document {
                state.view.layout = layout;
            }
        }
    }

    pub fn on_warning(&self, document: &Document, message: &str) {
        tracing::warn!(document_id = %document.id, warning = %message, "Renderer warning");

        let mut state = self.state.lock();
        if state.active == *document {
            state.view.push_log(LogCategory::Warning, message);
        }
    }

    /// A fault inside the renderer. Logged, kept in the view log and handed to
    /// the error reporter; the session carries on.
    pub fn on_render_error(&self, document: &Document, message: &str) {
        let fault = RendererFault::new(message);

        tracing::error!(document_id = %document.id, error = %fault.message, "Renderer fault");

        {
            let mut state = self.state.lock();
            if state.active == *document {
                state.view.push_log(LogCategory::Error, message);
            }
        }

        self.collaborators.errors.report(document, &fault);
    }

    pub fn handle_renderer_event(&self, document: &Document, event: RendererEvent) {
        match event {
            RendererEvent::Shown => self.on_shown(document),
            RendererEvent::Changed(props) => self.on_changed(document, props),
            RendererEvent::Warning(message) => self.on_warning(document, &message),
            RendererEvent::Error(message) => self.on_render_error(document, &message),
        }
    }

    /// The shell's panel layout changed
    pub fn on_layout_changed(&self, layout: serde_json::Value) {
        self.state.lock().layout = layout;
        self.persist_workspace();
    }

    /// Reopen the workspace of the previous run. Files that cannot be read are
    /// skipped. The recorded active file is activated without waiting for it to
    /// be shown.
    pub async fn restore_workspace(&self) -> Result<Vec<Document>> {
        let Some(workspace) = self.collaborators.workspace.load()? else {
            return Ok(Vec::new());
        };

        self.state.lock().layout = workspace.layout.clone();

        let mut files = Vec::with_capacity(workspace.files.len());
        for path in &workspace.files {
            match self.collaborators.fs.read_file(path).await {
                Ok(file) => files.push(file),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable file");
                }
            }
        }

        let opened = self.insert_files(files)?;

        let active = workspace
            .active_file
            .as_deref()
            .and_then(|path| self.find_by_path(path))
            .or_else(|| opened.documents.first().cloned());

        if let Some(active) = active {
            self.switch_to(&active).await?;
        }

        tracing::info!(document_count = opened.documents.len(), "Restored workspace");

        Ok(opened.documents)
    }

    pub(crate) fn persist_workspace(&self) {
        let layout = self.state.lock().workspace_layout();

        if let Err(err) = self.collaborators.workspace.save(&layout) {
            tracing::warn!(error = %err, "Failed to persist workspace");
        }
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            collaborators: self.collaborators.clone(),
            renderers: Arc::clone(&self.renderers),
            activations: Arc::clone(&self.activations),
            config: self.config.clone(),
        }
    }
}
