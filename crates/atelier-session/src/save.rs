//! Saving documents
//!
//! The interactive protocol: optionally confirm, show the document, collect the
//! serialized diagram from its renderer, pick a target and write. Nothing about
//! the document changes unless the write went through.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use atelier_documents::{Document, File};

use crate::collaborators::{FileFilter, PromptButton, PromptOptions, SaveChoice, WriteOptions};
use crate::error::SessionError;
use crate::manager::SessionManager;
use crate::Result;

const RETRY_BUTTON: &str = "retry";
const CANCEL_BUTTON: &str = "cancel";

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Always ask for a target path
    pub save_as: bool,
    /// Ask save / discard / cancel first
    pub ask: bool,
}

#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved(Document),
    /// The user chose not to keep the changes
    Discarded,
}

/// Renderers answer with the bare contents or wrap them
#[derive(Deserialize)]
#[serde(untagged)]
enum ActionContents {
    Plain(String),
    Wrapped { contents: String },
}

impl ActionContents {
    fn parse(action: &str, response: serde_json::Value) -> Result<String> {
        match serde_json::from_value(response) {
            Ok(ActionContents::Plain(contents)) | Ok(ActionContents::Wrapped { contents }) => {
                Ok(contents)
            }
            Err(err) => Err(SessionError::InvalidResponse {
                action: action.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

impl SessionManager {
    pub async fn save_document(
        &self,
        document: &Document,
        options: SaveOptions,
    ) -> Result<SaveOutcome> {
        let document = self
            .document(&document.id)
            .ok_or_else(|| SessionError::NotOpen(document.id.clone()))?;
        let file = document
            .file
            .clone()
            .ok_or_else(|| SessionError::NotOpen(document.id.clone()))?;

        if options.ask {
            match self.collaborators.dialog.confirm_save(&file).await {
                SaveChoice::Cancel => {
                    tracing::info!(document_id = %document.id, "Save cancelled");
                    return Err(SessionError::Cancelled);
                }
                SaveChoice::Discard => {
                    tracing::info!(document_id = %document.id, "Changes discarded");
                    return Ok(SaveOutcome::Discarded);
                }
                SaveChoice::Save => {}
            }
        }

        self.show_document(&document).await?;

        let contents = self.request_contents(&document, "save", serde_json::Value::Null).await?;

        let path = match (&file.path, options.save_as) {
            (Some(path), false) => path.clone(),
            _ => self.prompt_path(&document, &file).await?,
        };

        let candidate = File {
            contents,
            ..file.clone()
        };
        let write_options = WriteOptions {
            encoding: file.encoding.clone(),
            save_as: options.save_as || file.is_unsaved(),
            file_type: Some(document.doc_type.to_string()),
        };

        let written = self.write_with_retry(&path, &candidate, &write_options).await?;

        let Some(written) = written else {
            tracing::info!(document_id = %document.id, "Write abandoned");
            return Err(SessionError::Cancelled);
        };

        Ok(SaveOutcome::Saved(self.mark_saved(&document, written)))
    }

    /// Save every dirty document in tab order, stopping at the first failure
    pub async fn save_all_dirty(&self) -> Result<Vec<Document>> {
        let dirty: Vec<Document> = {
            let state = self.state.lock();
            state
                .documents
                .iter()
                .filter(|d| state.is_dirty(d))
                .cloned()
                .collect()
        };

        let mut saved = Vec::with_capacity(dirty.len());
        for document in &dirty {
            if let SaveOutcome::Saved(document) =
                self.save_document(document, SaveOptions::default()).await?
            {
                saved.push(document);
            }
        }

        Ok(saved)
    }

    /// Export the rendered diagram (`svg`, `png`, ...) to a file of its own.
    /// The document itself is left untouched.
    pub async fn export_as(&self, document: &Document, format: &str) -> Result<File> {
        let document = self
            .document(&document.id)
            .ok_or_else(|| SessionError::NotOpen(document.id.clone()))?;

        self.show_document(&document).await?;

        let contents = self
            .request_contents(&document, "export-as", serde_json::json!({ "format": format }))
            .await?;

        let stem = Path::new(document.name())
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "diagram".to_string());
        let export = File {
            encoding: if format == "png" { "base64" } else { "utf8" }.to_string(),
            ..File::unsaved(format!("{}.{}", stem, format), contents)?
        };

        let filters = [FileFilter::new(format.to_uppercase(), &[format])];
        let path = self
            .collaborators
            .dialog
            .prompt_save_path(&export, &filters)
            .await
            .ok_or(SessionError::Cancelled)?;

        let write_options = WriteOptions {
            encoding: export.encoding.clone(),
            save_as: true,
            file_type: Some(format.to_string()),
        };

        let written = self
            .collaborators
            .fs
            .write_file(&path, &export, &write_options)
            .await?
            .ok_or(SessionError::Cancelled)?;

        tracing::info!(document_id = %document.id, format = %format, path = %path.display(), "Exported document");

        Ok(written)
    }

    async fn request_contents(
        &self,
        document: &Document,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<String> {
        let renderer = self.active_renderer(document).await?;
        let response = renderer.request_action(document, action, payload).await?;
        ActionContents::parse(action, response)
    }

    async fn prompt_path(&self, document: &Document, file: &File) -> Result<PathBuf> {
        let filters = self.collaborators.types.file_filters(&document.doc_type);

        match self.collaborators.dialog.prompt_save_path(file, &filters).await {
            Some(path) => Ok(path),
            None => {
                tracing::info!(document_id = %document.id, "Save target dialog dismissed");
                Err(SessionError::Cancelled)
            }
        }
    }

    async fn write_with_retry(
        &self,
        path: &Path,
        file: &File,
        options: &WriteOptions,
    ) -> Result<Option<File>> {
        loop {
            let err = match self.collaborators.fs.write_file(path, file, options).await {
                Ok(written) => return Ok(written),
                Err(err) => err,
            };

            tracing::warn!(path = %path.display(), error = %err, "Failed to write file");

            let answer = self
                .collaborators
                .dialog
                .prompt(PromptOptions {
                    title: "Saving failed".to_string(),
                    message: format!("Could not save {}: {}", file.name, err),
                    buttons: vec![
                        PromptButton {
                            id: RETRY_BUTTON.to_string(),
                            label: "Retry".to_string(),
                        },
                        PromptButton {
                            id: CANCEL_BUTTON.to_string(),
                            label: "Cancel".to_string(),
                        },
                    ],
                    default_id: Some(RETRY_BUTTON.to_string()),
                })
                .await;

            if answer.as_deref() != Some(RETRY_BUTTON) {
                return Err(err.into());
            }
        }
    }

    fn mark_saved(&self, document: &Document, written: File) -> Document {
        let saved = {
            let mut state = self.state.lock();
            let saved = state.find(document).unwrap_or(document).with_file(written);

            if let Some(slot) = state.documents.iter_mut().find(|d| **d == saved) {
                *slot = saved.clone();
            }
            state.navigation.replace(document, saved.clone());
            state.closed.replace(document, saved.clone());
            if state.active == saved {
                state.active = saved.clone();
            }
            state.dirty.insert(saved.id.clone(), false);

            saved
        };

        tracing::info!(document_id = %saved.id, path = ?saved.path(), "Saved document");

        self.persist_workspace();
        saved
    }
}
