//! Closing and reopening documents

use atelier_documents::{Document, DocumentPhase};

use crate::error::SessionError;
use crate::manager::{SessionManager, SessionState};
use crate::save::SaveOptions;
use crate::Result;

impl SessionState {
    /// Drop `document` from the session, returning its former position
    fn remove_document(&mut self, document: &Document, closed_limit: usize) -> Option<usize> {
        let index = self.documents.iter().position(|d| d == document)?;
        let removed = self.documents.remove(index);

        self.dirty.remove(&removed.id);
        self.navigation.purge(&removed);

        // never persisted documents cannot be reopened
        if !removed.is_unsaved() {
            self.closed.push(removed.clone());
            self.closed.retain_last(closed_limit);
        }

        if self.active == removed {
            if let Err(err) = self.view.transition_to(DocumentPhase::Closed) {
                tracing::debug!(document_id = %removed.id, error = %err, "View already closed");
            }
        }

        Some(index)
    }

    /// Successor of a closed active document
    fn successor(&self, index: usize) -> Document {
        self.navigation
            .get()
            .or_else(|| self.documents.get(index))
            .or_else(|| index.checked_sub(1).and_then(|i| self.documents.get(i)))
            .cloned()
            .unwrap_or_else(Document::empty)
    }
}

impl SessionManager {
    /// Close `document`, asking to save it first when dirty
    pub async fn close_document(&self, document: &Document) -> Result<()> {
        let document = self
            .document(&document.id)
            .ok_or_else(|| SessionError::NotOpen(document.id.clone()))?;

        if self.is_dirty(&document) {
            self.save_document(
                &document,
                SaveOptions {
                    save_as: false,
                    ask: true,
                },
            )
            .await?;
        }

        let successor = {
            let mut state = self.state.lock();
            let was_active = state.active == document;

            let Some(index) = state.remove_document(&document, self.config.closed_history_limit)
            else {
                return Err(SessionError::NotOpen(document.id.clone()));
            };

            was_active.then(|| state.successor(index))
        };

        tracing::info!(document_id = %document.id, name = %document.name(), "Closed document");

        self.collaborators.cache.release(&document.id);

        match successor {
            Some(next) => {
                // the close is committed, a failed activation does not undo it
                if let Err(err) = self.switch_to(&next).await {
                    tracing::warn!(
                        document_id = %next.id,
                        error = %err,
                        "Failed to activate document after close"
                    );
                }
            }
            None => self.persist_workspace(),
        }

        Ok(())
    }

    /// Close every open document matching `predicate`, in tab order. The first
    /// failure, cancellation included, stops the batch.
    pub async fn close_many<F>(&self, predicate: F) -> Result<Vec<Document>>
    where
        F: Fn(&Document) -> bool,
    {
        let targets: Vec<Document> = self
            .documents()
            .into_iter()
            .filter(|d| predicate(d))
            .collect();

        let mut closed = Vec::with_capacity(targets.len());
        for document in targets {
            self.close_document(&document).await?;
            closed.push(document);
        }

        Ok(closed)
    }

    pub async fn close_all(&self) -> Result<Vec<Document>> {
        self.close_many(|_| true).await
    }

    pub async fn close_others(&self, keep: &Document) -> Result<Vec<Document>> {
        self.close_many(|d| d != keep).await
    }

    /// Bring back the most recently closed document
    pub async fn reopen_last_closed(&self) -> Result<Document> {
        let (document, reinserted) = {
            let mut state = self.state.lock();
            let last = state.closed.pop().ok_or(SessionError::NoLastTab)?;

            let open = last
                .path()
                .and_then(|path| state.find_by_path(path))
                .cloned();

            match open {
                Some(open) => (open, false),
                None => {
                    state.insert_after_active(last.clone())?;
                    (last, true)
                }
            }
        };

        if reinserted {
            tracing::info!(document_id = %document.id, path = ?document.path(), "Reopened document");
            self.persist_workspace();
        } else {
            tracing::debug!(document_id = %document.id, "Closed document open again");
        }

        self.show_document(&document).await?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CreateOptions, SaveChoice};
    use crate::events::ChangedProps;
    use crate::manager::SessionConfig;
    use crate::testing::{auto_show, bpmn, Harness};
    use atelier_documents::File;
    use std::path::PathBuf;

    fn create(harness: &Harness) -> Document {
        harness
            .manager
            .create_document(&bpmn(), &CreateOptions::default())
            .unwrap()
    }

    async fn open(harness: &Harness, paths: &[&str]) -> Vec<Document> {
        harness
            .manager
            .open_files(paths.iter().map(|path| File::at_path(*path, "")).collect())
            .await
            .unwrap()
            .documents
    }

    #[tokio::test]
    async fn test_close_active_activates_by_position() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn", "/work/b.bpmn", "/work/c.bpmn"]).await;
        // only c was visited, nothing left in the history once it closes
        manager.close_document(&docs[2]).await.unwrap();
        assert_eq!(manager.active_document(), docs[1]);

        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let a = create(&harness);
        let b = create(&harness);
        let c = create(&harness);
        harness.dialog.answer_confirm(SaveChoice::Discard);

        manager.switch_to(&b).await.unwrap();
        manager.close_document(&b).await.unwrap();

        assert_eq!(manager.active_document(), c);
        assert_eq!(manager.documents(), vec![a, c]);
    }

    #[tokio::test]
    async fn test_close_active_prefers_history() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn", "/work/b.bpmn", "/work/c.bpmn"]).await;
        manager.show_document(&docs[0]).await.unwrap();
        manager.show_document(&docs[1]).await.unwrap();

        manager.close_document(&docs[1]).await.unwrap();

        assert_eq!(manager.active_document(), docs[0]);
        assert_eq!(
            manager.navigation_entries(),
            vec![docs[2].clone(), docs[0].clone()]
        );
        assert_eq!(manager.view_state().document_id, docs[0].id);
    }

    #[tokio::test]
    async fn test_close_succeeds_when_successor_fails_to_load() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/b.dmn", "/work/a.bpmn"]).await;
        harness.types.fail_resolution(true);

        manager.close_document(&docs[1]).await.unwrap();

        assert_eq!(manager.documents(), vec![docs[0].clone()]);
        assert_eq!(manager.active_document(), docs[0]);
        assert!(!manager.view_state().renderer_ready);
        assert_eq!(harness.cache.released(), vec![docs[1].id.clone()]);

        // the successor loads once its notation resolves again
        harness.types.fail_resolution(false);
        manager.show_document(&docs[0]).await.unwrap();
        assert!(manager.view_state().renderer_ready);
    }

    #[tokio::test]
    async fn test_close_inactive_keeps_active() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn", "/work/b.bpmn"]).await;
        manager.close_document(&docs[0]).await.unwrap();

        assert_eq!(manager.active_document(), docs[1]);
        assert_eq!(manager.documents(), vec![docs[1].clone()]);
        assert_eq!(harness.cache.released(), vec![docs[0].id.clone()]);

        let saved = harness.workspace.last_saved().unwrap();
        assert_eq!(saved.files, vec![PathBuf::from("/work/b.bpmn")]);
    }

    #[tokio::test]
    async fn test_close_last_document_activates_sentinel() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn"]).await;
        manager.close_document(&docs[0]).await.unwrap();

        assert!(manager.documents().is_empty());
        assert!(manager.active_document().is_empty());
        assert!(manager.view_state().renderer_ready);
    }

    #[tokio::test]
    async fn test_close_dirty_discard_skips_writer() {
        let harness = Harness::new();
        let manager = &harness.manager;

        let doc = create(&harness);
        harness.dialog.answer_confirm(SaveChoice::Discard);

        manager.close_document(&doc).await.unwrap();

        assert_eq!(harness.dialog.confirm_calls(), 1);
        assert!(harness.fs.writes().is_empty());
        assert!(manager.documents().is_empty());
        // never saved, so nothing to reopen
        assert_eq!(manager.closed_count(), 0);
    }

    #[tokio::test]
    async fn test_close_dirty_saves_first() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn"]).await;
        manager.on_changed(
            &docs[0],
            ChangedProps {
                dirty: Some(true),
                layout: None,
            },
        );

        manager.close_document(&docs[0]).await.unwrap();

        assert_eq!(harness.fs.writes(), vec![PathBuf::from("/work/a.bpmn")]);
        assert!(manager.documents().is_empty());
        assert_eq!(manager.closed_count(), 1);
    }

    #[tokio::test]
    async fn test_close_cancel_aborts() {
        let harness = Harness::new();
        let manager = &harness.manager;

        let doc = create(&harness);
        harness.dialog.answer_confirm(SaveChoice::Cancel);

        let result = manager.close_document(&doc).await;

        assert!(matches!(result, Err(SessionError::Cancelled)));
        assert_eq!(manager.documents(), vec![doc.clone()]);
        assert!(manager.is_dirty(&doc));
        assert!(harness.cache.released().is_empty());
    }

    #[tokio::test]
    async fn test_close_many_stops_on_cancel() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn", "/work/b.bpmn", "/work/c.bpmn"]).await;
        manager.on_changed(
            &docs[1],
            ChangedProps {
                dirty: Some(true),
                layout: None,
            },
        );
        harness.dialog.answer_confirm(SaveChoice::Cancel);

        let result = manager.close_all().await;

        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(manager.documents(), vec![docs[1].clone(), docs[2].clone()]);
    }

    #[tokio::test]
    async fn test_close_others() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn", "/work/b.bpmn", "/work/c.bpmn"]).await;

        let closed = manager.close_others(&docs[1]).await.unwrap();

        assert_eq!(closed, vec![docs[0].clone(), docs[2].clone()]);
        assert_eq!(manager.documents(), vec![docs[1].clone()]);
        assert_eq!(manager.active_document(), docs[1]);
    }

    #[tokio::test]
    async fn test_reopen_last_closed() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn", "/work/b.bpmn"]).await;
        manager.close_document(&docs[1]).await.unwrap();
        assert_eq!(manager.closed_count(), 1);

        let reopened = manager.reopen_last_closed().await.unwrap();

        assert_eq!(reopened, docs[1]);
        assert_eq!(manager.documents(), docs);
        assert_eq!(manager.active_document(), docs[1]);
        assert_eq!(manager.closed_count(), 0);
    }

    #[tokio::test]
    async fn test_reopen_shows_document_open_again() {
        let harness = Harness::new();
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let first = open(&harness, &["/work/a.bpmn"]).await;
        manager.close_document(&first[0]).await.unwrap();
        let again = open(&harness, &["/work/a.bpmn"]).await;
        manager.new_document(&bpmn()).await.unwrap();

        let reopened = manager.reopen_last_closed().await.unwrap();

        assert_eq!(reopened, again[0]);
        assert_eq!(manager.documents().len(), 2);
        assert_eq!(manager.active_document(), again[0]);
    }

    #[tokio::test]
    async fn test_reopen_without_closed_documents() {
        let harness = Harness::new();

        let err = harness.manager.reopen_last_closed().await.unwrap_err();

        assert!(matches!(err, SessionError::NoLastTab));
        assert_eq!(err.to_string(), "no last tab");
    }

    #[tokio::test]
    async fn test_closed_history_is_bounded() {
        let harness = Harness::with_config(SessionConfig {
            closed_history_limit: 2,
        });
        let manager = &harness.manager;
        let _view = auto_show(manager);

        let docs = open(&harness, &["/work/a.bpmn", "/work/b.bpmn", "/work/c.bpmn"]).await;
        manager.close_all().await.unwrap();

        assert_eq!(manager.closed_count(), 2);
        assert_eq!(manager.reopen_last_closed().await.unwrap(), docs[2]);
        assert_eq!(manager.reopen_last_closed().await.unwrap(), docs[1]);
        assert!(matches!(
            manager.reopen_last_closed().await,
            Err(SessionError::NoLastTab)
        ));
    }
}
