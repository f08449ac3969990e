//! Main shell state container
//!
//! Owns the database and the document session. Everything the session needs
//! from the host (notations, dialogs, file access) comes in as `Services`.

use std::sync::Arc;

use atelier_documents::Document;
use atelier_session::{
    Collaborators, Dialog, DocumentCache, ErrorReporter, FileSystem, SessionManager,
    TypeProvider,
};
use atelier_storage::Database;

use crate::config::Config;
use crate::error::CoreError;
use crate::workspace::SqliteWorkspaceStore;
use crate::Result;

/// Host provided collaborators of the session
#[derive(Clone)]
pub struct Services {
    pub types: Arc<dyn TypeProvider>,
    pub dialog: Arc<dyn Dialog>,
    pub fs: Arc<dyn FileSystem>,
    pub cache: Arc<dyn DocumentCache>,
    pub errors: Arc<dyn ErrorReporter>,
}

pub struct Shell {
    config: Config,
    db: Database,
    session: SessionManager,
}

impl Shell {
    /// Open the database at the configured path and build the session on it
    pub fn new(config: Config, services: Services) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db, services)
    }

    pub fn with_database(config: Config, db: Database, services: Services) -> Result<Self> {
        if config.closed_history_limit == 0 {
            return Err(CoreError::Config(
                "closed_history_limit must be at least 1".to_string(),
            ));
        }

        let collaborators = Collaborators {
            types: services.types,
            dialog: services.dialog,
            fs: services.fs,
            cache: services.cache,
            errors: services.errors,
            workspace: Arc::new(SqliteWorkspaceStore::new(db.clone())),
        };

        let session = SessionManager::new(collaborators, config.session());

        Ok(Self {
            config,
            db,
            session,
        })
    }

    /// Restore the previous workspace when configured to. Returns the reopened
    /// documents.
    pub async fn initialize(&self) -> Result<Vec<Document>> {
        let restored = if self.config.restore_workspace {
            self.session.restore_workspace().await?
        } else {
            Vec::new()
        };

        tracing::info!(restored = restored.len(), "Shell initialized");

        Ok(restored)
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
