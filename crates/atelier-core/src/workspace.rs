//! Workspace store backed by the shell database

use atelier_session::{WorkspaceLayout, WorkspaceStore};
use atelier_storage::{Database, WorkspaceRecord};

pub struct SqliteWorkspaceStore {
    db: Database,
}

impl SqliteWorkspaceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl WorkspaceStore for SqliteWorkspaceStore {
    fn load(&self) -> anyhow::Result<Option<WorkspaceLayout>> {
        let record = self.db.load_workspace()?;
        if record.is_empty() {
            return Ok(None);
        }

        Ok(Some(WorkspaceLayout {
            files: record.files,
            active_file: record.active_file,
            layout: record.layout,
        }))
    }

    fn save(&self, layout: &WorkspaceLayout) -> anyhow::Result<()> {
        let record = WorkspaceRecord {
            files: layout.files.clone(),
            active_file: layout.active_file.clone(),
            layout: layout.layout.clone(),
        };

        self.db.save_workspace(&record)?;
        tracing::trace!(file_count = record.files.len(), "Workspace saved");

        Ok(())
    }
}
