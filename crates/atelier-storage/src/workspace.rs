//! Persisted workspace: open files in tab order, the active one, panel layout

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::database::{read_setting, write_setting, Database};
use crate::Result;

const LAYOUT_KEY: &str = "workspace.layout";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub files: Vec<PathBuf>,
    pub active_file: Option<PathBuf>,
    pub layout: serde_json::Value,
}

impl WorkspaceRecord {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.layout.is_null()
    }
}

impl Database {
    /// Read the workspace saved by the previous run
    pub fn load_workspace(&self) -> Result<WorkspaceRecord> {
        let (rows, layout) = self.read(|conn| {
            let mut stmt =
                conn.prepare("SELECT path, is_active FROM workspace_files ORDER BY position")?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)? != 0))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((rows, read_setting::<serde_json::Value>(conn, LAYOUT_KEY)?))
        })?;

        let active_file = rows
            .iter()
            .find(|(_, is_active)| *is_active)
            .map(|(path, _)| PathBuf::from(path));

        Ok(WorkspaceRecord {
            files: rows.into_iter().map(|(path, _)| PathBuf::from(path)).collect(),
            active_file,
            layout: layout.unwrap_or(serde_json::Value::Null),
        })
    }

    /// Replace the saved workspace, file list and layout together
    pub fn save_workspace(&self, record: &WorkspaceRecord) -> Result<()> {
        self.write(|conn| {
            conn.execute("DELETE FROM workspace_files", [])?;

            for (position, path) in record.files.iter().enumerate() {
                let is_active = record.active_file.as_ref() == Some(path);
                conn.execute(
                    "INSERT INTO workspace_files (position, path, is_active) VALUES (?1, ?2, ?3)",
                    rusqlite::params![position as i64, path.to_string_lossy().to_string(), is_active as i32],
                )?;
            }

            write_setting(conn, LAYOUT_KEY, &record.layout)
        })?;

        tracing::debug!(file_count = record.files.len(), "Saved workspace");

        Ok(())
    }
}
