//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use atelier_session::SessionConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Closed documents remembered for reopening
    pub closed_history_limit: usize,
    /// Reopen the previous run's workspace on startup
    pub restore_workspace: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("atelier.db"),
            closed_history_limit: SessionConfig::default().closed_history_limit,
            restore_workspace: true,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Atelier"))
            .unwrap_or_else(|| PathBuf::from(".atelier"))
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            closed_history_limit: self.closed_history_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
