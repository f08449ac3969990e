//! Notifications coming from the renderer of the active document

use serde::{Deserialize, Serialize};

/// Properties reported by `changed`; absent fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangedProps {
    pub dirty: Option<bool>,
    pub layout: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub enum RendererEvent {
    Shown,
    Changed(ChangedProps),
    Warning(String),
    Error(String),
}
