//! Transient state of the active document
//!
//! Rebuilt from scratch on every active-document change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::state::DocumentPhase;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub category: LogCategory,
    pub message: String,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewState {
    /// Id of the document this state belongs to
    pub document_id: String,
    pub phase: DocumentPhase,
    /// Renderer for the document type has been resolved
    pub renderer_ready: bool,
    /// A shown signal arrived before the renderer was ready
    pub shown_pending: bool,
    /// Editor layout reported by the renderer (panels, zoom)
    pub layout: serde_json::Value,
    pub log: Vec<LogEntry>,
}

impl ViewState {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            phase: DocumentPhase::Uninitialized,
            renderer_ready: false,
            shown_pending: false,
            layout: serde_json::Value::Null,
            log: Vec::new(),
        }
    }

    /// Fresh state for a document that just became active
    pub fn loading(document_id: impl Into<String>) -> Self {
        Self {
            phase: DocumentPhase::Loading,
            ..Self::new(document_id)
        }
    }

    /// Attempt to transition to a new phase
    pub fn transition_to(&mut self, phase: DocumentPhase) -> Result<()> {
        if !self.phase.can_transition_to(phase) {
            return Err(DocumentError::InvalidTransition {
                from: self.phase.to_string(),
                to: phase.to_string(),
            });
        }

        tracing::debug!(
            document_id = %self.document_id,
            from = %self.phase,
            to = %phase,
            "Document phase transition"
        );

        self.phase = phase;
        Ok(())
    }

    pub fn push_log(&mut self, category: LogCategory, message: impl Into<String>) {
        self.log.push(LogEntry {
            category,
            message: message.into(),
            logged_at: Utc::now(),
        });
    }

    pub fn is_loading(&self) -> bool {
        self.phase == DocumentPhase::Loading
    }
}
