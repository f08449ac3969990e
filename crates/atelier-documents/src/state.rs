//! Document Phase Machine
//!
//! ```text
//! Uninitialized
//!   ↓ becomes active
//! Loading  ←── any later activation
//!   ↓ renderer resolved + shown signal
//! Shown
//!   ↓ close
//! Closed
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentPhase {
    /// Never been active
    Uninitialized,
    /// Active, waiting for the renderer to show it
    Loading,
    /// Active and rendered
    Shown,
    /// Removed from the open list
    Closed,
}

impl DocumentPhase {
    /// Check if transition to another phase is valid
    pub fn can_transition_to(&self, target: DocumentPhase) -> bool {
        match (self, target) {
            (DocumentPhase::Closed, _) => false,
            // Every activation restarts loading
            (_, DocumentPhase::Loading) => true,
            (DocumentPhase::Loading, DocumentPhase::Shown) => true,
            (DocumentPhase::Shown, DocumentPhase::Shown) => true,
            (_, DocumentPhase::Closed) => true,
            _ => false,
        }
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, DocumentPhase::Shown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentPhase::Uninitialized => "uninitialized",
            DocumentPhase::Loading => "loading",
            DocumentPhase::Shown => "shown",
            DocumentPhase::Closed => "closed",
        }
    }
}

impl std::fmt::Display for DocumentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uninitialized" => Ok(DocumentPhase::Uninitialized),
            "loading" => Ok(DocumentPhase::Loading),
            "shown" => Ok(DocumentPhase::Shown),
            "closed" => Ok(DocumentPhase::Closed),
            _ => Err(format!("Unknown document phase: {}", s)),
        }
    }
}
