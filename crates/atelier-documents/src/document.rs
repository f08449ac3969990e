//! Document data structure
//!
//! A document displays:
//! - Name of the backing file
//! - Title (full path once persisted)
//! - Notation type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::DocumentError;
use crate::Result;

/// Id of the shared "no document" sentinel
pub const EMPTY_DOCUMENT_ID: &str = "__empty";

/// Notation of a document (`bpmn`, `dmn`, `form`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentType(String);

impl DocumentType {
    pub const EMPTY: &'static str = "empty";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_lowercase())
    }

    pub fn empty() -> Self {
        Self(Self::EMPTY.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == Self::EMPTY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// File backing a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// File name shown on the tab
    pub name: String,
    /// Location on disk, `None` until first saved
    pub path: Option<PathBuf>,
    /// Serialized diagram
    pub contents: String,
    /// Last modification time reported by the file system
    pub last_modified: Option<DateTime<Utc>>,
    pub encoding: String,
}

impl File {
    /// A file that has never been written to disk
    pub fn unsaved(name: impl Into<String>, contents: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DocumentError::EmptyName);
        }

        Ok(Self {
            name,
            path: None,
            contents: contents.into(),
            last_modified: None,
            encoding: "utf8".to_string(),
        })
    }

    /// A file read from `path`; the name is taken from the path
    pub fn at_path(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            name,
            path: Some(path),
            contents: contents.into(),
            last_modified: Some(Utc::now()),
            encoding: "utf8".to_string(),
        }
    }

    pub fn is_unsaved(&self) -> bool {
        self.path.is_none()
    }

    /// Extension of the file name, lowercased
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// An open document (tab).
///
/// Equality is identity: two values compare equal when they carry the same id,
/// so a refreshed snapshot still matches the one stored in a history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: String,
    /// Notation of the diagram
    pub doc_type: DocumentType,
    /// Backing file, `None` only for the sentinel
    pub file: Option<File>,
    /// When the document was opened or created
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(doc_type: DocumentType, file: File) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            doc_type,
            file: Some(file),
            created_at: Utc::now(),
        }
    }

    /// The "no document" sentinel
    pub fn empty() -> Self {
        Self {
            id: EMPTY_DOCUMENT_ID.to_string(),
            doc_type: DocumentType::empty(),
            file: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == EMPTY_DOCUMENT_ID
    }

    /// Same document, different backing file
    pub fn with_file(&self, file: File) -> Self {
        Self {
            file: Some(file),
            ..self.clone()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().and_then(|file| file.path.as_deref())
    }

    /// Never written to disk. The sentinel does not count as unsaved.
    pub fn is_unsaved(&self) -> bool {
        self.file.as_ref().is_some_and(File::is_unsaved)
    }

    pub fn name(&self) -> &str {
        self.file.as_ref().map_or("", |file| file.name.as_str())
    }

    /// Tab tooltip: the full path when persisted, the name otherwise
    pub fn title(&self) -> String {
        match self.path() {
            Some(path) => path.to_string_lossy().to_string(),
            None => self.name().to_string(),
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Document {}
