//! Renderer resolution, once per notation

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use atelier_documents::DocumentType;

use crate::collaborators::{Renderer, TypeProvider};

/// Resolved renderer handles keyed by notation.
///
/// Scoped to one session. Concurrent resolutions of the same type may both reach
/// the provider; the first one to finish is kept and handed to everyone.
#[derive(Default)]
pub struct RendererCache {
    resolved: Mutex<HashMap<DocumentType, Arc<dyn Renderer>>>,
}

impl RendererCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, doc_type: &DocumentType) -> Option<Arc<dyn Renderer>> {
        self.resolved.lock().get(doc_type).cloned()
    }

    pub async fn resolve(
        &self,
        provider: &dyn TypeProvider,
        doc_type: &DocumentType,
    ) -> anyhow::Result<Arc<dyn Renderer>> {
        if let Some(renderer) = self.get(doc_type) {
            return Ok(renderer);
        }

        let renderer = provider.resolve_renderer(doc_type).await?;

        let mut resolved = self.resolved.lock();
        let renderer = resolved.entry(doc_type.clone()).or_insert(renderer);

        tracing::debug!(doc_type = %doc_type, "Resolved renderer");

        Ok(Arc::clone(renderer))
    }

    pub fn len(&self) -> usize {
        self.resolved.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.lock().is_empty()
    }
}
