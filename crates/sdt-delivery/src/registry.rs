//! # Document Registries
//!
//! Where document text comes from. The editor integration serves the
//! in-memory text of open documents, so unsaved edits are seen;
//! command-line use reads from disk.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

/// Source of document text, keyed by document path.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`.
pub trait DocumentRegistry: Send + Sync {
    /// Current text of the document at `path`, if known.
    fn document_text(&self, path: &str) -> Option<String>;

    /// Human-readable name of this registry, for logs.
    fn registry_name(&self) -> &str;
}

/// Open documents held in memory, as an editor tracks them.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    documents: RwLock<HashMap<String, String>>,
}

impl InMemoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` as the current content of `path`, replacing any
    /// previous version.
    pub fn open(&self, path: impl Into<String>, text: impl Into<String>) {
        self.documents.write().insert(path.into(), text.into());
    }

    /// Forget `path`. Returns whether it was open.
    pub fn close(&self, path: &str) -> bool {
        self.documents.write().remove(path).is_some()
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// True if no document is open.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentRegistry for InMemoryRegistry {
    fn document_text(&self, path: &str) -> Option<String> {
        self.documents.read().get(path).cloned()
    }

    fn registry_name(&self) -> &str {
        "InMemoryRegistry"
    }
}

/// Documents read from the filesystem on every request.
#[derive(Debug, Clone, Default)]
pub struct FsRegistry {
    base: Option<PathBuf>,
}

impl FsRegistry {
    /// Resolve relative paths against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl DocumentRegistry for FsRegistry {
    fn document_text(&self, path: &str) -> Option<String> {
        let full = match &self.base {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        };
        match std::fs::read_to_string(&full) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(path = %full.display(), error = %e, "document not readable");
                None
            }
        }
    }

    fn registry_name(&self) -> &str {
        "FsRegistry"
    }
}
