//! # Identity Newtypes
//!
//! A `DocumentLocator` is the resource string the editor uses for an open
//! document (`file:///home/me/report.sdt.yaml`). A `SchemaIdentity` is the
//! custom-scheme URI the schema protocol requests (`sdt:///home/me/report.sdt.yaml`)
//! and the key of the augmentation cache. Keeping them as distinct types
//! prevents a locator from being used as a cache key.

use serde::{Deserialize, Serialize};

/// Resource string of a document in the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLocator(pub String);

/// Custom-scheme schema URI: `<scheme>://<document path>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaIdentity(pub String);

impl DocumentLocator {
    /// Wrap an editor resource string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Access the raw resource string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SchemaIdentity {
    /// Build an identity from a scheme name and a document path.
    pub fn new(scheme: &str, path: &str) -> Self {
        Self(format!("{scheme}://{path}"))
    }

    /// Access the raw URI string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The document path, if this identity uses `scheme`.
    pub fn path_for_scheme(&self, scheme: &str) -> Option<&str> {
        self.0
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("://"))
    }
}

impl std::fmt::Display for DocumentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for SchemaIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaIdentity {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
