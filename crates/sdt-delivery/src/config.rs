//! Delivery adapter configuration.
//!
//! Defaults match the editor integration: `sdt://` identities for
//! `*.sdt.yaml` documents, the template schema placed at
//! `#/properties/template`, and a five second budget for dereferencing.
//! Override via environment variables or explicit construction.

use std::time::Duration;

use sdt_schema::{check_template_pointer, SchemaPath, TEMPLATE_POINTER};

/// Default custom URI scheme for schema identities.
pub const DEFAULT_SCHEME: &str = "sdt";

/// Default suffix of documents that get a schema.
pub const DEFAULT_DOCUMENT_SUFFIX: &str = ".sdt.yaml";

/// Default dereferencing budget in milliseconds.
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 5_000;

/// Configuration for the schema delivery adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// URI scheme of schema identities (`sdt` gives `sdt://...`).
    pub scheme: String,
    /// Locator suffix that marks a document as an SDT document.
    pub document_suffix: String,
    /// Where the augmented template schema sits in the document schema.
    pub template_pointer: SchemaPath,
    /// Upper bound on a single dereference call.
    pub resolve_timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            document_suffix: DEFAULT_DOCUMENT_SUFFIX.to_string(),
            template_pointer: SchemaPath::from_tokens(["properties", "template"]),
            resolve_timeout: Duration::from_millis(DEFAULT_RESOLVE_TIMEOUT_MS),
        }
    }
}

impl DeliveryConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SDT_SCHEME` (default: `sdt`)
    /// - `SDT_DOCUMENT_SUFFIX` (default: `.sdt.yaml`)
    /// - `SDT_TEMPLATE_POINTER` (default: `#/properties/template`)
    /// - `SDT_RESOLVE_TIMEOUT_MS` (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value. Unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let scheme = non_empty(&lookup, "SDT_SCHEME", DEFAULT_SCHEME)?;
        if !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(ConfigError::InvalidScheme(scheme));
        }

        let document_suffix = non_empty(&lookup, "SDT_DOCUMENT_SUFFIX", DEFAULT_DOCUMENT_SUFFIX)?;

        let pointer = non_empty(&lookup, "SDT_TEMPLATE_POINTER", TEMPLATE_POINTER)?;
        let template_pointer = SchemaPath::parse(&pointer)
            .and_then(|path| check_template_pointer(&path).map(|()| path))
            .map_err(|e| {
                ConfigError::InvalidValue("SDT_TEMPLATE_POINTER".to_string(), e.to_string())
            })?;

        let resolve_timeout = match lookup("SDT_RESOLVE_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| {
                    ConfigError::InvalidValue("SDT_RESOLVE_TIMEOUT_MS".to_string(), e.to_string())
                })?,
            None => Duration::from_millis(DEFAULT_RESOLVE_TIMEOUT_MS),
        };

        Ok(Self {
            scheme,
            document_suffix,
            template_pointer,
            resolve_timeout,
        })
    }
}

fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match lookup(var) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(var.to_string())),
        Some(value) => Ok(value),
        None => Ok(default.to_string()),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(String),
    #[error("invalid URI scheme '{0}'")]
    InvalidScheme(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
