//! # Schema URI Protocol
//!
//! The editor asks two questions: which schema URI belongs to a document,
//! and what content belongs to a schema URI. This module answers the
//! first and decodes identities back into document paths for the second.
//!
//! `file:///work/a.sdt.yaml` maps to `sdt:///work/a.sdt.yaml`. The path
//! keeps its URI encoding inside the identity and is decoded only when the
//! document is looked up.

use sdt_core::{DocumentLocator, SchemaIdentity};
use url::Url;

use crate::config::DeliveryConfig;

/// Schema identity for `locator`, or `None` if it is not an SDT document.
///
/// Accepts `file:` URLs and bare paths. Other URL schemes have no path the
/// registry could serve and map to `None`.
pub fn schema_uri(config: &DeliveryConfig, locator: &DocumentLocator) -> Option<SchemaIdentity> {
    let raw = locator.as_str();
    if !raw.ends_with(&config.document_suffix) {
        return None;
    }

    let path = match Url::parse(raw) {
        Ok(url) if url.scheme() == "file" => url.path().to_string(),
        Ok(url) => {
            tracing::debug!(locator = raw, scheme = url.scheme(), "no schema for non-file locator");
            return None;
        }
        Err(_) => raw.to_string(),
    };

    Some(SchemaIdentity::new(&config.scheme, &path))
}

/// Registry path of the document `identity` was issued for, or `None` if
/// the identity uses another scheme.
pub fn document_path(config: &DeliveryConfig, identity: &SchemaIdentity) -> Option<String> {
    let encoded = identity.path_for_scheme(&config.scheme)?;
    match urlencoding::decode(encoded) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => {
            tracing::debug!(%identity, "identity path is not valid UTF-8 once decoded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> DeliveryConfig {
        DeliveryConfig::default()
    }

    #[test]
    fn file_urls_map_to_custom_scheme() {
        let id = schema_uri(&cfg(), &DocumentLocator::new("file:///work/report.sdt.yaml")).unwrap();
        assert_eq!(id.as_str(), "sdt:///work/report.sdt.yaml");
    }

    #[test]
    fn bare_paths_map_to_custom_scheme() {
        let id = schema_uri(&cfg(), &DocumentLocator::new("/work/report.sdt.yaml")).unwrap();
        assert_eq!(id.as_str(), "sdt:///work/report.sdt.yaml");
    }

    #[test]
    fn other_documents_have_no_schema() {
        for locator in [
            "file:///work/report.yaml",
            "file:///work/report.sdt.yml",
            "file:///work/report.sdt.yaml.bak",
            "https://example.com/report.sdt.yaml",
        ] {
            assert!(schema_uri(&cfg(), &DocumentLocator::new(locator)).is_none(), "{locator}");
        }
    }

    #[test]
    fn encoded_paths_decode_for_lookup() {
        let id = schema_uri(&cfg(), &DocumentLocator::new("file:///my%20work/a.sdt.yaml")).unwrap();
        assert_eq!(id.as_str(), "sdt:///my%20work/a.sdt.yaml");
        assert_eq!(document_path(&cfg(), &id).as_deref(), Some("/my work/a.sdt.yaml"));
    }

    #[test]
    fn foreign_identities_have_no_document() {
        let id = SchemaIdentity::from("file:///work/report.sdt.yaml");
        assert!(document_path(&cfg(), &id).is_none());
    }

    #[test]
    fn custom_scheme_is_honoured() {
        let config = DeliveryConfig {
            scheme: "tmpl".to_string(),
            ..DeliveryConfig::default()
        };
        let id = schema_uri(&config, &DocumentLocator::new("/a.sdt.yaml")).unwrap();
        assert_eq!(id.as_str(), "tmpl:///a.sdt.yaml");
        assert_eq!(document_path(&config, &id).as_deref(), Some("/a.sdt.yaml"));
        assert!(document_path(&cfg(), &id).is_none());
    }
}
