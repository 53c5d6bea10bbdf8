//! Command handlers exercised against documents on disk.

use std::path::PathBuf;

use sdt_cli::validate::validate_documents;
use sdt_cli::{document_schema, ConfigOverrides, ResolverKind};
use sdt_delivery::DeliveryConfig;
use serde_json::Value;

const LIST_DOC: &str = r#"schemas:
  output:
    type: object
    properties:
      items:
        type: array
        items: {type: string}
    required: [items]
    additionalProperties: false
template:
  items:
    $flatten:
      - [a, b]
      - $for: ${groups}
        $each: ${group.name}
"#;

const BROKEN_DOC: &str = r#"schemas:
  output:
    type: object
    properties:
      count: {type: number}
    additionalProperties: false
template:
  count: many
"#;

fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn schema_for_document_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "list.sdt.yaml", LIST_DOC);

    let (identity, content) =
        document_schema(&DeliveryConfig::default(), &path, ResolverKind::Inline).unwrap();
    assert!(identity.as_str().starts_with("sdt://"));
    assert!(identity.as_str().ends_with("list.sdt.yaml"));

    let schema: Value = serde_json::from_str(&content).unwrap();
    let template = &schema["properties"]["template"];
    assert!(template["oneOf"].is_array());
    assert!(template["oneOf"][0]["properties"]["items"]["oneOf"].is_array());
}

#[test]
fn schema_refuses_non_sdt_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "plain.yaml", LIST_DOC);
    let err = document_schema(&DeliveryConfig::default(), &path, ResolverKind::Inline).unwrap_err();
    assert!(err.to_string().contains("not an SDT document"));
}

#[test]
fn validate_reports_passes_and_failures() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(&dir, "good.sdt.yaml", LIST_DOC);
    let bad = write(&dir, "bad.sdt.yaml", BROKEN_DOC);

    let report = validate_documents(
        &DeliveryConfig::default(),
        &[good, bad.clone()],
        ResolverKind::Passthrough,
    )
    .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.passed, 1);
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, bad);
    assert!(report.failures[0].1.contains("/template"));
}

#[test]
fn documents_without_output_check_schemas_section_only() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(&dir, "free.sdt.yaml", "template:\n  anything: goes\n");
    let report =
        validate_documents(&DeliveryConfig::default(), &[doc], ResolverKind::Inline).unwrap();
    assert!(report.is_success());

    let bad_dialect = write(&dir, "dialect.sdt.yaml", "schemas:\n  dialect: draft-99\n");
    let report =
        validate_documents(&DeliveryConfig::default(), &[bad_dialect], ResolverKind::Inline)
            .unwrap();
    assert_eq!(report.passed, 0);
}

#[test]
fn custom_suffix_via_overrides() {
    let overrides = ConfigOverrides {
        suffix: Some(".tmpl.yaml".to_string()),
        ..ConfigOverrides::default()
    };
    let config = overrides.resolve().unwrap();
    assert_eq!(config.document_suffix, ".tmpl.yaml");

    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "doc.tmpl.yaml", LIST_DOC);
    let (identity, _) = document_schema(&config, &path, ResolverKind::Inline).unwrap();
    assert!(identity.as_str().ends_with("doc.tmpl.yaml"));
}
