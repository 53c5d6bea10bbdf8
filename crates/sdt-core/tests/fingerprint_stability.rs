//! # Fingerprint Stability Tests
//!
//! The augmentation cache is keyed on output-schema fingerprints. These
//! tests pin the properties the cache relies on: formatting and key order
//! never change a fingerprint, content changes always do.

use sdt_core::{fingerprint, CanonicalBytes, Fingerprint};
use serde_json::Value;

fn fp(text: &str) -> Fingerprint {
    let value: Value = serde_json::from_str(text).expect("test vector must be JSON");
    fingerprint(&value).expect("canonicalization should succeed")
}

// ---------------------------------------------------------------------------
// Formatting-insensitive
// ---------------------------------------------------------------------------

#[test]
fn test_whitespace_ignored() {
    let compact = fp(r#"{"type":"object","properties":{"a":{"type":"number"}}}"#);
    let pretty = fp(
        r#"{
            "type": "object",
            "properties": {
                "a": { "type": "number" }
            }
        }"#,
    );
    assert_eq!(compact, pretty);
}

#[test]
fn test_key_order_ignored() {
    let a = fp(r#"{"type":"array","description":"ids","items":{"type":"string"}}"#);
    let b = fp(r#"{"items":{"type":"string"},"description":"ids","type":"array"}"#);
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Content-sensitive
// ---------------------------------------------------------------------------

#[test]
fn test_description_change_invalidates() {
    let a = fp(r#"{"type":"number","description":"count"}"#);
    let b = fp(r#"{"type":"number","description":"Count"}"#);
    assert_ne!(a, b);
}

#[test]
fn test_required_order_is_content() {
    // Array order is significant in JSON, so it is part of the fingerprint.
    let a = fp(r#"{"required":["a","b"]}"#);
    let b = fp(r#"{"required":["b","a"]}"#);
    assert_ne!(a, b);
}

#[test]
fn test_integral_float_matches_integer() {
    // JCS renders 1.0 and 1 identically.
    let a = fp(r#"{"minimum":1}"#);
    let b = fp(r#"{"minimum":1.0}"#);
    assert_eq!(a, b);
}

#[test]
fn test_canonical_form_of_schema() {
    let value: Value =
        serde_json::from_str(r#"{"type":"array","items":{"type":"number","minimum":0.5}}"#).unwrap();
    let cb = CanonicalBytes::new(&value).unwrap();
    assert_eq!(
        std::str::from_utf8(cb.as_bytes()).unwrap(),
        r#"{"items":{"minimum":0.5,"type":"number"},"type":"array"}"#
    );
    assert_eq!(Fingerprint::of(&cb), fp(r#"{"type":"array","items":{"minimum":0.5,"type":"number"}}"#));
}
