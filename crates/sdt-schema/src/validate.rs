//! # Template Validation
//!
//! Validates SDT documents against their document schema (the base
//! meta-schema plus the augmented `template`), Draft 7, using the
//! `jsonschema` crate.
//!
//! ## Schema Resolution
//!
//! Augmented schemas only contain fragment-local `$ref`s, apart from the
//! `schemas.input` / `schemas.output` declarations which point at the
//! Draft 7 meta-schema by URI. No network access is ever made: remote
//! URIs resolve through [`OfflineRetriever`], which answers every one of
//! them with a permissive `{}`.

use std::fmt;
use std::path::Path;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::meta::document_schema_for_output;

/// Retriever that never leaves the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        // Meta-schemas and any other remote URI: accept anything rather
        // than reach for the network.
        tracing::debug!(uri = uri.as_str(), "serving permissive schema for remote URI");
        Ok(serde_json::json!({}))
    }
}

/// Error during template validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled document schema.
///
/// `TemplateValidator` is `Send + Sync`; compile once per schema and share.
#[derive(Debug)]
pub struct TemplateValidator {
    schema_name: String,
    validator: Validator,
}

impl TemplateValidator {
    /// Compile a document schema (as served by the delivery adapter).
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuildError` if the schema
    /// does not compile, e.g. because a `$ref` does not resolve.
    pub fn new(
        schema_name: impl Into<String>,
        schema: &Value,
    ) -> Result<Self, SchemaValidationError> {
        let schema_name = schema_name.into();
        let validator = build_options(OfflineRetriever)
            .build(schema)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            schema_name,
            validator,
        })
    }

    /// Augment `output` and compile the resulting document schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuildError` if `output`
    /// cannot be augmented or the result does not compile.
    pub fn for_output_schema(
        schema_name: impl Into<String>,
        output: &Value,
    ) -> Result<Self, SchemaValidationError> {
        let schema_name = schema_name.into();
        let schema = document_schema_for_output(output).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.clone(),
                reason: e.to_string(),
            }
        })?;
        Self::new(schema_name, &schema)
    }

    /// Whether `instance` conforms.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Whether a bare template value conforms, by validating
    /// `{"template": template}`.
    pub fn is_valid_template(&self, template: &Value) -> bool {
        self.is_valid(&serde_json::json!({ "template": template }))
    }

    /// Validate `instance`, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with structured
    /// violation details if the document is invalid.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let errors: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: self.schema_name.clone(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }

    /// Validate a YAML or JSON document file.
    ///
    /// The format follows the file extension (`.yaml`/`.yml` for YAML,
    /// anything else for JSON).
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::DocumentLoadError` if the file cannot
    /// be read or parsed, `ValidationFailed` if it does not conform.
    pub fn validate_file(&self, document_path: &Path) -> Result<(), SchemaValidationError> {
        let instance = load_document(document_path)?;
        self.validate(&instance)
    }
}

/// Draft 7 options with an offline retriever installed.
fn build_options(retriever: OfflineRetriever) -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.with_retriever(retriever);
    opts
}

/// Load a YAML or JSON document from disk as a JSON value.
///
/// # Errors
///
/// Returns `SchemaValidationError::DocumentLoadError` if the file cannot
/// be read or parsed.
pub fn load_document(document_path: &Path) -> Result<Value, SchemaValidationError> {
    let load_error = |reason: String| SchemaValidationError::DocumentLoadError {
        path: document_path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(document_path)
        .map_err(|e| load_error(format!("cannot read file: {e}")))?;

    let ext = document_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext {
        "yaml" | "yml" => parse_yaml(&content).map_err(load_error),
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

/// Parse YAML text into a JSON value.
///
/// # Errors
///
/// Returns a description of the problem if the text is not YAML or uses
/// YAML features with no JSON equivalent.
pub fn parse_yaml(text: &str) -> Result<Value, String> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| format!("invalid YAML: {e}"))?;
    yaml_to_json_value(&yaml).map_err(|e| format!("YAML-to-JSON conversion failed: {e}"))
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// SDT documents use only the JSON-compatible subset of YAML. Tags are
/// dropped and scalar map keys are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
