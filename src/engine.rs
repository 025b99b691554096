//! JSON Schema engine
//!
//! The dispatcher only talks to the [`SchemaEngine`] and [`CompiledSchema`]
//! traits. [`JsonSchemaEngine`] implements them on top of the `jsonschema`
//! crate, which owns keyword semantics, `$ref` resolution and draft handling.

use std::fmt;
use std::str::FromStr;

use jsonschema::{Retrieve, Uri, ValidationOptions};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::report::{Report, ReportMessage};

/// Syntax checking and schema compilation
#[cfg_attr(test, mockall::automock)]
pub trait SchemaEngine {
    /// Check that `document` is itself a well-formed schema
    fn check_syntax(&self, document: &Value) -> Result<Report>;

    /// Build a reusable validator from a schema document
    fn compile(&self, schema: &Value) -> Result<Box<dyn CompiledSchema>>;
}

/// A schema ready to validate instances
#[cfg_attr(test, mockall::automock)]
pub trait CompiledSchema {
    fn validate(&self, instance: &Value) -> Report;
}

/// JSON Schema draft a document is written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DraftVersion {
    #[default]
    #[serde(rename = "draft4")]
    Draft4,
    #[serde(rename = "draft6")]
    Draft6,
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "draft2019-09")]
    Draft201909,
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl DraftVersion {
    /// Map a `$schema` URI to its draft. Scheme and empty fragment are ignored.
    /// Hyper-schema meta-schemas are not bundled and map to nothing.
    pub fn from_meta_schema_uri(uri: &str) -> Option<Self> {
        let uri = uri.trim();
        let uri = uri.strip_suffix('#').unwrap_or(uri);
        let uri = uri
            .strip_prefix("https://")
            .or_else(|| uri.strip_prefix("http://"))?;

        match uri {
            "json-schema.org/draft-04/schema" => Some(DraftVersion::Draft4),
            "json-schema.org/draft-06/schema" => Some(DraftVersion::Draft6),
            "json-schema.org/draft-07/schema" => Some(DraftVersion::Draft7),
            "json-schema.org/draft/2019-09/schema" => Some(DraftVersion::Draft201909),
            "json-schema.org/draft/2020-12/schema" => Some(DraftVersion::Draft202012),
            _ => None,
        }
    }

    /// Canonical URI of the draft's meta-schema
    pub fn meta_schema_uri(self) -> &'static str {
        match self {
            DraftVersion::Draft4 => "http://json-schema.org/draft-04/schema#",
            DraftVersion::Draft6 => "http://json-schema.org/draft-06/schema#",
            DraftVersion::Draft7 => "http://json-schema.org/draft-07/schema#",
            DraftVersion::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            DraftVersion::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Validator for documents written against this draft. It refers to the
    /// bundled meta-schema, so every violation is reported, not just the first.
    fn meta_validator(self) -> Result<jsonschema::Validator> {
        let wrapper = json!({ "$ref": self.meta_schema_uri() });
        let mut options = jsonschema::options();
        options.with_draft(self.into());
        build(options, &wrapper)
    }
}

impl From<DraftVersion> for jsonschema::Draft {
    fn from(draft: DraftVersion) -> Self {
        match draft {
            DraftVersion::Draft4 => jsonschema::Draft::Draft4,
            DraftVersion::Draft6 => jsonschema::Draft::Draft6,
            DraftVersion::Draft7 => jsonschema::Draft::Draft7,
            DraftVersion::Draft201909 => jsonschema::Draft::Draft201909,
            DraftVersion::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

impl fmt::Display for DraftVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftVersion::Draft4 => "draft4",
            DraftVersion::Draft6 => "draft6",
            DraftVersion::Draft7 => "draft7",
            DraftVersion::Draft201909 => "draft2019-09",
            DraftVersion::Draft202012 => "draft2020-12",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DraftVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft4" | "4" => Ok(DraftVersion::Draft4),
            "draft6" | "6" => Ok(DraftVersion::Draft6),
            "draft7" | "7" => Ok(DraftVersion::Draft7),
            "draft2019-09" | "2019-09" => Ok(DraftVersion::Draft201909),
            "draft2020-12" | "2020-12" => Ok(DraftVersion::Draft202012),
            other => Err(format!("unknown draft: {}", other)),
        }
    }
}

/// Keywords of any supported draft. Others are ignored by validation and
/// reported as warnings by the syntax check.
const KNOWN_KEYWORDS: &[&str] = &[
    "$schema", "$id", "id", "$ref", "$comment", "$defs", "definitions", "$anchor",
    "$dynamicRef", "$dynamicAnchor", "$recursiveRef", "$recursiveAnchor", "$vocabulary",
    "title", "description", "default", "examples", "readOnly", "writeOnly", "deprecated",
    "type", "enum", "const", "multipleOf", "maximum", "exclusiveMaximum", "minimum",
    "exclusiveMinimum", "maxLength", "minLength", "pattern", "items", "additionalItems",
    "prefixItems", "maxItems", "minItems", "uniqueItems", "contains", "maxContains",
    "minContains", "maxProperties", "minProperties", "required", "properties",
    "patternProperties", "additionalProperties", "dependencies", "dependentRequired",
    "dependentSchemas", "propertyNames", "allOf", "anyOf", "oneOf", "not", "if", "then",
    "else", "unevaluatedItems", "unevaluatedProperties", "format", "contentMediaType",
    "contentEncoding", "contentSchema",
];

/// Refuses every external reference. Only the bundled meta-schemas and
/// references inside the document itself resolve.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external reference {} cannot be retrieved", uri.as_str()).into())
    }
}

fn build(mut options: ValidationOptions, schema: &Value) -> Result<jsonschema::Validator> {
    options.with_retriever(OfflineRetriever);
    options
        .build(schema)
        .map_err(|error| EngineError::Compilation {
            details: error.to_string(),
        })
}

/// JSON Pointer reference token
fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Warn about unknown keywords in `schema` and every subschema below it
fn collect_unknown_keywords(schema: &Value, pointer: &str, messages: &mut Vec<ReportMessage>) {
    let Value::Object(map) = schema else {
        return;
    };

    let unknown: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|keyword| !KNOWN_KEYWORDS.contains(keyword))
        .collect();
    if !unknown.is_empty() {
        messages.push(ReportMessage::warning(
            format!("unknown keyword(s) found; ignored: {}", unknown.join(", ")),
            pointer,
            "",
        ));
    }

    for (keyword, value) in map {
        let location = format!("{}/{}", pointer, escape(keyword));
        match keyword.as_str() {
            "properties" | "patternProperties" | "definitions" | "$defs" | "dependentSchemas"
            | "dependencies" => {
                if let Value::Object(children) = value {
                    for (name, child) in children {
                        let child_location = format!("{}/{}", location, escape(name));
                        collect_unknown_keywords(child, &child_location, messages);
                    }
                }
            }
            "items" | "prefixItems" | "allOf" | "anyOf" | "oneOf" => match value {
                Value::Array(children) => {
                    for (index, child) in children.iter().enumerate() {
                        let child_location = format!("{}/{}", location, index);
                        collect_unknown_keywords(child, &child_location, messages);
                    }
                }
                other => collect_unknown_keywords(other, &location, messages),
            },
            "additionalItems" | "additionalProperties" | "not" | "if" | "then" | "else"
            | "contains" | "propertyNames" | "unevaluatedItems" | "unevaluatedProperties"
            | "contentSchema" => collect_unknown_keywords(value, &location, messages),
            _ => {}
        }
    }
}

fn to_message(error: &jsonschema::ValidationError<'_>) -> ReportMessage {
    ReportMessage::error(
        error.to_string(),
        error.instance_path.to_string(),
        error.schema_path.to_string(),
    )
}

/// [`SchemaEngine`] backed by the `jsonschema` crate
#[derive(Debug, Clone)]
pub struct JsonSchemaEngine {
    default_draft: DraftVersion,
    validate_formats: Option<bool>,
}

impl Default for JsonSchemaEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl JsonSchemaEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_draft: config.default_draft,
            validate_formats: config.validate_formats,
        }
    }

    /// Draft named by `$schema`, or the configured default when absent
    pub fn detect_draft(&self, document: &Value) -> Result<DraftVersion> {
        match document.get("$schema") {
            None => Ok(self.default_draft),
            Some(Value::String(uri)) => DraftVersion::from_meta_schema_uri(uri)
                .ok_or_else(|| EngineError::UnknownMetaSchema { uri: uri.clone() }),
            Some(other) => Err(EngineError::UnknownMetaSchema {
                uri: other.to_string(),
            }),
        }
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn check_syntax(&self, document: &Value) -> Result<Report> {
        if let Some(meta) = document.get("$schema")
            && !meta.is_string()
        {
            return Ok(Report::from_messages(vec![ReportMessage::error(
                format!("{} is not of type \"string\"", meta),
                "/$schema",
                "/properties/$schema/type",
            )]));
        }

        let draft = self.detect_draft(document)?;
        debug!(%draft, "checking schema syntax");

        let mut messages: Vec<ReportMessage> = draft
            .meta_validator()?
            .iter_errors(document)
            .map(|error| to_message(&error))
            .collect();
        collect_unknown_keywords(document, "", &mut messages);
        debug!(messages = messages.len(), "checked schema syntax");

        Ok(Report::from_messages(messages))
    }

    fn compile(&self, schema: &Value) -> Result<Box<dyn CompiledSchema>> {
        let draft = self.detect_draft(schema)?;
        debug!(%draft, validate_formats = ?self.validate_formats, "compiling schema");

        let mut options = jsonschema::options();
        options.with_draft(draft.into());
        // Without an explicit setting the draft decides whether formats assert
        if let Some(validate_formats) = self.validate_formats {
            options.should_validate_formats(validate_formats);
        }

        let validator = build(options, schema)?;
        Ok(Box::new(JsonSchema { validator }))
    }
}

/// Compiled `jsonschema` validator
struct JsonSchema {
    validator: jsonschema::Validator,
}

impl CompiledSchema for JsonSchema {
    fn validate(&self, instance: &Value) -> Report {
        let messages: Vec<ReportMessage> = self
            .validator
            .iter_errors(instance)
            .map(|error| to_message(&error))
            .collect();
        debug!(errors = messages.len(), "validated instance");
        Report::from_messages(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::LogLevel;

    const DRAFT4: &str = "http://json-schema.org/draft-04/schema#";

    #[test]
    fn test_meta_schema_uri_detection() {
        assert_eq!(
            DraftVersion::from_meta_schema_uri(DRAFT4),
            Some(DraftVersion::Draft4)
        );
        assert_eq!(
            DraftVersion::from_meta_schema_uri("http://json-schema.org/draft-04/hyper-schema#"),
            None
        );
        assert_eq!(
            DraftVersion::from_meta_schema_uri("https://json-schema.org/draft-07/schema"),
            Some(DraftVersion::Draft7)
        );
        assert_eq!(
            DraftVersion::from_meta_schema_uri("https://json-schema.org/draft/2020-12/schema"),
            Some(DraftVersion::Draft202012)
        );
        assert_eq!(
            DraftVersion::from_meta_schema_uri("http://example.com/my-meta#"),
            None
        );
        assert_eq!(DraftVersion::from_meta_schema_uri("draft-04"), None);
    }

    #[test]
    fn test_draft_from_str() {
        assert_eq!("draft7".parse::<DraftVersion>(), Ok(DraftVersion::Draft7));
        assert_eq!("2019-09".parse::<DraftVersion>(), Ok(DraftVersion::Draft201909));
        assert_eq!(
            "Draft2020-12".parse::<DraftVersion>(),
            Ok(DraftVersion::Draft202012)
        );
        assert!("draft5".parse::<DraftVersion>().is_err());
        assert_eq!(DraftVersion::Draft201909.to_string(), "draft2019-09");
    }

    #[test]
    fn test_detect_draft_uses_default() {
        let engine = JsonSchemaEngine::new(&EngineConfig {
            default_draft: DraftVersion::Draft7,
            validate_formats: None,
        });

        assert_eq!(
            engine.detect_draft(&json!({"type": "object"})).unwrap(),
            DraftVersion::Draft7
        );
        assert_eq!(
            engine.detect_draft(&json!({"$schema": DRAFT4})).unwrap(),
            DraftVersion::Draft4
        );
        assert!(matches!(
            engine.detect_draft(&json!({"$schema": "urn:custom"})),
            Err(EngineError::UnknownMetaSchema { .. })
        ));
    }

    #[test]
    fn test_check_syntax_valid_schema() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({
            "$schema": DRAFT4,
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        });

        let report = engine.check_syntax(&schema).unwrap();
        assert!(report.is_success());
        assert!(report.messages().is_empty());
    }

    #[test]
    fn test_check_syntax_invalid_schema() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({"$schema": DRAFT4, "type": 12});

        let report = engine.check_syntax(&schema).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.messages().len(), 1);
    }

    #[test]
    fn test_check_syntax_non_string_meta_schema() {
        let engine = JsonSchemaEngine::default();

        let report = engine.check_syntax(&json!({"$schema": 4})).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.messages()[0].instance_pointer, "/$schema");
    }

    #[test]
    fn test_check_syntax_unknown_meta_schema() {
        let engine = JsonSchemaEngine::default();
        let error = engine
            .check_syntax(&json!({"$schema": "http://example.com/meta#"}))
            .unwrap_err();

        assert!(error.to_string().contains("http://example.com/meta#"));
    }

    #[test]
    fn test_check_syntax_scalar_document() {
        let engine = JsonSchemaEngine::default();
        let report = engine.check_syntax(&json!(42)).unwrap();
        assert!(!report.is_success());
    }

    #[test]
    fn test_compile_and_validate() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({
            "$schema": DRAFT4,
            "type": "object",
            "properties": {"age": {"type": "integer", "minimum": 0}},
            "required": ["age"]
        });
        let compiled = engine.compile(&schema).unwrap();

        assert!(compiled.validate(&json!({"age": 30})).is_success());

        let report = compiled.validate(&json!({"age": -1}));
        assert!(!report.is_success());
        assert_eq!(report.messages()[0].instance_pointer, "/age");

        let report = compiled.validate(&json!({"age": "x", "extra": true}));
        assert!(!report.is_success());

        let report = compiled.validate(&json!({}));
        assert!(!report.is_success());
        assert_eq!(report.messages().len(), 1);
    }

    #[test]
    fn test_validate_collects_every_error() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({
            "$schema": DRAFT4,
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "string"}
            }
        });
        let compiled = engine.compile(&schema).unwrap();

        let report = compiled.validate(&json!({"a": 1, "b": 2}));
        assert_eq!(report.messages().len(), 2);
    }

    #[test]
    fn test_compile_invalid_schema() {
        let engine = JsonSchemaEngine::default();
        let error = engine
            .compile(&json!({"$schema": DRAFT4, "type": 12}))
            .err()
            .unwrap();

        assert!(matches!(error, EngineError::Compilation { .. }));
    }

    #[test]
    fn test_format_assertion_follows_config() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "string",
            "format": "email"
        });
        let instance = json!("not an email");

        let lenient = JsonSchemaEngine::new(&EngineConfig {
            default_draft: DraftVersion::Draft4,
            validate_formats: Some(false),
        });
        assert!(lenient.compile(&schema).unwrap().validate(&instance).is_success());

        let strict = JsonSchemaEngine::new(&EngineConfig {
            default_draft: DraftVersion::Draft4,
            validate_formats: Some(true),
        });
        assert!(!strict.compile(&schema).unwrap().validate(&instance).is_success());
    }
    #[test]
    fn test_hyper_schema_is_unknown() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({
            "$schema": "http://json-schema.org/draft-04/hyper-schema#",
            "links": null
        });

        assert!(matches!(
            engine.check_syntax(&schema),
            Err(EngineError::UnknownMetaSchema { .. })
        ));
    }

    #[test]
    fn test_check_syntax_reports_every_violation() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "banana",
            "minimum": "zero"
        });

        let report = engine.check_syntax(&schema).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.messages().len(), 2);
        assert!(report.messages().iter().all(|m| m.level == LogLevel::Error));
    }

    #[test]
    fn test_unknown_keywords_are_warnings() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({
            "type": "object",
            "colour": "blue",
            "properties": {
                "a/b": {"type": "string", "hint": "x"}
            }
        });

        let report = engine.check_syntax(&schema).unwrap();
        assert!(report.is_success());
        assert_eq!(
            report.messages(),
            [
                ReportMessage::warning("unknown keyword(s) found; ignored: colour", "", ""),
                ReportMessage::warning(
                    "unknown keyword(s) found; ignored: hint",
                    "/properties/a~1b",
                    ""
                ),
            ]
        );
    }

    #[test]
    fn test_remote_reference_is_a_compilation_error() {
        let engine = JsonSchemaEngine::default();
        let error = engine
            .compile(&json!({"$ref": "http://127.0.0.1:9/none.json"}))
            .err()
            .unwrap();

        assert!(matches!(error, EngineError::Compilation { .. }));
    }

    #[test]
    fn test_local_reference_still_resolves() {
        let engine = JsonSchemaEngine::default();
        let schema = json!({
            "definitions": {"name": {"type": "string"}},
            "properties": {"name": {"$ref": "#/definitions/name"}}
        });
        let compiled = engine.compile(&schema).unwrap();

        assert!(compiled.validate(&json!({"name": "Ada"})).is_success());
        assert!(!compiled.validate(&json!({"name": 1})).is_success());
    }
}
