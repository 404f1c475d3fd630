//! Structural validation and `$ref` dereferencing.
//!
//! The parser only talks to a [`DocumentValidator`]; the bundled
//! [`OpenApiValidator`] dereferences internal pointers, checks the document
//! shape, and hands back a typed [`Document`].

use crate::document::{
    Document, OperationLike, ParameterLike, PathItem, ReferenceOr, SpecVersion,
    escape_pointer_token, is_extension, template_params,
};
use crate::error::ValidationError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Turns a decoded document into a validated [`Document`]
#[async_trait]
pub trait DocumentValidator: Send + Sync {
    async fn validate(&self, raw: Value) -> Result<Document, ValidationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Replace internal `$ref`s with their targets before reduction
    pub dereference: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self { dereference: true }
    }
}

/// Validator for OpenAPI 3.x and Swagger 2.0 documents
#[derive(Debug, Clone, Default)]
pub struct OpenApiValidator {
    options: ValidatorOptions,
}

impl OpenApiValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidatorOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DocumentValidator for OpenApiValidator {
    async fn validate(&self, raw: Value) -> Result<Document, ValidationError> {
        if !raw.is_object() {
            return Err(ValidationError::new("document root must be an object"));
        }

        let version = SpecVersion::detect(&raw)?;
        let raw = if self.options.dereference {
            dereference(&raw)?
        } else {
            raw
        };

        let document = match version {
            SpecVersion::OpenApi3 => Document::OpenApi(
                serde_json::from_value(raw).map_err(|e| ValidationError::new(e.to_string()))?,
            ),
            SpecVersion::Swagger2 => Document::Swagger(
                serde_json::from_value(raw).map_err(|e| ValidationError::new(e.to_string()))?,
            ),
        };

        check_document(&document)?;
        tracing::debug!(version = ?document.spec_version(), title = %document.info().title, "document validated");
        Ok(document)
    }
}

/// Replace every internal `$ref` (`#/...`) with a copy of its target.
///
/// A reference to the node being expanded, or to any node enclosing it, is
/// left in place. External references are left untouched.
pub fn dereference(root: &Value) -> Result<Value, ValidationError> {
    Dereferencer {
        root,
        stack: Vec::new(),
    }
    .resolve(root, String::new())
}

struct Dereferencer<'a> {
    root: &'a Value,
    /// Document locations of the `$ref`s currently being expanded
    stack: Vec<String>,
}

impl Dereferencer<'_> {
    /// `location` is the JSON pointer of `value` in the document
    fn resolve(&mut self, value: &Value, location: String) -> Result<Value, ValidationError> {
        match value {
            Value::Object(object) => {
                if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
                    return self.resolve_reference(value, reference, location);
                }
                let mut resolved = Map::with_capacity(object.len());
                for (key, child) in object {
                    let child_location = format!("{location}/{}", escape_pointer_token(key));
                    resolved.insert(key.clone(), self.resolve(child, child_location)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.resolve(item, format!("{location}/{index}")))
                    .collect::<Result<_, _>>()?,
            )),
            other => Ok(other.clone()),
        }
    }

    fn resolve_reference(
        &mut self,
        node: &Value,
        reference: &str,
        location: String,
    ) -> Result<Value, ValidationError> {
        let Some(pointer) = reference.strip_prefix('#') else {
            tracing::debug!(reference, "leaving external reference in place");
            return Ok(node.clone());
        };

        let recursive = std::iter::once(&location)
            .chain(&self.stack)
            .any(|open| encloses(pointer, open));
        if recursive {
            tracing::debug!(reference, "leaving circular reference in place");
            return Ok(node.clone());
        }

        let root = self.root;
        let target = root.pointer(pointer).ok_or_else(|| {
            ValidationError::new(format!("Error resolving $ref pointer \"{reference}\""))
        })?;

        self.stack.push(location);
        let resolved = self.resolve(target, pointer.to_string());
        self.stack.pop();
        resolved
    }
}

/// Whether `pointer` names `location` or one of its ancestors
fn encloses(pointer: &str, location: &str) -> bool {
    location
        .strip_prefix(pointer)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn check_document(document: &Document) -> Result<(), ValidationError> {
    let mut operation_ids = HashSet::new();
    match document {
        Document::OpenApi(doc) => {
            for (path, item) in &doc.paths {
                check_path(path, item, &mut operation_ids)?;
            }
        }
        Document::Swagger(doc) => {
            for (path, item) in &doc.paths {
                check_path(path, item, &mut operation_ids)?;
            }
        }
    }
    Ok(())
}

fn check_path<'a, O: OperationLike>(
    path: &str,
    item: &'a PathItem<O, O::Parameter>,
    operation_ids: &mut HashSet<&'a str>,
) -> Result<(), ValidationError> {
    let path_pointer = format!("/paths/{}", escape_pointer_token(path));
    if !path.starts_with('/') {
        return Err(ValidationError::at(
            path_pointer,
            format!("path `{path}` must begin with a slash"),
        ));
    }

    let placeholders = template_params(path);
    for (method, operation) in item.operations() {
        let pointer = format!("{path_pointer}/{method}");

        let declared: Vec<&O::Parameter> = item
            .parameters
            .iter()
            .chain(operation.parameters())
            .filter_map(ReferenceOr::as_item)
            .filter(|param| param.location() == "path")
            .collect();

        for param in &declared {
            if !placeholders.contains(&param.name()) {
                return Err(ValidationError::at(
                    pointer,
                    format!(
                        "path parameter `{}` does not appear in `{path}`",
                        param.name()
                    ),
                ));
            }
            if !param.required() {
                return Err(ValidationError::at(
                    pointer,
                    format!("path parameter `{}` must be required", param.name()),
                ));
            }
        }

        let has_path_refs = item
            .parameters
            .iter()
            .chain(operation.parameters())
            .any(|param| param.as_item().is_none());
        for placeholder in &placeholders {
            if !has_path_refs && !declared.iter().any(|param| param.name() == *placeholder) {
                return Err(ValidationError::at(
                    pointer,
                    format!("path parameter `{placeholder}` in `{path}` is not declared"),
                ));
            }
        }

        for code in operation.response_codes() {
            if !is_response_key(code) {
                return Err(ValidationError::at(
                    format!("{pointer}/responses"),
                    format!("invalid response code `{code}`"),
                ));
            }
        }

        if let Some(id) = operation.operation_id() {
            if !operation_ids.insert(id) {
                return Err(ValidationError::at(
                    pointer,
                    format!("duplicate operationId `{id}`"),
                ));
            }
        }
    }
    Ok(())
}

/// `default`, a three-digit status, a range like `2XX`, or an extension
fn is_response_key(code: &str) -> bool {
    if code == "default" || is_extension(code) {
        return true;
    }
    let bytes = code.as_bytes();
    bytes.len() == 3
        && (b'1'..=b'5').contains(&bytes[0])
        && (bytes[1..].iter().all(u8::is_ascii_digit) || &bytes[1..] == b"XX")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn openapi(paths: Value) -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Test API", "version": "1.0.0"},
            "paths": paths
        })
    }

    async fn validate(raw: Value) -> Result<Document, ValidationError> {
        OpenApiValidator::new().validate(raw).await
    }

    #[tokio::test]
    async fn accepts_minimal_document() {
        let document = validate(openapi(json!({}))).await.expect("valid");
        assert_eq!(document.info().title, "Test API");
        assert_eq!(document.spec_version(), SpecVersion::OpenApi3);
    }

    #[tokio::test]
    async fn rejects_non_objects() {
        assert!(validate(json!("just a string")).await.is_err());
        assert!(validate(json!([1, 2])).await.is_err());
    }

    #[tokio::test]
    async fn rejects_missing_info() {
        let err = validate(json!({"openapi": "3.0.0", "paths": {}}))
            .await
            .expect_err("missing info");
        assert!(err.message.contains("info"));
    }

    #[tokio::test]
    async fn rejects_undeclared_placeholder() {
        let err = validate(openapi(json!({
            "/users/{id}": {"get": {"responses": {"200": {"description": "ok"}}}}
        })))
        .await
        .expect_err("undeclared");
        assert!(err.message.contains("`id`"));
        assert_eq!(err.pointer.as_deref(), Some("/paths/~1users~1{id}/get"));
    }

    #[tokio::test]
    async fn rejects_optional_path_parameter() {
        let err = validate(openapi(json!({
            "/users/{id}": {"get": {
                "parameters": [{"name": "id", "in": "path", "schema": {"type": "string"}}],
                "responses": {}
            }}
        })))
        .await
        .expect_err("optional path parameter");
        assert!(err.message.contains("must be required"));
    }

    #[tokio::test]
    async fn path_level_parameters_count_as_declared() {
        validate(openapi(json!({
            "/users/{id}": {
                "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
                "get": {"responses": {}},
                "delete": {"responses": {}}
            }
        })))
        .await
        .expect("valid");
    }

    #[tokio::test]
    async fn rejects_bad_response_codes_and_duplicate_ids() {
        let err = validate(openapi(json!({
            "/a": {"get": {"responses": {"OK": {"description": "ok"}}}}
        })))
        .await
        .expect_err("bad code");
        assert!(err.message.contains("`OK`"));

        let err = validate(openapi(json!({
            "/a": {"get": {"operationId": "list", "responses": {}}},
            "/b": {"get": {"operationId": "list", "responses": {}}}
        })))
        .await
        .expect_err("duplicate id");
        assert!(err.message.contains("duplicate operationId"));
    }

    #[tokio::test]
    async fn accepts_extension_keys() {
        let raw = json!({
            "openapi": "3.0.0",
            "info": {"title": "Test API", "version": "1.0.0"},
            "paths": {
                "x-generated-by": "tooling",
                "/a": {"get": {"responses": {
                    "200": {"description": "ok"},
                    "x-retry": 3
                }}}
            }
        });
        let Document::OpenApi(doc) = validate(raw).await.expect("valid") else {
            panic!("expected openapi document");
        };
        assert_eq!(doc.paths.len(), 1);
    }

    #[tokio::test]
    async fn rejects_relative_paths() {
        let err = validate(openapi(json!({"users": {"get": {"responses": {}}}})))
            .await
            .expect_err("relative path");
        assert!(err.message.contains("must begin with a slash"));
    }

    #[test]
    fn response_keys() {
        for ok in ["200", "404", "default", "2XX", "5XX", "x-cache"] {
            assert!(is_response_key(ok), "{ok}");
        }
        for bad in ["OK", "20", "600", "2xx", "2000"] {
            assert!(!is_response_key(bad), "{bad}");
        }
    }

    #[test]
    fn dereferences_internal_pointers() {
        let raw = json!({
            "paths": {"/u": {"get": {"responses": {"200": {"$ref": "#/components/responses/Ok"}}}}},
            "components": {
                "responses": {"Ok": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/User"}}}}},
                "schemas": {"User": {"type": "object", "properties": {"id": {"type": "string"}}}}
            }
        });

        let resolved = dereference(&raw).expect("dereference");
        assert_eq!(
            resolved.pointer("/paths/~1u/get/responses/200/content/application~1json/schema/properties/id"),
            Some(&json!({"type": "string"}))
        );
    }

    #[test]
    fn keeps_cycles_and_external_references() {
        let raw = json!({
            "components": {"schemas": {
                "Node": {"type": "object", "properties": {"next": {"$ref": "#/components/schemas/Node"}}},
                "Remote": {"$ref": "other.yaml#/Thing"}
            }}
        });

        let resolved = dereference(&raw).expect("dereference");
        assert_eq!(
            resolved.pointer("/components/schemas/Node/properties/next"),
            Some(&json!({"$ref": "#/components/schemas/Node"}))
        );
        assert_eq!(
            resolved.pointer("/components/schemas/Remote"),
            Some(&json!({"$ref": "other.yaml#/Thing"}))
        );
    }

    #[test]
    fn mutual_references_stop_at_the_enclosing_schema() {
        let raw = json!({
            "components": {"schemas": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
            }},
            "paths": {"/a": {"get": {"responses": {"200": {"description": "ok", "content": {
                "application/json": {"schema": {"$ref": "#/components/schemas/A"}}
            }}}}}}
        });

        let resolved = dereference(&raw).expect("dereference");
        assert_eq!(
            resolved.pointer("/components/schemas/A/properties/b/properties/a"),
            Some(&json!({"$ref": "#/components/schemas/A"}))
        );
        assert_eq!(
            resolved.pointer("/paths/~1a/get/responses/200/content/application~1json/schema/properties/b/properties/a"),
            Some(&json!({"$ref": "#/components/schemas/A"}))
        );
    }

    #[test]
    fn sibling_pointers_are_not_ancestors() {
        assert!(encloses("/components/schemas/Node", "/components/schemas/Node"));
        assert!(encloses("/components/schemas/Node", "/components/schemas/Node/properties/next"));
        assert!(!encloses("/components/schemas/Node", "/components/schemas/NodeList"));
        assert!(encloses("", "/anything"));
    }

    #[test]
    fn unresolvable_pointer_is_an_error() {
        let err = dereference(&json!({"a": {"$ref": "#/missing"}})).expect_err("missing");
        assert!(err.message.contains("#/missing"));
    }

    #[tokio::test]
    async fn dereferencing_can_be_disabled() {
        let raw = openapi(json!({
            "/u": {"get": {"responses": {"200": {"$ref": "#/components/responses/Missing"}}}}
        }));
        let validator = OpenApiValidator::with_options(ValidatorOptions { dereference: false });
        let document = validator.validate(raw.clone()).await.expect("kept reference");
        let Document::OpenApi(doc) = document else {
            panic!("expected openapi document");
        };
        let get = doc.paths["/u"].get.as_ref().expect("get");
        assert!(matches!(get.responses["200"], ReferenceOr::Reference { .. }));

        assert!(validate(raw).await.is_err());
    }
}
