//! Serde model of OpenAPI 3.x and Swagger 2.0 documents.
//!
//! Only the parts that feed route types are typed. Schemas stay as raw
//! [`serde_json::Value`]s so that property order and unknown keywords survive
//! untouched until translation.

use crate::error::ValidationError;
use crate::model::HttpMethod;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A validated API description
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    OpenApi(OpenApiDocument),
    Swagger(SwaggerDocument),
}

impl Document {
    pub fn info(&self) -> &Info {
        match self {
            Document::OpenApi(doc) => &doc.info,
            Document::Swagger(doc) => &doc.info,
        }
    }

    pub fn spec_version(&self) -> SpecVersion {
        match self {
            Document::OpenApi(_) => SpecVersion::OpenApi3,
            Document::Swagger(_) => SpecVersion::Swagger2,
        }
    }
}

/// Which description format a raw document claims to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    OpenApi3,
    Swagger2,
}

impl SpecVersion {
    /// Read the `openapi` / `swagger` version field of a raw document
    pub fn detect(raw: &Value) -> Result<Self, ValidationError> {
        if let Some(version) = raw.get("openapi") {
            let version = version_text(version)
                .ok_or_else(|| ValidationError::at("/openapi", "`openapi` must be a string"))?;
            return if version.starts_with("3.") || version == "3" {
                Ok(SpecVersion::OpenApi3)
            } else {
                Err(ValidationError::at(
                    "/openapi",
                    format!("unsupported OpenAPI version {version}"),
                ))
            };
        }

        if let Some(version) = raw.get("swagger") {
            let version = version_text(version)
                .ok_or_else(|| ValidationError::at("/swagger", "`swagger` must be a string"))?;
            return if version == "2.0" || version == "2" {
                Ok(SpecVersion::Swagger2)
            } else {
                Err(ValidationError::at(
                    "/swagger",
                    format!("unsupported Swagger version {version}"),
                ))
            };
        }

        Err(ValidationError::new(
            "document is not an OpenAPI 3.x or Swagger 2.0 description: missing `openapi` or `swagger` field",
        ))
    }
}

/// YAML writes `openapi: 3.0` as a float
fn version_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    version_text(&value).ok_or_else(|| serde::de::Error::custom("expected a string"))
}

/// Whether a map key is an `x-` specification extension
pub fn is_extension(key: &str) -> bool {
    key.starts_with("x-")
}

/// A map whose `x-` extension entries are dropped before the rest are typed
fn without_extensions<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    IndexMap::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .filter(|(key, _)| !is_extension(key))
        .map(|(key, value)| {
            serde_json::from_value(value)
                .map(|item| (key, item))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

/// Either a `$ref` object or an inline value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

impl<T> ReferenceOr<T> {
    pub fn as_item(&self) -> Option<&T> {
        match self {
            ReferenceOr::Item(item) => Some(item),
            ReferenceOr::Reference { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,
    pub description: Option<String>,
}

/// Operations on one path template, generic over the format's operation and
/// parameter types
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathItem<O, P> {
    #[serde(default = "Vec::new")]
    pub parameters: Vec<ReferenceOr<P>>,
    pub get: Option<O>,
    pub post: Option<O>,
    pub put: Option<O>,
    pub patch: Option<O>,
    pub delete: Option<O>,
    pub head: Option<O>,
    pub options: Option<O>,
    pub trace: Option<O>,
}

impl<O, P> PathItem<O, P> {
    pub fn operation(&self, method: HttpMethod) -> Option<&O> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Declared operations in verb order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &O)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| self.operation(method).map(|op| (method, op)))
    }
}

/// Common view of a parameter object across formats
pub trait ParameterLike {
    fn name(&self) -> &str;
    fn location(&self) -> &str;
    fn required(&self) -> bool;
}

/// Common view of an operation object across formats
pub trait OperationLike {
    type Parameter: ParameterLike;

    fn operation_id(&self) -> Option<&str>;
    fn parameters(&self) -> &[ReferenceOr<Self::Parameter>];
    fn response_codes(&self) -> Vec<&str>;
}

// OpenAPI 3.x

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenApiDocument {
    #[serde(deserialize_with = "string_or_number")]
    pub openapi: String,
    pub info: Info,
    #[serde(default, deserialize_with = "without_extensions")]
    pub paths: IndexMap<String, PathItem<Operation, Parameter>>,
    pub components: Option<Components>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
    pub request_body: Option<ReferenceOr<RequestBody>>,
    #[serde(default, deserialize_with = "without_extensions")]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

impl OperationLike for Operation {
    type Parameter = Parameter;

    fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    fn parameters(&self) -> &[ReferenceOr<Parameter>] {
        &self.parameters
    }

    fn response_codes(&self) -> Vec<&str> {
        self.responses.keys().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<Value>,
    pub content: Option<IndexMap<String, MediaType>>,
}

impl Parameter {
    /// `schema`, or the schema of the first `content` entry
    pub fn type_schema(&self) -> Option<&Value> {
        self.schema.as_ref().or_else(|| {
            self.content
                .as_ref()
                .and_then(|content| content.first())
                .and_then(|(_, media)| media.schema.as_ref())
        })
    }
}

impl ParameterLike for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn required(&self) -> bool {
        self.required
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaType {
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    pub headers: Option<IndexMap<String, Value>>,
}

// Swagger 2.0

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwaggerDocument {
    #[serde(deserialize_with = "string_or_number")]
    pub swagger: String,
    pub info: Info,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default, deserialize_with = "without_extensions")]
    pub paths: IndexMap<String, PathItem<SwaggerOperation, SwaggerParameter>>,
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<SwaggerParameter>>,
    #[serde(default, deserialize_with = "without_extensions")]
    pub responses: IndexMap<String, ReferenceOr<SwaggerResponse>>,
}

impl OperationLike for SwaggerOperation {
    type Parameter = SwaggerParameter;

    fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    fn parameters(&self) -> &[ReferenceOr<SwaggerParameter>] {
        &self.parameters
    }

    fn response_codes(&self) -> Vec<&str> {
        self.responses.keys().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwaggerParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    /// Only set for `in: body`
    pub schema: Option<Value>,
    #[serde(rename = "type")]
    pub ty: Option<Value>,
    pub format: Option<Value>,
    pub items: Option<Value>,
    #[serde(rename = "enum")]
    pub enumeration: Option<Value>,
}

impl SwaggerParameter {
    /// Schema equivalent of a non-body parameter's inline type keywords
    pub fn inline_schema(&self) -> Value {
        let mut schema = serde_json::Map::new();
        for (key, value) in [
            ("type", &self.ty),
            ("format", &self.format),
            ("items", &self.items),
            ("enum", &self.enumeration),
        ] {
            if let Some(value) = value {
                schema.insert(key.to_string(), value.clone());
            }
        }
        Value::Object(schema)
    }
}

impl ParameterLike for SwaggerParameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn required(&self) -> bool {
        self.required
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwaggerResponse {
    #[serde(default)]
    pub description: String,
    pub schema: Option<Value>,
    pub headers: Option<IndexMap<String, Value>>,
}

/// Placeholder names of a path template, e.g. `["id"]` for `/users/{id}`
pub fn template_params(path: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        if close > 0 {
            params.push(&after[..close]);
        }
        rest = &after[close + 1..];
    }
    params
}

/// Escape one JSON pointer reference token
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_versions() {
        assert_eq!(
            SpecVersion::detect(&json!({"openapi": "3.0.3"})),
            Ok(SpecVersion::OpenApi3)
        );
        assert_eq!(
            SpecVersion::detect(&json!({"openapi": "3.1.0"})),
            Ok(SpecVersion::OpenApi3)
        );
        assert_eq!(
            SpecVersion::detect(&json!({"swagger": "2.0"})),
            Ok(SpecVersion::Swagger2)
        );
        assert_eq!(
            SpecVersion::detect(&json!({"openapi": 3.0})),
            Ok(SpecVersion::OpenApi3)
        );
        assert!(SpecVersion::detect(&json!({"openapi": "2.0"})).is_err());
        assert!(SpecVersion::detect(&json!({"swagger": "1.2"})).is_err());
        assert!(SpecVersion::detect(&json!({"info": {}})).is_err());
    }

    #[test]
    fn operations_follow_verb_order() {
        let item: PathItem<Operation, Parameter> = serde_json::from_value(json!({
            "delete": {"responses": {}},
            "post": {"responses": {}},
            "get": {"responses": {}}
        }))
        .expect("path item");

        let verbs: Vec<_> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(
            verbs,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete]
        );
    }

    #[test]
    fn reference_or_item() {
        let params: Vec<ReferenceOr<Parameter>> = serde_json::from_value(json!([
            {"$ref": "#/components/parameters/Limit"},
            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
        ]))
        .expect("parameters");

        assert!(matches!(&params[0], ReferenceOr::Reference { reference } if reference == "#/components/parameters/Limit"));
        assert_eq!(params[1].as_item().map(|p| p.name.as_str()), Some("id"));
    }

    #[test]
    fn parameter_schema_falls_back_to_content() {
        let param: Parameter = serde_json::from_value(json!({
            "name": "filter",
            "in": "query",
            "content": {"application/json": {"schema": {"type": "object"}}}
        }))
        .expect("parameter");
        assert_eq!(param.type_schema(), Some(&json!({"type": "object"})));
    }

    #[test]
    fn swagger_inline_schema() {
        let param: SwaggerParameter = serde_json::from_value(json!({
            "name": "tags",
            "in": "query",
            "type": "array",
            "items": {"type": "string"}
        }))
        .expect("parameter");
        assert_eq!(
            param.inline_schema(),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn extension_keys_are_dropped() {
        let doc: OpenApiDocument = serde_json::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "x-internal": true,
                "/a": {"get": {"responses": {
                    "200": {"description": "ok"},
                    "x-rate-limited": "yes"
                }}}
            }
        }))
        .expect("document");

        assert_eq!(doc.paths.keys().collect::<Vec<_>>(), vec!["/a"]);
        let get = doc.paths["/a"].get.as_ref().expect("get");
        assert_eq!(get.response_codes(), vec!["200"]);
    }

    #[test]
    fn template_placeholders() {
        assert_eq!(template_params("/users/{id}/posts/{postId}"), vec!["id", "postId"]);
        assert_eq!(template_params("/users"), Vec::<&str>::new());
        assert_eq!(template_params("/broken/{"), Vec::<&str>::new());
        assert_eq!(template_params("/empty/{}"), Vec::<&str>::new());
    }

    #[test]
    fn pointer_tokens() {
        assert_eq!(escape_pointer_token("/users/{id}"), "~1users~1{id}");
        assert_eq!(escape_pointer_token("a~b"), "a~0b");
    }
}
