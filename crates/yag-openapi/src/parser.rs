//! Decoding and reduction of API documents into the [`ApiModel`].

use crate::document::{
    Document, Info, OpenApiDocument, Operation, Parameter, ReferenceOr, RequestBody, Response,
    SwaggerDocument, SwaggerOperation, SwaggerParameter,
};
use crate::error::{GenerateError, Result};
use crate::model::{
    ApiInfo, ApiModel, HttpMethod, MethodModel, ParameterLocation, ParameterModel,
    RequestBodyModel, ResponseModel, RouteModel,
};
use crate::translate::schema_to_type;
use crate::validate::{DocumentValidator, OpenApiValidator};
use serde_json::{Map, Value, json};
use std::sync::Arc;

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// How path-level and operation-level parameters are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParameterMerge {
    /// Path-level parameters followed by operation-level ones, duplicates kept
    #[default]
    Concatenate,
    /// An operation parameter replaces a path-level one with the same name
    /// and location
    OperationOverrides,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub parameter_merge: ParameterMerge,
}

/// Parses OpenAPI 3.x and Swagger 2.0 text into an [`ApiModel`]
#[derive(Clone)]
pub struct OpenApiParser {
    validator: Arc<dyn DocumentValidator>,
    options: ParserOptions,
}

impl Default for OpenApiParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpenApiParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiParser")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl OpenApiParser {
    pub fn new() -> Self {
        Self::with_validator(OpenApiValidator::new())
    }

    pub fn with_validator(validator: impl DocumentValidator + 'static) -> Self {
        Self {
            validator: Arc::new(validator),
            options: ParserOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode, validate and reduce a document
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = content.len()))]
    pub async fn parse(&self, content: &str) -> Result<ApiModel> {
        let raw = decode_document(content)?;
        let document = self.validator.validate(raw).await?;
        Ok(self.reduce(&document))
    }

    /// Reduce a validated document to the intermediate representation
    pub fn reduce(&self, document: &Document) -> ApiModel {
        let model = match document {
            Document::OpenApi(doc) => self.reduce_openapi(doc),
            Document::Swagger(doc) => self.reduce_swagger(doc),
        };
        tracing::debug!(
            title = %model.info.title,
            routes = model.routes.len(),
            schemas = model.schemas().count(),
            "reduced document"
        );
        model
    }

    fn reduce_openapi(&self, doc: &OpenApiDocument) -> ApiModel {
        let routes = doc
            .paths
            .iter()
            .filter_map(|(path, item)| {
                let methods = item
                    .operations()
                    .map(|(method, operation)| {
                        self.openapi_method(method, &item.parameters, operation)
                    })
                    .collect();
                route(path, methods)
            })
            .collect();

        ApiModel {
            info: api_info(&doc.info),
            routes,
            schemas: doc
                .components
                .as_ref()
                .map(|components| components.schemas.clone())
                .filter(|schemas| !schemas.is_empty()),
        }
    }

    fn openapi_method(
        &self,
        method: HttpMethod,
        path_parameters: &[ReferenceOr<Parameter>],
        operation: &Operation,
    ) -> MethodModel {
        let parameters = path_parameters
            .iter()
            .chain(&operation.parameters)
            .filter_map(|param| resolved(param, "parameter"))
            .filter_map(|param| {
                Some(ParameterModel {
                    name: param.name.clone(),
                    ty: schema_to_type(param.type_schema()),
                    location: ParameterLocation::parse(&param.location)?,
                    required: param.required,
                    description: param.description.clone(),
                })
            });

        MethodModel {
            method,
            parameters: self.merge_parameters(parameters),
            request_body: operation
                .request_body
                .as_ref()
                .and_then(|body| resolved(body, "request body"))
                .and_then(openapi_request_body),
            responses: operation
                .responses
                .iter()
                .filter_map(|(code, response)| {
                    resolved(response, "response").map(|response| openapi_response(code, response))
                })
                .collect(),
            operation_id: operation.operation_id.clone(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
        }
    }

    fn reduce_swagger(&self, doc: &SwaggerDocument) -> ApiModel {
        let routes = doc
            .paths
            .iter()
            .filter_map(|(path, item)| {
                let methods = item
                    .operations()
                    .map(|(method, operation)| {
                        self.swagger_method(doc, method, &item.parameters, operation)
                    })
                    .collect();
                route(path, methods)
            })
            .collect();

        ApiModel {
            info: api_info(&doc.info),
            routes,
            schemas: Some(doc.definitions.clone()).filter(|schemas| !schemas.is_empty()),
        }
    }

    fn swagger_method(
        &self,
        doc: &SwaggerDocument,
        method: HttpMethod,
        path_parameters: &[ReferenceOr<SwaggerParameter>],
        operation: &SwaggerOperation,
    ) -> MethodModel {
        let all: Vec<&SwaggerParameter> = path_parameters
            .iter()
            .chain(&operation.parameters)
            .filter_map(|param| resolved(param, "parameter"))
            .collect();

        let parameters = all.iter().filter_map(|param| {
            Some(ParameterModel {
                name: param.name.clone(),
                ty: schema_to_type(Some(&param.inline_schema())),
                location: ParameterLocation::parse(&param.location)?,
                required: param.required,
                description: param.description.clone(),
            })
        });

        let consumes = first_media_type(operation.consumes.as_deref(), &doc.consumes);
        let produces = first_media_type(operation.produces.as_deref(), &doc.produces)
            .unwrap_or(JSON_CONTENT_TYPE);

        MethodModel {
            method,
            parameters: self.merge_parameters(parameters),
            request_body: swagger_request_body(&all, consumes),
            responses: operation
                .responses
                .iter()
                .filter_map(|(code, response)| {
                    let response = resolved(response, "response")?;
                    Some(ResponseModel {
                        status_code: code.clone(),
                        description: response.description.clone(),
                        content_type: response.schema.as_ref().map(|_| produces.to_string()),
                        schema: response.schema.clone(),
                        headers: response.headers.clone(),
                    })
                })
                .collect(),
            operation_id: operation.operation_id.clone(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
        }
    }

    fn merge_parameters(
        &self,
        parameters: impl Iterator<Item = ParameterModel>,
    ) -> Vec<ParameterModel> {
        match self.options.parameter_merge {
            ParameterMerge::Concatenate => parameters.collect(),
            ParameterMerge::OperationOverrides => {
                let mut merged: Vec<ParameterModel> = Vec::new();
                for param in parameters {
                    match merged
                        .iter_mut()
                        .find(|existing| existing.name == param.name && existing.location == param.location)
                    {
                        Some(existing) => *existing = param,
                        None => merged.push(param),
                    }
                }
                merged
            }
        }
    }
}

/// Decode document text, trying YAML first and JSON second
pub fn decode_document(content: &str) -> Result<Value> {
    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(yaml) => Ok(yaml_to_json(yaml)),
        Err(yaml_error) => serde_json::from_str::<Value>(content)
            .map_err(|json_error| GenerateError::parse(yaml_error, json_error)),
    }
}

/// Convert a YAML value into JSON, stringifying non-string mapping keys
pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect::<Map<String, Value>>(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => yaml_to_json(other).to_string(),
    }
}

fn resolved<'a, T>(item: &'a ReferenceOr<T>, kind: &str) -> Option<&'a T> {
    match item {
        ReferenceOr::Item(item) => Some(item),
        ReferenceOr::Reference { reference } => {
            tracing::warn!(reference = %reference, kind, "skipping unresolved reference");
            None
        }
    }
}

fn route(path: &str, methods: Vec<MethodModel>) -> Option<RouteModel> {
    if methods.is_empty() {
        tracing::debug!(path, "skipping path without operations");
        return None;
    }
    Some(RouteModel {
        path: path.to_string(),
        methods,
    })
}

fn api_info(info: &Info) -> ApiInfo {
    ApiInfo {
        title: info.title.clone(),
        version: info.version.clone(),
        description: info.description.clone(),
    }
}

fn openapi_request_body(body: &RequestBody) -> Option<RequestBodyModel> {
    let (content_type, media) = body.content.first()?;
    if body.content.len() > 1 {
        tracing::debug!(content_type = %content_type, alternatives = body.content.len() - 1, "keeping first request content type");
    }
    Some(RequestBodyModel {
        content_type: content_type.clone(),
        schema: media.schema.clone()?,
        required: body.required,
    })
}

fn openapi_response(code: &str, response: &Response) -> ResponseModel {
    let first = response.content.first();
    ResponseModel {
        status_code: code.to_string(),
        description: response.description.clone(),
        content_type: first.map(|(content_type, _)| content_type.clone()),
        schema: first.and_then(|(_, media)| media.schema.clone()),
        headers: response.headers.clone(),
    }
}

fn first_media_type<'a>(operation: Option<&'a [String]>, document: &'a [String]) -> Option<&'a str> {
    operation
        .unwrap_or(document)
        .first()
        .map(String::as_str)
}

/// A Swagger `in: body` parameter, or `formData` parameters folded into one
/// object schema
fn swagger_request_body(
    parameters: &[&SwaggerParameter],
    consumes: Option<&str>,
) -> Option<RequestBodyModel> {
    if let Some(body) = parameters.iter().find(|param| param.location == "body") {
        return Some(RequestBodyModel {
            content_type: consumes.unwrap_or(JSON_CONTENT_TYPE).to_string(),
            schema: body.schema.clone()?,
            required: body.required,
        });
    }

    let form: Vec<&&SwaggerParameter> = parameters
        .iter()
        .filter(|param| param.location == "formData")
        .collect();
    if form.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in &form {
        properties.insert(param.name.clone(), param.inline_schema());
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    let mut schema = json!({"type": "object", "properties": properties});
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }

    Some(RequestBodyModel {
        content_type: consumes.unwrap_or(FORM_CONTENT_TYPE).to_string(),
        schema,
        required: form.iter().any(|param| param.required),
    })
}
