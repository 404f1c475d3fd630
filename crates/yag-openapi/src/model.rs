//! Framework-agnostic intermediate representation of an API.
//!
//! The parser reduces both OpenAPI 3.x and Swagger 2.0 documents to an
//! [`ApiModel`]; the framework builders only ever see this shape.

use crate::types::TypeExpr;
use indexmap::IndexMap;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::fmt;

/// An untouched JSON-schema fragment
pub type SchemaValue = serde_json::Value;

const JSON_CONTENT_TYPE: &str = "application/json";

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiModel {
    pub info: ApiInfo,
    pub routes: Vec<RouteModel>,
    /// Named component schemas (`components.schemas` or `definitions`)
    pub schemas: Option<IndexMap<String, SchemaValue>>,
}

impl ApiModel {
    /// Iterate the named component schemas in document order
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &SchemaValue)> {
        self.schemas
            .iter()
            .flat_map(|schemas| schemas.iter())
            .map(|(name, schema)| (name.as_str(), schema))
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

/// One path template and the operations declared on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteModel {
    /// Path template exactly as written, e.g. `/users/{id}`
    pub path: String,
    pub methods: Vec<MethodModel>,
}

impl RouteModel {
    pub fn method(&self, method: HttpMethod) -> Option<&MethodModel> {
        self.methods.iter().find(|m| m.method == method)
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodModel {
    pub method: HttpMethod,
    pub parameters: Vec<ParameterModel>,
    pub request_body: Option<RequestBodyModel>,
    pub responses: Vec<ResponseModel>,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl MethodModel {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
            operation_id: None,
            summary: None,
            description: None,
        }
    }

    /// Parameters declared at `location`, in declaration order
    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &ParameterModel> {
        self.parameters
            .iter()
            .filter(move |param| param.location == location)
    }

    /// The request body, if its content type is exactly `application/json`
    pub fn json_body(&self) -> Option<&RequestBodyModel> {
        self.request_body
            .as_ref()
            .filter(|body| body.content_type == JSON_CONTENT_TYPE)
    }

    /// First response, in declaration order, with a 2xx code
    pub fn success_response(&self) -> Option<&ResponseModel> {
        self.responses.iter().find(|response| response.is_success())
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterModel {
    pub name: String,
    /// Rendered TypeScript type of the parameter
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// Parse the `in` field of a parameter object. Locations that carry a
    /// body (`body`, `formData`) are not parameter locations.
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodyModel {
    pub content_type: String,
    pub schema: SchemaValue,
    pub required: bool,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseModel {
    /// `"200"`, `"2XX"` or `"default"`
    pub status_code: String,
    pub description: String,
    pub content_type: Option<String>,
    pub schema: Option<SchemaValue>,
    pub headers: Option<IndexMap<String, serde_json::Value>>,
}

impl ResponseModel {
    /// Exactly three characters, a `2` followed by two digits
    pub fn is_success(&self) -> bool {
        let code = self.status_code.as_bytes();
        code.len() == 3 && code[0] == b'2' && code[1..].iter().all(u8::is_ascii_digit)
    }
}

/// The eight HTTP verbs an OpenAPI path item can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Every verb in the order operations are read from a path item
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    /// Lowercase verb as used in path items and route keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(code: &str, schema: Option<SchemaValue>) -> ResponseModel {
        ResponseModel {
            status_code: code.to_string(),
            description: String::new(),
            content_type: schema.as_ref().map(|_| JSON_CONTENT_TYPE.to_string()),
            schema,
            headers: None,
        }
    }

    #[test]
    fn success_codes() {
        assert!(response("200", None).is_success());
        assert!(response("204", None).is_success());
        assert!(!response("2XX", None).is_success());
        assert!(!response("default", None).is_success());
        assert!(!response("301", None).is_success());
        assert!(!response("2000", None).is_success());
    }

    #[test]
    fn success_response_is_first_2xx_even_without_schema() {
        let mut method = MethodModel::new(HttpMethod::Post);
        method.responses = vec![
            response("400", Some(json!({"type": "string"}))),
            response("204", None),
            response("201", Some(json!({"type": "string"}))),
        ];
        assert_eq!(
            method.success_response().map(|r| r.status_code.as_str()),
            Some("204")
        );

        method.responses = vec![response("404", None), response("default", None)];
        assert!(method.success_response().is_none());
    }

    #[test]
    fn json_body_requires_exact_content_type() {
        let mut method = MethodModel::new(HttpMethod::Post);
        method.request_body = Some(RequestBodyModel {
            content_type: "multipart/form-data".into(),
            schema: json!({"type": "object"}),
            required: true,
        });
        assert!(method.json_body().is_none());

        method.request_body = Some(RequestBodyModel {
            content_type: JSON_CONTENT_TYPE.into(),
            schema: json!({"type": "object"}),
            required: true,
        });
        assert!(method.json_body().is_some());
    }

    #[test]
    fn serializes_with_wire_names() {
        let mut method = MethodModel::new(HttpMethod::Get);
        method.parameters.push(ParameterModel {
            name: "id".into(),
            ty: TypeExpr::literal("string"),
            location: ParameterLocation::Path,
            required: true,
            description: None,
        });

        let value = serde_json::to_value(&method).expect("serialize");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["parameters"][0]["in"], "path");
        assert_eq!(value["parameters"][0]["type"], "string");
        assert!(value.get("requestBody").is_none());
    }

    #[test]
    fn verb_order() {
        let names: Vec<_> = HttpMethod::ALL.iter().map(HttpMethod::as_str).collect();
        assert_eq!(
            names,
            ["get", "post", "put", "patch", "delete", "head", "options", "trace"]
        );
    }
}
