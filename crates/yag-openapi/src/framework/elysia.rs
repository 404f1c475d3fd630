//! Route tree shape for Elysia's Eden client.

use super::route_tree::RouteTree;
use super::{FrameworkTypeBuilder, colon_path, parameter_object};
use crate::model::{ApiModel, MethodModel, ParameterLocation, RouteModel};
use crate::translate::schema_to_type;
use crate::types::{ObjectType, TypeExpr};

/// Segment Elysia uses for the bare root path
const INDEX_SEGMENT: &str = "index";

/// Builds `Elysia<"", SingletonBase, DefinitionBase, MetadataBase, Tree>`,
/// where the tree nests path segments down to lowercase verb entries
#[derive(Debug, Clone, Copy, Default)]
pub struct ElysiaTypeBuilder;

impl ElysiaTypeBuilder {
    fn input_object(&self, method: &MethodModel) -> ObjectType {
        let body = method
            .json_body()
            .map(|body| schema_to_type(Some(&body.schema)))
            .unwrap_or_else(TypeExpr::unknown);
        let params = parameter_object(method, ParameterLocation::Path, false)
            .map(TypeExpr::from)
            .unwrap_or_else(TypeExpr::empty_object);
        let query = parameter_object(method, ParameterLocation::Query, true)
            .map(TypeExpr::from)
            .unwrap_or_else(TypeExpr::unknown);
        let headers = parameter_object(method, ParameterLocation::Header, true)
            .map(TypeExpr::from)
            .unwrap_or_else(TypeExpr::unknown);

        ObjectType::block()
            .field("body", body)
            .field("params", params)
            .field("query", query)
            .field("headers", headers)
    }

    fn route_object(&self, route: &RouteModel) -> ObjectType {
        route.methods.iter().fold(ObjectType::block(), |object, method| {
            object.field(method.method.as_str(), self.build_method_type(method))
        })
    }
}

impl FrameworkTypeBuilder for ElysiaTypeBuilder {
    fn build_input_type(&self, method: &MethodModel) -> TypeExpr {
        self.input_object(method).into()
    }

    /// Every declared status code, with `unknown` for responses without a schema
    fn build_output_type(&self, method: &MethodModel) -> TypeExpr {
        method
            .responses
            .iter()
            .fold(ObjectType::block(), |object, response| {
                object.field(
                    response.status_code.as_str(),
                    schema_to_type(response.schema.as_ref()),
                )
            })
            .into()
    }

    fn build_method_type(&self, method: &MethodModel) -> TypeExpr {
        self.input_object(method)
            .field("response", self.build_output_type(method))
            .into()
    }

    fn build_route_type(&self, route: &RouteModel) -> TypeExpr {
        self.route_object(route).into()
    }

    fn build_app_type(&self, model: &ApiModel) -> TypeExpr {
        let mut tree = RouteTree::new();
        for route in &model.routes {
            let path = colon_path(&route.path);
            let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            if segments.is_empty() {
                segments.push(INDEX_SEGMENT);
            }
            tracing::debug!(path = %route.path, depth = segments.len(), "elysia route");

            let leaves = self
                .route_object(route)
                .into_members()
                .into_iter()
                .map(|member| (member.key.as_str().to_string(), member.ty));
            tree.insert(segments, leaves);
        }

        TypeExpr::generic(
            "Elysia",
            [
                TypeExpr::string_literal(""),
                TypeExpr::literal("SingletonBase"),
                TypeExpr::literal("DefinitionBase"),
                TypeExpr::literal("MetadataBase"),
                tree.to_type(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ApiInfo, HttpMethod, ParameterModel, RequestBodyModel, ResponseModel,
    };
    use serde_json::json;

    fn model(routes: Vec<RouteModel>) -> ApiModel {
        ApiModel {
            info: ApiInfo {
                title: "T".into(),
                version: "1".into(),
                description: None,
            },
            routes,
            schemas: None,
        }
    }

    fn response(code: &str, schema: Option<serde_json::Value>) -> ResponseModel {
        ResponseModel {
            status_code: code.into(),
            description: String::new(),
            content_type: schema.as_ref().map(|_| "application/json".into()),
            schema,
            headers: None,
        }
    }

    #[test]
    fn empty_categories_fall_back() {
        let method = MethodModel::new(HttpMethod::Get);
        assert_eq!(
            ElysiaTypeBuilder.build_method_type(&method).render(),
            concat!(
                "{\n",
                "    body: unknown;\n",
                "    params: {};\n",
                "    query: unknown;\n",
                "    headers: unknown;\n",
                "    response: {}\n",
                "}"
            )
        );
    }

    #[test]
    fn method_type_lists_every_status() {
        let mut method = MethodModel::new(HttpMethod::Post);
        method.parameters = vec![ParameterModel {
            name: "limit".into(),
            ty: TypeExpr::literal("number"),
            location: ParameterLocation::Query,
            required: true,
            description: None,
        }];
        method.request_body = Some(RequestBodyModel {
            content_type: "application/json".into(),
            schema: json!({"$ref": "#/components/schemas/NewUser"}),
            required: true,
        });
        method.responses = vec![
            response("201", Some(json!({"$ref": "#/components/schemas/User"}))),
            response("400", None),
            response("default", Some(json!({"type": "string"}))),
        ];

        assert_eq!(
            ElysiaTypeBuilder.build_method_type(&method).render(),
            concat!(
                "{\n",
                "    body: NewUser;\n",
                "    params: {};\n",
                "    query: {\n",
                "        limit?: number\n",
                "    };\n",
                "    headers: unknown;\n",
                "    response: {\n",
                "        201: User;\n",
                "        400: unknown;\n",
                "        default: string\n",
                "    }\n",
                "}"
            )
        );
    }

    #[test]
    fn app_type_nests_segments() {
        let mut get = MethodModel::new(HttpMethod::Get);
        get.responses = vec![response("200", Some(json!({"type": "string"})))];
        let mut by_id = MethodModel::new(HttpMethod::Delete);
        by_id.parameters = vec![ParameterModel {
            name: "id".into(),
            ty: TypeExpr::literal("string"),
            location: ParameterLocation::Path,
            required: true,
            description: None,
        }];

        let api = model(vec![
            RouteModel {
                path: "/todos".into(),
                methods: vec![get],
            },
            RouteModel {
                path: "/todos/{id}".into(),
                methods: vec![by_id],
            },
        ]);

        assert_eq!(
            ElysiaTypeBuilder.build_app_type(&api).render(),
            concat!(
                "Elysia<\"\", SingletonBase, DefinitionBase, MetadataBase, {\n",
                "    \"todos\": {\n",
                "        \"get\": {\n",
                "            body: unknown;\n",
                "            params: {};\n",
                "            query: unknown;\n",
                "            headers: unknown;\n",
                "            response: {\n",
                "                200: string\n",
                "            }\n",
                "        };\n",
                "        \":id\": {\n",
                "            \"delete\": {\n",
                "                body: unknown;\n",
                "                params: {\n",
                "                    id: string\n",
                "                };\n",
                "                query: unknown;\n",
                "                headers: unknown;\n",
                "                response: {}\n",
                "            }\n",
                "        }\n",
                "    }\n",
                "}>"
            )
        );
    }

    #[test]
    fn root_path_goes_under_index() {
        let api = model(vec![RouteModel {
            path: "/".into(),
            methods: vec![MethodModel::new(HttpMethod::Get)],
        }]);
        let rendered = ElysiaTypeBuilder.build_app_type(&api).render();
        assert!(rendered.contains("\"index\": {\n        \"get\": {"));
    }

    #[test]
    fn empty_api_renders_empty_tree() {
        assert_eq!(
            ElysiaTypeBuilder.build_app_type(&model(Vec::new())).render(),
            "Elysia<\"\", SingletonBase, DefinitionBase, MetadataBase, {}>"
        );
    }
}
