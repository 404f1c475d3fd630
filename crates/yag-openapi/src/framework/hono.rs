//! Route schema shape for Hono's typed client.

use super::{FrameworkTypeBuilder, colon_path, parameter_object};
use crate::model::{ApiModel, MethodModel, ParameterLocation, RouteModel};
use crate::translate::schema_to_type;
use crate::types::{ObjectType, TypeExpr};

pub(crate) const ENV_TYPE: &str = "BlankEnv";
pub(crate) const STATUS_TYPE: &str = "ContentfulStatusCode";
const BASE_PATH: &str = "/";

/// Builds `Hono<BlankEnv, Schema, "/">`, where the schema maps each path to
/// its `$verb` endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct HonoTypeBuilder;

impl HonoTypeBuilder {
    fn route_object(&self, route: &RouteModel) -> ObjectType {
        route.methods.iter().fold(ObjectType::block(), |object, method| {
            object.field(format!("${}", method.method), self.build_method_type(method))
        })
    }
}

impl FrameworkTypeBuilder for HonoTypeBuilder {
    fn build_input_type(&self, method: &MethodModel) -> TypeExpr {
        let mut input = ObjectType::block();
        if let Some(param) = parameter_object(method, ParameterLocation::Path, false) {
            input = input.field("param", param.into());
        }
        if let Some(query) = parameter_object(method, ParameterLocation::Query, true) {
            input = input.field("query", query.into());
        }
        if let Some(body) = method.json_body() {
            input = input.field("json", schema_to_type(Some(&body.schema)));
        }
        if let Some(header) = parameter_object(method, ParameterLocation::Header, true) {
            input = input.field("header", header.into());
        }

        if input.is_empty() {
            TypeExpr::empty_object()
        } else {
            input.into()
        }
    }

    fn build_output_type(&self, method: &MethodModel) -> TypeExpr {
        method
            .success_response()
            .and_then(|response| response.schema.as_ref())
            .map(|schema| schema_to_type(Some(schema)))
            .unwrap_or_else(TypeExpr::empty_object)
    }

    fn build_method_type(&self, method: &MethodModel) -> TypeExpr {
        ObjectType::block()
            .field("input", self.build_input_type(method))
            .field("output", self.build_output_type(method))
            .field("outputFormat", TypeExpr::string_literal("json"))
            .field("status", TypeExpr::literal(STATUS_TYPE))
            .into()
    }

    fn build_route_type(&self, route: &RouteModel) -> TypeExpr {
        self.route_object(route).into()
    }

    fn build_app_type(&self, model: &ApiModel) -> TypeExpr {
        let routes = model.routes.iter().fold(ObjectType::block(), |routes, route| {
            tracing::debug!(path = %route.path, methods = route.methods.len(), "hono route");
            routes.quoted_field(colon_path(&route.path), self.build_route_type(route))
        });

        TypeExpr::generic(
            "Hono",
            [
                TypeExpr::literal(ENV_TYPE),
                TypeExpr::intersection([routes.into(), TypeExpr::empty_object()]),
                TypeExpr::string_literal(BASE_PATH),
            ],
        )
    }
}
