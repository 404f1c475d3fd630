//! Standalone type aliases for every named component schema.

use crate::model::ApiModel;
use crate::translate::schema_to_type;
use crate::types::{RenderOptions, sanitize_type_name};

const NAMESPACE_INDENT: &str = "  ";

/// Emits `export type <Name> = <type>;` per component schema
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelsGenerator {
    options: RenderOptions,
}

impl ModelsGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    /// One alias per line in schema order; empty when there are no schemas
    pub fn generate(&self, model: &ApiModel) -> String {
        model
            .schemas()
            .map(|(name, schema)| {
                format!(
                    "export type {} = {};\n",
                    sanitize_type_name(name),
                    schema_to_type(Some(schema)).render_with(&self.options)
                )
            })
            .collect()
    }

    /// The aliases wrapped in `export namespace <namespace> { ... }`
    pub fn generate_namespaced(&self, namespace: &str, model: &ApiModel) -> String {
        let namespace = sanitize_type_name(namespace);
        let body = self.generate(model);
        if body.is_empty() {
            return format!("export namespace {namespace} {{}}\n");
        }

        let mut out = format!("export namespace {namespace} {{\n");
        for line in body.lines() {
            if !line.is_empty() {
                out.push_str(NAMESPACE_INDENT);
            }
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ApiInfo;
    use indexmap::IndexMap;
    use serde_json::json;

    fn model_with(schemas: Option<IndexMap<String, serde_json::Value>>) -> ApiModel {
        ApiModel {
            info: ApiInfo {
                title: "T".into(),
                version: "1".into(),
                description: None,
            },
            routes: Vec::new(),
            schemas,
        }
    }

    fn sample() -> ApiModel {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "User".to_string(),
            json!({"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}),
        );
        schemas.insert(
            "user-list".to_string(),
            json!({"type": "array", "items": {"$ref": "#/components/schemas/User"}}),
        );
        schemas.insert(
            "Status".to_string(),
            json!({"type": "string", "enum": ["on", "off"]}),
        );
        model_with(Some(schemas))
    }

    #[test]
    fn one_alias_per_schema() {
        assert_eq!(
            ModelsGenerator::new().generate(&sample()),
            concat!(
                "export type User = { id: string };\n",
                "export type user_list = User[];\n",
                "export type Status = \"on\" | \"off\";\n"
            )
        );
    }

    #[test]
    fn no_schemas_no_output() {
        assert_eq!(ModelsGenerator::new().generate(&model_with(None)), "");
    }

    #[test]
    fn namespaced_output_is_indented() {
        assert_eq!(
            ModelsGenerator::new().generate_namespaced("Petstore", &sample()),
            concat!(
                "export namespace Petstore {\n",
                "  export type User = { id: string };\n",
                "  export type user_list = User[];\n",
                "  export type Status = \"on\" | \"off\";\n",
                "}\n"
            )
        );
        assert_eq!(
            ModelsGenerator::new().generate_namespaced("9lives", &model_with(None)),
            "export namespace _9lives {}\n"
        );
    }
}
