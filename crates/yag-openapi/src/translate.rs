//! JSON-schema fragments to TypeScript type expressions.

use crate::types::{ObjectType, TypeExpr, sanitize_type_name};
use serde_json::{Map, Value};

/// Scalar JSON-schema types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl Primitive {
    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number | Primitive::Integer => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
        }
    }
}

/// A schema fragment classified by the first rule that applies to it
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode<'a> {
    Ref(&'a str),
    OneOf(&'a [Value]),
    AnyOf(&'a [Value]),
    AllOf(&'a [Value]),
    Enum(&'a [Value]),
    Object {
        properties: Option<&'a Map<String, Value>>,
        required: Vec<&'a str>,
    },
    ArrayOf(Option<&'a Value>),
    Primitive(Primitive),
    Unknown,
}

impl<'a> SchemaNode<'a> {
    pub fn classify(value: &'a Value) -> Self {
        let Some(schema) = value.as_object() else {
            return SchemaNode::Unknown;
        };

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return SchemaNode::Ref(reference);
        }
        if let Some(members) = schema.get("oneOf").and_then(Value::as_array) {
            return SchemaNode::OneOf(members);
        }
        if let Some(members) = schema.get("anyOf").and_then(Value::as_array) {
            return SchemaNode::AnyOf(members);
        }
        if let Some(members) = schema.get("allOf").and_then(Value::as_array) {
            return SchemaNode::AllOf(members);
        }
        if let Some(values) = schema.get("enum").and_then(Value::as_array) {
            return SchemaNode::Enum(values);
        }

        let ty = schema.get("type").and_then(Value::as_str);
        let properties = schema.get("properties").and_then(Value::as_object);
        if ty == Some("object") || properties.is_some() {
            let required = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            return SchemaNode::Object {
                properties,
                required,
            };
        }

        match ty {
            Some("array") => SchemaNode::ArrayOf(schema.get("items")),
            Some("string") => SchemaNode::Primitive(Primitive::String),
            Some("number") => SchemaNode::Primitive(Primitive::Number),
            Some("integer") => SchemaNode::Primitive(Primitive::Integer),
            Some("boolean") => SchemaNode::Primitive(Primitive::Boolean),
            Some("null") => SchemaNode::Primitive(Primitive::Null),
            _ => SchemaNode::Unknown,
        }
    }
}

/// Translate a schema fragment. An absent or `null` fragment is `unknown`;
/// a fragment no rule recognizes is `any`.
pub fn schema_to_type(schema: Option<&Value>) -> TypeExpr {
    match schema {
        None | Some(Value::Null) => TypeExpr::unknown(),
        Some(schema) => node_to_type(SchemaNode::classify(schema)),
    }
}

/// [`schema_to_type`] rendered to text
pub fn schema_to_type_string(schema: Option<&Value>) -> String {
    schema_to_type(schema).render()
}

fn node_to_type(node: SchemaNode<'_>) -> TypeExpr {
    match node {
        SchemaNode::Ref(reference) => TypeExpr::Literal(ref_type_name(reference)),
        SchemaNode::OneOf(members) | SchemaNode::AnyOf(members) => {
            TypeExpr::union(members.iter().map(|m| schema_to_type(Some(m))))
        }
        SchemaNode::AllOf(members) => {
            TypeExpr::intersection(members.iter().map(|m| schema_to_type(Some(m))))
        }
        SchemaNode::Enum(values) => {
            TypeExpr::union(values.iter().map(|v| TypeExpr::Literal(v.to_string())))
        }
        SchemaNode::Object {
            properties,
            required,
        } => {
            let mut object = ObjectType::inline();
            for (name, property) in properties.into_iter().flatten() {
                let ty = schema_to_type(Some(property));
                object = if required.contains(&name.as_str()) {
                    object.field(name.as_str(), ty)
                } else {
                    object.optional_field(name.as_str(), ty)
                };
            }
            object.into()
        }
        SchemaNode::ArrayOf(items) => TypeExpr::array_of(schema_to_type(items)),
        SchemaNode::Primitive(primitive) => TypeExpr::literal(primitive.keyword()),
        SchemaNode::Unknown => TypeExpr::any(),
    }
}

/// Type name for a `$ref`: the last pointer segment, unescaped and sanitized
/// the same way model alias names are.
pub fn ref_type_name(reference: &str) -> String {
    let segment = reference.rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        return crate::types::UNKNOWN.to_string();
    }

    sanitize_type_name(&segment.replace("~1", "/").replace("~0", "~"))
}
