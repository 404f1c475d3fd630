//! Framework-specific type builders.
//!
//! A [`FrameworkTypeBuilder`] turns the [`ApiModel`] into the application type
//! a framework's typed client consumes. [`Framework`] selects a builder and
//! the import declarations that go with it.

pub mod elysia;
pub mod hono;
pub mod route_tree;

pub use elysia::ElysiaTypeBuilder;
pub use hono::HonoTypeBuilder;

use crate::codegen::{CodeGenerator, ImportDeclaration, NamedImport};
use crate::error::GenerateError;
use crate::model::{ApiModel, MethodModel, ParameterLocation, RouteModel};
use crate::types::{ObjectType, PropertyKey, TypeExpr};
use std::fmt;
use std::str::FromStr;

/// Builds type expressions for one target framework
pub trait FrameworkTypeBuilder: Send + Sync {
    /// Request side of one operation
    fn build_input_type(&self, method: &MethodModel) -> TypeExpr;

    /// Response side of one operation
    fn build_output_type(&self, method: &MethodModel) -> TypeExpr;

    /// Everything the framework records for one operation
    fn build_method_type(&self, method: &MethodModel) -> TypeExpr;

    /// All operations on one path, keyed by verb
    fn build_route_type(&self, route: &RouteModel) -> TypeExpr;

    /// The application type exported from the generated module
    fn build_app_type(&self, model: &ApiModel) -> TypeExpr;
}

/// Supported target frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    Hono,
    Elysia,
}

impl Framework {
    pub const ALL: [Framework; 2] = [Framework::Hono, Framework::Elysia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Hono => "hono",
            Framework::Elysia => "elysia",
        }
    }

    pub fn type_builder(&self) -> Box<dyn FrameworkTypeBuilder> {
        match self {
            Framework::Hono => Box::new(HonoTypeBuilder),
            Framework::Elysia => Box::new(ElysiaTypeBuilder),
        }
    }

    /// Type-only imports the generated module needs
    pub fn imports(&self) -> Vec<ImportDeclaration> {
        match self {
            Framework::Hono => vec![
                ImportDeclaration::named("hono", [NamedImport::type_only("Hono")]),
                ImportDeclaration::named(
                    "hono/types",
                    [NamedImport::type_only(hono::ENV_TYPE)],
                ),
                ImportDeclaration::named(
                    "hono/utils/http-status",
                    [NamedImport::type_only(hono::STATUS_TYPE)],
                ),
            ],
            Framework::Elysia => vec![ImportDeclaration::named(
                "elysia",
                ["DefinitionBase", "Elysia", "MetadataBase", "SingletonBase"]
                    .map(NamedImport::type_only),
            )],
        }
    }

    /// Generator for a module exporting `source_name`
    pub fn code_generator(&self, source_name: &str) -> CodeGenerator {
        CodeGenerator::new(source_name, self.type_builder(), self.imports())
    }
}

impl FromStr for Framework {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Framework::ALL
            .into_iter()
            .find(|framework| framework.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GenerateError::unsupported_framework(s))
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters at `location` as a block object keyed by name, or `None` if
/// the operation declares none there.
pub(crate) fn parameter_object(
    method: &MethodModel,
    location: ParameterLocation,
    optional: bool,
) -> Option<ObjectType> {
    let mut object = ObjectType::block();
    for param in method.parameters_in(location) {
        object.insert(PropertyKey::Name(param.name.clone()), optional, param.ty.clone());
    }
    (!object.is_empty()).then_some(object)
}

/// Rewrite `{param}` placeholders to `:param`
pub fn colon_path(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close > 0 => {
                out.push_str(&rest[..open]);
                out.push(':');
                out.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
