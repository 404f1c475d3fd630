//! Assembles a TypeScript module from imports and a framework app type.

use crate::framework::FrameworkTypeBuilder;
use crate::model::ApiModel;
use crate::types::{RenderOptions, sanitize_type_name};

/// One `import` statement of the generated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub module_specifier: String,
    pub named_imports: Vec<NamedImport>,
    pub default_import: Option<String>,
    /// `import type { ... }` for the whole declaration
    pub is_type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub name: String,
    pub is_type_only: bool,
}

impl NamedImport {
    pub fn type_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_type_only: true,
        }
    }
}

impl ImportDeclaration {
    pub fn named(
        module_specifier: impl Into<String>,
        named_imports: impl IntoIterator<Item = NamedImport>,
    ) -> Self {
        Self {
            module_specifier: module_specifier.into(),
            named_imports: named_imports.into_iter().collect(),
            default_import: None,
            is_type_only: false,
        }
    }

    pub fn render(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(default) = &self.default_import {
            clauses.push(default.clone());
        }
        if !self.named_imports.is_empty() {
            let names: Vec<String> = self
                .named_imports
                .iter()
                .map(|import| {
                    if import.is_type_only && !self.is_type_only {
                        format!("type {}", import.name)
                    } else {
                        import.name.clone()
                    }
                })
                .collect();
            clauses.push(format!("{{ {} }}", names.join(", ")));
        }

        let specifier = crate::types::quote(&self.module_specifier);
        if clauses.is_empty() {
            return format!("import {specifier};");
        }
        let kind = if self.is_type_only { "type " } else { "" };
        format!("import {kind}{} from {specifier};", clauses.join(", "))
    }
}

/// Renders `export type <source name> = <app type>;` with its imports
pub struct CodeGenerator {
    source_name: String,
    builder: Box<dyn FrameworkTypeBuilder>,
    imports: Vec<ImportDeclaration>,
    options: RenderOptions,
}

impl CodeGenerator {
    pub fn new(
        source_name: impl Into<String>,
        builder: Box<dyn FrameworkTypeBuilder>,
        imports: Vec<ImportDeclaration>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            builder,
            imports,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn generate(&self, model: &ApiModel) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str(&import.render());
            out.push('\n');
        }
        if !self.imports.is_empty() {
            out.push('\n');
        }

        let app = self.builder.build_app_type(model);
        out.push_str(&format!(
            "export type {} = {};\n",
            sanitize_type_name(&self.source_name),
            app.render_with(&self.options)
        ));
        out
    }
}

/// Join several generated modules into one file, hoisting each distinct
/// import line to the top so shared imports are declared once.
pub fn combine_modules<S: AsRef<str>>(modules: &[S]) -> String {
    let mut imports: Vec<&str> = Vec::new();
    let mut bodies: Vec<&str> = Vec::new();
    for module in modules {
        let module = module.as_ref();
        let mut body_start = 0;
        for line in module.lines() {
            if !line.starts_with("import ") && !line.is_empty() {
                break;
            }
            if !line.is_empty() && !imports.contains(&line) {
                imports.push(line);
            }
            body_start += line.len() + 1;
        }
        let body = module.get(body_start..).unwrap_or_default().trim_end();
        if !body.is_empty() {
            bodies.push(body);
        }
    }

    let mut out = String::new();
    for import in &imports {
        out.push_str(import);
        out.push('\n');
    }
    if !imports.is_empty() && !bodies.is_empty() {
        out.push('\n');
    }
    out.push_str(&bodies.join("\n\n"));
    if !bodies.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Framework;
    use crate::model::ApiInfo;

    fn empty_model() -> ApiModel {
        ApiModel {
            info: ApiInfo {
                title: "Empty".into(),
                version: "0".into(),
                description: None,
            },
            routes: Vec::new(),
            schemas: None,
        }
    }

    #[test]
    fn renders_import_forms() {
        let named = ImportDeclaration::named("hono", [NamedImport::type_only("Hono")]);
        assert_eq!(named.render(), r#"import { type Hono } from "hono";"#);

        let mixed = ImportDeclaration::named(
            "zod",
            [
                NamedImport {
                    name: "z".into(),
                    is_type_only: false,
                },
                NamedImport::type_only("ZodType"),
            ],
        );
        assert_eq!(mixed.render(), r#"import { z, type ZodType } from "zod";"#);

        let whole = ImportDeclaration {
            is_type_only: true,
            ..ImportDeclaration::named("elysia", [NamedImport::type_only("Elysia")])
        };
        assert_eq!(whole.render(), r#"import type { Elysia } from "elysia";"#);

        let default = ImportDeclaration {
            default_import: Some("React".into()),
            ..ImportDeclaration::named("react", [])
        };
        assert_eq!(default.render(), r#"import React from "react";"#);

        let side_effect = ImportDeclaration::named("./polyfill", []);
        assert_eq!(side_effect.render(), r#"import "./polyfill";"#);
    }

    #[test]
    fn hono_module_layout() {
        let output = Framework::Hono.code_generator("Api").generate(&empty_model());
        assert_eq!(
            output,
            concat!(
                "import { type Hono } from \"hono\";\n",
                "import { type BlankEnv } from \"hono/types\";\n",
                "import { type ContentfulStatusCode } from \"hono/utils/http-status\";\n",
                "\n",
                "export type Api = Hono<BlankEnv, {} & {}, \"/\">;\n"
            )
        );
    }

    #[test]
    fn elysia_module_layout() {
        let output = Framework::Elysia.code_generator("Api").generate(&empty_model());
        assert_eq!(
            output,
            concat!(
                "import { type DefinitionBase, type Elysia, type MetadataBase, type SingletonBase } from \"elysia\";\n",
                "\n",
                "export type Api = Elysia<\"\", SingletonBase, DefinitionBase, MetadataBase, {}>;\n"
            )
        );
    }

    #[test]
    fn source_name_is_sanitized() {
        let output = Framework::Hono
            .code_generator("my-api.v2")
            .generate(&empty_model());
        assert!(output.contains("export type my_api_v2 = "));
    }

    #[test]
    fn no_imports_means_no_blank_line() {
        let generator = CodeGenerator::new("Api", Framework::Hono.type_builder(), Vec::new());
        assert!(generator.generate(&empty_model()).starts_with("export type Api = "));
    }

    #[test]
    fn combined_modules_share_imports() {
        let a = Framework::Hono.code_generator("A").generate(&empty_model());
        let b = Framework::Hono.code_generator("B").generate(&empty_model());
        let combined = combine_modules(&[a, b]);

        assert_eq!(combined.matches("import { type Hono } from \"hono\";").count(), 1);
        assert!(combined.starts_with("import { type Hono } from \"hono\";\n"));
        assert!(combined.contains(
            "\n\nexport type A = Hono<BlankEnv, {} & {}, \"/\">;\n\nexport type B = "
        ));
        assert!(combined.ends_with(";\n"));
        assert_eq!(combine_modules::<String>(&[]), "");
    }
}
