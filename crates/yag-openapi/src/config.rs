//! KDL build configuration for `yag-openapi-build`.
//!
//! ```kdl
//! output {
//!     dir "src/generated"
//!     indent 4
//! }
//! target "hono"
//! target "elysia"
//! models "models.ts"
//! schema "Petstore" {
//!     path "openapi/petstore.yaml"
//! }
//! ```

use crate::framework::Framework;
use crate::types::RenderOptions;
use miette::{IntoDiagnostic, Result, WrapErr, miette};
use std::path::{Path, PathBuf};

const DEFAULT_MODELS_FILE: &str = "models.ts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub output: OutputConfig,
    pub targets: Vec<Framework>,
    /// File name of the combined models module, relative to the output dir
    pub models: Option<PathBuf>,
    pub schemas: Vec<SchemaSource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub indent: Option<usize>,
}

/// One named input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSource {
    pub name: String,
    pub path: PathBuf,
}

impl BuildConfig {
    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc = text
            .parse::<kdl::KdlDocument>()
            .map_err(|e| miette!("Failed to parse KDL: {}", e))?;

        let mut output: Option<OutputConfig> = None;
        let mut targets = Vec::new();
        let mut models = None;
        let mut schemas: Vec<SchemaSource> = Vec::new();

        for node in doc.nodes() {
            match node.name().value() {
                "output" => {
                    if output.is_some() {
                        return Err(miette!("Multiple output blocks found"));
                    }
                    output = Some(parse_output(node)?);
                }
                "target" => {
                    let framework = first_string(node, "target")?
                        .parse::<Framework>()?;
                    if !targets.contains(&framework) {
                        targets.push(framework);
                    }
                }
                "models" => {
                    let file = node
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or(DEFAULT_MODELS_FILE);
                    models = Some(PathBuf::from(file));
                }
                "schema" => {
                    let schema = parse_schema(node)?;
                    if schemas.iter().any(|s| s.name == schema.name) {
                        return Err(miette!("Duplicate schema name: {}", schema.name));
                    }
                    schemas.push(schema);
                }
                other => {
                    return Err(miette!("Unknown config node: {}", other));
                }
            }
        }

        let output = output.ok_or_else(|| miette!("Missing output block"))?;
        if targets.is_empty() && models.is_none() {
            return Err(miette!("Nothing to generate: add a target or models node"));
        }

        Ok(BuildConfig {
            output,
            targets,
            models,
            schemas,
        })
    }

    /// Read a config file, resolving relative paths against its directory
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_kdl(&text)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    fn relative_to(mut self, base: &Path) -> Self {
        self.output.dir = base.join(&self.output.dir);
        for schema in &mut self.schemas {
            schema.path = base.join(&schema.path);
        }
        self
    }

    pub fn render_options(&self) -> RenderOptions {
        self.output
            .indent
            .map(|indent_width| RenderOptions { indent_width })
            .unwrap_or_default()
    }

    /// Output file for a framework target
    pub fn target_path(&self, framework: Framework) -> PathBuf {
        self.output.dir.join(format!("{}.ts", framework.as_str()))
    }

    pub fn models_path(&self) -> Option<PathBuf> {
        self.models.as_ref().map(|file| self.output.dir.join(file))
    }
}

fn first_string<'a>(node: &'a kdl::KdlNode, what: &str) -> Result<&'a str> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| miette!("{} expects a string value", what))
}

fn parse_output(node: &kdl::KdlNode) -> Result<OutputConfig> {
    let children = node
        .children()
        .ok_or_else(|| miette!("output block has no children"))?;

    let mut dir: Option<PathBuf> = None;
    let mut indent: Option<usize> = None;

    for child in children.nodes() {
        match child.name().value() {
            "dir" => {
                dir = Some(PathBuf::from(first_string(child, "dir")?));
            }
            "indent" => {
                let val = child
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_integer())
                    .ok_or_else(|| miette!("indent expects an integer value"))?;
                indent = Some(
                    usize::try_from(val)
                        .map_err(|_| miette!("indent must be a non-negative integer"))?,
                );
            }
            other => {
                return Err(miette!("Unknown output field: {}", other));
            }
        }
    }

    Ok(OutputConfig {
        dir: dir.ok_or_else(|| miette!("Missing output directory"))?,
        indent,
    })
}

fn parse_schema(node: &kdl::KdlNode) -> Result<SchemaSource> {
    let name = first_string(node, "schema")
        .wrap_err("schema expects a name as first argument")?
        .to_string();

    let children = node
        .children()
        .ok_or_else(|| miette!("schema {} has no children", name))?;

    let mut path: Option<PathBuf> = None;
    for child in children.nodes() {
        match child.name().value() {
            "path" => {
                path = Some(PathBuf::from(first_string(child, "path")?));
            }
            other => {
                return Err(miette!("Unknown schema field: {}", other));
            }
        }
    }

    Ok(SchemaSource {
        path: path.ok_or_else(|| miette!("schema {} is missing a path", name))?,
        name,
    })
}
