//! # OpenAPI to Hono and Elysia route type generation
//!
//! Reads an OpenAPI 3.x or Swagger 2.0 document (YAML or JSON), reduces it to
//! a framework-agnostic model, and renders the application type a typed HTTP
//! client for Hono or Elysia consumes.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> yag_openapi::error::Result<()> {
//! let document = std::fs::read_to_string("petstore.yaml").unwrap_or_default();
//! let hono = yag_openapi::generate("Petstore", &document, "hono").await?;
//! let models = yag_openapi::generate_models(&document).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Generate from the command line
//!
//! ```bash
//! cargo run -p yag-openapi --bin yag-openapi -- -i petstore.yaml -t elysia
//! ```
//!
//! The `yag-openapi-build` binary reads `yag-openapi.kdl` and writes one file
//! per configured target for every listed schema.
//!
//! ## Modules
//!
//! - [`parser`] - Decoding and reduction to the [`model`]
//! - [`validate`] - Validator seam and the bundled `$ref`-dereferencing validator
//! - [`document`] - Serde model of OpenAPI 3.x and Swagger 2.0
//! - [`translate`] - JSON schema to type expressions
//! - [`types`] - Type expression tree and renderer
//! - [`framework`] - Hono and Elysia type builders
//! - [`codegen`] / [`models`] - Module assembly
//! - [`pipeline`] - End-to-end orchestration
//! - [`config`] - KDL build configuration

pub mod cli;
pub mod codegen;
pub mod config;
pub mod document;
pub mod error;
pub mod framework;
pub mod logging;
pub mod model;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod translate;
pub mod types;
pub mod validate;

pub use error::{GenerateError, Result, ValidationError};
pub use framework::{Framework, FrameworkTypeBuilder};
pub use model::ApiModel;
pub use parser::{OpenApiParser, ParameterMerge, ParserOptions};
pub use pipeline::Pipeline;
pub use types::{RenderOptions, TypeExpr};
pub use validate::{DocumentValidator, OpenApiValidator, ValidatorOptions};

/// Generate the app type module for `target` (`"hono"` or `"elysia"`)
pub async fn generate(source_name: &str, content: &str, target: &str) -> Result<String> {
    let framework: Framework = target.parse()?;
    Pipeline::new().generate(source_name, content, framework).await
}

/// Generate standalone aliases for every component schema
pub async fn generate_models(content: &str) -> Result<String> {
    Pipeline::new().generate_models(content).await
}
