use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What `yag-openapi` writes
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    /// Hono client app type
    Hono,
    /// Elysia Eden app type
    Elysia,
    /// Standalone aliases for component schemas
    Models,
    /// Intermediate representation as JSON
    Ir,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate typed client route types from an OpenAPI document")]
pub struct GenerateArgs {
    /// OpenAPI 3.x or Swagger 2.0 document (YAML or JSON)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Name of the exported type (default: input file stem in PascalCase)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Output kind
    #[arg(short = 't', long, value_enum, default_value_t = Emit::Hono)]
    pub target: Emit,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    pub indent: usize,

    /// Keep internal $ref pointers instead of inlining them
    #[arg(long)]
    pub no_dereference: bool,

    /// Let operation parameters replace path-level ones with the same name
    #[arg(long)]
    pub override_parameters: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate route types for every schema in a KDL config")]
pub struct BuildArgs {
    /// Path to KDL config file
    #[arg(short = 'c', long, default_value = "yag-openapi.kdl")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
