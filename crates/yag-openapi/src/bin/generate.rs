use clap::Parser;
use heck::ToPascalCase;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;
use yag_openapi::cli::{Emit, GenerateArgs};
use yag_openapi::logging::init_tracing;
use yag_openapi::{
    Framework, OpenApiParser, OpenApiValidator, ParameterMerge, ParserOptions, Pipeline,
    RenderOptions, ValidatorOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = GenerateArgs::parse();
    init_tracing(args.verbose);

    let content = tokio::fs::read_to_string(&args.input)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", args.input.display()))?;

    let validator = OpenApiValidator::with_options(ValidatorOptions {
        dereference: !args.no_dereference,
    });
    let parameter_merge = if args.override_parameters {
        ParameterMerge::OperationOverrides
    } else {
        ParameterMerge::Concatenate
    };
    let pipeline = Pipeline::with_parser(
        OpenApiParser::with_validator(validator).with_options(ParserOptions { parameter_merge }),
    )
    .with_render_options(RenderOptions {
        indent_width: args.indent,
    });

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| default_source_name(&args.input));

    let output = match args.target {
        Emit::Hono => pipeline.generate(&name, &content, Framework::Hono).await?,
        Emit::Elysia => pipeline.generate(&name, &content, Framework::Elysia).await?,
        Emit::Models => pipeline.generate_models(&content).await?,
        Emit::Ir => {
            let model = pipeline.inspect(&content).await?;
            let mut json = serde_json::to_string_pretty(&model).into_diagnostic()?;
            json.push('\n');
            json
        }
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.into_diagnostic()?;
            }
            tokio::fs::write(path, output).await.into_diagnostic()?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => print!("{output}"),
    }

    Ok(())
}

fn default_source_name(input: &Path) -> String {
    let name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_pascal_case())
        .unwrap_or_default();
    if name.is_empty() { "Api".to_string() } else { name }
}
