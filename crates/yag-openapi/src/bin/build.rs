use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use std::collections::HashSet;
use yag_openapi::Pipeline;
use yag_openapi::cli::BuildArgs;
use yag_openapi::codegen::combine_modules;
use yag_openapi::config::BuildConfig;
use yag_openapi::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = BuildArgs::parse();
    init_tracing(args.verbose);

    let config = BuildConfig::load(&args.config)?;
    let pipeline = Pipeline::new().with_render_options(config.render_options());

    let mut sources = Vec::new();
    for schema in &config.schemas {
        match tokio::fs::read_to_string(&schema.path).await {
            Ok(content) => sources.push((schema.name.as_str(), content)),
            Err(e) => {
                tracing::error!(schema = %schema.name, path = %schema.path.display(), error = %e, "failed to read schema")
            }
        }
    }

    tokio::fs::create_dir_all(&config.output.dir)
        .await
        .into_diagnostic()?;

    let mut succeeded = HashSet::new();
    for &target in &config.targets {
        let outputs = pipeline
            .generate_batch(
                sources.iter().map(|(name, content)| (*name, content.as_str())),
                target,
            )
            .await;

        let mut modules = Vec::new();
        for output in outputs {
            if let Ok(module) = output.result {
                succeeded.insert(output.name);
                modules.push(module);
            }
        }

        let path = config.target_path(target);
        tokio::fs::write(&path, combine_modules(&modules))
            .await
            .into_diagnostic()?;
        tracing::info!(path = %path.display(), modules = modules.len(), "wrote target");
    }

    if let Some(path) = config.models_path() {
        let mut namespaces = Vec::new();
        for (name, content) in &sources {
            match pipeline.generate_models_namespaced(name, content).await {
                Ok(models) => {
                    succeeded.insert(name.to_string());
                    namespaces.push(models);
                }
                Err(e) => tracing::error!(schema = %name, error = %e, "models failed"),
            }
        }
        tokio::fs::write(&path, namespaces.join("\n"))
            .await
            .into_diagnostic()?;
        tracing::info!(path = %path.display(), namespaces = namespaces.len(), "wrote models");
    }

    if !config.schemas.is_empty() && succeeded.is_empty() {
        return Err(miette!("Every configured schema failed"));
    }

    Ok(())
}
