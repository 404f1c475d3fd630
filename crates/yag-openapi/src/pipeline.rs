//! End-to-end generation: document text in, TypeScript text out.

use crate::error::Result;
use crate::framework::Framework;
use crate::model::ApiModel;
use crate::models::ModelsGenerator;
use crate::parser::OpenApiParser;
use crate::types::RenderOptions;
use futures::future::join_all;

/// Parser plus render settings, shared by every generation call
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    parser: OpenApiParser,
    render: RenderOptions,
}

/// Outcome of one schema in a [`Pipeline::generate_batch`] run
#[derive(Debug)]
pub struct BatchOutput {
    pub name: String,
    pub result: Result<String>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: OpenApiParser) -> Self {
        Self {
            parser,
            render: RenderOptions::default(),
        }
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    pub fn parser(&self) -> &OpenApiParser {
        &self.parser
    }

    /// Framework app type module for one document
    #[tracing::instrument(skip(self, content), fields(framework = %framework))]
    pub async fn generate(
        &self,
        source_name: &str,
        content: &str,
        framework: Framework,
    ) -> Result<String> {
        let model = self.parser.parse(content).await?;
        let output = framework
            .code_generator(source_name)
            .with_options(self.render)
            .generate(&model);
        tracing::debug!(routes = model.routes.len(), bytes = output.len(), "generated");
        Ok(output)
    }

    /// Standalone aliases for the document's component schemas
    #[tracing::instrument(skip_all)]
    pub async fn generate_models(&self, content: &str) -> Result<String> {
        let model = self.parser.parse(content).await?;
        Ok(ModelsGenerator::with_options(self.render).generate(&model))
    }

    /// [`Pipeline::generate_models`] wrapped in a namespace
    #[tracing::instrument(skip(self, content))]
    pub async fn generate_models_namespaced(
        &self,
        namespace: &str,
        content: &str,
    ) -> Result<String> {
        let model = self.parser.parse(content).await?;
        Ok(ModelsGenerator::with_options(self.render).generate_namespaced(namespace, &model))
    }

    /// The intermediate representation, for inspection and debugging
    pub async fn inspect(&self, content: &str) -> Result<ApiModel> {
        self.parser.parse(content).await
    }

    /// Generate every `(name, content)` pair concurrently. Results come back
    /// in input order and a failure only affects its own entry.
    pub async fn generate_batch<'a, I>(&self, schemas: I, framework: Framework) -> Vec<BatchOutput>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        join_all(schemas.into_iter().map(|(name, content)| async move {
            let result = self.generate(name, content, framework).await;
            if let Err(e) = &result {
                tracing::error!(schema = name, framework = %framework, error = %e, "schema failed");
            }
            BatchOutput {
                name: name.to_string(),
                result,
            }
        }))
        .await
    }
}
