//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, PipelineConfig};
use crate::error::Result;
use crate::logging;
use crate::pipeline::GeocodingPipeline;
use serde_json::{json, Value};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let mut config = load_config(&self.cli.config)?;
        logging::init(&config.logging, self.cli.verbose)?;
        debug!(config = %self.cli.config.display(), "Configuration loaded");

        match &self.cli.command {
            Commands::Run => self.process(config).await,
            Commands::Extract { url } => {
                if let Some(url) = url {
                    config.remote_url.clone_from(url);
                    config.validate()?;
                }
                self.extract(config).await
            }
            Commands::Transform => self.transform(config).await,
            Commands::Load { dataset } => {
                if let Some(dataset) = dataset {
                    config.dataset_name.clone_from(dataset);
                    config.validate()?;
                }
                self.load(config)
            }
            Commands::Validate => {
                self.validate(&config);
                Ok(())
            }
        }
    }

    async fn process(&self, config: PipelineConfig) -> Result<()> {
        let pipeline = GeocodingPipeline::new(config)?;
        let report = pipeline.process().await?;

        self.output_message(&json!({
            "type": "REPORT",
            "report": report,
        }));
        Ok(())
    }

    async fn extract(&self, config: PipelineConfig) -> Result<()> {
        let pipeline = GeocodingPipeline::new(config)?;
        let bytes = pipeline.extract().await?;

        self.output_message(&json!({
            "type": "EXTRACT",
            "extract": {
                "url": pipeline.config().remote_url,
                "path": pipeline.config().raw_csv_path(),
                "bytes": bytes,
            }
        }));
        Ok(())
    }

    async fn transform(&self, config: PipelineConfig) -> Result<()> {
        let pipeline = GeocodingPipeline::new(config)?;
        let summary = pipeline.transform().await?;

        self.output_message(&json!({
            "type": "TRANSFORM",
            "transform": {
                "input": pipeline.config().raw_csv_path(),
                "output": pipeline.config().transformed_csv_path(),
                "summary": summary,
                "message": summary.to_string(),
            }
        }));
        Ok(())
    }

    fn load(&self, config: PipelineConfig) -> Result<()> {
        let pipeline = GeocodingPipeline::new(config)?;
        let report = pipeline.load()?;

        self.output_message(&json!({
            "type": "LOAD",
            "load": report,
        }));
        Ok(())
    }

    fn validate(&self, config: &PipelineConfig) {
        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Configuration '{}' is valid: {} geocoder, {} dataset '{}'",
                    self.cli.config.display(),
                    config.geocoder.provider.as_str(),
                    config.feature_store.kind(),
                    config.dataset_name
                )
            }
        }));
    }

    /// Print a message in the selected format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
