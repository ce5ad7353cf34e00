//! Extract → transform → load sequencing
//!
//! [`GeocodingPipeline`] owns one instance of each stage, built from a
//! [`PipelineConfig`], and runs them strictly in order. A fatal error in any
//! stage stops the run before the next stage starts.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract::AddressExtractor;
use crate::geocode::Geocoder;
use crate::load::{build_loader, load_features, FeatureLoader, LoadReport};
use crate::transform::AddressGeocoder;
use crate::types::GeocodeSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Summary of a full pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Downloaded export
    pub raw_csv: PathBuf,
    /// Geocoded output
    pub transformed_csv: PathBuf,
    /// Size of the downloaded export
    pub bytes_extracted: u64,
    /// Transform counts
    pub summary: GeocodeSummary,
    /// Load outcome
    pub load: LoadReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// The geocoding ETL pipeline
pub struct GeocodingPipeline {
    config: PipelineConfig,
    extractor: AddressExtractor,
    transformer: AddressGeocoder,
    loader: Box<dyn FeatureLoader>,
}

impl GeocodingPipeline {
    /// Build every stage from the config
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let extractor = AddressExtractor::from_config(&config.http)?;
        let transformer = AddressGeocoder::from_config(&config)?;
        let loader = build_loader(&config);

        Ok(Self {
            config,
            extractor,
            transformer,
            loader,
        })
    }

    /// Build the pipeline around an injected geocoder and feature loader
    pub fn with_components(
        config: PipelineConfig,
        geocoder: Box<dyn Geocoder>,
        loader: Box<dyn FeatureLoader>,
    ) -> Result<Self> {
        let extractor = AddressExtractor::from_config(&config.http)?;
        let transformer = AddressGeocoder::new(geocoder, &config.city, &config.state);

        Ok(Self {
            config,
            extractor,
            transformer,
            loader,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Download the export into `raw_csv_path()`
    pub async fn extract(&self) -> Result<u64> {
        self.extractor
            .extract(&self.config.remote_url, self.config.raw_csv_path())
            .await
    }

    /// Geocode `raw_csv_path()` into `transformed_csv_path()`
    pub async fn transform(&self) -> Result<GeocodeSummary> {
        self.transformer
            .transform(self.config.raw_csv_path(), self.config.transformed_csv_path())
            .await
    }

    /// Load `transformed_csv_path()` as the configured dataset
    pub fn load(&self) -> Result<LoadReport> {
        load_features(
            self.loader.as_ref(),
            self.config.transformed_csv_path(),
            &self.config.dataset_name,
        )
    }

    /// Run extract, transform and load in order
    pub async fn process(&self) -> Result<PipelineReport> {
        let started_at = Utc::now();
        info!(
            operation = "process",
            provider = self.transformer.provider(),
            store = self.loader.name(),
            "Starting geocoding pipeline"
        );

        let bytes_extracted = self.extract().await?;
        let summary = self.transform().await?;
        let load = self.load()?;

        let finished_at = Utc::now();
        info!(
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Pipeline complete: {summary}"
        );

        Ok(PipelineReport {
            raw_csv: self.config.raw_csv_path(),
            transformed_csv: self.config.transformed_csv_path(),
            bytes_extracted,
            summary,
            load,
            started_at,
            finished_at,
        })
    }
}

impl std::fmt::Debug for GeocodingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingPipeline")
            .field("remote_url", &self.config.remote_url)
            .field("transformer", &self.transformer)
            .field("loader", &self.loader.name())
            .finish_non_exhaustive()
    }
}
