//! Point feature loading
//!
//! Materializes the normalized `X,Y,Type` CSV as a named point dataset in a
//! feature store. Two stores are provided:
//!
//! - [`DuckDbFeatureLoader`]: one table per dataset in a DuckDB file
//! - [`ParquetFeatureLoader`]: one `<dataset>.parquet` file per dataset
//!
//! Loading always replaces an existing dataset of the same name. After a
//! load the dataset must exist, otherwise the stage fails with
//! [`Error::FeatureCreationFailed`].

mod duckdb_store;
mod parquet_store;

pub use duckdb_store::DuckDbFeatureLoader;
pub use parquet_store::{point_schema, ParquetFeatureLoader};

use crate::config::{validate_dataset_name, FeatureStoreConfig, PipelineConfig};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One point read from the normalized CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Type")]
    pub kind: String,
}

/// Creates point datasets from the normalized CSV
pub trait FeatureLoader: Send + Sync {
    /// Store name for logs
    fn name(&self) -> &str;

    /// Create or replace `dataset` from `input_csv`, returning the feature count
    fn load(&self, input_csv: &Path, dataset: &str) -> Result<usize>;

    /// Check whether `dataset` exists in the store
    fn exists(&self, dataset: &str) -> Result<bool>;
}

/// Outcome of a load stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Store that received the dataset
    pub store: String,
    /// Dataset name
    pub dataset: String,
    /// Number of point features written
    pub features: usize,
}

/// Build the loader selected by `feature_store`
pub fn build_loader(config: &PipelineConfig) -> Box<dyn FeatureLoader> {
    let location = config.feature_store.location(&config.download_dir);
    debug!(store = config.feature_store.kind(), location = %location.display(), "Building feature loader");

    match config.feature_store {
        FeatureStoreConfig::Duckdb { .. } => Box::new(DuckDbFeatureLoader::new(location)),
        FeatureStoreConfig::Parquet { .. } => Box::new(ParquetFeatureLoader::new(location)),
    }
}

/// Load `input_csv` as `dataset` and verify that the dataset was created
pub fn load_features(
    loader: &dyn FeatureLoader,
    input_csv: impl AsRef<Path>,
    dataset: &str,
) -> Result<LoadReport> {
    let input_csv = input_csv.as_ref();
    info!(
        operation = "load",
        store = loader.name(),
        input = %input_csv.display(),
        dataset,
        "Loading point features"
    );

    if !input_csv.exists() {
        return Err(Error::file_not_found(input_csv));
    }
    validate_dataset_name(dataset)?;

    let features = loader
        .load(input_csv, dataset)
        .map_err(|e| Error::feature_creation(dataset, e.to_string()))?;

    let exists = loader
        .exists(dataset)
        .map_err(|e| Error::feature_creation(dataset, e.to_string()))?;
    if !exists {
        return Err(Error::feature_creation(
            dataset,
            format!("dataset not found in {} store after load", loader.name()),
        ));
    }

    info!(store = loader.name(), dataset, features, "Point features loaded");
    Ok(LoadReport {
        store: loader.name().to_string(),
        dataset: dataset.to_string(),
        features,
    })
}

/// Read every point of a normalized CSV
pub fn read_point_features(path: impl AsRef<Path>) -> Result<Vec<PointFeature>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut features = Vec::new();
    for record in reader.deserialize() {
        features.push(record?);
    }
    Ok(features)
}
