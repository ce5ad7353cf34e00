//! Parquet feature store

use super::{read_point_features, FeatureLoader, PointFeature};
use crate::error::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writes each dataset as `<dir>/<dataset>.parquet`
#[derive(Debug, Clone)]
pub struct ParquetFeatureLoader {
    dir: PathBuf,
}

impl ParquetFeatureLoader {
    /// Create a loader writing into `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding `dataset`
    pub fn dataset_path(&self, dataset: &str) -> PathBuf {
        self.dir.join(format!("{dataset}.parquet"))
    }
}

/// Arrow schema of a point dataset
pub fn point_schema() -> Schema {
    Schema::new(vec![
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
        Field::new("type", DataType::Utf8, false),
    ])
}

fn to_record_batch(features: &[PointFeature]) -> Result<RecordBatch> {
    let x: Float64Array = features.iter().map(|f| Some(f.x)).collect();
    let y: Float64Array = features.iter().map(|f| Some(f.y)).collect();
    let kind: StringArray = features.iter().map(|f| Some(f.kind.as_str())).collect();

    let columns: Vec<ArrayRef> = vec![Arc::new(x), Arc::new(y), Arc::new(kind)];
    Ok(RecordBatch::try_new(Arc::new(point_schema()), columns)?)
}

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

impl FeatureLoader for ParquetFeatureLoader {
    fn name(&self) -> &str {
        "parquet"
    }

    fn load(&self, input_csv: &Path, dataset: &str) -> Result<usize> {
        let features = read_point_features(input_csv)?;
        let batch = to_record_batch(&features)?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dataset_path(dataset);
        let staging = crate::extract::staging_path(&path);

        let written = write_batch(&staging, &batch)
            .and_then(|()| std::fs::rename(&staging, &path).map_err(Error::from));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&staging);
            return Err(e);
        }

        Ok(batch.num_rows())
    }

    fn exists(&self, dataset: &str) -> Result<bool> {
        Ok(self.dataset_path(dataset).is_file())
    }
}
