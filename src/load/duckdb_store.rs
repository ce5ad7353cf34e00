//! DuckDB feature store

use super::{read_point_features, FeatureLoader};
use crate::error::{Error, Result};
use duckdb::{params, Connection};
use std::path::{Path, PathBuf};

/// Writes each dataset as a `(x DOUBLE, y DOUBLE, type VARCHAR)` table
#[derive(Debug, Clone)]
pub struct DuckDbFeatureLoader {
    path: PathBuf,
}

impl DuckDbFeatureLoader {
    /// Create a loader backed by the database file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Connection::open(&self.path).map_err(|e| {
            Error::config(format!(
                "Failed to open DuckDB database {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl FeatureLoader for DuckDbFeatureLoader {
    fn name(&self) -> &str {
        "duckdb"
    }

    fn load(&self, input_csv: &Path, dataset: &str) -> Result<usize> {
        let features = read_point_features(input_csv)?;
        let table = quote_ident(dataset);

        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; \
             CREATE TABLE {table} (x DOUBLE, y DOUBLE, type VARCHAR);"
        ))?;

        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {table} (x, y, type) VALUES (?, ?, ?)"))?;
            for feature in &features {
                stmt.execute(params![feature.x, feature.y, feature.kind])?;
            }
        }

        tx.commit()?;
        Ok(features.len())
    }

    fn exists(&self, dataset: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        let conn = self.open()?;
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM information_schema.tables WHERE table_name = ?",
            [dataset],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
