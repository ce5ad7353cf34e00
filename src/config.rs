//! Configuration types for the geocoding pipeline
//!
//! The pipeline is configured from a single YAML file. The document is parsed,
//! its string scalars are rendered through [`crate::template`] so
//! `{{ env.NAME }}` placeholders can pull secrets from the environment, and
//! the result is deserialized into [`PipelineConfig`] and validated. The
//! resulting value is passed explicitly to every component.

use crate::error::{Error, Result};
use crate::template::{self, TemplateContext};
use crate::types::{LogLevel, DEFAULT_CITY, DEFAULT_STATE};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static DATASET_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

// ============================================================================
// Top-Level Pipeline Config
// ============================================================================

/// Complete pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Published CSV export URL of the address spreadsheet
    pub remote_url: String,

    /// Directory holding the raw and transformed CSV files
    pub download_dir: PathBuf,

    /// File name of the downloaded export
    #[serde(default = "default_raw_file_name")]
    pub raw_file_name: String,

    /// File name of the geocoded output
    #[serde(default = "default_transformed_file_name")]
    pub transformed_file_name: String,

    /// City appended to every street address
    #[serde(default = "default_city")]
    pub city: String,

    /// State appended to every street address
    #[serde(default = "default_state")]
    pub state: String,

    /// Name of the point feature dataset to create
    #[serde(default = "default_dataset_name")]
    pub dataset_name: String,

    /// HTTP settings shared by every network call
    #[serde(default)]
    pub http: HttpConfig,

    /// Geocoding service settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Where point features are materialized
    #[serde(default)]
    pub feature_store: FeatureStoreConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_raw_file_name() -> String {
    "raw_addresses.csv".to_string()
}

fn default_transformed_file_name() -> String {
    "new_addresses.csv".to_string()
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_state() -> String {
    DEFAULT_STATE.to_string()
}

fn default_dataset_name() -> String {
    "avoid_points".to_string()
}

impl PipelineConfig {
    /// Minimal config with defaults for everything optional
    pub fn new(remote_url: impl Into<String>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            remote_url: remote_url.into(),
            download_dir: download_dir.into(),
            raw_file_name: default_raw_file_name(),
            transformed_file_name: default_transformed_file_name(),
            city: default_city(),
            state: default_state(),
            dataset_name: default_dataset_name(),
            http: HttpConfig::default(),
            geocoder: GeocoderConfig::default(),
            feature_store: FeatureStoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Path of the downloaded export
    pub fn raw_csv_path(&self) -> PathBuf {
        self.download_dir.join(&self.raw_file_name)
    }

    /// Path of the geocoded output
    pub fn transformed_csv_path(&self) -> PathBuf {
        self.download_dir.join(&self.transformed_file_name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_http_url("remote_url", &self.remote_url)?;

        if self.download_dir.as_os_str().is_empty() {
            return Err(Error::missing_field("download_dir"));
        }

        for (field, value) in [
            ("raw_file_name", &self.raw_file_name),
            ("transformed_file_name", &self.transformed_file_name),
            ("city", &self.city),
            ("state", &self.state),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(field, "cannot be empty"));
            }
        }

        if self.raw_file_name == self.transformed_file_name {
            return Err(Error::invalid_value(
                "transformed_file_name",
                "must differ from raw_file_name",
            ));
        }

        validate_dataset_name(&self.dataset_name)?;
        self.http.validate()?;
        self.geocoder.validate()?;

        Ok(())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent for requests that do not set their own
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("geocode-etl/{}", env!("CARGO_PKG_VERSION"))
}

impl HttpConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "http.timeout_seconds",
                "must be greater than zero",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::invalid_value("http.user_agent", "cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Geocoder Config
// ============================================================================

/// Geocoding service contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocoderProvider {
    /// OSM Nominatim search API (`q`, `format`, `limit`)
    #[default]
    Nominatim,
    /// US Census one-line-address API (`address`, `benchmark`, `format`)
    Census,
}

impl GeocoderProvider {
    /// Public endpoint used when no base URL is configured
    pub fn default_base_url(self) -> &'static str {
        match self {
            GeocoderProvider::Nominatim => "https://nominatim.openstreetmap.org/search",
            GeocoderProvider::Census => {
                "https://geocoding.geo.census.gov/geocoder/locations/onelineaddress"
            }
        }
    }

    /// Provider name for logs
    pub fn as_str(self) -> &'static str {
        match self {
            GeocoderProvider::Nominatim => "nominatim",
            GeocoderProvider::Census => "census",
        }
    }
}

/// Geocoding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Which response contract to speak
    #[serde(default)]
    pub provider: GeocoderProvider,

    /// Endpoint override
    #[serde(default)]
    pub base_url: Option<String>,

    /// Census benchmark (ignored by Nominatim)
    #[serde(default = "default_benchmark")]
    pub benchmark: String,

    /// User agent sent with every lookup (Nominatim rejects anonymous clients)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra fixed query parameters, e.g. an API key
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Optional client-side request rate cap
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Per-request timeout override in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: GeocoderProvider::default(),
            base_url: None,
            benchmark: default_benchmark(),
            user_agent: None,
            params: BTreeMap::new(),
            requests_per_second: None,
            timeout_seconds: None,
        }
    }
}

fn default_benchmark() -> String {
    "2020".to_string()
}

impl GeocoderConfig {
    /// Endpoint to call
    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Timeout for geocoding requests, falling back to the shared HTTP timeout
    pub fn timeout(&self, http: &HttpConfig) -> Duration {
        self.timeout_seconds
            .map_or_else(|| http.timeout(), Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        validate_http_url("geocoder.base_url", self.endpoint())?;

        if self.provider == GeocoderProvider::Census && self.benchmark.trim().is_empty() {
            return Err(Error::invalid_value("geocoder.benchmark", "cannot be empty"));
        }

        if let Some(agent) = &self.user_agent {
            if agent.trim().is_empty() {
                return Err(Error::invalid_value("geocoder.user_agent", "cannot be empty"));
            }
        }

        if self.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "geocoder.requests_per_second",
                "must be greater than zero",
            ));
        }

        if self.timeout_seconds == Some(0) {
            return Err(Error::invalid_value(
                "geocoder.timeout_seconds",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Feature Store Config
// ============================================================================

/// Where the point feature dataset is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureStoreConfig {
    /// Table in a DuckDB database file
    Duckdb {
        /// Database file (default: `<download_dir>/features.duckdb`)
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// One Parquet file per dataset
    Parquet {
        /// Output directory (default: `<download_dir>/features`)
        #[serde(default)]
        dir: Option<PathBuf>,
    },
}

impl Default for FeatureStoreConfig {
    fn default() -> Self {
        FeatureStoreConfig::Duckdb { path: None }
    }
}

impl FeatureStoreConfig {
    /// Store kind as written in the config
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureStoreConfig::Duckdb { .. } => "duckdb",
            FeatureStoreConfig::Parquet { .. } => "parquet",
        }
    }

    /// Resolve the store location against the download directory
    pub fn location(&self, download_dir: &Path) -> PathBuf {
        match self {
            FeatureStoreConfig::Duckdb { path } => path
                .clone()
                .unwrap_or_else(|| download_dir.join("features.duckdb")),
            FeatureStoreConfig::Parquet { dir } => {
                dir.clone().unwrap_or_else(|| download_dir.join("features"))
            }
        }
    }
}

// ============================================================================
// Logging Config
// ============================================================================

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level (overridden by `RUST_LOG`)
    #[serde(default)]
    pub level: LogLevel,

    /// Log file, truncated at startup; stderr when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// ============================================================================
// Loading
// ============================================================================

/// Load a pipeline config from a YAML file, rendering `{{ env.* }}` placeholders
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path)
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;

    load_config_from_str(&content, &TemplateContext::from_env())
}

/// Load a pipeline config from YAML text
pub fn load_config_from_str(yaml: &str, ctx: &TemplateContext) -> Result<PipelineConfig> {
    let document: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let rendered = template::render_value(&document, ctx)?;

    let config: PipelineConfig = serde_yaml::from_value(rendered)?;
    config.validate()?;
    Ok(config)
}

/// Check that a dataset name is usable as a table or file name
pub fn validate_dataset_name(name: &str) -> Result<()> {
    if DATASET_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(Error::invalid_value(
            "dataset_name",
            format!("'{name}' must match [A-Za-z_][A-Za-z0-9_]*"),
        ))
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::missing_field(field));
    }

    let url = url::Url::parse(value)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r"
remote_url: https://docs.google.com/spreadsheets/d/e/abc/pub?output=csv
download_dir: data
";

    #[test]
    fn test_minimal_config_defaults() {
        let config = load_config_from_str(MINIMAL, &TemplateContext::new()).unwrap();

        assert_eq!(config.city, "Boulder");
        assert_eq!(config.state, "CO");
        assert_eq!(config.dataset_name, "avoid_points");
        assert_eq!(config.raw_csv_path(), PathBuf::from("data/raw_addresses.csv"));
        assert_eq!(
            config.transformed_csv_path(),
            PathBuf::from("data/new_addresses.csv")
        );
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert_eq!(config.geocoder.provider, GeocoderProvider::Nominatim);
        assert_eq!(
            config.geocoder.endpoint(),
            "https://nominatim.openstreetmap.org/search"
        );
        assert_eq!(config.feature_store, FeatureStoreConfig::Duckdb { path: None });
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
remote_url: https://example.com/sheet.csv
download_dir: /tmp/wnv
raw_file_name: addresses.csv
transformed_file_name: geocoded.csv
city: Longmont
state: CO
dataset_name: Avoid_Points
http:
  timeout_seconds: 5
  user_agent: wnv-course/1.0
geocoder:
  provider: census
  benchmark: "2020"
  params:
    vintage: Current_Current
  requests_per_second: 2
feature_store:
  type: parquet
  dir: /tmp/wnv/features
logging:
  level: debug
  file: /tmp/wnv/wnv.log
"#;
        let config = load_config_from_str(yaml, &TemplateContext::new()).unwrap();

        assert_eq!(config.city, "Longmont");
        assert_eq!(config.raw_csv_path(), PathBuf::from("/tmp/wnv/addresses.csv"));
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.geocoder.provider, GeocoderProvider::Census);
        assert_eq!(
            config.geocoder.endpoint(),
            "https://geocoding.geo.census.gov/geocoder/locations/onelineaddress"
        );
        assert_eq!(
            config.geocoder.params.get("vintage"),
            Some(&"Current_Current".to_string())
        );
        assert_eq!(config.geocoder.requests_per_second, Some(2));
        assert_eq!(
            config.feature_store.location(&config.download_dir),
            PathBuf::from("/tmp/wnv/features")
        );
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_env_placeholder_rendered() {
        let yaml = r#"
remote_url: https://example.com/sheet.csv
download_dir: data
geocoder:
  params:
    api_key: "{{ env.GEOCODER_KEY }}"
"#;
        let ctx = TemplateContext::new().with_env("GEOCODER_KEY", "k-123");
        let config = load_config_from_str(yaml, &ctx).unwrap();
        assert_eq!(
            config.geocoder.params.get("api_key"),
            Some(&"k-123".to_string())
        );
    }

    #[test]
    fn test_undefined_env_placeholder() {
        let yaml = r#"
remote_url: https://example.com/sheet.csv
download_dir: data
geocoder:
  params:
    api_key: "{{ env.NOT_SET_ANYWHERE }}"
"#;
        let result = load_config_from_str(yaml, &TemplateContext::new());
        assert!(matches!(result, Err(Error::UndefinedVariable { .. })));
    }

    #[test]
    fn test_placeholder_in_comment_ignored() {
        let yaml = r"
# set api_key to {{ env.GEOCODER_KEY }} when needed
remote_url: https://example.com/sheet.csv
download_dir: data
";
        let config = load_config_from_str(yaml, &TemplateContext::new()).unwrap();
        assert!(config.geocoder.params.is_empty());
    }

    #[test]
    fn test_env_value_with_yaml_syntax() {
        let yaml = r#"
remote_url: https://example.com/sheet.csv
download_dir: data
geocoder:
  params:
    api_key: "{{ env.GEOCODER_KEY }}"
"#;
        let ctx = TemplateContext::new().with_env("GEOCODER_KEY", "abc#def: x");
        let config = load_config_from_str(yaml, &ctx).unwrap();
        assert_eq!(
            config.geocoder.params.get("api_key"),
            Some(&"abc#def: x".to_string())
        );
    }

    #[test]
    fn test_missing_remote_url() {
        let result = load_config_from_str("download_dir: data\n", &TemplateContext::new());
        assert!(matches!(result, Err(Error::YamlParse(_))));
    }

    #[test]
    fn test_invalid_remote_url() {
        let config = PipelineConfig::new("not a url", "data");
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        let config = PipelineConfig::new("ftp://example.com/sheet.csv", "data");
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = PipelineConfig::new("https://example.com/sheet.csv", "data");
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_file_names_rejected() {
        let mut config = PipelineConfig::new("https://example.com/sheet.csv", "data");
        config.transformed_file_name = config.raw_file_name.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dataset_name_validation() {
        assert!(validate_dataset_name("avoid_points").is_ok());
        assert!(validate_dataset_name("_tmp1").is_ok());
        assert!(validate_dataset_name("1points").is_err());
        assert!(validate_dataset_name("avoid points").is_err());
        assert!(validate_dataset_name("x; DROP TABLE y").is_err());
        assert!(validate_dataset_name("").is_err());
    }

    #[test]
    fn test_geocoder_timeout_override() {
        let http = HttpConfig::default();
        let mut geocoder = GeocoderConfig::default();
        assert_eq!(geocoder.timeout(&http), Duration::from_secs(10));

        geocoder.timeout_seconds = Some(3);
        assert_eq!(geocoder.timeout(&http), Duration::from_secs(3));
    }

    #[test]
    fn test_feature_store_default_location() {
        let store = FeatureStoreConfig::default();
        assert_eq!(
            store.location(Path::new("data")),
            PathBuf::from("data/features.duckdb")
        );

        let store = FeatureStoreConfig::Parquet { dir: None };
        assert_eq!(store.location(Path::new("data")), PathBuf::from("data/features"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/definitely/not/here/pipeline.yaml");
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }
}
