//! US Census Bureau one-line-address geocoder

use super::Geocoder;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::{Coordinate, GeocodeQuery, GeocodeResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Geocoder speaking the Census `locations/onelineaddress` contract
#[derive(Debug)]
pub struct CensusGeocoder {
    client: HttpClient,
    base_url: String,
    benchmark: String,
    params: BTreeMap<String, String>,
}

impl CensusGeocoder {
    /// Create a geocoder for the given endpoint and benchmark
    pub fn new(client: HttpClient, base_url: impl Into<String>, benchmark: &str) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            benchmark: benchmark.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Extra fixed query parameters
    #[must_use]
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    fn request(&self, query: &GeocodeQuery) -> RequestConfig {
        RequestConfig::new()
            .queries(&self.params)
            .query("address", query.text())
            .query("benchmark", &self.benchmark)
            .query("format", "json")
    }
}

#[async_trait]
impl Geocoder for CensusGeocoder {
    fn name(&self) -> &str {
        "census"
    }

    async fn geocode(&self, query: &GeocodeQuery) -> Result<GeocodeResult> {
        let address = query.text();
        let body: Value = self
            .client
            .get_json(&self.base_url, self.request(query))
            .await
            .map_err(|e| Error::geocode(&address, e.to_string()))?;

        parse_response(&address, &body)
    }
}

/// Read the first address match out of a Census response
pub(crate) fn parse_response(address: &str, body: &Value) -> Result<GeocodeResult> {
    let matches = body
        .pointer("/result/addressMatches")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::geocode(
                address,
                "unexpected response shape: missing result.addressMatches array",
            )
        })?;

    let Some(first) = matches.first() else {
        return Ok(GeocodeResult::NoMatch);
    };

    let field = |pointer: &str| -> Result<Coordinate> {
        let value = first.pointer(pointer).ok_or_else(|| {
            Error::geocode(
                address,
                format!("unexpected response shape: missing '{pointer}' in first match"),
            )
        })?;
        Coordinate::from_json(value).map_err(|e| Error::geocode(address, e.to_string()))
    };

    Ok(GeocodeResult::matched(
        field("/coordinates/x")?,
        field("/coordinates/y")?,
    ))
}
