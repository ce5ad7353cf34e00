//! Nominatim (OpenStreetMap) search API

use super::Geocoder;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::{Coordinate, GeocodeQuery, GeocodeResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Geocoder speaking the Nominatim `/search` contract
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: HttpClient,
    base_url: String,
    params: BTreeMap<String, String>,
}

impl NominatimGeocoder {
    /// Create a geocoder for the given search endpoint
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            params: BTreeMap::new(),
        }
    }

    /// Extra fixed query parameters (e.g. `email`, `countrycodes`)
    #[must_use]
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    fn request(&self, query: &GeocodeQuery) -> RequestConfig {
        RequestConfig::new()
            .queries(&self.params)
            .query("q", query.text())
            .query("format", "json")
            .query("limit", "1")
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
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

/// Read the first place out of a search response
pub(crate) fn parse_response(address: &str, body: &Value) -> Result<GeocodeResult> {
    let places = body.as_array().ok_or_else(|| {
        Error::geocode(address, "unexpected response shape: expected a JSON array")
    })?;

    let Some(first) = places.first() else {
        return Ok(GeocodeResult::NoMatch);
    };

    let field = |name: &str| -> Result<Coordinate> {
        let value = first.get(name).ok_or_else(|| {
            Error::geocode(address, format!("unexpected response shape: missing '{name}'"))
        })?;
        Coordinate::from_json(value).map_err(|e| Error::geocode(address, e.to_string()))
    };

    Ok(GeocodeResult::matched(field("lon")?, field("lat")?))
}
