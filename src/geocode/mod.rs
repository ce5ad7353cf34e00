//! Geocoding service clients
//!
//! A [`Geocoder`] turns one [`GeocodeQuery`] into a [`GeocodeResult`]. Two
//! service contracts are implemented and exactly one is active per run,
//! selected by `geocoder.provider` in the config:
//!
//! - [`NominatimGeocoder`]: `q`/`format`/`limit` query, JSON array of places
//!   with `lon`/`lat`
//! - [`CensusGeocoder`]: `address`/`benchmark`/`format` query, JSON object
//!   with `result.addressMatches[].coordinates.{x,y}`
//!
//! A response that does not have the active provider's shape is an error,
//! never a silent "no match".

mod census;
mod nominatim;

pub use census::CensusGeocoder;
pub use nominatim::NominatimGeocoder;

use crate::config::{GeocoderConfig, GeocoderProvider, HttpConfig};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::types::{GeocodeQuery, GeocodeResult};
use async_trait::async_trait;

/// Looks up coordinates for a single address
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Geocode one address.
    ///
    /// `Ok(GeocodeResult::NoMatch)` means the service answered with zero
    /// candidates. Every other problem (transport, status, timeout,
    /// malformed or unexpected body) is an [`crate::Error::Geocode`].
    async fn geocode(&self, query: &GeocodeQuery) -> Result<GeocodeResult>;
}

/// Build the configured geocoder
pub fn build_geocoder(config: &GeocoderConfig, http: &HttpConfig) -> Result<Box<dyn Geocoder>> {
    let client = build_client(config, http)?;
    let base_url = config.endpoint().to_string();

    let geocoder: Box<dyn Geocoder> = match config.provider {
        GeocoderProvider::Nominatim => Box::new(
            NominatimGeocoder::new(client, base_url).with_params(config.params.clone()),
        ),
        GeocoderProvider::Census => Box::new(
            CensusGeocoder::new(client, base_url, &config.benchmark)
                .with_params(config.params.clone()),
        ),
    };

    tracing::debug!(
        provider = geocoder.name(),
        endpoint = config.endpoint(),
        "Geocoder configured"
    );
    Ok(geocoder)
}

/// HTTP client for geocoding requests
fn build_client(config: &GeocoderConfig, http: &HttpConfig) -> Result<HttpClient> {
    let user_agent = config.user_agent.as_deref().unwrap_or(&http.user_agent);

    let mut builder = HttpClientConfig::builder()
        .timeout(config.timeout(http))
        .user_agent(user_agent);

    if let Some(rps) = config.requests_per_second {
        builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
    }

    HttpClient::with_config(builder.build())
}
