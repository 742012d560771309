//! Geoapify-backed implementation of [`Geocoder`].
//!
//! Store writes resolve free-text addresses through Geoapify's forward
//! geocoding API; only the first feature's coordinates and state name are
//! kept. An empty feature list means the address could not be resolved.

pub mod error;

use inkfoot_core::geocode::{GeocodedAddress, Geocoder};
use serde::Deserialize;

pub use error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.geoapify.com/v1/geocode/search";

/// A [`Geocoder`] talking to the Geoapify search endpoint.
///
/// Cloning is cheap — the inner HTTP client is reference-counted.
#[derive(Clone)]
pub struct GeoapifyClient {
  http:     reqwest::Client,
  base_url: String,
  api_key:  String,
}

impl GeoapifyClient {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self::with_base_url(DEFAULT_BASE_URL, api_key)
  }

  /// Point the client at a non-default endpoint (used by tests and proxies).
  pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      http:     reqwest::Client::new(),
      base_url: base_url.into(),
      api_key:  api_key.into(),
    }
  }

  async fn search(&self, address: &str) -> Result<SearchResponse> {
    let response = self
      .http
      .get(&self.base_url)
      .query(&[("text", address), ("apiKey", self.api_key.as_str())])
      .send()
      .await?
      .error_for_status()?
      .json::<SearchResponse>()
      .await?;
    Ok(response)
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
  properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
  lat:   f64,
  lon:   f64,
  state: Option<String>,
}

/// Project the first (best-ranked) feature, if any.
fn first_feature(response: SearchResponse) -> Option<GeocodedAddress> {
  response.features.into_iter().next().map(|feature| GeocodedAddress {
    lat:   feature.properties.lat,
    lng:   feature.properties.lon,
    state: feature.properties.state,
  })
}

impl Geocoder for GeoapifyClient {
  type Error = Error;

  async fn geocode(&self, address: String) -> Result<Option<GeocodedAddress>> {
    Ok(first_feature(self.search(&address).await?))
  }
}
