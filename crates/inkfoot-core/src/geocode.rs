//! The geocoding seam.
//!
//! Store creation and update resolve a free-text address to coordinates and
//! a state name through this trait. `inkfoot-geocode` provides the Geoapify
//! implementation; tests substitute a canned one.

use std::future::Future;

/// A successfully geocoded address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
  pub lat:   f64,
  pub lng:   f64,
  /// Full state name as reported by the geocoder, if any. Store writes
  /// require it to exactly match a configured state row.
  pub state: Option<String>,
}

pub trait Geocoder: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve `address`. `Ok(None)` means the geocoder had no result for it.
  fn geocode(
    &self,
    address: String,
  ) -> impl Future<Output = Result<Option<GeocodedAddress>, Self::Error>> + Send + '_;
}
