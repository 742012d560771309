//! Error type for `inkfoot-geocode`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("geocoding request failed: {0}")]
  Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
