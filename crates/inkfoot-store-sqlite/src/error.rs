//! Error type for `inkfoot-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain errors (validation, conflicts, not-found) carry the core
  /// taxonomy unchanged so the API layer can classify them.
  #[error(transparent)]
  Core(#[from] inkfoot_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl From<Error> for inkfoot_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      Error::Database(e) => inkfoot_core::Error::Backend(e.to_string()),
      Error::DateParse(m) => inkfoot_core::Error::Backend(m),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
