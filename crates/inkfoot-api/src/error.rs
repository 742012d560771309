//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use inkfoot_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Classify a store failure through the core taxonomy: validation → 400,
  /// uniqueness conflicts → 409, missing rows → 404, backend → 500.
  pub fn from_store<E: Into<CoreError>>(err: E) -> Self {
    let err = err.into();
    match &err {
      CoreError::MissingField(_)
      | CoreError::NoMaterials
      | CoreError::InvalidThickness { .. }
      | CoreError::InvalidArea { .. }
      | CoreError::InvalidRegistrationToken
      | CoreError::UnknownState(_)
      | CoreError::UnknownStateAbbreviation(_)
      | CoreError::StoreHasProjects(_) => ApiError::BadRequest(err.to_string()),

      CoreError::ProjectConflict { .. }
      | CoreError::ClientNameTaken(_)
      | CoreError::EmailTaken(_) => ApiError::Conflict(err.to_string()),

      CoreError::ClientNotFound(_)
      | CoreError::StoreNotFound(_)
      | CoreError::ProjectNotFound(_) => ApiError::NotFound(err.to_string()),

      CoreError::Backend(_) => ApiError::Internal(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
