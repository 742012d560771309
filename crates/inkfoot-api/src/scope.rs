//! Tenant scoping for client-facing routes.
//!
//! Session handling lives in the upstream auth gateway (outside this
//! service), which resolves the caller's session and injects the tenant id
//! as the `x-client-id` header. This extractor is the only place that reads
//! it; internal/global routes simply don't use it.

use axum::{extract::FromRequestParts, http::request::Parts};
use inkfoot_core::entity::ClientId;

use crate::error::ApiError;

pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// The authenticated caller's tenant. Present in a handler means the request
/// carried a valid tenant header.
pub struct ClientScope(pub ClientId);

impl<St> FromRequestParts<St> for ClientScope
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    let client = parts
      .headers
      .get(CLIENT_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.parse::<ClientId>().ok())
      .ok_or_else(|| {
        ApiError::Unauthorized(format!("missing or invalid {CLIENT_ID_HEADER} header"))
      })?;
    Ok(ClientScope(client))
  }
}
