//! Handlers for internal client management.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/internal/clients/:id` | 404 if absent |
//! | `PUT` | `/internal/clients/:id` | Body: `{"client_name":"..."}`; 409 on name collision |
//! | `DELETE` | `/internal/clients/:id` | removes users, stores and projects too |
//! | `GET` | `/internal/clients/:id/stores` | the client's stores with state names |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use inkfoot_core::{
  entity::{Client, ClientId, StoreDetail},
  geocode::Geocoder,
  store::PortalStore,
};
use serde::Deserialize;

use crate::{error::ApiError, AppState};

/// `GET /internal/clients/:id`
pub async fn get_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<ClientId>,
) -> Result<Json<Client>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let client = state
    .store
    .get_client(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("client {id} not found")))?;
  Ok(Json(client))
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientBody {
  pub client_name: String,
}

/// `PUT /internal/clients/:id`
pub async fn update_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<ClientId>,
  Json(body): Json<UpdateClientBody>,
) -> Result<Json<Client>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  if body.client_name.trim().is_empty() {
    return Err(ApiError::BadRequest("client name is required".into()));
  }
  let client = state
    .store
    .rename_client(id, body.client_name)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(client))
}

/// `DELETE /internal/clients/:id`
pub async fn delete_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<ClientId>,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  state
    .store
    .delete_client(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /internal/clients/:id/stores`
pub async fn stores_for<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<ClientId>,
) -> Result<Json<Vec<StoreDetail>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let stores = state
    .store
    .stores_for_client(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stores))
}
