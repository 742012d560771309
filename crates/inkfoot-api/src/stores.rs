//! Handlers for internal store management.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/internal/stores` | geocodes the address before writing |
//! | `PUT` | `/internal/stores/:id` | re-geocodes; state auto-detected |
//! | `DELETE` | `/internal/stores/:id` | 400 while projects reference it |
//! | `POST` | `/internal/stores/bulk` | pre-parsed rows, all-or-nothing |
//!
//! The geocoded state name must exactly match a configured state row; there
//! is no abbreviation fallback or fuzzy matching on this path.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use inkfoot_core::{
  entity::{ClientId, StateId, Store, StoreId},
  error::Error as CoreError,
  geocode::Geocoder,
  store::{BulkStoreRow, NewStore, PortalStore, StoreUpdate},
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, AppState};

/// Geocode `address` and resolve its state against the reference table.
async fn resolve_address<S, G>(
  state: &AppState<S, G>,
  address: &str,
) -> Result<(f64, f64, StateId), ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let geocoded = state
    .geocoder
    .geocode(address.to_owned())
    .await
    .map_err(|e| ApiError::Internal(format!("geocoding failed: {e}")))?
    .ok_or_else(|| {
      ApiError::BadRequest("could not find coordinates for the address".into())
    })?;

  let state_name = geocoded.state.ok_or_else(|| {
    ApiError::BadRequest("could not determine the state from the address provided".into())
  })?;

  let state_row = state
    .store
    .state_by_name(state_name.clone())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::from_store(CoreError::UnknownState(state_name)))?;

  Ok((geocoded.lat, geocoded.lng, state_row.state_id))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateStoreBody {
  pub name:      String,
  pub client_id: ClientId,
  pub address:   String,
}

/// `POST /internal/stores`
pub async fn create<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<CreateStoreBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  if body.name.trim().is_empty() || body.address.trim().is_empty() {
    return Err(ApiError::BadRequest("name, client and address are required".into()));
  }

  let (lat, lng, state_id) = resolve_address(&state, &body.address).await?;
  let store = state
    .store
    .add_store(NewStore {
      client_id: body.client_id,
      state_id,
      name: body.name,
      address: Some(body.address),
      lat: Some(lat),
      lng: Some(lng),
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(store)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateStoreBody {
  pub name:    String,
  pub address: String,
}

/// `PUT /internal/stores/:id`
pub async fn update_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<StoreId>,
  Json(body): Json<UpdateStoreBody>,
) -> Result<Json<Store>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  if body.name.trim().is_empty() || body.address.trim().is_empty() {
    return Err(ApiError::BadRequest("name and address are required".into()));
  }

  let (lat, lng, state_id) = resolve_address(&state, &body.address).await?;
  let store = state
    .store
    .update_store(id, StoreUpdate {
      state_id,
      name: body.name,
      address: Some(body.address),
      lat: Some(lat),
      lng: Some(lng),
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(store))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /internal/stores/:id`
pub async fn delete_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<StoreId>,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  state
    .store
    .delete_store(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Bulk import ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BulkStoresBody {
  pub client_id: ClientId,
  pub stores:    Vec<BulkStoreRow>,
}

#[derive(Debug, Serialize)]
pub struct BulkStoresResult {
  pub inserted: usize,
}

/// `POST /internal/stores/bulk` — the whole batch is one transaction; one
/// bad row cancels the entire upload.
pub async fn bulk<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<BulkStoresBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  if body.stores.is_empty() {
    return Err(ApiError::BadRequest("a non-empty array of stores is required".into()));
  }

  let inserted = state
    .store
    .bulk_add_stores(body.client_id, body.stores)
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(BulkStoresResult { inserted })))
}
