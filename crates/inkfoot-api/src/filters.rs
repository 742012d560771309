//! Handlers for the dropdown-filter value endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/filters/project-names` | tenant-scoped, distinct, sorted |
//! | `GET` | `/filters/client-states` | tenant-scoped, distinct, sorted |
//! | `GET` | `/filters/stores` | global store list |
//! | `GET` | `/filters/clients` | clients with primary contact |
//! | `GET` | `/filters/all-states` | full state reference table |

use axum::{extract::State, Json};
use inkfoot_core::{
  entity::{ClientContact, State as StateRow, StoreSummary},
  geocode::Geocoder,
  store::PortalStore,
};

use crate::{error::ApiError, scope::ClientScope, AppState};

/// `GET /filters/project-names`
pub async fn project_names<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let names = state
    .store
    .project_names(client)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(names))
}

/// `GET /filters/client-states`
pub async fn client_states<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let names = state
    .store
    .client_states(client)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(names))
}

/// `GET /filters/stores`
pub async fn stores<S, G>(
  State(state): State<AppState<S, G>>,
) -> Result<Json<Vec<StoreSummary>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let stores = state.store.list_stores().await.map_err(ApiError::from_store)?;
  Ok(Json(stores))
}

/// `GET /filters/clients`
pub async fn clients<S, G>(
  State(state): State<AppState<S, G>>,
) -> Result<Json<Vec<ClientContact>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let clients = state.store.list_clients().await.map_err(ApiError::from_store)?;
  Ok(Json(clients))
}

/// `GET /filters/all-states`
pub async fn all_states<S, G>(
  State(state): State<AppState<S, G>>,
) -> Result<Json<Vec<StateRow>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let states = state.store.list_states().await.map_err(ApiError::from_store)?;
  Ok(Json(states))
}
