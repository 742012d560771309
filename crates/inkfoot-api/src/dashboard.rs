//! Handlers for the emissions read views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/dashboard/impact-by-store` | top 5 stores by total CO2e |
//! | `GET` | `/dashboard/impact-by-media` | top 5 materials, materials contribution only |
//! | `GET` | `/dashboard/chart-data` | month × material matrix, zero-filled |
//! | `GET` | `/dashboard/stores` | per-store totals with coordinates |
//! | `GET` | `/dashboard/projects-list` | per-project totals, newest first |
//! | `GET` | `/dashboard/factor-gaps` | materials with no emission factor |
//! | `GET` | `/internal/co2e-trends` | monthly totals, optional `clientId` |
//!
//! All dashboard routes are tenant-scoped and accept the same query params
//! (`startDate`, `endDate`, `projectName`, `state`, `storeName`). Every view
//! funnels through the one filter predicate and the one per-project formula
//! in [`inkfoot_core::calc`] — none re-derives totals.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use inkfoot_core::{
  calc::{
    self, ChartData, EmissionRecord, MediaImpact, ProjectEmissions, StoreGeoPoint, StoreImpact,
    TrendPoint,
  },
  entity::ClientId,
  factor::FactorCatalog,
  filter::ReportFilter,
  geocode::Geocoder,
  store::PortalStore,
};
use serde::Deserialize;

use crate::{error::ApiError, scope::ClientScope, AppState};

// ─── Query params ─────────────────────────────────────────────────────────────

/// The filter params shared by every dashboard view.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
  pub start_date:   Option<NaiveDate>,
  pub end_date:     Option<NaiveDate>,
  pub project_name: Option<String>,
  pub state:        Option<String>,
  pub store_name:   Option<String>,
}

impl DashboardParams {
  fn into_filter(self, client: Option<ClientId>) -> ReportFilter {
    ReportFilter {
      client,
      start_date: self.start_date,
      end_date: self.end_date,
      project_name: self.project_name,
      state: self.state,
      store: self.store_name,
    }
  }
}

/// Fetch the read model and catalog for one request.
async fn load<S, G>(
  state: &AppState<S, G>,
  client: Option<ClientId>,
) -> Result<(Vec<EmissionRecord>, FactorCatalog), ApiError>
where
  S: PortalStore,
{
  let records = state
    .store
    .emission_records(client)
    .await
    .map_err(ApiError::from_store)?;
  let catalog = state
    .store
    .factor_catalog()
    .await
    .map_err(ApiError::from_store)?;
  Ok((records, catalog))
}

// ─── Client-facing views ──────────────────────────────────────────────────────

/// `GET /dashboard/impact-by-store`
pub async fn impact_by_store<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
  Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<StoreImpact>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let filter = params.into_filter(Some(client));
  let (records, catalog) = load(&state, Some(client)).await?;
  Ok(Json(calc::impact_by_store(&records, &filter, &catalog)))
}

/// `GET /dashboard/impact-by-media`
pub async fn impact_by_media<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
  Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<MediaImpact>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let filter = params.into_filter(Some(client));
  let (records, catalog) = load(&state, Some(client)).await?;
  Ok(Json(calc::impact_by_media(&records, &filter, &catalog)))
}

/// `GET /dashboard/chart-data`
pub async fn chart_data<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
  Query(params): Query<DashboardParams>,
) -> Result<Json<ChartData>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let filter = params.into_filter(Some(client));
  let (records, catalog) = load(&state, Some(client)).await?;
  Ok(Json(calc::chart_data(&records, &filter, &catalog)))
}

/// `GET /dashboard/stores`
pub async fn stores<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
  Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<StoreGeoPoint>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let filter = params.into_filter(Some(client));
  let (records, catalog) = load(&state, Some(client)).await?;
  Ok(Json(calc::store_geo(&records, &filter, &catalog)))
}

/// `GET /dashboard/projects-list`
pub async fn projects_list<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
  Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<ProjectEmissions>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let filter = params.into_filter(Some(client));
  let (records, catalog) = load(&state, Some(client)).await?;
  Ok(Json(calc::project_list(&records, &filter, &catalog)))
}

/// `GET /dashboard/factor-gaps` — materials in use with no emission factor.
/// The formula degrades those to zero; this is the audit trail for
/// reconciling the catalog.
pub async fn factor_gaps<S, G>(
  State(state): State<AppState<S, G>>,
  ClientScope(client): ClientScope,
  Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let filter = params.into_filter(Some(client));
  let (records, catalog) = load(&state, Some(client)).await?;
  Ok(Json(calc::missing_factors(&records, &filter, &catalog)))
}

// ─── Internal trend view ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendParams {
  pub client_id:  Option<ClientId>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
}

/// `GET /internal/co2e-trends[?clientId=...][&startDate=...][&endDate=...]`
pub async fn trends<S, G>(
  State(state): State<AppState<S, G>>,
  Query(params): Query<TrendParams>,
) -> Result<Json<Vec<TrendPoint>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let filter = ReportFilter {
    client: params.client_id,
    start_date: params.start_date,
    end_date: params.end_date,
    ..ReportFilter::default()
  };
  let (records, catalog) = load(&state, params.client_id).await?;
  Ok(Json(calc::trend(&records, &filter, &catalog)))
}
