//! Handlers for project endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/projects` | Body: [`NewProject`]; transactional, 201 on success |
//! | `GET` | `/internal/all-projects` | every project, newest first |
//! | `GET` | `/internal/projects/:id` | project with its bill of materials |
//! | `DELETE` | `/internal/projects/:id` | 404 if absent |
//!
//! There is no project PUT: editing a multi-material project is an open
//! product question, so projects are replaced by delete + create.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use inkfoot_core::{
  entity::{ProjectDetail, ProjectId, ProjectOverview},
  geocode::Geocoder,
  store::{NewProject, PortalStore},
};
use serde::Serialize;

use crate::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct ProjectCreated {
  pub project_id: ProjectId,
}

/// `POST /projects` — the project row and all material rows land in one
/// transaction; any validation failure persists nothing.
pub async fn create<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<NewProject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let project_id = state
    .store
    .add_project(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(ProjectCreated { project_id })))
}

/// `GET /internal/all-projects`
pub async fn list_all<S, G>(
  State(state): State<AppState<S, G>>,
) -> Result<Json<Vec<ProjectOverview>>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let projects = state.store.list_projects().await.map_err(ApiError::from_store)?;
  Ok(Json(projects))
}

/// `GET /internal/projects/:id`
pub async fn get_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<ProjectId>,
) -> Result<Json<ProjectDetail>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let project = state
    .store
    .get_project(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("project {id} not found")))?;
  Ok(Json(project))
}

/// `DELETE /internal/projects/:id`
pub async fn delete_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<ProjectId>,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  state
    .store
    .delete_project(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
