//! JSON REST API for the inkfoot portal.
//!
//! Exposes an axum [`Router`] backed by any [`PortalStore`] + [`Geocoder`]
//! pair. Session handling, TLS and transport concerns are the caller's
//! responsibility; client-facing routes read the tenant id the upstream
//! gateway injects (see [`scope`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = inkfoot_api::router(AppState {
//!   store:    Arc::new(store),
//!   geocoder: Arc::new(geocoder),
//! });
//! ```

pub mod accounts;
pub mod clients;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod projects;
pub mod scope;
pub mod stores;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use inkfoot_core::{geocode::Geocoder, store::PortalStore};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, G> {
  pub store:    Arc<S>,
  pub geocoder: Arc<G>,
}

impl<S, G> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      geocoder: self.geocoder.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S, G>(state: AppState<S, G>) -> Router<()>
where
  S: PortalStore + 'static,
  G: Geocoder + 'static,
{
  Router::new()
    // Client-facing dashboard (tenant-scoped)
    .route("/dashboard/impact-by-store", get(dashboard::impact_by_store::<S, G>))
    .route("/dashboard/impact-by-media", get(dashboard::impact_by_media::<S, G>))
    .route("/dashboard/chart-data", get(dashboard::chart_data::<S, G>))
    .route("/dashboard/stores", get(dashboard::stores::<S, G>))
    .route("/dashboard/projects-list", get(dashboard::projects_list::<S, G>))
    .route("/dashboard/factor-gaps", get(dashboard::factor_gaps::<S, G>))
    // Dropdown filter values
    .route("/filters/project-names", get(filters::project_names::<S, G>))
    .route("/filters/client-states", get(filters::client_states::<S, G>))
    .route("/filters/stores", get(filters::stores::<S, G>))
    .route("/filters/clients", get(filters::clients::<S, G>))
    .route("/filters/all-states", get(filters::all_states::<S, G>))
    // Projects
    .route("/projects", post(projects::create::<S, G>))
    .route("/internal/all-projects", get(projects::list_all::<S, G>))
    .route(
      "/internal/projects/{id}",
      get(projects::get_one::<S, G>).delete(projects::delete_one::<S, G>),
    )
    .route("/internal/co2e-trends", get(dashboard::trends::<S, G>))
    // Clients
    .route(
      "/internal/clients/{id}",
      get(clients::get_one::<S, G>)
        .put(clients::update_one::<S, G>)
        .delete(clients::delete_one::<S, G>),
    )
    .route("/internal/clients/{id}/stores", get(clients::stores_for::<S, G>))
    // Stores
    .route("/internal/stores", post(stores::create::<S, G>))
    .route("/internal/stores/bulk", post(stores::bulk::<S, G>))
    .route(
      "/internal/stores/{id}",
      put(stores::update_one::<S, G>).delete(stores::delete_one::<S, G>),
    )
    // Accounts
    .route("/internal/invites", post(accounts::create_invite::<S, G>))
    .route("/users/register", post(accounts::register::<S, G>))
    .route("/users/login", post(accounts::login::<S, G>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
